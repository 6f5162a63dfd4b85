//! Comparison point selection

use tracing::{debug, info};

use crate::error::Result;

use super::history::History;

/// Number of revision characters used for canary ranges
pub const SHORT_REVISION_LEN: usize = 8;

/// Pick the history point changes are measured against.
///
/// Returns `None` when the repository has no tags and nothing was given
/// explicitly, meaning every package counts as changed.
pub fn select_since<H: History>(
    history: &H,
    since: Option<&str>,
    canary: bool,
) -> Result<Option<String>> {
    if !history.has_tags()? {
        debug!(since = ?since, "repository has no tags, keeping requested comparison point");
        return Ok(since.map(str::to_string));
    }

    let selected = if canary {
        // Anchor on the parent so every commit a merge brought in is covered.
        let revision = history.current_revision()?;
        let short: String = revision.chars().take(SHORT_REVISION_LEN).collect();
        format!("{short}^..{short}")
    } else {
        match since {
            Some(explicit) => explicit.to_string(),
            None => history.latest_tag()?,
        }
    };

    info!(since = %selected, canary, "comparing with");
    Ok(Some(selected))
}
