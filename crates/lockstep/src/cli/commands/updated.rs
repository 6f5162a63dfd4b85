//! Updated command

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use lockstep_core::config::{config_root, load_config_or_default, Config};
use lockstep_core::monorepo::{
    packages_of, DependencyGraph, ForcePublish, PackageDiscovery, UpdatedPackages,
};
use lockstep_core::{Update, UpdateOptions, UpdatedPackagesCollector};
use lockstep_git::GitRepo;

use crate::cli::{output, Cli, OutputFormat};

/// List packages that need a new version
#[derive(Debug, Default, Args)]
pub struct UpdatedCommand {
    /// Compare against this ref instead of the latest tag
    #[arg(long, value_name = "REF")]
    pub since: Option<String>,

    /// Only look at the last commit and include every package
    #[arg(long)]
    pub canary: bool,

    /// Always include these packages (comma-separated, `*` or no value for all)
    #[arg(long, value_name = "LIST", num_args = 0..=1, default_missing_value = "*")]
    pub force_publish: Option<String>,

    /// Intended bump type; `pre*` values skip prerelease detection
    #[arg(long, value_name = "TOKEN")]
    pub cd_version: Option<String>,

    /// Ignore changed files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,
}

impl UpdatedCommand {
    /// Execute the updated command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            since = ?self.since,
            canary = self.canary,
            "executing updated command"
        );
        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;
        let root = config_path
            .as_deref()
            .map(config_root)
            .unwrap_or_else(|| cwd.clone())
            .canonicalize()?;

        let discovered = PackageDiscovery::new(&root, config.packages.clone()).discover()?;
        let graph = DependencyGraph::build(&discovered, config.changes.include_dev_dependencies);
        let packages = packages_of(&discovered);
        let private: HashSet<&str> = discovered
            .iter()
            .filter(|d| d.private)
            .map(|d| d.package.name.as_str())
            .collect();

        let repo = GitRepo::discover(&root)?;
        let repo_root = repo.path().canonicalize()?;

        let options = self.options(&config);
        let result =
            UpdatedPackagesCollector::new(&repo, repo_root, &packages, &graph).collect(&options)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&result.updates)?);
            }
            OutputFormat::Text => {
                self.print_text(cli, &root, packages.len(), &private, &graph, &result)
            }
        }

        Ok(())
    }

    /// Options from the config file with command-line flags on top
    fn options(&self, config: &Config) -> UpdateOptions {
        let mut overrides = UpdateOptions::new().with_canary(self.canary);
        if let Some(since) = &self.since {
            overrides = overrides.with_since(since);
        }
        if let Some(list) = &self.force_publish {
            overrides = overrides.with_force_publish(ForcePublish::from_arg(list));
        }
        if let Some(token) = &self.cd_version {
            overrides = overrides.with_cd_version(token);
        }
        for pattern in &self.ignore {
            overrides = overrides.with_ignore(pattern);
        }

        UpdateOptions::from_config(&config.changes).merge(overrides)
    }

    fn print_text(
        &self,
        cli: &Cli,
        root: &Path,
        package_count: usize,
        private: &HashSet<&str>,
        graph: &DependencyGraph,
        result: &UpdatedPackages<'_>,
    ) {
        if !cli.quiet {
            for cycle in graph.cycles() {
                output::warning(&format!("Dependency cycle: {}", cycle.join(" -> ")));
            }
            match &result.since {
                Some(since) => output::info(&format!(
                    "Comparing with {} across {} packages",
                    style(since).yellow(),
                    package_count
                )),
                None => output::info("No tags found, every package counts as changed"),
            }
        }

        if result.updates.is_empty() {
            if !cli.quiet {
                output::success("No packages need updating");
            }
            return;
        }

        for update in &result.updates {
            let pkg = update.package;
            if cli.quiet {
                println!("{}", pkg.name);
                continue;
            }
            println!(
                "{}",
                update_line(update, root, private.contains(pkg.name.as_str()))
            );
        }

        if !cli.quiet && cli.verbose {
            println!();
            println!(
                "  {} changed, {} prereleased, {} dependent",
                result.sets.updated.len(),
                result.sets.prereleased.len(),
                result.sets.dependent.len()
            );
        }
    }
}

/// One text-mode line: name, version, reason, location and a private marker
fn update_line(update: &Update<'_>, root: &Path, private: bool) -> String {
    let pkg = update.package;
    let mut line = format!(
        "  {} {} ({}) {}",
        style(&pkg.name).cyan(),
        style(format!("v{}", pkg.version)).green(),
        update.reason,
        style(relative_display(root, pkg.location()).display().to_string()).dim()
    );
    if private {
        line.push_str(&format!(" {}", style("private").magenta()));
    }
    line
}

fn relative_display(root: &Path, location: &Path) -> PathBuf {
    location
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| location.to_path_buf())
}
