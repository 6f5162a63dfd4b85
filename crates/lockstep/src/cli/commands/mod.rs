//! CLI commands

mod completions;
mod init;
mod updated;

pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use updated::UpdatedCommand;
