mod check;
mod parts;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum PromptlintCommand {
    /// Check prompt templates for template errors
    Check(self::check::Check),
    /// Split text into multimodal content parts, or join them back
    Parts(self::parts::Parts),
}

impl Command for PromptlintCommand {
    fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            Self::Check(check) => check.execute(args),
            Self::Parts(parts) => parts.execute(args),
        }
    }
}
