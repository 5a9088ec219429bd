use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use promptlint_templates::join;
use promptlint_templates::split;
use promptlint_templates::ContentPart;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Parts {
    /// File to read. Reads stdin when omitted.
    file: Option<Utf8PathBuf>,

    /// Read a JSON array of content parts and print the joined text.
    #[arg(long)]
    join: bool,
}

impl Command for Parts {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        let input = match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path}"))?,
            None => {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("Failed to read stdin")?;
                input
            }
        };

        if self.join {
            let parts: Vec<ContentPart> =
                serde_json::from_str(&input).context("Input is not a JSON array of content parts")?;
            print!("{}", join(&parts));
        } else {
            let parts = split(&input);
            if parts.is_empty() {
                tracing::info!("no multimodal variables found");
            }
            println!("{}", serde_json::to_string_pretty(&parts)?);
        }

        Ok(Exit::success())
    }
}
