use std::process::ExitCode;

use crate::args::GlobalArgs;

/// How a command finished, with an optional summary for stderr.
#[derive(Debug)]
pub struct Exit {
    code: ExitCode,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Self {
        Self {
            code: ExitCode::SUCCESS,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            code: ExitCode::FAILURE,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn report(self, global: &GlobalArgs) -> ExitCode {
        if let Some(message) = self.message {
            if !global.quiet {
                eprintln!("{message}");
            }
        }
        self.code
    }
}
