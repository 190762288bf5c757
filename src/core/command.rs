//! Command contract and result codes
//!
//! Every unit of shell functionality, built-in or externally registered,
//! implements [`Command`]. Execution returns a tagged outcome: a plain
//! result code, a clean failure carrying a reserved code and a message, or
//! an unexpected error that only gets a backtrace when tracing is on.

use thiserror::Error;

use crate::shell::Shell;
use crate::validation::{Diagnostics, Target};

/// Reserved result codes. Zero is success; negative values are specific
/// failure categories. Commands may return further negative codes for
/// domain-specific failures.
pub mod code {
    pub const OK: i32 = 0;
    pub const UNKNOWN_ERROR: i32 = -1;
    pub const PARSE_ERROR: i32 = -2;
    pub const ABORT: i32 = -3;
    pub const PROCESS_ERROR: i32 = -5;
    pub const INVALID_PROJECT: i32 = -7;
    pub const INVALID_PATH: i32 = -11;
    pub const INVALID_OPTION_VALUE: i32 = -12;
    pub const UNSUPPORTED: i32 = -14;
    pub const UNKNOWN_COMMAND: i32 = -15;
    pub const MISSING_OPTION_VALUE: i32 = -18;
    pub const MISSING_EXTENSION: i32 = -19;
    pub const UNKNOWN_EXECUTABLE: i32 = -20;
}

/// Failure modes of command execution
#[derive(Debug, Error)]
pub enum CommandError {
    /// The expected, clean failure path: a reserved (or domain-specific)
    /// code plus a user-facing message, shown without a backtrace.
    #[error("{message}")]
    Failure { code: i32, message: String },

    /// Anything else that went wrong. The shell prints a terse message,
    /// and the full error chain only when tracing is enabled.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl CommandError {
    /// Builds the clean failure variant
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        CommandError::Failure {
            code,
            message: message.into(),
        }
    }

    /// The result code this error maps to
    pub fn code(&self) -> i32 {
        match self {
            CommandError::Failure { code, .. } => *code,
            CommandError::Unexpected(_) => code::UNKNOWN_ERROR,
        }
    }
}

/// Outcome of executing a command: a result code or a tagged failure
pub type CommandResult = Result<i32, CommandError>;

/// Base contract for all commands
pub trait Command {
    /// Canonical name, unique across the registry
    fn name(&self) -> &str;

    /// Alternate names, in declaration order
    fn aliases(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Hidden commands are excluded from default listings
    fn hidden(&self) -> bool {
        false
    }

    /// One-line help summary
    fn header(&self) -> &str;

    /// Help text; `verbose` adds option details beyond the synopsis
    fn usage(&self, verbose: bool) -> String;

    /// Runs the command with its arguments (command name not included)
    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult;

    /// Validates a target through the shell's validation engine.
    /// Commands with their own validators can override this.
    fn validate(&self, shell: &Shell, target: &Target, filter: &[String]) -> Diagnostics {
        shell.validation.validate(shell, target, filter)
    }

    /// Candidate completions for interactive input, if any
    fn completions(&self, _shell: &Shell) -> Vec<String> {
        Vec::new()
    }
}

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .finish()
    }
}
