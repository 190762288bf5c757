//! MAB - An interactive shell for mobile-backend projects
//!
//! MAB wraps mobile-backend project chores in a command shell with
//! persistent history, user aliases, and runtime-registered commands.
//! The companion `mab-simple-gen` binary turns REST example transcripts
//! into per-platform SDK descriptors without a session.

pub mod cli;
pub mod commands;
pub mod core;
pub mod extension;
pub mod session;
pub mod shell;
pub mod simplegen;
pub mod validation;

pub use self::core::{code, Command, CommandError, CommandResult};
pub use self::shell::Shell;
