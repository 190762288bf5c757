//! Shell core: the command contract, registry, tokenizer, and hook chain

pub mod command;
pub mod hooks;
pub mod registry;
pub mod tokenizer;

pub use command::{code, Command, CommandError, CommandResult};
pub use hooks::{Hook, HookChain, HookError, HookOutcome, HookReport};
pub use registry::{Registry, RegistryError};
pub use tokenizer::{tokenize, ParseError};
