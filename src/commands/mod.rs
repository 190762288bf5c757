//! # Built-in Commands
//!
//! Every command the shell ships with. [`install`] registers them all on
//! a fresh shell and exposes each one to the locator system as
//! `builtin:<name>`, so a displaced builtin can always be brought back
//! with `register`.
//!
//! | Command | Aliases | Purpose |
//! |---------|---------|---------|
//! | `alias`, `unalias` | | User command shortcuts |
//! | `clear` | | Clear the screen |
//! | `diagnostics` | | Environment and session state |
//! | `exec` | `x` | Run an external program |
//! | `help` | `?` | Command listings |
//! | `history` | `h` | Recorded lines, `!n` recall numbers |
//! | `login` | | Store credentials |
//! | `open` | | Current project in the editor |
//! | `quit` | `exit`, `q` | End the session |
//! | `register` | | Add or remove commands at runtime |
//! | `run` | `.` | Execute a script file |
//! | `set` | | Session settings |
//! | `topic` | `howto` | Prose help topics |
//! | `validate` | | Check project, workspace, proxies |

mod control;
mod diagnostics;
mod exec;
mod help;
mod history;
mod login;
mod open;
mod register;
mod run;
mod set;
mod validate;

pub use control::{ClearCommand, QuitCommand};
pub use diagnostics::DiagnosticsCommand;
pub use exec::ExecCommand;
pub use help::{HelpCommand, TopicCommand};
pub use history::HistoryCommand;
pub use login::LoginCommand;
pub use open::OpenCommand;
pub use register::RegisterCommand;
pub use run::RunCommand;
pub use set::{AliasCommand, SetCommand, UnaliasCommand};
pub use validate::ValidateCommand;

use std::rc::Rc;

use crate::core::{Command, RegistryError};
use crate::extension::CommandResolver;
use crate::shell::Shell;

/// Registers every built-in command and its locator factory
pub fn install(shell: &mut Shell) -> Result<(), RegistryError> {
    for command in builtins() {
        shell.registry.register(command)?;
    }
    add_builtin_factories(&mut shell.resolver);
    Ok(())
}

fn builtins() -> Vec<Rc<dyn Command>> {
    vec![
        Rc::new(AliasCommand),
        Rc::new(ClearCommand),
        Rc::new(DiagnosticsCommand),
        Rc::new(ExecCommand),
        Rc::new(HelpCommand),
        Rc::new(HistoryCommand),
        Rc::new(LoginCommand),
        Rc::new(OpenCommand),
        Rc::new(QuitCommand),
        Rc::new(RegisterCommand),
        Rc::new(RunCommand),
        Rc::new(SetCommand),
        Rc::new(TopicCommand),
        Rc::new(UnaliasCommand),
        Rc::new(ValidateCommand),
    ]
}

/// Factories behind `builtin:<name>` locators
pub fn add_builtin_factories(resolver: &mut CommandResolver) {
    resolver.add_factory("alias", || Rc::new(AliasCommand));
    resolver.add_factory("clear", || Rc::new(ClearCommand));
    resolver.add_factory("diagnostics", || Rc::new(DiagnosticsCommand));
    resolver.add_factory("exec", || Rc::new(ExecCommand));
    resolver.add_factory("help", || Rc::new(HelpCommand));
    resolver.add_factory("history", || Rc::new(HistoryCommand));
    resolver.add_factory("login", || Rc::new(LoginCommand));
    resolver.add_factory("open", || Rc::new(OpenCommand));
    resolver.add_factory("quit", || Rc::new(QuitCommand));
    resolver.add_factory("register", || Rc::new(RegisterCommand));
    resolver.add_factory("run", || Rc::new(RunCommand));
    resolver.add_factory("set", || Rc::new(SetCommand));
    resolver.add_factory("topic", || Rc::new(TopicCommand));
    resolver.add_factory("unalias", || Rc::new(UnaliasCommand));
    resolver.add_factory("validate", || Rc::new(ValidateCommand));
}
