//! # Session Bootstrap
//!
//! Builds one shell session from the environment:
//!
//! 1. resolve directories and take the session lock
//! 2. load settings, history, configuration, and credentials
//! 3. assemble the [`Shell`]: builtin commands, the project manager
//!    extension, the validation pre-hook
//! 4. dispatch the trailing command line once, or loop over stdin
//!
//! The lock is held for the whole run and released on drop.

use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use crate::commands;
use crate::session::{
    Configuration, Credentials, HistoryLog, MabDirs, MarkerFilter, SessionLock, SettingsStore,
    TomlProjectManager,
};
use crate::shell::{Shell, StdinReader};
use crate::validation::ValidationHook;

#[derive(Parser)]
#[command(name = "mab")]
#[command(author, version, about = "Interactive shell for mobile-backend projects")]
struct Cli {
    /// Print progress details
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Print error backtraces
    #[arg(long, short = 't')]
    trace: bool,

    /// Run one command and exit instead of reading stdin
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Parses arguments, assembles a session, and runs it to completion.
/// Returns the code of the last dispatched command.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    let dirs = MabDirs::resolve()?;
    let _lock = SessionLock::acquire(dirs.lock_file())?;

    let mut settings = SettingsStore::load(dirs.settings_file())?;
    settings.seed_proxies_from_env();
    let history = HistoryLog::open(dirs.history_file(), Box::new(MarkerFilter))
        .context("Cannot open the command history")?;
    let config = Configuration::load(&dirs.install)?;
    let credentials = Credentials::load(dirs.credentials_file())?;
    let projects = TomlProjectManager::load(dirs.projects_file())
        .context("Cannot load the project registry")?;

    let mut shell = Shell::new(dirs, config, settings, history, credentials);
    shell.extensions.install_project_manager(Box::new(projects));
    commands::install(&mut shell).context("Builtin command registration failed")?;
    shell.pre_hooks.register(Rc::new(ValidationHook));
    shell.override_verbosity(cli.verbose, cli.trace);

    let code = if cli.command.is_empty() {
        shell.run(&mut StdinReader)
    } else {
        shell.dispatch_args(&cli.command)
    };
    shell.close();
    Ok(code)
}
