//! # Session State
//!
//! Everything a shell session persists between runs, kept under the
//! state directory (`~/.mab` unless `MAB_HOME` points elsewhere).
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Settings | TOML | `~/.mab/settings.toml` |
//! | History | plain text, one line per entry | `~/.mab/history` |
//! | Projects | TOML | `~/.mab/projects.toml` |
//! | Credentials | TOML, mode 600 | `~/.mab/credentials.toml` |
//! | Session lock | pid text file | `~/.mab/mab.lock` |
//!
//! Installation configuration (`mab_configuration.toml` plus its
//! override file) is read-only and lives in the install directory.
//!
//! ## Concurrency Safety
//!
//! - [`SessionLock`] keeps sessions exclusive per state directory (`fs2`)
//! - [`HistoryLog`] holds an advisory lock on its appender
//! - Settings and project writes are atomic (temp file + rename)

mod config;
mod credentials;
mod history;
mod lock;
mod paths;
mod projects;
mod proxy;
mod settings;

pub use config::{Configuration, CONFIG_FILE_NAME, OVERRIDE_FILE_NAME};
pub use credentials::{Credentials, CredentialsError};
pub use history::{HistoryError, HistoryLog, LineFilter, MarkerFilter};
pub use lock::{LockError, SessionLock, LOCK_FILE_NAME};
pub use paths::{MabDirs, PathsError, MAB_HOME_ENV, MAB_WORKSPACE_ENV};
pub use projects::{ProjectError, ProjectInfo, ProjectManager, TomlProjectManager};
pub use proxy::{ClientProxy, ProxyKind, ProxyParseError};
pub use settings::{keys, SettingsError, SettingsStore};
