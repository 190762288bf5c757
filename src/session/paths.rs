//! Directory resolution for a shell session
//!
//! Per-user state lives in `~/.mab`; generated projects default to
//! `~/MABProjects`. The installation directory comes from `MAB_HOME` and
//! the workspace can be overridden with `MAB_WORKSPACE` (the `workspace`
//! setting, when present, wins over both).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::UserDirs;
use thiserror::Error;

/// Installation directory environment variable
pub const MAB_HOME_ENV: &str = "MAB_HOME";

/// Workspace directory environment variable
pub const MAB_WORKSPACE_ENV: &str = "MAB_WORKSPACE";

const STATE_DIR_NAME: &str = ".mab";
const DEFAULT_WORKSPACE_NAME: &str = "MABProjects";

#[derive(Debug, Error)]
pub enum PathsError {
    #[error("Cannot determine the user home directory")]
    NoHome,
}

/// Resolved directories for one session
#[derive(Debug, Clone)]
pub struct MabDirs {
    /// Installation directory (configuration, topics)
    pub install: PathBuf,
    /// Per-user state directory (`~/.mab`)
    pub state: PathBuf,
    /// Default workspace for generated projects
    pub default_workspace: PathBuf,
}

impl MabDirs {
    /// Resolves directories from the environment and creates the state
    /// directory if needed.
    pub fn resolve() -> Result<Self> {
        let user_dirs = UserDirs::new().ok_or(PathsError::NoHome)?;
        let home = user_dirs.home_dir();

        let state = home.join(STATE_DIR_NAME);
        fs::create_dir_all(&state)
            .with_context(|| format!("Failed to create state directory: {}", state.display()))?;

        let install = env::var_os(MAB_HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| state.clone());

        let default_workspace = env::var_os(MAB_WORKSPACE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(DEFAULT_WORKSPACE_NAME));

        Ok(Self {
            install,
            state,
            default_workspace,
        })
    }

    pub fn settings_file(&self) -> PathBuf {
        self.state.join("settings.toml")
    }

    pub fn history_file(&self) -> PathBuf {
        self.state.join("history")
    }

    pub fn projects_file(&self) -> PathBuf {
        self.state.join("projects.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.state.join("credentials.toml")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.state.join(super::lock::LOCK_FILE_NAME)
    }

    /// Directory holding help topics, under the installation directory
    pub fn topics_dir(&self) -> PathBuf {
        self.install.join("topics")
    }

    /// Builds directories rooted at an explicit state directory, mostly
    /// useful to point a session at a scratch location.
    pub fn rooted_at(state: &Path) -> Self {
        Self {
            install: state.to_path_buf(),
            state: state.to_path_buf(),
            default_workspace: state.join(DEFAULT_WORKSPACE_NAME),
        }
    }
}
