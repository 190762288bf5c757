//! Stored factory login
//!
//! The login command keeps the factory username and a blake3 digest of
//! the password in `~/.mab/credentials.toml` (mode 600 on unix). The
//! digest lets a later session confirm a password without ever holding
//! the original.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Failed to parse credentials: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLogin {
    username: String,
    digest: String,
}

/// Credential store for the factory login
pub struct Credentials {
    path: PathBuf,
    login: Option<StoredLogin>,
}

impl Credentials {
    /// Loads stored credentials; a missing file means nobody logged in
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, login: None });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials: {}", path.display()))?;
        let login = toml::from_str(&content)
            .map_err(|e| CredentialsError::Parse(e.to_string()))
            .context("Failed to parse credentials")?;
        Ok(Self {
            path,
            login: Some(login),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logged-in username, if any
    pub fn username(&self) -> Option<&str> {
        self.login.as_ref().map(|l| l.username.as_str())
    }

    /// Records a login, replacing any previous one
    pub fn store(&mut self, username: &str, password: &str) -> Result<()> {
        self.login = Some(StoredLogin {
            username: username.to_string(),
            digest: digest(password),
        });
        self.save()
    }

    /// Checks a password against the stored digest
    pub fn verify(&self, password: &str) -> bool {
        match &self.login {
            Some(login) => login.digest == digest(password),
            None => false,
        }
    }

    /// Forgets the stored login; true when one existed
    pub fn clear(&mut self) -> Result<bool> {
        if self.login.take().is_none() {
            return Ok(false);
        }
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove credentials: {}", self.path.display()))?;
        }
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let Some(login) = &self.login else {
            return Ok(());
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(login).context("Failed to serialize credentials")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credentials: {}", self.path.display()))?;

        // Credentials are private to the user
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).with_context(
                || format!("Failed to restrict credentials: {}", self.path.display()),
            )?;
        }

        Ok(())
    }
}

fn digest(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}
