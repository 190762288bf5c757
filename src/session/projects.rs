//! Project registry
//!
//! Tracks known mobile-backend projects by name in `~/.mab/projects.toml`:
//! filesystem location, creation time, and the directory each project was
//! last deployed to. The session exposes the manager through the
//! `projectManager` extension slot so commands never depend on the
//! concrete store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::code;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Unknown project: {0}")]
    Unknown(String),

    #[error("Project already registered: {0}")]
    Duplicate(String),

    #[error("Not a directory: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ProjectError {
    /// Reserved command code for this failure
    pub fn code(&self) -> i32 {
        match self {
            ProjectError::Unknown(_) | ProjectError::Duplicate(_) => code::INVALID_PROJECT,
            ProjectError::InvalidPath(_) => code::INVALID_PATH,
            ProjectError::Storage(_) => code::UNKNOWN_ERROR,
        }
    }
}

/// Everything the registry knows about one project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    pub name: String,
    pub path: PathBuf,
    pub created: DateTime<Utc>,
    pub deployment: Option<String>,
}

/// Named-project operations available to commands
pub trait ProjectManager {
    /// Registers a project rooted at an existing directory
    fn add(&mut self, name: &str, path: &Path) -> Result<(), ProjectError>;

    /// Forgets a project, returning what was known about it. Unless
    /// `preserve_dir` is set, the project directory is deleted too.
    fn remove(&mut self, name: &str, preserve_dir: bool) -> Result<ProjectInfo, ProjectError>;

    /// Filesystem location of a project
    fn path(&self, name: &str) -> Result<PathBuf, ProjectError>;

    /// Directory the project was last deployed to, if any
    fn deployment(&self, name: &str) -> Result<Option<String>, ProjectError>;

    /// Records or clears the last deployment directory
    fn set_deployment(&mut self, name: &str, dir: Option<&str>) -> Result<(), ProjectError>;

    fn info(&self, name: &str) -> Result<ProjectInfo, ProjectError>;

    /// All registered projects, sorted by name
    fn list(&self) -> Vec<ProjectInfo>;

    /// Registered names, sorted
    fn names(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectRecord {
    path: PathBuf,
    created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment: Option<String>,
}

/// Project registry persisted as TOML
pub struct TomlProjectManager {
    path: PathBuf,
    projects: BTreeMap<String, ProjectRecord>,
}

impl TomlProjectManager {
    /// Loads the registry from `path`; a missing file yields an empty
    /// registry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                projects: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project registry: {}", path.display()))?;
        let projects = toml::from_str(&content)
            .with_context(|| format!("Failed to parse project registry: {}", path.display()))?;
        Ok(Self { path, projects })
    }

    fn record(&self, name: &str) -> Result<&ProjectRecord, ProjectError> {
        self.projects
            .get(name)
            .ok_or_else(|| ProjectError::Unknown(name.to_string()))
    }

    fn save(&self) -> Result<(), ProjectError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(&self.projects).context("Failed to serialize project registry")?;
        let temp_path = self.path.with_extension("toml.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write project registry: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

impl ProjectManager for TomlProjectManager {
    fn add(&mut self, name: &str, path: &Path) -> Result<(), ProjectError> {
        if self.projects.contains_key(name) {
            return Err(ProjectError::Duplicate(name.to_string()));
        }
        if !path.is_dir() {
            return Err(ProjectError::InvalidPath(path.to_path_buf()));
        }

        self.projects.insert(
            name.to_string(),
            ProjectRecord {
                path: path.to_path_buf(),
                created: Utc::now(),
                deployment: None,
            },
        );
        self.save()
    }

    fn remove(&mut self, name: &str, preserve_dir: bool) -> Result<ProjectInfo, ProjectError> {
        let record = self
            .projects
            .remove(name)
            .ok_or_else(|| ProjectError::Unknown(name.to_string()))?;
        self.save()?;

        if !preserve_dir && record.path.exists() {
            fs::remove_dir_all(&record.path).with_context(|| {
                format!(
                    "Failed to delete project directory: {}",
                    record.path.display()
                )
            })?;
        }

        Ok(ProjectInfo {
            name: name.to_string(),
            path: record.path,
            created: record.created,
            deployment: record.deployment,
        })
    }

    fn path(&self, name: &str) -> Result<PathBuf, ProjectError> {
        Ok(self.record(name)?.path.clone())
    }

    fn deployment(&self, name: &str) -> Result<Option<String>, ProjectError> {
        Ok(self.record(name)?.deployment.clone())
    }

    fn set_deployment(&mut self, name: &str, dir: Option<&str>) -> Result<(), ProjectError> {
        let record = self
            .projects
            .get_mut(name)
            .ok_or_else(|| ProjectError::Unknown(name.to_string()))?;
        record.deployment = dir.map(str::to_string);
        self.save()
    }

    fn info(&self, name: &str) -> Result<ProjectInfo, ProjectError> {
        let record = self.record(name)?;
        Ok(ProjectInfo {
            name: name.to_string(),
            path: record.path.clone(),
            created: record.created,
            deployment: record.deployment.clone(),
        })
    }

    fn list(&self) -> Vec<ProjectInfo> {
        self.projects
            .iter()
            .map(|(name, record)| ProjectInfo {
                name: name.clone(),
                path: record.path.clone(),
                created: record.created,
                deployment: record.deployment.clone(),
            })
            .collect()
    }

    fn names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }
}
