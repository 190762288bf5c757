//! Installation configuration
//!
//! Read-only key/value store loaded from the install directory:
//! `mab_configuration.toml` overlaid with `mab_configuration_override.toml`
//! so site patches survive tool upgrades. Values are addressed by dotted
//! path. Missing files simply yield an empty configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml::Value;

pub const CONFIG_FILE_NAME: &str = "mab_configuration.toml";
pub const OVERRIDE_FILE_NAME: &str = "mab_configuration_override.toml";

/// Abort dispatch when pre-execution validation reports errors
pub const ABORT_IF_VALIDATION_FAIL_KEY: &str = "abort_if_validation_fail";
/// Skip pre-execution validation entirely
pub const SKIP_VALIDATION_KEY: &str = "skip_validation";
/// Location of help topics, relative to the install directory
pub const TOPICS_DIR_KEY: &str = "topics_dir";

const DEFAULT_TOPICS_DIR: &str = "topics";

/// Merged installation configuration
pub struct Configuration {
    install_dir: PathBuf,
    doc: toml::value::Table,
}

impl Configuration {
    /// Loads and merges the configuration files under `install_dir`
    pub fn load(install_dir: &Path) -> Result<Self> {
        let mut doc = read_table(&install_dir.join(CONFIG_FILE_NAME))?;
        let overlay = read_table(&install_dir.join(OVERRIDE_FILE_NAME))?;
        deep_merge(&mut doc, overlay);

        Ok(Self {
            install_dir: install_dir.to_path_buf(),
            doc,
        })
    }

    /// An empty configuration rooted at `install_dir`
    pub fn empty(install_dir: &Path) -> Self {
        Self {
            install_dir: install_dir.to_path_buf(),
            doc: toml::value::Table::new(),
        }
    }

    /// Looks a value up by dotted path, e.g. `generator.policy`
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let mut segments = dotted.split('.');
        let mut current = self.doc.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, dotted: &str) -> Option<&str> {
        self.get(dotted).and_then(Value::as_str)
    }

    pub fn get_bool(&self, dotted: &str) -> Option<bool> {
        self.get(dotted).and_then(Value::as_bool)
    }

    pub fn abort_if_validation_fail(&self) -> bool {
        self.get_bool(ABORT_IF_VALIDATION_FAIL_KEY).unwrap_or(false)
    }

    pub fn skip_validation(&self) -> bool {
        self.get_bool(SKIP_VALIDATION_KEY).unwrap_or(false)
    }

    /// Directory holding help topic files
    pub fn topics_dir(&self) -> PathBuf {
        let dir = self.get_str(TOPICS_DIR_KEY).unwrap_or(DEFAULT_TOPICS_DIR);
        let dir = Path::new(dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.install_dir.join(dir)
        }
    }
}

fn read_table(path: &Path) -> Result<toml::value::Table> {
    if !path.exists() {
        return Ok(toml::value::Table::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse configuration: {}", path.display()))
}

/// Merges `overlay` into `base`; nested tables merge key-wise, anything
/// else is replaced.
fn deep_merge(base: &mut toml::value::Table, overlay: toml::value::Table) {
    for (key, incoming) in overlay {
        match base.entry(key) {
            toml::map::Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
            toml::map::Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (Value::Table(existing), Value::Table(incoming)) => {
                    deep_merge(existing, incoming);
                }
                (existing, incoming) => *existing = incoming,
            },
        }
    }
}
