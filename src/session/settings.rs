//! Session settings store
//!
//! String-keyed session and user preferences with typed accessors,
//! persisted as TOML in `~/.mab/settings.toml`. Every mutation is flushed
//! to disk immediately. User aliases and the invoked-script cache live in
//! dedicated sub-tables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;
use toml::Value;

use super::proxy::ClientProxy;

/// Well-known setting keys
pub mod keys {
    pub const LOCALE: &str = "locale";
    pub const EDITOR: &str = "editor";
    pub const VERBOSE: &str = "verbose";
    pub const DEBUG: &str = "debug";
    pub const TRACING: &str = "tracing";
    pub const ALIASES: &str = "aliases";
    pub const SCRIPTS: &str = "scripts";
    pub const MVN: &str = "mvn";
    pub const MVN_ARGS: &str = "mvn_args";
    pub const WORKSPACE: &str = "workspace";
    pub const PROJECT_EDITOR: &str = "project_editor";
    pub const HTTP_PROXY: &str = "http_proxy";
    pub const HTTPS_PROXY: &str = "https_proxy";
    pub const SSH_PROXY: &str = "ssh_proxy";
    pub const FACTORY_URL: &str = "factory_url";
    pub const MAVEN_REPOSITORY: &str = "maven_repository";
    pub const CURRENT_PROJECT: &str = "current_project";
    pub const CURRENT_SERVER: &str = "current_server";

    /// Keys holding boolean flags
    pub const BOOL_KEYS: &[&str] = &[VERBOSE, DEBUG, TRACING];

    /// Keys holding proxy or repository URLs
    pub const URL_KEYS: &[&str] = &[HTTP_PROXY, HTTPS_PROXY, FACTORY_URL, MAVEN_REPOSITORY];

    /// Sub-tables managed through dedicated commands, not `set`
    pub const RESERVED_TABLES: &[&str] = &[ALIASES, SCRIPTS];
}

/// Prefix for invoked-script cache entries, followed by an epoch-millis
/// timestamp
const SCRIPT_KEY_PREFIX: &str = "millis_";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

/// Typed accessors over the persisted settings document
pub struct SettingsStore {
    path: PathBuf,
    doc: toml::value::Table,
}

impl SettingsStore {
    /// Loads settings from `path`; a missing file yields empty settings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                doc: toml::value::Table::new(),
            });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let doc = toml::from_str(&content)
            .map_err(|e| SettingsError::Parse(e.to_string()))
            .context("Failed to parse settings")?;
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generic lookup. Empty string values count as unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.doc.get(key) {
            Some(Value::String(s)) if s.is_empty() => None,
            other => other,
        }
    }

    /// Generic mutation; persists immediately
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.doc.insert(key.to_string(), value);
        self.save()
    }

    /// Removes a key; persists when something was removed
    pub fn unset(&mut self, key: &str) -> Result<bool> {
        if self.doc.remove(key).is_some() {
            self.save()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// All top-level entries, for listings
    pub fn entries(&self) -> &toml::value::Table {
        &self.doc
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Boolean(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    pub fn locale(&self) -> String {
        self.get_str(keys::LOCALE).unwrap_or("en").to_string()
    }

    pub fn editor(&self) -> Option<String> {
        self.get_str(keys::EDITOR).map(str::to_string)
    }

    pub fn project_editor(&self) -> Option<String> {
        self.get_str(keys::PROJECT_EDITOR).map(str::to_string)
    }

    pub fn verbose(&self) -> bool {
        self.get_bool(keys::VERBOSE)
    }

    pub fn debug(&self) -> bool {
        self.get_bool(keys::DEBUG)
    }

    pub fn tracing(&self) -> bool {
        self.get_bool(keys::TRACING)
    }

    pub fn set_tracing(&mut self, on: bool) -> Result<()> {
        self.set(keys::TRACING, Value::Boolean(on))
    }

    pub fn set_verbose(&mut self, on: bool) -> Result<()> {
        self.set(keys::VERBOSE, Value::Boolean(on))
    }

    pub fn mvn(&self) -> String {
        self.get_str(keys::MVN).unwrap_or("mvn").to_string()
    }

    pub fn mvn_args(&self) -> Option<String> {
        self.get_str(keys::MVN_ARGS).map(str::to_string)
    }

    pub fn current_project(&self) -> Option<String> {
        self.get_str(keys::CURRENT_PROJECT).map(str::to_string)
    }

    pub fn set_current_project(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => self.set(keys::CURRENT_PROJECT, Value::String(name.to_string())),
            None => self.unset(keys::CURRENT_PROJECT).map(|_| ()),
        }
    }

    pub fn current_server(&self) -> Option<String> {
        self.get_str(keys::CURRENT_SERVER).map(str::to_string)
    }

    pub fn set_current_server(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => self.set(keys::CURRENT_SERVER, Value::String(name.to_string())),
            None => self.unset(keys::CURRENT_SERVER).map(|_| ()),
        }
    }

    /// Workspace setting, if set
    pub fn workspace(&self) -> Option<PathBuf> {
        self.get_str(keys::WORKSPACE).map(PathBuf::from)
    }

    /// Workspace setting, or the session default
    pub fn workspace_or<'a>(&self, default: &'a Path) -> PathBuf {
        self.workspace().unwrap_or_else(|| default.to_path_buf())
    }

    pub fn factory_url(&self) -> Option<String> {
        self.get_str(keys::FACTORY_URL).map(str::to_string)
    }

    pub fn maven_repository(&self) -> Option<String> {
        self.get_str(keys::MAVEN_REPOSITORY).map(str::to_string)
    }

    /// HTTP proxy, `None` when unset or unparseable (validators report
    /// malformed values)
    pub fn http_proxy(&self) -> Option<ClientProxy> {
        self.get_str(keys::HTTP_PROXY)
            .and_then(|s| ClientProxy::parse_url(s).ok())
    }

    pub fn https_proxy(&self) -> Option<ClientProxy> {
        self.get_str(keys::HTTPS_PROXY)
            .and_then(|s| ClientProxy::parse_url(s).ok())
    }

    pub fn ssh_proxy(&self) -> Option<ClientProxy> {
        self.get_str(keys::SSH_PROXY)
            .and_then(|s| ClientProxy::parse_ssh(s).ok())
    }

    /// Raw value of a proxy/url key, for validation
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.get_str(key)
    }

    /// Adopts `http_proxy`/`https_proxy` from the environment when the
    /// settings file leaves them unset. Session-only until the next
    /// flushing mutation.
    pub fn seed_proxies_from_env(&mut self) {
        self.seed_proxies(|key| {
            env::var(key).or_else(|_| env::var(key.to_uppercase())).ok()
        });
    }

    fn seed_proxies(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for key in [keys::HTTP_PROXY, keys::HTTPS_PROXY] {
            if self.get(key).is_some() {
                continue;
            }
            let Some(url) = lookup(key).filter(|url| !url.is_empty()) else {
                continue;
            };
            if ClientProxy::parse_url(&url).is_ok() {
                self.doc.insert(key.to_string(), Value::String(url));
            }
        }
    }

    /// User aliases: name to stored argument vector
    pub fn user_aliases(&self) -> BTreeMap<String, Vec<String>> {
        let mut aliases = BTreeMap::new();
        let Some(Value::Table(table)) = self.doc.get(keys::ALIASES) else {
            return aliases;
        };
        for (name, value) in table {
            if let Some(args) = string_array(value) {
                aliases.insert(name.clone(), args);
            }
        }
        aliases
    }

    pub fn user_alias(&self, name: &str) -> Option<Vec<String>> {
        let Some(Value::Table(table)) = self.doc.get(keys::ALIASES) else {
            return None;
        };
        table.get(name).and_then(string_array)
    }

    /// Adds or replaces a user alias; persists immediately
    pub fn add_user_alias(&mut self, name: &str, args: &[String]) -> Result<()> {
        let value = Value::Array(args.iter().map(|a| Value::String(a.clone())).collect());
        self.subtable_mut(keys::ALIASES).insert(name.to_string(), value);
        self.save()
    }

    /// Removes a user alias, returning its previous expansion
    pub fn remove_user_alias(&mut self, name: &str) -> Result<Option<Vec<String>>> {
        let old = self
            .subtable_mut(keys::ALIASES)
            .remove(name)
            .as_ref()
            .and_then(string_array);
        if old.is_some() {
            self.save()?;
        }
        Ok(old)
    }

    /// Records a script invocation in the cache, keyed by epoch millis
    pub fn record_script(&mut self, source: &str) -> Result<()> {
        let key = format!("{}{}", SCRIPT_KEY_PREFIX, Utc::now().timestamp_millis());
        self.subtable_mut(keys::SCRIPTS)
            .insert(key, Value::String(source.to_string()));
        self.save()
    }

    /// Previously invoked scripts, oldest first
    pub fn invoked_scripts(&self) -> Vec<(i64, String)> {
        let mut scripts = Vec::new();
        let Some(Value::Table(table)) = self.doc.get(keys::SCRIPTS) else {
            return scripts;
        };
        for (key, value) in table {
            let (Some(millis), Value::String(source)) = (
                key.strip_prefix(SCRIPT_KEY_PREFIX)
                    .and_then(|m| m.parse::<i64>().ok()),
                value,
            ) else {
                continue;
            };
            scripts.push((millis, source.clone()));
        }
        scripts.sort_by_key(|(millis, _)| *millis);
        scripts
    }

    fn subtable_mut(&mut self, key: &str) -> &mut toml::value::Table {
        let entry = self
            .doc
            .entry(key.to_string())
            .or_insert_with(|| Value::Table(toml::value::Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(toml::value::Table::new());
        }
        match entry {
            Value::Table(table) => table,
            _ => unreachable!("entry was replaced with a table above"),
        }
    }

    /// Writes the document out through a temp file and atomic rename
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(&self.doc).context("Failed to serialize settings")?;
        let temp_path = self.path.with_extension("toml.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write settings: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
