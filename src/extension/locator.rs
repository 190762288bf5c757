//! Command locators
//!
//! `register <locator>` accepts `builtin:<id>` for commands compiled
//! into the shell, a filesystem path, or a `file://` URL. Builtin ids
//! resolve through a factory table populated at startup; files resolve
//! by probing the executable's manifest.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::core::{code, Command};

use super::external::ExternalCommand;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Unknown builtin command id '{0}'")]
    UnknownBuiltin(String),

    #[error("Unsupported locator scheme in '{0}'")]
    UnsupportedScheme(String),

    #[error("Cannot load command from {locator}: {reason}")]
    Load { locator: String, reason: String },

    #[error("Command at {locator} violates the command contract: {reason}")]
    Contract { locator: String, reason: String },
}

impl LocatorError {
    /// Reserved command code for this failure
    pub fn code(&self) -> i32 {
        match self {
            LocatorError::UnknownBuiltin(_) => code::INVALID_OPTION_VALUE,
            LocatorError::UnsupportedScheme(_) => code::UNSUPPORTED,
            LocatorError::Load { .. } => code::INVALID_PATH,
            LocatorError::Contract { .. } => code::INVALID_OPTION_VALUE,
        }
    }
}

/// A parsed command location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A command compiled into the shell, by factory id
    Builtin(String),
    /// An executable on the filesystem
    File(PathBuf),
}

impl Locator {
    pub fn parse(text: &str) -> Result<Self, LocatorError> {
        if let Some(id) = text.strip_prefix("builtin:") {
            return Ok(Locator::Builtin(id.to_string()));
        }
        if let Some(path) = text.strip_prefix("file://") {
            return Ok(Locator::File(PathBuf::from(path)));
        }
        if text.contains("://") {
            return Err(LocatorError::UnsupportedScheme(text.to_string()));
        }
        Ok(Locator::File(PathBuf::from(text)))
    }
}

/// Builds a fresh command instance
pub type CommandFactory = fn() -> Rc<dyn Command>;

/// Resolves locator strings into command instances
pub struct CommandResolver {
    factories: BTreeMap<String, CommandFactory>,
}

impl CommandResolver {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Makes a builtin id resolvable
    pub fn add_factory(&mut self, id: &str, factory: CommandFactory) {
        self.factories.insert(id.to_string(), factory);
    }

    /// Registered builtin ids, sorted
    pub fn factory_ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Resolves a locator into a command ready for registration
    pub fn resolve(&self, text: &str) -> Result<Rc<dyn Command>, LocatorError> {
        match Locator::parse(text)? {
            Locator::Builtin(id) => match self.factories.get(&id) {
                Some(factory) => Ok(factory()),
                None => Err(LocatorError::UnknownBuiltin(id)),
            },
            Locator::File(path) => {
                let command = ExternalCommand::probe(&path)?;
                Ok(Rc::new(command))
            }
        }
    }
}

impl Default for CommandResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_ids() {
        assert_eq!(
            Locator::parse("builtin:help").unwrap(),
            Locator::Builtin("help".to_string())
        );
    }

    #[test]
    fn parses_plain_paths_and_file_urls() {
        assert_eq!(
            Locator::parse("/opt/mab/bin/deploy").unwrap(),
            Locator::File(PathBuf::from("/opt/mab/bin/deploy"))
        );
        assert_eq!(
            Locator::parse("file:///opt/mab/bin/deploy").unwrap(),
            Locator::File(PathBuf::from("/opt/mab/bin/deploy"))
        );
    }

    #[test]
    fn rejects_other_schemes() {
        let err = Locator::parse("https://example.com/cmd").unwrap_err();
        assert!(matches!(err, LocatorError::UnsupportedScheme(_)));
        assert_eq!(err.code(), code::UNSUPPORTED);
    }

    #[test]
    fn unknown_builtin_id_fails_resolution() {
        let resolver = CommandResolver::new();
        let err = resolver.resolve("builtin:ghost").unwrap_err();
        assert!(matches!(err, LocatorError::UnknownBuiltin(_)));
        assert_eq!(err.code(), code::INVALID_OPTION_VALUE);
    }

    #[test]
    fn missing_file_fails_resolution() {
        let resolver = CommandResolver::new();
        let err = resolver.resolve("/definitely/not/here").unwrap_err();
        assert!(matches!(err, LocatorError::Load { .. }));
        assert_eq!(err.code(), code::INVALID_PATH);
    }
}
