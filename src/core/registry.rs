//! Command registry
//!
//! Owns the authoritative mapping from command name to implementation and
//! from alias to canonical name. All mutations are transactional: a failed
//! registration leaves every prior mapping untouched.

use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;

use super::command::Command;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Command '{0}' is already registered")]
    DuplicateName(String),

    #[error("Alias '{alias}' is already taken by '{owner}'")]
    DuplicateAlias { alias: String, owner: String },
}

/// Name and alias maps for registered commands
#[derive(Default)]
pub struct Registry {
    commands: BTreeMap<String, Rc<dyn Command>>,
    // alias -> canonical name
    aliases: BTreeMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, failing on any name or alias collision.
    /// On failure the registry is unchanged.
    pub fn register(&mut self, command: Rc<dyn Command>) -> Result<(), RegistryError> {
        let name = command.name().to_string();
        if let Some(owner) = self.owner_of(&name) {
            return Err(match owner {
                Owner::Name => RegistryError::DuplicateName(name),
                Owner::Alias(canonical) => RegistryError::DuplicateAlias {
                    alias: name,
                    owner: canonical,
                },
            });
        }

        let mut new_aliases = Vec::new();
        for alias in command.aliases() {
            if alias == name || new_aliases.iter().any(|a| a == alias) {
                return Err(RegistryError::DuplicateAlias {
                    alias: alias.to_string(),
                    owner: name,
                });
            }
            if let Some(owner) = self.owner_of(alias) {
                let owner = match owner {
                    Owner::Name => alias.to_string(),
                    Owner::Alias(canonical) => canonical,
                };
                return Err(RegistryError::DuplicateAlias {
                    alias: alias.to_string(),
                    owner,
                });
            }
            new_aliases.push(alias.to_string());
        }

        for alias in new_aliases {
            self.aliases.insert(alias, name.clone());
        }
        self.commands.insert(name, command);
        Ok(())
    }

    /// Registers a command, displacing any colliding entries.
    /// Returns the canonical names of the commands that were removed.
    pub fn register_forced(&mut self, command: Rc<dyn Command>) -> Vec<String> {
        let mut displaced = Vec::new();
        let mut tokens: Vec<String> = vec![command.name().to_string()];
        tokens.extend(command.aliases().into_iter().map(str::to_string));

        for token in &tokens {
            let canonical = match self.owner_of(token) {
                Some(Owner::Name) => token.clone(),
                Some(Owner::Alias(canonical)) => canonical,
                None => continue,
            };
            if self.unregister(&canonical).is_some() && !displaced.contains(&canonical) {
                displaced.push(canonical);
            }
        }

        // Cannot collide anymore
        let _ = self.register(command);
        displaced
    }

    /// Removes a command and all its aliases by canonical name.
    /// Returns the removed command, or `None` if the name was not registered.
    pub fn unregister(&mut self, name: &str) -> Option<Rc<dyn Command>> {
        let command = self.commands.remove(name)?;
        self.aliases.retain(|_, canonical| canonical != name);
        Some(command)
    }

    /// Looks up a command by name or alias
    pub fn lookup(&self, name_or_alias: &str) -> Option<Rc<dyn Command>> {
        if let Some(command) = self.commands.get(name_or_alias) {
            return Some(Rc::clone(command));
        }
        let canonical = self.aliases.get(name_or_alias)?;
        self.commands.get(canonical).map(Rc::clone)
    }

    /// Canonical command names, sorted
    pub fn command_names(&self, include_hidden: bool) -> Vec<String> {
        self.commands
            .iter()
            .filter(|(_, c)| include_hidden || !c.hidden())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All registered aliases, sorted
    pub fn command_aliases(&self, include_hidden: bool) -> Vec<String> {
        self.aliases
            .iter()
            .filter(|(_, canonical)| {
                include_hidden
                    || self
                        .commands
                        .get(*canonical)
                        .map(|c| !c.hidden())
                        .unwrap_or(false)
            })
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// Aliases of a command, or `None` when the command has none
    /// (or is not registered)
    pub fn aliases_for(&self, name: &str) -> Option<Vec<String>> {
        self.commands.get(name)?;
        let aliases: Vec<String> = self
            .aliases
            .iter()
            .filter(|(_, canonical)| canonical.as_str() == name)
            .map(|(alias, _)| alias.clone())
            .collect();
        if aliases.is_empty() {
            None
        } else {
            Some(aliases)
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn owner_of(&self, token: &str) -> Option<Owner> {
        if self.commands.contains_key(token) {
            return Some(Owner::Name);
        }
        self.aliases
            .get(token)
            .map(|canonical| Owner::Alias(canonical.clone()))
    }
}

enum Owner {
    Name,
    Alias(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::CommandResult;
    use crate::shell::Shell;

    struct Fake {
        name: &'static str,
        aliases: Vec<&'static str>,
        hidden: bool,
    }

    impl Fake {
        fn new(name: &'static str, aliases: &[&'static str]) -> Rc<dyn Command> {
            Rc::new(Self {
                name,
                aliases: aliases.to_vec(),
                hidden: false,
            })
        }

        fn hidden(name: &'static str) -> Rc<dyn Command> {
            Rc::new(Self {
                name,
                aliases: Vec::new(),
                hidden: true,
            })
        }
    }

    impl Command for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn aliases(&self) -> Vec<&str> {
            self.aliases.clone()
        }

        fn hidden(&self) -> bool {
            self.hidden
        }

        fn header(&self) -> &str {
            "fake"
        }

        fn usage(&self, _verbose: bool) -> String {
            "fake".to_string()
        }

        fn execute(&self, _shell: &mut Shell, _args: &[String]) -> CommandResult {
            Ok(0)
        }
    }

    #[test]
    fn register_and_lookup_by_name_and_alias() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d"])).unwrap();

        assert!(registry.lookup("deploy").is_some());
        assert!(registry.lookup("d").is_some());
        assert!(registry.lookup("x").is_none());
    }

    #[test]
    fn duplicate_name_is_rejected_and_state_unchanged() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d"])).unwrap();

        let err = registry.register(Fake::new("deploy", &[])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(_)));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("d").is_some());
    }

    #[test]
    fn alias_colliding_with_existing_name_is_rejected() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &[])).unwrap();

        let err = registry
            .register(Fake::new("other", &["deploy"]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAlias { .. }));
        assert!(registry.lookup("other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn name_colliding_with_existing_alias_is_rejected() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d"])).unwrap();

        let err = registry.register(Fake::new("d", &[])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAlias { .. }));
    }

    #[test]
    fn failed_registration_adds_no_alias() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d"])).unwrap();

        // "fresh" would be fine but "d" collides; nothing must be inserted
        let err = registry
            .register(Fake::new("other", &["fresh", "d"]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAlias { .. }));
        assert!(registry.lookup("fresh").is_none());
        assert!(registry.lookup("other").is_none());
    }

    #[test]
    fn unregister_cascades_aliases() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d", "dep"])).unwrap();

        assert!(registry.unregister("deploy").is_some());
        assert!(registry.lookup("deploy").is_none());
        assert!(registry.lookup("d").is_none());
        assert!(registry.lookup("dep").is_none());
    }

    #[test]
    fn unregister_unknown_returns_none() {
        let mut registry = Registry::new();
        assert!(registry.unregister("ghost").is_none());
    }

    #[test]
    fn forced_registration_reports_displaced() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d"])).unwrap();
        registry.register(Fake::new("other", &["o"])).unwrap();

        // Collides with "deploy" via name and with "other" via alias
        let displaced = registry.register_forced(Fake::new("deploy", &["o"]));
        assert_eq!(displaced, vec!["deploy".to_string(), "other".to_string()]);
        assert!(registry.lookup("deploy").is_some());
        assert!(registry.lookup("o").is_some());
        assert!(registry.lookup("d").is_none());
    }

    #[test]
    fn listings_respect_hidden_flag() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d"])).unwrap();
        registry.register(Fake::hidden("secret")).unwrap();

        assert_eq!(registry.command_names(false), vec!["deploy"]);
        assert_eq!(registry.command_names(true), vec!["deploy", "secret"]);
        assert_eq!(registry.command_aliases(false), vec!["d"]);
    }

    #[test]
    fn aliases_for_reports_none_without_aliases() {
        let mut registry = Registry::new();
        registry.register(Fake::new("deploy", &["d", "dep"])).unwrap();
        registry.register(Fake::new("plain", &[])).unwrap();

        assert_eq!(
            registry.aliases_for("deploy"),
            Some(vec!["d".to_string(), "dep".to_string()])
        );
        assert_eq!(registry.aliases_for("plain"), None);
        assert_eq!(registry.aliases_for("ghost"), None);
    }
}
