//! Settings and alias management commands

use toml::Value;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::session::{keys, ClientProxy};
use crate::shell::Shell;

/// `set` reads, writes, and unsets session settings
pub struct SetCommand;

impl Command for SetCommand {
    fn name(&self) -> &str {
        "set"
    }

    fn header(&self) -> &str {
        "Show or change session settings"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("set [key [value..]]");
        if verbose {
            text.push_str("\n  Without arguments, lists every setting.");
            text.push_str("\n  With only a key, unsets it.");
            text.push_str("\n  With a key and a value, stores the value.");
            text.push_str("\n  Multi-word values need no quoting.");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        match args {
            [] => {
                list_settings(shell);
                Ok(code::OK)
            }
            [key] => {
                reject_reserved(key)?;
                if shell.settings.unset(key)? {
                    shell.console.info(&format!("Unset {key}"));
                } else {
                    shell.console.info(&format!("{key} is not set"));
                }
                Ok(code::OK)
            }
            [key, value_words @ ..] => {
                reject_reserved(key)?;
                let value = value_words.join(" ");
                let value = checked_value(key, value)?;
                shell.settings.set(key, value)?;
                Ok(code::OK)
            }
        }
    }
}

fn list_settings(shell: &mut Shell) {
    let mut lines = Vec::new();
    for (key, value) in shell.settings.entries() {
        match value {
            // Sub-tables have their own commands
            Value::Table(_) => {}
            Value::String(s) => lines.push(format!("{key} = {s}")),
            other => lines.push(format!("{key} = {other}")),
        }
    }
    if lines.is_empty() {
        shell.console.info("No settings");
        return;
    }
    for line in lines {
        shell.console.info(&line);
    }
}

fn reject_reserved(key: &str) -> Result<(), CommandError> {
    if keys::RESERVED_TABLES.contains(&key) {
        return Err(CommandError::failure(
            code::INVALID_OPTION_VALUE,
            format!("'{key}' is managed through its own command"),
        ));
    }
    Ok(())
}

/// Validates typed keys before storing. Boolean keys are stored as
/// booleans, URL keys must parse, everything else is a plain string.
fn checked_value(key: &str, value: String) -> Result<Value, CommandError> {
    if keys::BOOL_KEYS.contains(&key) {
        return match value.as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            other => Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                format!("Value for {key} must be true or false, got '{other}'"),
            )),
        };
    }
    if keys::URL_KEYS.contains(&key) {
        if let Err(error) = ClientProxy::parse_url(&value) {
            return Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                format!("Invalid {key}: {error}"),
            ));
        }
    }
    Ok(Value::String(value))
}

/// `alias` lists or defines user command shortcuts
pub struct AliasCommand;

impl Command for AliasCommand {
    fn name(&self) -> &str {
        "alias"
    }

    fn header(&self) -> &str {
        "List or define command shortcuts"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("alias [name command [args..]]");
        if verbose {
            text.push_str("\n  Without arguments, lists the defined aliases.");
            text.push_str("\n  Redefining an existing alias replaces it.");
            text.push_str("\n  Names of registered commands cannot be aliased over.");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        match args {
            [] => {
                let aliases = shell.settings.user_aliases();
                if aliases.is_empty() {
                    shell.console.info("No aliases defined");
                } else {
                    for (name, words) in aliases {
                        shell
                            .console
                            .info(&format!("{name} = {}", words.join(" ")));
                    }
                }
                Ok(code::OK)
            }
            [_name] => Err(CommandError::failure(
                code::MISSING_OPTION_VALUE,
                "alias needs a name and the command line it stands for",
            )),
            [name, expansion @ ..] => {
                if shell.registry.lookup(name).is_some() {
                    return Err(CommandError::failure(
                        code::INVALID_OPTION_VALUE,
                        format!("'{name}' is a command name"),
                    ));
                }
                shell.settings.add_user_alias(name, expansion)?;
                Ok(code::OK)
            }
        }
    }
}

/// `unalias` removes a user shortcut
pub struct UnaliasCommand;

impl Command for UnaliasCommand {
    fn name(&self) -> &str {
        "unalias"
    }

    fn header(&self) -> &str {
        "Remove a command shortcut"
    }

    fn usage(&self, _verbose: bool) -> String {
        String::from("unalias name")
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        let name = args.first().ok_or_else(|| {
            CommandError::failure(code::MISSING_OPTION_VALUE, "unalias needs an alias name")
        })?;
        match shell.settings.remove_user_alias(name)? {
            Some(_) => Ok(code::OK),
            None => Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                format!("No such alias: {name}"),
            )),
        }
    }
}
