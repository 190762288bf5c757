//! External command manifest
//!
//! Every external command executable must answer `--manifest` with a
//! JSON document describing how it appears inside the shell. Declarative
//! registration supplies the same fields up front instead.

use serde::{Deserialize, Serialize};

/// Capabilities an external command declares to the shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandManifest {
    /// Name the command registers under
    pub name: String,

    /// Extra names resolving to this command
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Hidden commands are callable but left out of listings
    #[serde(default)]
    pub hidden: bool,

    /// One-line description for `help`
    #[serde(default)]
    pub header: String,

    /// Usage text; the shell synthesizes one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl CommandManifest {
    /// Checks the declared fields satisfy the command contract
    pub fn check_contract(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("command name is empty".to_string());
        }
        if !is_word(&self.name) {
            return Err(format!("command name '{}' contains whitespace", self.name));
        }
        for alias in &self.aliases {
            if alias.is_empty() || !is_word(alias) {
                return Err(format!("alias '{}' is not a single word", alias));
            }
            if alias == &self.name {
                return Err(format!("alias '{}' repeats the command name", alias));
            }
        }
        Ok(())
    }
}

fn is_word(s: &str) -> bool {
    !s.chars().any(char::is_whitespace)
}
