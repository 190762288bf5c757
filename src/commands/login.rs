//! Credential capture

use anyhow::Context;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;

/// `login` stores a username and password digest for later sessions
pub struct LoginCommand;

impl Command for LoginCommand {
    fn name(&self) -> &str {
        "login"
    }

    fn header(&self) -> &str {
        "Store credentials for this user"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("login [user] [--password pw]");
        if verbose {
            text.push_str("\n  Prompts for the password unless --password is given.");
            text.push_str("\n  Only a digest of the password is kept on disk.");
            text.push_str("\n  Without arguments, shows who is logged in.");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        let mut username = None;
        let mut password = None;

        let mut it = args.iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--password" => {
                    password = Some(it.next().cloned().ok_or_else(|| {
                        CommandError::failure(
                            code::MISSING_OPTION_VALUE,
                            "--password needs a value",
                        )
                    })?)
                }
                other if other.starts_with('-') => {
                    return Err(CommandError::failure(
                        code::INVALID_OPTION_VALUE,
                        format!("Unknown option: {other}"),
                    ))
                }
                other => username = Some(other.to_string()),
            }
        }

        let Some(username) = username else {
            return match shell.credentials.username() {
                Some(user) => {
                    let line = format!("Logged in as {user}");
                    shell.console.info(&line);
                    Ok(code::OK)
                }
                None => Err(CommandError::failure(
                    code::MISSING_OPTION_VALUE,
                    "login needs a username",
                )),
            };
        };

        let password = match password {
            Some(password) => password,
            None => shell
                .console
                .read_secret("Password: ")
                .context("Failed to read the password")?,
        };
        if password.is_empty() {
            return Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                "Password cannot be empty",
            ));
        }

        shell.credentials.store(&username, &password)?;
        shell.console.info(&format!("Logged in as {username}"));
        Ok(code::OK)
    }
}
