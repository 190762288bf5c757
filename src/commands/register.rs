//! Runtime command registration

use std::rc::Rc;
use std::slice::Iter;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;

/// `register` adds commands resolved from a locator, or removes them
pub struct RegisterCommand;

#[derive(Default)]
struct RegisterArgs {
    locator: Option<String>,
    name: Option<String>,
    aliases: Vec<String>,
    header: Option<String>,
    hidden: bool,
    force: bool,
    unregister: Option<String>,
}

impl Command for RegisterCommand {
    fn name(&self) -> &str {
        "register"
    }

    fn header(&self) -> &str {
        "Register or unregister a command"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("register [options] locator | register -u name");
        if verbose {
            text.push_str("\n  Locators: builtin:<id> for built-in factories, or the path");
            text.push_str("\n  of an executable answering the manifest probe.");
            text.push_str("\n  --name n      register under this name");
            text.push_str("\n  --alias a     add an alias, repeatable");
            text.push_str("\n  --header t    one-line description for listings");
            text.push_str("\n  --hidden      keep out of help listings");
            text.push_str("\n  --force       displace colliding commands");
            text.push_str("\n  -u, --unregister name   remove a command");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        let parsed = parse_args(args)?;

        if let Some(name) = parsed.unregister {
            return match shell.registry.unregister(&name) {
                Some(_) => {
                    shell.console.info(&format!("Unregistered {name}"));
                    Ok(code::OK)
                }
                None => Err(CommandError::failure(
                    code::INVALID_OPTION_VALUE,
                    format!("No such command: {name}"),
                )),
            };
        }

        let locator = parsed.locator.ok_or_else(|| {
            CommandError::failure(code::MISSING_OPTION_VALUE, "register needs a locator")
        })?;
        let command = shell
            .resolver
            .resolve(&locator)
            .map_err(|error| CommandError::failure(error.code(), error.to_string()))?;

        let overridden =
            parsed.name.is_some() || !parsed.aliases.is_empty() || parsed.header.is_some();
        let command: Rc<dyn Command> = if overridden || parsed.hidden {
            Rc::new(OverrideCommand {
                inner: command,
                name: parsed.name,
                aliases: parsed.aliases,
                header: parsed.header,
                hidden: parsed.hidden,
            })
        } else {
            command
        };

        let registered = command.name().to_string();
        if parsed.force {
            for displaced in shell.registry.register_forced(command) {
                shell.console.info(&format!("Displaced command: {displaced}"));
            }
        } else if let Err(error) = shell.registry.register(command) {
            return Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                error.to_string(),
            ));
        }
        shell.console.info(&format!("Registered {registered}"));
        Ok(code::OK)
    }
}

fn parse_args(args: &[String]) -> Result<RegisterArgs, CommandError> {
    let mut parsed = RegisterArgs::default();
    let mut it = args.iter();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--name" => parsed.name = Some(option_value(&mut it, "--name")?),
            "--alias" => parsed.aliases.push(option_value(&mut it, "--alias")?),
            "--header" => parsed.header = Some(option_value(&mut it, "--header")?),
            "--hidden" => parsed.hidden = true,
            "--force" => parsed.force = true,
            "-u" | "--unregister" => {
                parsed.unregister = Some(option_value(&mut it, "--unregister")?)
            }
            other if other.starts_with('-') => {
                return Err(CommandError::failure(
                    code::INVALID_OPTION_VALUE,
                    format!("Unknown option: {other}"),
                ))
            }
            other => {
                if parsed.locator.is_some() {
                    return Err(CommandError::failure(
                        code::INVALID_OPTION_VALUE,
                        "register takes a single locator",
                    ));
                }
                parsed.locator = Some(other.to_string());
            }
        }
    }
    Ok(parsed)
}

fn option_value(it: &mut Iter<'_, String>, option: &str) -> Result<String, CommandError> {
    it.next().cloned().ok_or_else(|| {
        CommandError::failure(
            code::MISSING_OPTION_VALUE,
            format!("{option} needs a value"),
        )
    })
}

/// Wraps a resolved command with replacement identity fields
struct OverrideCommand {
    inner: Rc<dyn Command>,
    name: Option<String>,
    aliases: Vec<String>,
    header: Option<String>,
    hidden: bool,
}

impl Command for OverrideCommand {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.inner.name())
    }

    fn aliases(&self) -> Vec<&str> {
        if self.aliases.is_empty() {
            self.inner.aliases()
        } else {
            self.aliases.iter().map(String::as_str).collect()
        }
    }

    fn hidden(&self) -> bool {
        self.hidden || self.inner.hidden()
    }

    fn header(&self) -> &str {
        self.header.as_deref().unwrap_or_else(|| self.inner.header())
    }

    fn usage(&self, verbose: bool) -> String {
        self.inner.usage(verbose)
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        self.inner.execute(shell, args)
    }
}
