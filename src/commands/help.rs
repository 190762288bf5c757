//! Command listings and help topics

use std::fs;

use anyhow::Context;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;

/// `help` lists visible commands or shows one command's full usage
pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["?"]
    }

    fn header(&self) -> &str {
        "List commands, or show one in detail"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("help [command]");
        if verbose {
            text.push_str("\n  Without arguments, lists every visible command.");
            text.push_str("\n  With a name, prints that command's full usage. Alias: ?");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        match args.first() {
            None => {
                list_commands(shell);
                Ok(code::OK)
            }
            Some(name) => {
                let command = shell.registry.lookup(name).ok_or_else(|| {
                    CommandError::failure(
                        code::UNKNOWN_COMMAND,
                        format!("Unknown command: {name}"),
                    )
                })?;
                let usage = command.usage(true);
                shell.console.bold_info(command.name());
                shell.console.info(&usage);
                Ok(code::OK)
            }
        }
    }
}

fn list_commands(shell: &mut Shell) {
    let names = shell.registry.command_names(false);
    let width = names.iter().map(String::len).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(names.len());
    for name in &names {
        if let Some(command) = shell.registry.lookup(name) {
            let mut label = name.clone();
            if let Some(aliases) = shell.registry.aliases_for(name) {
                if !aliases.is_empty() {
                    label = format!("{} ({})", name, aliases.join(", "));
                }
            }
            lines.push(format!("  {label:<width$}  {}", command.header()));
        }
    }

    shell.console.bold_info("Available commands:");
    for line in lines {
        shell.console.info(&line);
    }
}

/// `topic` prints prose guides installed next to the configuration
pub struct TopicCommand;

impl Command for TopicCommand {
    fn name(&self) -> &str {
        "topic"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["howto"]
    }

    fn header(&self) -> &str {
        "Show a help topic"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("topic [name]");
        if verbose {
            text.push_str("\n  Without arguments, lists the installed topics.");
            text.push_str("\n  With a name, prints that topic. Alias: howto");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        let dir = shell.config.topics_dir();
        match args.first() {
            None => {
                let topics = topic_names(&dir)?;
                if topics.is_empty() {
                    shell.console.info("No topics installed");
                } else {
                    shell.console.bold_info("Topics:");
                    for topic in topics {
                        shell.console.info(&format!("  {topic}"));
                    }
                }
                Ok(code::OK)
            }
            Some(name) => {
                let file = dir.join(format!("{name}.txt"));
                let file = if file.is_file() { file } else { dir.join(name) };
                if !file.is_file() {
                    return Err(CommandError::failure(
                        code::INVALID_OPTION_VALUE,
                        format!("No such topic: {name}"),
                    ));
                }
                let text = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read topic {}", file.display()))?;
                shell.console.info(text.trim_end());
                Ok(code::OK)
            }
        }
    }
}

/// Topic names are file stems, sorted. A missing directory is an empty
/// topic list, not an error.
fn topic_names(dir: &std::path::Path) -> Result<Vec<String>, CommandError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(Vec::new()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('.') {
            continue;
        }
        names.push(stem.to_string());
    }
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::commands::control::QuitCommand;
    use crate::shell::{Console, SharedBuf};

    fn captured(shell: &mut Shell) -> (SharedBuf, SharedBuf) {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        shell.console = Console::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (out, err)
    }

    #[test]
    fn help_lists_names_aliases_and_headers() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.registry.register(Rc::new(QuitCommand)).unwrap();
        shell.registry.register(Rc::new(HelpCommand)).unwrap();
        let (out, _err) = captured(&mut shell);

        assert_eq!(HelpCommand.execute(&mut shell, &[]).unwrap(), code::OK);
        let listing = out.contents();
        assert!(listing.contains("quit (exit, q)"));
        assert!(listing.contains("End the session"));
        assert!(listing.contains("help (?)"));
    }

    #[test]
    fn help_for_one_command_prints_verbose_usage() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.registry.register(Rc::new(QuitCommand)).unwrap();
        let (out, _err) = captured(&mut shell);

        let args = vec!["q".to_string()];
        assert_eq!(HelpCommand.execute(&mut shell, &args).unwrap(), code::OK);
        assert!(out.contents().contains("Aliases: exit, q"));
    }

    #[test]
    fn help_for_unknown_command_fails() {
        let (mut shell, _dir) = Shell::bare_for_tests();

        let args = vec!["nonesuch".to_string()];
        let err = HelpCommand.execute(&mut shell, &args).unwrap_err();
        assert_eq!(err.code(), code::UNKNOWN_COMMAND);
    }

    #[test]
    fn topics_list_from_the_topics_directory() {
        let (mut shell, dir) = Shell::bare_for_tests();
        let topics = dir.path().join("topics");
        fs::create_dir_all(&topics).unwrap();
        fs::write(topics.join("projects.txt"), "All about projects\n").unwrap();
        fs::write(topics.join("aliases.txt"), "All about aliases\n").unwrap();
        let (out, _err) = captured(&mut shell);

        assert_eq!(TopicCommand.execute(&mut shell, &[]).unwrap(), code::OK);
        let listing = out.contents();
        assert!(listing.contains("aliases"));
        assert!(listing.contains("projects"));
    }

    #[test]
    fn topic_prints_the_file_contents() {
        let (mut shell, dir) = Shell::bare_for_tests();
        let topics = dir.path().join("topics");
        fs::create_dir_all(&topics).unwrap();
        fs::write(topics.join("projects.txt"), "All about projects\n").unwrap();
        let (out, _err) = captured(&mut shell);

        let args = vec!["projects".to_string()];
        assert_eq!(TopicCommand.execute(&mut shell, &args).unwrap(), code::OK);
        assert!(out.contents().contains("All about projects"));
    }

    #[test]
    fn missing_topics_directory_is_an_empty_list() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        let (out, _err) = captured(&mut shell);

        assert_eq!(TopicCommand.execute(&mut shell, &[]).unwrap(), code::OK);
        assert!(out.contents().contains("No topics installed"));
    }

    #[test]
    fn unknown_topic_is_an_option_error() {
        let (mut shell, _dir) = Shell::bare_for_tests();

        let args = vec!["nonesuch".to_string()];
        let err = TopicCommand.execute(&mut shell, &args).unwrap_err();
        assert_eq!(err.code(), code::INVALID_OPTION_VALUE);
    }
}
