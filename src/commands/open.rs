//! Opening the current project in an editor

use std::process::Command as Process;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;

/// `open` hands the current project's directory to the project editor
pub struct OpenCommand;

impl Command for OpenCommand {
    fn name(&self) -> &str {
        "open"
    }

    fn header(&self) -> &str {
        "Open the current project in the configured editor"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("open");
        if verbose {
            text.push_str("\n  Launches the project_editor setting on the current");
            text.push_str("\n  project's directory and returns immediately.");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, _args: &[String]) -> CommandResult {
        let project = shell.settings.current_project().ok_or_else(|| {
            CommandError::failure(
                code::INVALID_PROJECT,
                "No current project; use 'set current_project <name>'",
            )
        })?;
        let editor = shell
            .settings
            .project_editor()
            .or_else(|| shell.settings.editor())
            .ok_or_else(|| {
                CommandError::failure(
                    code::MISSING_OPTION_VALUE,
                    "No editor configured; use 'set project_editor <command>'",
                )
            })?;

        let path = {
            let manager = shell.require_project_manager()?;
            manager
                .path(&project)
                .map_err(|error| CommandError::failure(error.code(), error.to_string()))?
        };

        // The editor setting may carry its own flags
        let mut words = editor.split_whitespace();
        let program = words.next().ok_or_else(|| {
            CommandError::failure(code::MISSING_OPTION_VALUE, "The editor setting is empty")
        })?;

        let spawned = Process::new(program)
            .args(words)
            .arg(&path)
            .spawn();
        match spawned {
            Ok(_) => {
                shell
                    .console
                    .info(&format!("Opening {} with {program}", path.display()));
                Ok(code::OK)
            }
            Err(error) => Err(CommandError::failure(
                code::UNKNOWN_EXECUTABLE,
                format!("Cannot launch {program}: {error}"),
            )),
        }
    }
}
