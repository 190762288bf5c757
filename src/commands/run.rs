//! Script execution

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;

/// `run` feeds a file of shell lines through the dispatcher
pub struct RunCommand;

impl Command for RunCommand {
    fn name(&self) -> &str {
        "run"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["."]
    }

    fn header(&self) -> &str {
        "Run a script of shell commands"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("run file");
        if verbose {
            text.push_str("\n  Executes the file line by line and stops at the first");
            text.push_str("\n  failing command. Blank lines and # comments are skipped.");
            text.push_str("\n  Alias: .");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        let source = args.first().ok_or_else(|| {
            CommandError::failure(code::MISSING_OPTION_VALUE, "run needs a script file")
        })?;

        if source.contains("://") {
            return Err(CommandError::failure(
                code::UNSUPPORTED,
                format!("Remote scripts are not supported: {source}"),
            ));
        }

        let path = Path::new(source);
        if !path.is_file() {
            return Err(CommandError::failure(
                code::INVALID_PATH,
                format!("No such script: {source}"),
            ));
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {source}"))?;
        shell.settings.record_script(source)?;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let result = shell.dispatch_script_line(line);
            if result != code::OK {
                return Err(CommandError::failure(
                    result,
                    format!("Script {source} stopped at line {}: {line}", index + 1),
                ));
            }
        }
        Ok(code::OK)
    }
}
