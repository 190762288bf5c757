//! External process execution

use std::path::PathBuf;
use std::process::Command as Process;

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;
use crate::validation::find_on_path;

/// `exec` runs a program from the PATH, streaming its output
pub struct ExecCommand;

impl Command for ExecCommand {
    fn name(&self) -> &str {
        "exec"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["x"]
    }

    fn header(&self) -> &str {
        "Run an external program"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("exec program [args..]");
        if verbose {
            text.push_str("\n  Resolves the program on the PATH and waits for it.");
            text.push_str("\n  The program's exit code becomes the command's result. Alias: x");
        }
        text
    }

    fn execute(&self, _shell: &mut Shell, args: &[String]) -> CommandResult {
        let program = args.first().ok_or_else(|| {
            CommandError::failure(code::MISSING_OPTION_VALUE, "exec needs a program to run")
        })?;
        let resolved = resolve_program(program)?;

        let status = Process::new(&resolved).args(&args[1..]).status();
        match status {
            Err(error) => Err(CommandError::failure(
                code::PROCESS_ERROR,
                format!("Cannot run {program}: {error}"),
            )),
            Ok(status) if status.success() => Ok(code::OK),
            Ok(status) => match status.code() {
                Some(exit) => Err(CommandError::failure(
                    code::PROCESS_ERROR,
                    format!("{program} exited with code {exit}"),
                )),
                None => Err(CommandError::failure(
                    code::PROCESS_ERROR,
                    format!("{program} was terminated by a signal"),
                )),
            },
        }
    }
}

/// Resolves a bare name on the PATH; anything with a separator is taken
/// as a path.
fn resolve_program(program: &str) -> Result<PathBuf, CommandError> {
    let unknown = || {
        CommandError::failure(
            code::UNKNOWN_EXECUTABLE,
            format!("Unknown executable: {program}"),
        )
    };

    if program.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(program);
        if path.is_file() {
            return Ok(path);
        }
        return Err(unknown());
    }
    find_on_path(program).ok_or_else(unknown)
}
