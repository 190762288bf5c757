//! On-demand validation

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;
use crate::validation::{report_diagnostics, Target};

/// `validate` checks the current project, the workspace, or the proxies
pub struct ValidateCommand;

impl Command for ValidateCommand {
    fn name(&self) -> &str {
        "validate"
    }

    fn header(&self) -> &str {
        "Check the project, workspace, or proxies"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("validate [--target workspace|proxies] [validator..]");
        if verbose {
            text.push_str("\n  Without options, validates the current project.");
            text.push_str("\n  Validator names restrict the run to those validators.");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        let mut target = Target::Project(None);
        let mut filter = Vec::new();

        let mut it = args.iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--target" => {
                    let value = it.next().ok_or_else(|| {
                        CommandError::failure(
                            code::MISSING_OPTION_VALUE,
                            "--target needs a value",
                        )
                    })?;
                    target = match value.as_str() {
                        "workspace" => Target::Workspace,
                        "proxies" => Target::Proxies,
                        "project" => Target::Project(None),
                        other => {
                            return Err(CommandError::failure(
                                code::INVALID_OPTION_VALUE,
                                format!("Unknown target: {other}"),
                            ))
                        }
                    };
                }
                other if other.starts_with('-') => {
                    return Err(CommandError::failure(
                        code::INVALID_OPTION_VALUE,
                        format!("Unknown option: {other}"),
                    ))
                }
                other => filter.push(other.to_string()),
            }
        }

        let diagnostics = shell.validation.validate(shell, &target, &filter);
        if diagnostics.is_empty() {
            shell.console.info(&format!("No findings for {target}"));
        } else {
            report_diagnostics(&mut shell.console, &diagnostics);
        }
        Ok(code::OK)
    }
}
