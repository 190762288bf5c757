//! History listing and clearing

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;

/// `history` lists recorded lines with their event numbers
pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "history"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["h"]
    }

    fn header(&self) -> &str {
        "Show the session history"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("history [-c|--clear]");
        if verbose {
            text.push_str("\n  Lists recorded lines, numbered for !n recall.");
            text.push_str("\n  -c, --clear  forget all recorded lines. Alias: h");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, args: &[String]) -> CommandResult {
        match args.first().map(String::as_str) {
            Some("-c") | Some("--clear") => match shell.history.clear() {
                Ok(()) => Ok(code::OK),
                Err(error) => {
                    // A history file that cannot be rewritten ends the session
                    shell.request_exit();
                    Err(CommandError::failure(code::UNKNOWN_ERROR, error.to_string()))
                }
            },
            Some(other) => Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                format!("Unknown option: {other}"),
            )),
            None => {
                let width = shell.history.len().to_string().len();
                let lines: Vec<String> = shell
                    .history
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(index, line)| format!("{:>width$}  {line}", index + 1))
                    .collect();
                for line in lines {
                    shell.console.info(&line);
                }
                Ok(code::OK)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shell::{Console, SharedBuf};

    #[test]
    fn listing_is_numbered_from_one() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.history.record("help").unwrap();
        shell.history.record("set editor vi").unwrap();

        let out = SharedBuf::default();
        shell.console =
            Console::with_writers(Box::new(out.clone()), Box::new(SharedBuf::default()));
        HistoryCommand.execute(&mut shell, &[]).unwrap();

        let listing = out.contents();
        assert!(listing.contains("1  help"));
        assert!(listing.contains("2  set editor vi"));
    }

    #[test]
    fn clear_forgets_everything() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.history.record("help").unwrap();

        let args = vec!["--clear".to_string()];
        assert_eq!(HistoryCommand.execute(&mut shell, &args).unwrap(), code::OK);
        assert!(shell.history.is_empty());
    }

    #[test]
    fn unknown_option_fails() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        let args = vec!["--wipe".to_string()];
        let err = HistoryCommand.execute(&mut shell, &args).unwrap_err();
        assert_eq!(err.code(), code::INVALID_OPTION_VALUE);
    }
}
