//! Session control commands

use crate::core::{code, Command, CommandResult};
use crate::shell::Shell;

/// `quit` ends the session after the current dispatch finishes
pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str {
        "quit"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["exit", "q"]
    }

    fn header(&self) -> &str {
        "End the session"
    }

    fn usage(&self, verbose: bool) -> String {
        let mut text = String::from("quit");
        if verbose {
            text.push_str("\n  Ends the session. Aliases: exit, q");
        }
        text
    }

    fn execute(&self, shell: &mut Shell, _args: &[String]) -> CommandResult {
        shell.request_exit();
        Ok(code::OK)
    }
}

/// `clear` wipes the terminal
pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &str {
        "clear"
    }

    fn header(&self) -> &str {
        "Clear the screen"
    }

    fn usage(&self, _verbose: bool) -> String {
        String::from("clear")
    }

    fn execute(&self, shell: &mut Shell, _args: &[String]) -> CommandResult {
        shell.console.clear_screen();
        Ok(code::OK)
    }
}
