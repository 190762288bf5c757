//! Environment and session introspection

use crate::core::{code, Command, CommandResult};
use crate::shell::Shell;
use crate::validation::find_on_path;

/// Executables every backend build leans on
const PROBED_PROGRAMS: &[&str] = &["mvn", "java"];

/// `diagnostics` prints where the session lives and what it can see
pub struct DiagnosticsCommand;

impl Command for DiagnosticsCommand {
    fn name(&self) -> &str {
        "diagnostics"
    }

    fn header(&self) -> &str {
        "Show environment and session state"
    }

    fn usage(&self, _verbose: bool) -> String {
        String::from("diagnostics")
    }

    fn execute(&self, shell: &mut Shell, _args: &[String]) -> CommandResult {
        let workspace = shell
            .settings
            .workspace_or(&shell.dirs.default_workspace);

        shell.console.bold_info("Directories");
        let install = shell.dirs.install.display().to_string();
        let state = shell.dirs.state.display().to_string();
        shell.console.info(&format!("  install:   {install}"));
        shell.console.info(&format!("  state:     {state}"));
        shell
            .console
            .info(&format!("  workspace: {}", workspace.display()));

        shell.console.bold_info("Session");
        let settings_line = format!(
            "  settings:  {} ({} entries)",
            shell.settings.path().display(),
            shell.settings.entries().len()
        );
        shell.console.info(&settings_line);
        let history_line = format!(
            "  history:   {} ({} lines)",
            shell.history.path().display(),
            shell.history.len()
        );
        shell.console.info(&history_line);
        let commands = shell.registry.len();
        shell.console.info(&format!("  commands:  {commands} registered"));
        let extensions = shell.extensions.installed();
        let extensions = if extensions.is_empty() {
            "none".to_string()
        } else {
            extensions.join(", ")
        };
        shell.console.info(&format!("  extensions: {extensions}"));
        if let Some(user) = shell.credentials.username() {
            let line = format!("  logged in as {user}");
            shell.console.info(&line);
        }

        shell.console.bold_info("Proxies");
        let proxies = [
            ("http", shell.settings.http_proxy()),
            ("https", shell.settings.https_proxy()),
            ("ssh", shell.settings.ssh_proxy()),
        ];
        for (label, proxy) in proxies {
            let value = proxy
                .map(|p| p.to_string())
                .unwrap_or_else(|| "not set".to_string());
            shell.console.info(&format!("  {label}: {value}"));
        }

        shell.console.bold_info("Executables");
        for program in PROBED_PROGRAMS {
            let found = find_on_path(program)
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "not found".to_string());
            shell.console.info(&format!("  {program}: {found}"));
        }

        Ok(code::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shell::{Console, SharedBuf};

    #[test]
    fn reports_directories_session_and_probes() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.history.record("help").unwrap();
        let out = SharedBuf::default();
        shell.console =
            Console::with_writers(Box::new(out.clone()), Box::new(SharedBuf::default()));

        assert_eq!(DiagnosticsCommand.execute(&mut shell, &[]).unwrap(), code::OK);
        let report = out.contents();
        assert!(report.contains("Directories"));
        assert!(report.contains("workspace:"));
        assert!(report.contains("(1 lines)"));
        assert!(report.contains("extensions: projectManager"));
        assert!(report.contains("mvn:"));
        assert!(report.contains("java:"));
    }

    #[test]
    fn shows_the_stored_login() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.credentials.store("dev", "hunter2").unwrap();
        let out = SharedBuf::default();
        shell.console =
            Console::with_writers(Box::new(out.clone()), Box::new(SharedBuf::default()));

        DiagnosticsCommand.execute(&mut shell, &[]).unwrap();
        assert!(out.contents().contains("logged in as dev"));
    }
}
