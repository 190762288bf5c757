//! External commands
//!
//! A registered executable joins the shell like any other command. It is
//! either probed (`--manifest`) at registration time or described up
//! front by declarative registration, in which case the executable only
//! has to exist once it is invoked.

use std::path::{Path, PathBuf};
use std::process::{Command as Process, Stdio};

use crate::core::{code, Command, CommandError, CommandResult};
use crate::shell::Shell;
use crate::validation::is_executable;

use super::locator::LocatorError;
use super::manifest::CommandManifest;

/// Flag every external command must answer with its manifest
pub const MANIFEST_FLAG: &str = "--manifest";

/// A shell command backed by an executable outside the process
#[derive(Debug)]
pub struct ExternalCommand {
    path: PathBuf,
    manifest: CommandManifest,
}

impl ExternalCommand {
    /// Loads a command by running the executable's manifest probe
    pub fn probe(path: &Path) -> Result<Self, LocatorError> {
        let locator = path.display().to_string();

        if !path.is_file() {
            return Err(LocatorError::Load {
                locator,
                reason: "no such file".to_string(),
            });
        }
        if !is_executable(path) {
            return Err(LocatorError::Load {
                locator,
                reason: "not executable".to_string(),
            });
        }

        let output = Process::new(path)
            .arg(MANIFEST_FLAG)
            .output()
            .map_err(|e| LocatorError::Load {
                locator: locator.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LocatorError::Load {
                locator,
                reason: format!("manifest probe failed: {}", stderr.trim()),
            });
        }

        let manifest: CommandManifest =
            serde_json::from_slice(&output.stdout).map_err(|e| LocatorError::Contract {
                locator: locator.clone(),
                reason: format!("invalid manifest JSON: {}", e),
            })?;

        Self::declared(path, manifest)
    }

    /// Builds a command from declared fields without probing. The
    /// executable is only checked when the command runs.
    pub fn declared(path: &Path, manifest: CommandManifest) -> Result<Self, LocatorError> {
        manifest
            .check_contract()
            .map_err(|reason| LocatorError::Contract {
                locator: path.display().to_string(),
                reason,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Command for ExternalCommand {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn aliases(&self) -> Vec<&str> {
        self.manifest.aliases.iter().map(String::as_str).collect()
    }

    fn hidden(&self) -> bool {
        self.manifest.hidden
    }

    fn header(&self) -> &str {
        &self.manifest.header
    }

    fn usage(&self, _verbose: bool) -> String {
        match &self.manifest.usage {
            Some(usage) => usage.clone(),
            None => format!("{} [args...]", self.manifest.name),
        }
    }

    fn execute(&self, _shell: &mut Shell, args: &[String]) -> CommandResult {
        let status = Process::new(&self.path)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CommandError::failure(
                        code::UNKNOWN_EXECUTABLE,
                        format!("Cannot run {}: no such executable", self.path.display()),
                    )
                } else {
                    CommandError::failure(
                        code::UNKNOWN_EXECUTABLE,
                        format!("Cannot run {}: {}", self.path.display(), e),
                    )
                }
            })?;

        match status.code() {
            Some(0) => Ok(code::OK),
            Some(exit) => Err(CommandError::failure(
                code::PROCESS_ERROR,
                format!("{} exited with code {}", self.manifest.name, exit),
            )),
            None => Err(CommandError::failure(
                code::PROCESS_ERROR,
                format!("{} was terminated by a signal", self.manifest.name),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn manifest(name: &str) -> CommandManifest {
        CommandManifest {
            name: name.to_string(),
            aliases: vec![],
            hidden: false,
            header: String::new(),
            usage: None,
        }
    }

    #[test]
    fn probe_rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ExternalCommand::probe(&dir.path().join("ghost")).unwrap_err();
        assert!(matches!(err, LocatorError::Load { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn probe_rejects_non_executable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "not a program").unwrap();

        let err = ExternalCommand::probe(&path).unwrap_err();
        assert!(matches!(err, LocatorError::Load { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn probe_reads_the_manifest() {
        let dir = TempDir::new().unwrap();
        let path = script(
            &dir,
            "deploy",
            r#"echo '{"name": "deploy", "aliases": ["d"], "header": "push it"}'"#,
        );

        let command = ExternalCommand::probe(&path).unwrap();
        assert_eq!(command.name(), "deploy");
        assert_eq!(command.aliases(), vec!["d"]);
        assert_eq!(command.header(), "push it");
    }

    #[cfg(unix)]
    #[test]
    fn probe_flags_bad_manifest_json() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "broken", "echo 'not json'");

        let err = ExternalCommand::probe(&path).unwrap_err();
        assert!(matches!(err, LocatorError::Contract { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn execute_maps_exit_statuses() {
        let dir = TempDir::new().unwrap();
        let (mut shell, _state) = Shell::bare_for_tests();

        let ok = ExternalCommand::declared(&script(&dir, "ok", "exit 0"), manifest("ok")).unwrap();
        assert_eq!(ok.execute(&mut shell, &[]).unwrap(), code::OK);

        let sad =
            ExternalCommand::declared(&script(&dir, "sad", "exit 3"), manifest("sad")).unwrap();
        let err = sad.execute(&mut shell, &[]).unwrap_err();
        assert_eq!(err.code(), code::PROCESS_ERROR);
    }

    #[test]
    fn declared_command_defers_executable_check() {
        let dir = TempDir::new().unwrap();
        let (mut shell, _state) = Shell::bare_for_tests();

        let lazy = ExternalCommand::declared(&dir.path().join("later"), manifest("later")).unwrap();
        let err = lazy.execute(&mut shell, &[]).unwrap_err();
        assert_eq!(err.code(), code::UNKNOWN_EXECUTABLE);
    }

    #[test]
    fn declared_command_still_checks_the_contract() {
        let dir = TempDir::new().unwrap();
        let err =
            ExternalCommand::declared(&dir.path().join("x"), manifest("two words")).unwrap_err();
        assert!(matches!(err, LocatorError::Contract { .. }));
    }
}
