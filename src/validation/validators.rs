//! Built-in validators

use std::path::{Path, PathBuf};

use crate::session::keys;
use crate::session::{ClientProxy, ProxyParseError};
use crate::shell::Shell;

use super::{Diagnostic, Target, Validator};

/// Checks the workspace directory exists and is writable
pub struct WorkspaceValidator;

impl Validator for WorkspaceValidator {
    fn name(&self) -> &str {
        "workspace"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target, Target::Workspace)
    }

    fn validate(&self, shell: &Shell, _target: &Target) -> Vec<Diagnostic> {
        let dir = shell.settings.workspace_or(&shell.dirs.default_workspace);

        if !dir.exists() {
            // Created on demand when the first project lands there
            return vec![Diagnostic::warning(
                self.name(),
                format!("Workspace {} does not exist yet", dir.display()),
            )];
        }
        if !dir.is_dir() {
            return vec![Diagnostic::error(
                self.name(),
                format!("Workspace {} is not a directory", dir.display()),
            )];
        }

        let readonly = std::fs::metadata(&dir)
            .map(|m| m.permissions().readonly())
            .unwrap_or(false);
        if readonly {
            return vec![Diagnostic::error(
                self.name(),
                format!("Workspace {} is not writable", dir.display()),
            )];
        }

        Vec::new()
    }
}

/// Checks a project is registered and its directory still exists
pub struct ProjectValidator;

impl Validator for ProjectValidator {
    fn name(&self) -> &str {
        "project"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target, Target::Project(_))
    }

    fn validate(&self, shell: &Shell, target: &Target) -> Vec<Diagnostic> {
        let name = match target {
            Target::Project(Some(name)) => name.clone(),
            Target::Project(None) => match shell.settings.current_project() {
                Some(name) => name,
                None => {
                    return vec![Diagnostic::error(
                        self.name(),
                        "No current project; use 'set current_project <name>'",
                    )]
                }
            },
            _ => return Vec::new(),
        };

        let Some(manager) = shell.extensions.project_manager() else {
            return vec![Diagnostic::error(
                self.name(),
                "The projectManager extension is not installed",
            )];
        };

        match manager.info(&name) {
            Err(_) => vec![Diagnostic::error(
                self.name(),
                format!("Project '{}' is not registered", name),
            )],
            Ok(info) if !info.path.is_dir() => vec![Diagnostic::error(
                self.name(),
                format!(
                    "Project '{}' points at {}, which no longer exists",
                    name,
                    info.path.display()
                ),
            )],
            Ok(_) => Vec::new(),
        }
    }
}

/// Checks configured proxy values parse
pub struct ProxyValidator;

impl Validator for ProxyValidator {
    fn name(&self) -> &str {
        "proxy"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target, Target::Proxies)
    }

    fn validate(&self, shell: &Shell, _target: &Target) -> Vec<Diagnostic> {
        type Parse = fn(&str) -> Result<ClientProxy, ProxyParseError>;
        let checks: [(&str, Parse); 3] = [
            (keys::HTTP_PROXY, ClientProxy::parse_url),
            (keys::HTTPS_PROXY, ClientProxy::parse_url),
            (keys::SSH_PROXY, ClientProxy::parse_ssh),
        ];

        let mut diagnostics = Vec::new();
        for (key, parse) in checks {
            let Some(raw) = shell.settings.raw(key) else {
                continue;
            };
            if let Err(err) = parse(raw) {
                diagnostics.push(Diagnostic::error(
                    self.name(),
                    format!("Invalid {}: {}", key, err),
                ));
            }
        }
        diagnostics
    }
}

/// Checks a program resolves on the PATH
pub struct ExecutableValidator;

impl Validator for ExecutableValidator {
    fn name(&self) -> &str {
        "executable"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target, Target::Executable(_))
    }

    fn validate(&self, _shell: &Shell, target: &Target) -> Vec<Diagnostic> {
        let Target::Executable(program) = target else {
            return Vec::new();
        };

        match find_on_path(program) {
            Some(_) => Vec::new(),
            None => vec![Diagnostic::error(
                self.name(),
                format!("'{}' not found on PATH", program),
            )],
        }
    }
}

/// Resolves a program name against the PATH directories
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

pub(crate) fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return ext == "exe" || ext == "bat" || ext == "cmd";
        }
    }

    false
}
