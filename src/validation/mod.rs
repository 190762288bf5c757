//! Validation engine
//!
//! Commands ask the engine to check a [`Target`] before doing work that
//! depends on it. Validators are pluggable; each one reports what it can
//! see and the engine concatenates the diagnostics. Validation never
//! fails outright: a target no validator recognizes yields a single
//! informational diagnostic.

mod validators;

pub use validators::{
    find_on_path, ExecutableValidator, ProjectValidator, ProxyValidator, WorkspaceValidator,
};
pub(crate) use validators::is_executable;

use std::fmt;
use std::rc::Rc;

use crate::core::{Hook, HookError};
use crate::shell::{Console, Shell};

/// What a validation run is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The workspace directory
    Workspace,
    /// A named project, or the current one when `None`
    Project(Option<String>),
    /// All configured proxies
    Proxies,
    /// A program expected on the PATH
    Executable(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Workspace => write!(f, "workspace"),
            Target::Project(Some(name)) => write!(f, "project '{}'", name),
            Target::Project(None) => write!(f, "current project"),
            Target::Proxies => write!(f, "proxies"),
            Target::Executable(name) => write!(f, "executable '{}'", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// One finding, attributed to the validator that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub source: String,
}

impl Diagnostic {
    pub fn info(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Ordered collection of findings from one validation run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.0.extend(diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any finding is an error
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A check that knows how to inspect some targets
pub trait Validator {
    fn name(&self) -> &str;

    /// Whether this validator has anything to say about `target`
    fn supports(&self, target: &Target) -> bool;

    /// Inspects the target. An empty result means the target passed.
    fn validate(&self, shell: &Shell, target: &Target) -> Vec<Diagnostic>;
}

/// Runs registered validators against a target
pub struct ValidationEngine {
    validators: Vec<Rc<dyn Validator>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Engine preloaded with the built-in validators
    pub fn with_builtins() -> Self {
        let mut engine = Self::new();
        engine.register(Rc::new(WorkspaceValidator));
        engine.register(Rc::new(ProjectValidator));
        engine.register(Rc::new(ProxyValidator));
        engine.register(Rc::new(ExecutableValidator));
        engine
    }

    pub fn register(&mut self, validator: Rc<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn validator_names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Validates `target` with every applicable validator. A non-empty
    /// `filter` restricts the run to validators named in it.
    pub fn validate(&self, shell: &Shell, target: &Target, filter: &[String]) -> Diagnostics {
        let selected: Vec<&Rc<dyn Validator>> = self
            .validators
            .iter()
            .filter(|v| filter.is_empty() || filter.iter().any(|name| name == v.name()))
            .filter(|v| v.supports(target))
            .collect();

        if selected.is_empty() {
            return Diagnostics::single(Diagnostic::info(
                "validation",
                format!("No validators applicable to {}", target),
            ));
        }

        let mut diagnostics = Diagnostics::new();
        for validator in selected {
            diagnostics.extend(validator.validate(shell, target));
        }
        diagnostics
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints each finding on the console channel matching its severity
pub fn report_diagnostics(console: &mut Console, diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let line = format!("[{}] {}", diagnostic.source, diagnostic.message);
        match diagnostic.severity {
            Severity::Info => console.info(&line),
            Severity::Warning => console.warn(&line),
            Severity::Error => console.error(&line),
        }
    }
}

/// Pre-execution hook that checks the current project before every
/// command. `skip_validation` disables it; `abort_if_validation_fail`
/// turns findings into a veto.
pub struct ValidationHook;

impl Hook for ValidationHook {
    fn name(&self) -> &str {
        "validation"
    }

    // Ahead of user hooks, which default to rank 0
    fn rank(&self) -> i32 {
        -10
    }

    fn run(&self, shell: &mut Shell) -> Result<(), HookError> {
        if shell.config.skip_validation() {
            return Ok(());
        }
        if shell.settings.current_project().is_none() {
            return Ok(());
        }

        let diagnostics = shell
            .validation
            .validate(shell, &Target::Project(None), &[]);
        if !diagnostics.has_errors() {
            return Ok(());
        }

        report_diagnostics(&mut shell.console, &diagnostics);
        if shell.config.abort_if_validation_fail() {
            return Err(HookError::Abort(
                "Current project failed validation".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;

    struct Flagging {
        name: &'static str,
        severity: Severity,
    }

    impl Validator for Flagging {
        fn name(&self) -> &str {
            self.name
        }

        fn supports(&self, target: &Target) -> bool {
            matches!(target, Target::Workspace)
        }

        fn validate(&self, _shell: &Shell, _target: &Target) -> Vec<Diagnostic> {
            vec![Diagnostic {
                severity: self.severity,
                message: format!("{} spoke", self.name),
                source: self.name.to_string(),
            }]
        }
    }

    #[test]
    fn unsupported_target_yields_single_info() {
        let (shell, _dir) = Shell::bare_for_tests();
        let engine = ValidationEngine::new();

        let diagnostics = engine.validate(&shell, &Target::Proxies, &[]);
        assert_eq!(diagnostics.len(), 1);
        let only = diagnostics.iter().next().unwrap();
        assert_eq!(only.severity, Severity::Info);
        assert!(only.message.contains("No validators applicable"));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn all_applicable_validators_contribute() {
        let (shell, _dir) = Shell::bare_for_tests();
        let mut engine = ValidationEngine::new();
        engine.register(Rc::new(Flagging {
            name: "first",
            severity: Severity::Warning,
        }));
        engine.register(Rc::new(Flagging {
            name: "second",
            severity: Severity::Error,
        }));

        let diagnostics = engine.validate(&shell, &Target::Workspace, &[]);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn filter_restricts_by_validator_name() {
        let (shell, _dir) = Shell::bare_for_tests();
        let mut engine = ValidationEngine::new();
        engine.register(Rc::new(Flagging {
            name: "first",
            severity: Severity::Error,
        }));
        engine.register(Rc::new(Flagging {
            name: "second",
            severity: Severity::Info,
        }));

        let diagnostics =
            engine.validate(&shell, &Target::Workspace, &["second".to_string()]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().source, "second");
    }

    #[test]
    fn severity_orders_by_weight() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    fn config_from(dir: &std::path::Path, text: &str) -> crate::session::Configuration {
        std::fs::write(dir.join(crate::session::CONFIG_FILE_NAME), text).unwrap();
        crate::session::Configuration::load(dir).unwrap()
    }

    #[test]
    fn validation_hook_is_a_noop_without_a_current_project() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        assert!(ValidationHook.run(&mut shell).is_ok());
    }

    #[test]
    fn validation_hook_reports_but_passes_by_default() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.settings.set_current_project(Some("ghost")).unwrap();

        assert!(ValidationHook.run(&mut shell).is_ok());
    }

    #[test]
    fn validation_hook_aborts_when_configured_to() {
        let (mut shell, dir) = Shell::bare_for_tests();
        shell.settings.set_current_project(Some("ghost")).unwrap();
        shell.config = config_from(dir.path(), "abort_if_validation_fail = true\n");

        let result = ValidationHook.run(&mut shell);
        assert!(matches!(result, Err(HookError::Abort(_))));
    }

    #[test]
    fn skip_validation_disables_the_hook() {
        let (mut shell, dir) = Shell::bare_for_tests();
        shell.settings.set_current_project(Some("ghost")).unwrap();
        shell.config = config_from(
            dir.path(),
            "skip_validation = true\nabort_if_validation_fail = true\n",
        );

        assert!(ValidationHook.run(&mut shell).is_ok());
    }
}
