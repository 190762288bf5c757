//! # Interactive Shell
//!
//! The dispatch engine behind the `mab` prompt. One [`Shell`] owns every
//! session collaborator and drives lines through a fixed pipeline.
//!
//! ## Dispatch Pipeline
//!
//! | Step | Stage | Failure code |
//! |------|-------|--------------|
//! | 1 | Read a line (prompt or batch argv) | |
//! | 2 | Expand history events (`!!`, `!n`, `^old^new`) | `PARSE_ERROR` |
//! | 3 | Tokenize | `PARSE_ERROR` |
//! | 4 | Resolve name, registry alias, then user alias | `UNKNOWN_COMMAND` |
//! | 5 | Pre-hooks, in rank order | `ABORT` |
//! | 6 | Execute the command | command's own code |
//! | 7 | Post-hooks, always | logged only |
//! | 8 | Record the line in history | fatal, ends the session |
//!
//! A line the registry cannot resolve is offered to the installed
//! expression evaluator before being reported as unknown. Batch dispatch
//! (`mab <command> [args..]`) enters at step 4 with pre-built argv and
//! never consults the evaluator.
//!
//! ## Extension Points
//!
//! Commands reach optional collaborators through [`Extensions`]. The
//! `projectManager` extension backs every project-aware command; commands
//! that need it fail with `MISSING_EXTENSION` when it is absent. The
//! `prompt` extension overrides the default `mab> ` prompt.

use std::collections::BTreeSet;
use std::rc::Rc;

use thiserror::Error;

use crate::core::{
    code, tokenize, Command, CommandError, CommandResult, HookChain, HookOutcome, HookReport,
    Registry,
};
use crate::extension::{CommandResolver, ExpressionEvaluator, NullEvaluator};
use crate::session::{
    Configuration, Credentials, HistoryLog, MabDirs, ProjectManager, SettingsStore,
};
use crate::validation::ValidationEngine;

mod console;
mod expansion;

pub use console::{Console, LineReader, StdinReader};
#[cfg(test)]
pub use console::{ScriptedReader, SharedBuf};
pub use expansion::{expand, is_event_line, ExpansionError};

/// Extension slot for the project manager collaborator
pub const PROJECT_MANAGER_EXTENSION: &str = "projectManager";

/// Extension slot for a custom prompt
pub const PROMPT_EXTENSION: &str = "prompt";

pub const DEFAULT_PROMPT: &str = "mab> ";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Alias loop detected at '{0}'")]
    AliasCycle(String),

    #[error("Alias '{0}' expands to nothing")]
    EmptyAlias(String),
}

/// Optional collaborators installed at startup
#[derive(Default)]
pub struct Extensions {
    project_manager: Option<Box<dyn ProjectManager>>,
    prompt: Option<String>,
}

impl Extensions {
    pub fn install_project_manager(&mut self, manager: Box<dyn ProjectManager>) {
        self.project_manager = Some(manager);
    }

    pub fn project_manager(&self) -> Option<&dyn ProjectManager> {
        self.project_manager.as_deref()
    }

    pub fn project_manager_mut(&mut self) -> Option<&mut (dyn ProjectManager + 'static)> {
        self.project_manager.as_deref_mut()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = Some(prompt.into());
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
    }

    /// Names of the installed extensions, for diagnostics output
    pub fn installed(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.project_manager.is_some() {
            names.push(PROJECT_MANAGER_EXTENSION);
        }
        if self.prompt.is_some() {
            names.push(PROMPT_EXTENSION);
        }
        names
    }
}

/// Outcome of command-name resolution
enum Resolution {
    /// A registered command plus the final argv, alias splices applied
    Command(Rc<dyn Command>, Vec<String>),
    /// No registered command claims the first token
    Unresolved(Vec<String>),
}

/// One interactive session: registries, stores, and the dispatch loop
pub struct Shell {
    pub dirs: MabDirs,
    pub config: Configuration,
    pub settings: SettingsStore,
    pub history: HistoryLog,
    pub credentials: Credentials,
    pub registry: Registry,
    pub resolver: CommandResolver,
    pub pre_hooks: HookChain,
    pub post_hooks: HookChain,
    pub validation: ValidationEngine,
    pub extensions: Extensions,
    pub console: Console,
    pub evaluator: Rc<dyn ExpressionEvaluator>,
    last_code: i32,
    exit_requested: bool,
    verbose_override: bool,
    tracing_override: bool,
}

impl Shell {
    pub fn new(
        dirs: MabDirs,
        config: Configuration,
        settings: SettingsStore,
        history: HistoryLog,
        credentials: Credentials,
    ) -> Self {
        let mut console = Console::stdio();
        console.set_verbose(settings.verbose());
        console.set_tracing(settings.tracing());

        Self {
            dirs,
            config,
            settings,
            history,
            credentials,
            registry: Registry::new(),
            resolver: CommandResolver::new(),
            pre_hooks: HookChain::new(),
            post_hooks: HookChain::new(),
            validation: ValidationEngine::with_builtins(),
            extensions: Extensions::default(),
            console,
            evaluator: Rc::new(NullEvaluator),
            last_code: code::OK,
            exit_requested: false,
            verbose_override: false,
            tracing_override: false,
        }
    }

    /// Code of the most recent dispatch
    pub fn last_code(&self) -> i32 {
        self.last_code
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Forces verbosity for this session only, on top of whatever the
    /// persisted settings say. Command-line flags land here.
    pub fn override_verbosity(&mut self, verbose: bool, tracing: bool) {
        self.verbose_override = verbose;
        self.tracing_override = tracing;
        self.sync_console();
    }

    /// The project manager extension, or a `MISSING_EXTENSION` failure
    pub fn require_project_manager(
        &mut self,
    ) -> Result<&mut (dyn ProjectManager + 'static), CommandError> {
        self.extensions.project_manager_mut().ok_or_else(|| {
            CommandError::failure(
                code::MISSING_EXTENSION,
                format!("Missing extension: {PROJECT_MANAGER_EXTENSION}"),
            )
        })
    }

    /// Reads lines until exit is requested or input ends. Returns the code
    /// of the last dispatched command.
    pub fn run(&mut self, reader: &mut dyn LineReader) -> i32 {
        while !self.exit_requested {
            let prompt = self.extensions.prompt().to_string();
            match reader.read_line(&prompt) {
                Ok(Some(line)) => {
                    self.dispatch_line(&line);
                }
                Ok(None) => break,
                Err(error) => {
                    self.console.error(&format!("Cannot read input: {error}"));
                    self.last_code = code::UNKNOWN_ERROR;
                    break;
                }
            }
        }
        self.last_code
    }

    /// Dispatches one interactive line through the full pipeline,
    /// including event expansion and history recording.
    pub fn dispatch_line(&mut self, line: &str) -> i32 {
        if line.trim().is_empty() {
            return code::OK;
        }

        let line = if expansion::is_event_line(line) {
            match expansion::expand(line, &self.history) {
                Ok(expanded) => {
                    // Echo what the event resolved to before running it
                    self.console.info(&expanded);
                    expanded
                }
                Err(error) => {
                    self.console.error(&error.to_string());
                    self.last_code = code::PARSE_ERROR;
                    return code::PARSE_ERROR;
                }
            }
        } else {
            line.to_string()
        };

        let code = match tokenize(&line) {
            Ok(tokens) => self.dispatch_tokens(Some(&line), tokens, true),
            Err(error) => {
                self.console.error(&error.to_string());
                self.last_code = code::PARSE_ERROR;
                code::PARSE_ERROR
            }
        };

        // Expanded text is what recall sees, never the event marker
        if !self.record_history(&line) {
            return code::UNKNOWN_ERROR;
        }
        code
    }

    /// Dispatches one script line: tokenized and hook-wrapped like an
    /// interactive line, but never expanded or recorded in history.
    pub fn dispatch_script_line(&mut self, line: &str) -> i32 {
        if line.trim().is_empty() {
            return code::OK;
        }
        match tokenize(line) {
            Ok(tokens) => self.dispatch_tokens(Some(line), tokens, true),
            Err(error) => {
                self.console.error(&error.to_string());
                self.last_code = code::PARSE_ERROR;
                code::PARSE_ERROR
            }
        }
    }

    /// Dispatches pre-built argv, as invoked from the command line.
    /// Skips tokenizing, the evaluator, and history.
    pub fn dispatch_args(&mut self, args: &[String]) -> i32 {
        if args.is_empty() {
            return code::OK;
        }
        self.dispatch_tokens(None, args.to_vec(), false)
    }

    fn dispatch_tokens(
        &mut self,
        raw: Option<&str>,
        tokens: Vec<String>,
        allow_evaluator: bool,
    ) -> i32 {
        let code = match self.resolve(tokens) {
            Err(error) => {
                self.console.error(&error.to_string());
                code::PARSE_ERROR
            }
            Ok(Resolution::Command(command, argv)) => self.invoke(command, &argv[1..]),
            Ok(Resolution::Unresolved(tokens)) => {
                self.handle_unresolved(raw, &tokens, allow_evaluator)
            }
        };

        self.sync_console();
        self.last_code = code;
        code
    }

    /// Resolves the first token to a command, splicing user aliases into
    /// argv until a registered name is reached. A name revisited during
    /// splicing is a loop.
    fn resolve(&self, mut tokens: Vec<String>) -> Result<Resolution, ResolveError> {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        loop {
            let first = match tokens.first() {
                Some(first) => first.clone(),
                None => return Ok(Resolution::Unresolved(tokens)),
            };
            if let Some(command) = self.registry.lookup(&first) {
                return Ok(Resolution::Command(command, tokens));
            }
            let Some(expansion) = self.settings.user_alias(&first) else {
                return Ok(Resolution::Unresolved(tokens));
            };
            if !visited.insert(first.clone()) {
                return Err(ResolveError::AliasCycle(first));
            }
            if expansion.is_empty() {
                return Err(ResolveError::EmptyAlias(first));
            }
            let mut next = expansion;
            next.extend(tokens.drain(1..));
            tokens = next;
        }
    }

    fn handle_unresolved(
        &mut self,
        raw: Option<&str>,
        tokens: &[String],
        allow_evaluator: bool,
    ) -> i32 {
        if allow_evaluator {
            if let Some(line) = raw {
                let evaluator = Rc::clone(&self.evaluator);
                if evaluator.claims(line) {
                    return match evaluator.evaluate(self, line) {
                        Ok(rendered) => {
                            if !rendered.is_empty() {
                                self.console.info(&rendered);
                            }
                            code::OK
                        }
                        Err(error) => {
                            self.console.error(&error.to_string());
                            code::UNKNOWN_ERROR
                        }
                    };
                }
            }
        }

        let name = tokens.first().map(String::as_str).unwrap_or_default();
        self.console.error(&format!("Unknown command: {name}"));
        code::UNKNOWN_COMMAND
    }

    /// Runs pre-hooks, the command, then post-hooks. Post-hooks run no
    /// matter how execution went and never change the result.
    fn invoke(&mut self, command: Rc<dyn Command>, args: &[String]) -> i32 {
        let pre = self.pre_hooks.snapshot();
        let reports = HookChain::run_hooks(&pre, self);
        let aborted = self.report_hook_issues(&reports);

        let code = match aborted {
            Some(reason) => {
                self.console.error(&reason);
                code::ABORT
            }
            None => {
                let result = command.execute(self, args);
                self.finish(result)
            }
        };

        let post = self.post_hooks.snapshot();
        let reports = HookChain::run_hooks(&post, self);
        if let Some(reason) = self.report_hook_issues(&reports) {
            self.console
                .warn(&format!("Post-hook abort ignored: {reason}"));
        }

        code
    }

    /// Logs failed hooks and returns the abort reason, if any
    fn report_hook_issues(&mut self, reports: &[HookReport]) -> Option<String> {
        let mut abort = None;
        for report in reports {
            match &report.outcome {
                HookOutcome::Ok => {}
                HookOutcome::Aborted(reason) => abort = Some(reason.clone()),
                HookOutcome::Failed(message) => self
                    .console
                    .warn(&format!("Hook '{}' failed: {}", report.hook, message)),
            }
        }
        abort
    }

    /// Maps a command outcome to its code, printing failures. Unexpected
    /// errors print their cause chain only when tracing is on.
    fn finish(&mut self, outcome: CommandResult) -> i32 {
        match outcome {
            Ok(code) => code,
            Err(error) => {
                let code = error.code();
                match error {
                    CommandError::Failure { message, .. } => self.console.error(&message),
                    CommandError::Unexpected(cause) => {
                        self.console.error(&format!("{cause}"));
                        self.console.trace(&format!("{cause:?}"));
                    }
                }
                code
            }
        }
    }

    /// Appends a line to history. An unwritable history file ends the
    /// session.
    fn record_history(&mut self, line: &str) -> bool {
        match self.history.record(line) {
            Ok(_) => true,
            Err(error) => {
                self.console.error(&error.to_string());
                self.last_code = code::UNKNOWN_ERROR;
                self.exit_requested = true;
                false
            }
        }
    }

    /// Mirrors the persisted verbosity switches onto the console
    fn sync_console(&mut self) {
        self.console
            .set_verbose(self.settings.verbose() || self.verbose_override);
        self.console
            .set_tracing(self.settings.tracing() || self.tracing_override);
    }

    /// Flushes buffered session state before the lock is released
    pub fn close(&mut self) {
        if let Err(error) = self.history.close() {
            self.console.warn(&error.to_string());
        }
    }

    /// A shell over a scratch state directory with a silenced console and
    /// a project manager installed. Returns the guard keeping the
    /// directory alive.
    #[cfg(test)]
    pub fn bare_for_tests() -> (Shell, tempfile::TempDir) {
        use crate::session::{MarkerFilter, TomlProjectManager};

        let dir = tempfile::TempDir::new().unwrap();
        let dirs = MabDirs::rooted_at(dir.path());
        let settings = SettingsStore::load(dirs.settings_file()).unwrap();
        let history = HistoryLog::open(dirs.history_file(), Box::new(MarkerFilter)).unwrap();
        let config = Configuration::empty(&dirs.install);
        let credentials = Credentials::load(dirs.credentials_file()).unwrap();
        let manager = TomlProjectManager::load(dirs.projects_file()).unwrap();

        let mut shell = Shell::new(dirs, config, settings, history, credentials);
        shell.console =
            Console::with_writers(Box::new(std::io::sink()), Box::new(std::io::sink()));
        shell.extensions.install_project_manager(Box::new(manager));
        (shell, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::core::{Hook, HookError};
    use crate::extension::EvalError;

    type Calls = Rc<RefCell<Vec<Vec<String>>>>;

    struct Recorder {
        name: &'static str,
        calls: Calls,
        outcome: fn() -> CommandResult,
    }

    impl Command for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn header(&self) -> &str {
            "test command"
        }

        fn usage(&self, _verbose: bool) -> String {
            self.name.to_string()
        }

        fn execute(&self, _shell: &mut Shell, args: &[String]) -> CommandResult {
            self.calls.borrow_mut().push(args.to_vec());
            (self.outcome)()
        }
    }

    fn install(shell: &mut Shell, name: &'static str, outcome: fn() -> CommandResult) -> Calls {
        let calls: Calls = Rc::default();
        shell
            .registry
            .register(Rc::new(Recorder {
                name,
                calls: Rc::clone(&calls),
                outcome,
            }))
            .unwrap();
        calls
    }

    fn captured_shell() -> (Shell, tempfile::TempDir, SharedBuf, SharedBuf) {
        let (mut shell, dir) = Shell::bare_for_tests();
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        shell.console = Console::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (shell, dir, out, err)
    }

    #[test]
    fn dispatch_runs_command_with_tokenized_args() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        let calls = install(&mut shell, "echo", || Ok(code::OK));

        assert_eq!(shell.dispatch_line("echo one 'two three'"), code::OK);
        assert_eq!(
            *calls.borrow(),
            vec![vec!["one".to_string(), "two three".to_string()]]
        );
    }

    #[test]
    fn unknown_command_reports_and_still_records_history() {
        let (mut shell, _dir, _out, err) = captured_shell();

        assert_eq!(shell.dispatch_line("nonesuch now"), code::UNKNOWN_COMMAND);
        assert!(err.contents().contains("Unknown command: nonesuch"));
        assert_eq!(shell.history.last(), Some("nonesuch now"));
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        install(&mut shell, "echo", || Ok(code::OK));

        assert_eq!(shell.dispatch_line("echo 'oops"), code::PARSE_ERROR);
        assert_eq!(shell.last_code(), code::PARSE_ERROR);
        // Broken lines stay recallable for a ^fix^
        assert_eq!(shell.history.last(), Some("echo 'oops"));
    }

    #[test]
    fn user_alias_splices_argv() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        let calls = install(&mut shell, "echo", || Ok(code::OK));
        shell
            .settings
            .add_user_alias("gs", &["echo".to_string(), "status".to_string()])
            .unwrap();

        assert_eq!(shell.dispatch_line("gs now"), code::OK);
        assert_eq!(
            *calls.borrow(),
            vec![vec!["status".to_string(), "now".to_string()]]
        );
    }

    #[test]
    fn alias_loop_is_a_parse_error() {
        let (mut shell, _dir, _out, err) = captured_shell();
        shell
            .settings
            .add_user_alias("a", &["b".to_string()])
            .unwrap();
        shell
            .settings
            .add_user_alias("b", &["a".to_string()])
            .unwrap();

        assert_eq!(shell.dispatch_line("a"), code::PARSE_ERROR);
        assert!(err.contents().contains("Alias loop"));
    }

    #[test]
    fn registered_name_wins_over_user_alias() {
        let (mut shell, _dir) = Shell::bare_for_tests();
        let echo = install(&mut shell, "echo", || Ok(code::OK));
        let other = install(&mut shell, "other", || Ok(code::OK));
        shell
            .settings
            .add_user_alias("echo", &["other".to_string()])
            .unwrap();

        shell.dispatch_line("echo hi");
        assert_eq!(echo.borrow().len(), 1);
        assert!(other.borrow().is_empty());
    }

    #[test]
    fn failure_prints_message_and_keeps_its_code() {
        let (mut shell, _dir, _out, err) = captured_shell();
        install(&mut shell, "bad", || {
            Err(CommandError::failure(
                code::INVALID_OPTION_VALUE,
                "bad value",
            ))
        });

        assert_eq!(shell.dispatch_line("bad"), code::INVALID_OPTION_VALUE);
        assert!(err.contents().contains("Error: bad value"));
    }

    #[test]
    fn unexpected_error_prints_chain_only_when_tracing() {
        let (mut shell, _dir, _out, err) = captured_shell();
        install(&mut shell, "boom", || {
            Err(anyhow::anyhow!("io trouble")
                .context("command blew up")
                .into())
        });

        assert_eq!(shell.dispatch_line("boom"), code::UNKNOWN_ERROR);
        let quiet = err.contents();
        assert!(quiet.contains("command blew up"));
        assert!(!quiet.contains("[trace]"));

        shell.console.set_tracing(true);
        shell.dispatch_line("boom");
        assert!(err.contents().contains("[trace]"));
    }

    #[test]
    fn verbosity_override_survives_dispatches() {
        let (mut shell, _dir, out, _err) = captured_shell();
        install(&mut shell, "noop", || Ok(code::OK));
        shell.override_verbosity(true, false);

        shell.dispatch_line("noop");
        shell.console.verbose("still chatty");
        assert!(out.contents().contains("still chatty"));
    }

    #[test]
    fn pre_hook_abort_skips_execution() {
        struct Veto;
        impl Hook for Veto {
            fn name(&self) -> &str {
                "veto"
            }
            fn rank(&self) -> i32 {
                0
            }
            fn run(&self, _shell: &mut Shell) -> Result<(), HookError> {
                Err(HookError::Abort("not today".to_string()))
            }
        }

        let (mut shell, _dir, _out, err) = captured_shell();
        let calls = install(&mut shell, "echo", || Ok(code::OK));
        shell.pre_hooks.register(Rc::new(Veto));

        assert_eq!(shell.dispatch_line("echo hi"), code::ABORT);
        assert!(calls.borrow().is_empty());
        assert!(err.contents().contains("not today"));
    }

    #[test]
    fn post_hooks_run_after_a_failing_command() {
        struct Tally(Rc<RefCell<u32>>);
        impl Hook for Tally {
            fn name(&self) -> &str {
                "tally"
            }
            fn rank(&self) -> i32 {
                0
            }
            fn run(&self, _shell: &mut Shell) -> Result<(), HookError> {
                *self.0.borrow_mut() += 1;
                Ok(())
            }
        }

        let (mut shell, _dir) = Shell::bare_for_tests();
        install(&mut shell, "bad", || {
            Err(CommandError::failure(code::PROCESS_ERROR, "nope"))
        });
        let count = Rc::new(RefCell::new(0));
        shell.post_hooks.register(Rc::new(Tally(Rc::clone(&count))));

        assert_eq!(shell.dispatch_line("bad"), code::PROCESS_ERROR);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn bang_bang_replays_and_records_the_expanded_line() {
        let (mut shell, _dir, out, _err) = captured_shell();
        let calls = install(&mut shell, "echo", || Ok(code::OK));

        shell.dispatch_line("echo one");
        assert_eq!(shell.dispatch_line("!!"), code::OK);

        assert_eq!(calls.borrow().len(), 2);
        assert!(out.contents().contains("echo one"));
        assert_eq!(
            shell.history.entries(),
            ["echo one".to_string(), "echo one".to_string()]
        );
    }

    #[test]
    fn failed_event_expansion_records_nothing() {
        let (mut shell, _dir, _out, err) = captured_shell();

        assert_eq!(shell.dispatch_line("!99"), code::PARSE_ERROR);
        assert!(err.contents().contains("Event not found"));
        assert!(shell.history.is_empty());
    }

    #[test]
    fn evaluator_claims_unresolved_lines() {
        struct Arith;
        impl ExpressionEvaluator for Arith {
            fn name(&self) -> &str {
                "arith"
            }
            fn claims(&self, line: &str) -> bool {
                line.starts_with('=')
            }
            fn evaluate(&self, _shell: &mut Shell, line: &str) -> Result<String, EvalError> {
                Ok(format!("evaluated {line}"))
            }
        }

        let (mut shell, _dir, out, _err) = captured_shell();
        shell.evaluator = Rc::new(Arith);

        assert_eq!(shell.dispatch_line("= 1 + 2"), code::OK);
        assert!(out.contents().contains("evaluated = 1 + 2"));
    }

    #[test]
    fn batch_dispatch_skips_tokenizer_and_evaluator() {
        struct Greedy;
        impl ExpressionEvaluator for Greedy {
            fn name(&self) -> &str {
                "greedy"
            }
            fn claims(&self, _line: &str) -> bool {
                true
            }
            fn evaluate(&self, _shell: &mut Shell, _line: &str) -> Result<String, EvalError> {
                Ok("claimed".to_string())
            }
        }

        let (mut shell, _dir) = Shell::bare_for_tests();
        shell.evaluator = Rc::new(Greedy);
        let calls = install(&mut shell, "echo", || Ok(code::OK));

        let args = vec!["echo".to_string(), "a b".to_string()];
        assert_eq!(shell.dispatch_args(&args), code::OK);
        // Embedded space survives: argv is taken as-is
        assert_eq!(*calls.borrow(), vec![vec!["a b".to_string()]]);

        let unknown = vec!["nonesuch".to_string()];
        assert_eq!(shell.dispatch_args(&unknown), code::UNKNOWN_COMMAND);
        assert!(shell.history.is_empty());
    }

    #[test]
    fn run_loop_stops_when_exit_is_requested() {
        struct Leave;
        impl Command for Leave {
            fn name(&self) -> &str {
                "leave"
            }
            fn header(&self) -> &str {
                "leave"
            }
            fn usage(&self, _verbose: bool) -> String {
                "leave".to_string()
            }
            fn execute(&self, shell: &mut Shell, _args: &[String]) -> CommandResult {
                shell.request_exit();
                Ok(code::OK)
            }
        }

        let (mut shell, _dir) = Shell::bare_for_tests();
        let calls = install(&mut shell, "echo", || Ok(code::OK));
        shell.registry.register(Rc::new(Leave)).unwrap();

        let mut reader = ScriptedReader::new(&["echo hi", "leave", "echo never"]);
        assert_eq!(shell.run(&mut reader), code::OK);
        assert_eq!(calls.borrow().len(), 1);
        assert!(shell.exit_requested());
    }

    #[test]
    fn run_returns_last_code_at_end_of_input() {
        let (mut shell, _dir, _out, _err) = captured_shell();

        let mut reader = ScriptedReader::new(&["nonesuch"]);
        assert_eq!(shell.run(&mut reader), code::UNKNOWN_COMMAND);
    }
}
