//! Hook chain
//!
//! An ordered extension point invoked around command execution. Hooks run
//! in ascending rank order, ties in registration order. The chain captures
//! per-hook outcomes instead of propagating failures: the shell decides
//! the abort-vs-continue policy from the reports.

use std::rc::Rc;

use thiserror::Error;

use crate::shell::Shell;

#[derive(Debug, Error)]
pub enum HookError {
    /// Veto: the shell must not execute the pending command
    #[error("{0}")]
    Abort(String),

    /// Captured and logged; the chain continues
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// A ranked callback run around command execution
pub trait Hook {
    fn name(&self) -> &str;

    /// Lower ranks run first
    fn rank(&self) -> i32;

    fn run(&self, shell: &mut Shell) -> Result<(), HookError>;
}

/// Outcome of one hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Ok,
    Aborted(String),
    Failed(String),
}

/// Per-hook result returned by [`HookChain::run_all`]
#[derive(Debug, Clone)]
pub struct HookReport {
    pub hook: String,
    pub outcome: HookOutcome,
}

impl HookReport {
    pub fn aborted(&self) -> Option<&str> {
        match &self.outcome {
            HookOutcome::Aborted(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Hooks sorted by ascending rank, stable on registration order
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Rc<dyn Hook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Rc<dyn Hook>) {
        let at = self
            .hooks
            .partition_point(|existing| existing.rank() <= hook.rank());
        self.hooks.insert(at, hook);
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Clones the current order. The shell snapshots before running so
    /// hooks may mutate it, including the chain they came from.
    pub fn snapshot(&self) -> Vec<Rc<dyn Hook>> {
        self.hooks.to_vec()
    }

    pub fn run_all(&self, shell: &mut Shell) -> Vec<HookReport> {
        Self::run_hooks(&self.snapshot(), shell)
    }

    /// Runs every hook in order, collecting per-hook outcomes.
    /// An abort stops the chain; any other failure is recorded and the
    /// chain continues.
    pub fn run_hooks(hooks: &[Rc<dyn Hook>], shell: &mut Shell) -> Vec<HookReport> {
        let mut reports = Vec::with_capacity(hooks.len());

        for hook in hooks {
            let outcome = match hook.run(shell) {
                Ok(()) => HookOutcome::Ok,
                Err(HookError::Abort(reason)) => {
                    reports.push(HookReport {
                        hook: hook.name().to_string(),
                        outcome: HookOutcome::Aborted(reason),
                    });
                    break;
                }
                Err(HookError::Failed(e)) => HookOutcome::Failed(format!("{e:#}")),
            };
            reports.push(HookReport {
                hook: hook.name().to_string(),
                outcome,
            });
        }
        reports
    }
}
