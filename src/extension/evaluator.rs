//! Expression evaluator port
//!
//! When the first token of a line resolves to no command, the shell
//! offers the whole line to the evaluator before giving up. An installed
//! evaluator can claim and compute expressions; the default claims
//! nothing, so unresolved lines fail as unknown commands.

use thiserror::Error;

use crate::shell::Shell;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{0}")]
    Evaluation(String),
}

/// Last-chance handler for lines that resolve to no command
pub trait ExpressionEvaluator {
    fn name(&self) -> &str;

    /// Whether this evaluator wants the line
    fn claims(&self, line: &str) -> bool;

    /// Evaluates a claimed line, returning the text to print
    fn evaluate(&self, shell: &mut Shell, line: &str) -> Result<String, EvalError>;
}

/// Default evaluator: claims nothing
pub struct NullEvaluator;

impl ExpressionEvaluator for NullEvaluator {
    fn name(&self) -> &str {
        "null"
    }

    fn claims(&self, _line: &str) -> bool {
        false
    }

    fn evaluate(&self, _shell: &mut Shell, line: &str) -> Result<String, EvalError> {
        Err(EvalError::Evaluation(format!(
            "No evaluator installed for: {}",
            line
        )))
    }
}
