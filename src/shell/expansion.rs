//! History event expansion
//!
//! Lines starting with `!` or `^` refer back to recorded history:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `!!` | the previous line |
//! | `!n` | line `n` as numbered by `history` |
//! | `!-n` | the line `n` back from the end |
//! | `!text` | the most recent line starting with `text` |
//! | `^old^new` | the previous line with the first `old` replaced |
//!
//! A `!` form may carry trailing arguments, appended to the recalled
//! line. The expanded text is what the shell echoes, runs, and records;
//! the marker itself never reaches history.

use thiserror::Error;

use crate::session::HistoryLog;

#[derive(Debug, Error, PartialEq)]
pub enum ExpansionError {
    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("No history to expand")]
    Empty,

    #[error("Bad event designator: {0}")]
    Malformed(String),

    #[error("Substitution '{0}' does not match the previous line")]
    NoMatch(String),
}

/// Whether a line is a history event that needs expanding
pub fn is_event_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('!') || trimmed.starts_with('^')
}

/// Expands history designators; lines without one pass through
/// untouched.
pub fn expand(line: &str, history: &HistoryLog) -> Result<String, ExpansionError> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix('!') {
        return expand_event(rest, history);
    }
    if let Some(rest) = trimmed.strip_prefix('^') {
        return substitute(rest, history);
    }
    Ok(line.to_string())
}

fn expand_event(rest: &str, history: &HistoryLog) -> Result<String, ExpansionError> {
    let (designator, tail) = match rest.split_once(char::is_whitespace) {
        Some((designator, tail)) => (designator, Some(tail.trim_start())),
        None => (rest, None),
    };

    if designator.is_empty() {
        return Err(ExpansionError::Malformed("!".to_string()));
    }

    let recalled = if designator == "!" {
        history.last().ok_or(ExpansionError::Empty)?
    } else if let Some(back) = designator.strip_prefix('-') {
        let back: usize = back
            .parse()
            .map_err(|_| ExpansionError::Malformed(format!("!{}", designator)))?;
        history
            .from_end(back)
            .ok_or_else(|| ExpansionError::NotFound(format!("!{}", designator)))?
    } else if designator.chars().all(|c| c.is_ascii_digit()) {
        let position: usize = designator
            .parse()
            .map_err(|_| ExpansionError::Malformed(format!("!{}", designator)))?;
        history
            .get(position)
            .ok_or_else(|| ExpansionError::NotFound(format!("!{}", designator)))?
    } else {
        history
            .last_with_prefix(designator)
            .ok_or_else(|| ExpansionError::NotFound(format!("!{}", designator)))?
    };

    Ok(match tail {
        Some(tail) if !tail.is_empty() => format!("{} {}", recalled, tail),
        _ => recalled.to_string(),
    })
}

fn substitute(rest: &str, history: &HistoryLog) -> Result<String, ExpansionError> {
    let Some((old, new)) = rest.split_once('^') else {
        return Err(ExpansionError::Malformed(format!("^{}", rest)));
    };
    if old.is_empty() {
        return Err(ExpansionError::Malformed(format!("^{}", rest)));
    }
    let new = new.strip_suffix('^').unwrap_or(new);

    let last = history.last().ok_or(ExpansionError::Empty)?;
    if !last.contains(old) {
        return Err(ExpansionError::NoMatch(old.to_string()));
    }
    Ok(last.replacen(old, new, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MarkerFilter;
    use tempfile::TempDir;

    fn history_with(lines: &[&str]) -> (HistoryLog, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut history =
            HistoryLog::open(dir.path().join("history"), Box::new(MarkerFilter)).unwrap();
        for line in lines {
            history.record(line).unwrap();
        }
        (history, dir)
    }

    #[test]
    fn plain_lines_pass_through() {
        let (history, _dir) = history_with(&[]);
        assert_eq!(expand("help", &history).unwrap(), "help");
        assert!(!is_event_line("help"));
        assert!(is_event_line("!!"));
        assert!(is_event_line("  ^a^b"));
    }

    #[test]
    fn bang_bang_recalls_the_last_line() {
        let (history, _dir) = history_with(&["help", "set verbose true"]);
        assert_eq!(expand("!!", &history).unwrap(), "set verbose true");
    }

    #[test]
    fn bang_bang_on_empty_history_fails() {
        let (history, _dir) = history_with(&[]);
        assert_eq!(expand("!!", &history), Err(ExpansionError::Empty));
    }

    #[test]
    fn numbered_events_are_one_based() {
        let (history, _dir) = history_with(&["alpha", "beta", "gamma"]);
        assert_eq!(expand("!1", &history).unwrap(), "alpha");
        assert_eq!(expand("!3", &history).unwrap(), "gamma");
        assert_eq!(
            expand("!7", &history),
            Err(ExpansionError::NotFound("!7".to_string()))
        );
    }

    #[test]
    fn negative_events_count_from_the_end() {
        let (history, _dir) = history_with(&["alpha", "beta", "gamma"]);
        assert_eq!(expand("!-1", &history).unwrap(), "gamma");
        assert_eq!(expand("!-3", &history).unwrap(), "alpha");
        assert_eq!(
            expand("!-4", &history),
            Err(ExpansionError::NotFound("!-4".to_string()))
        );
    }

    #[test]
    fn prefix_events_find_the_most_recent_match() {
        let (history, _dir) = history_with(&["set editor vi", "help", "set editor emacs"]);
        assert_eq!(expand("!set", &history).unwrap(), "set editor emacs");
        assert_eq!(
            expand("!validate", &history),
            Err(ExpansionError::NotFound("!validate".to_string()))
        );
    }

    #[test]
    fn trailing_arguments_are_appended() {
        let (history, _dir) = history_with(&["validate"]);
        assert_eq!(
            expand("!! --target workspace", &history).unwrap(),
            "validate --target workspace"
        );
        assert_eq!(
            expand("!1 --target workspace", &history).unwrap(),
            "validate --target workspace"
        );
    }

    #[test]
    fn caret_substitutes_first_occurrence() {
        let (history, _dir) = history_with(&["set editor vi"]);
        assert_eq!(expand("^vi^emacs", &history).unwrap(), "set editor emacs");
        assert_eq!(expand("^vi^emacs^", &history).unwrap(), "set editor emacs");
    }

    #[test]
    fn caret_deletion_with_empty_replacement() {
        let (history, _dir) = history_with(&["help verbose"]);
        assert_eq!(expand("^ verbose^", &history).unwrap(), "help");
    }

    #[test]
    fn caret_without_match_fails() {
        let (history, _dir) = history_with(&["help"]);
        assert_eq!(
            expand("^quit^exit", &history),
            Err(ExpansionError::NoMatch("quit".to_string()))
        );
    }

    #[test]
    fn malformed_designators_are_rejected() {
        let (history, _dir) = history_with(&["help"]);
        assert_eq!(
            expand("!", &history),
            Err(ExpansionError::Malformed("!".to_string()))
        );
        assert_eq!(
            expand("^help", &history),
            Err(ExpansionError::Malformed("^help".to_string()))
        );
    }
}
