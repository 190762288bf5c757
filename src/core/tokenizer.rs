//! Input line tokenizer
//!
//! Splits a raw line into an argument vector. Double quotes group words and
//! honor backslash escapes, single quotes group literally, and an unquoted
//! backslash escapes the next character. Malformed quoting never reaches
//! the registry; it surfaces as a parse error.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("Trailing escape character")]
    TrailingEscape,
}

/// Splits `line` into tokens
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string is still a token
    let mut started = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            '\'' => {
                started = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(ParseError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                started = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped @ ('"' | '\\')) => current.push(escaped),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(ParseError::UnterminatedQuote('"')),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(ParseError::UnterminatedQuote('"')),
                    }
                }
            }
            '\\' => {
                started = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err(ParseError::TrailingEscape),
                }
            }
            _ => {
                started = true;
                current.push(c);
            }
        }
    }

    if started {
        tokens.push(current);
    }
    Ok(tokens)
}
