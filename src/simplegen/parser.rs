//! REST example transcript parsing
//!
//! A transcript captures one or more request/response exchanges in plain
//! text:
//!
//! ```text
//! # name: createUser
//! POST https://api.example.com/users
//! Content-Type: application/json
//!
//! {"name": "bob"}
//!
//! RESPONSE 201
//! Content-Type: application/json
//!
//! {"id": 7, "name": "bob"}
//! ```
//!
//! A line holding only `===` separates exchanges. `#` comments are
//! allowed outside body regions; a `# name:` comment before the request
//! line names the operation, otherwise the file stem is used.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::extension::{
    guess_content_kind, ExampleParseError, ExampleParser, RestExampleModel,
};

const BLOCK_SEPARATOR: &str = "===";
const RESPONSE_MARKER: &str = "RESPONSE";

/// Parses transcript files into exchange models
pub struct TranscriptParser;

impl ExampleParser for TranscriptParser {
    fn parse(&self, source: &Path) -> Result<Vec<RestExampleModel>, ExampleParseError> {
        if !source.is_file() {
            return Err(ExampleParseError::Missing(source.display().to_string()));
        }
        let text = fs::read_to_string(source)?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("example")
            .to_string();

        let mut models = Vec::new();
        for (index, block) in split_blocks(&text).into_iter().enumerate() {
            let fallback = if index == 0 {
                stem.clone()
            } else {
                format!("{stem}_{index}")
            };
            let model = parse_block(&block, fallback).map_err(|message| {
                ExampleParseError::Malformed(format!("{}: {message}", source.display()))
            })?;
            models.push(model);
        }

        if models.is_empty() {
            return Err(ExampleParseError::Malformed(format!(
                "{} holds no examples",
                source.display()
            )));
        }
        Ok(models)
    }
}

/// Splits on `===` lines, dropping blocks with no content lines
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim() == BLOCK_SEPARATOR {
            push_block(&mut blocks, std::mem::take(&mut current));
        } else {
            current.push(line);
        }
    }
    push_block(&mut blocks, current);
    blocks
}

fn push_block<'a>(blocks: &mut Vec<Vec<&'a str>>, block: Vec<&'a str>) {
    let has_content = block.iter().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    });
    if has_content {
        blocks.push(block);
    }
}

fn parse_block(lines: &[&str], fallback_name: String) -> Result<RestExampleModel, String> {
    let mut name = fallback_name;
    let mut i = 0;

    // Leading comments and the name directive, then `METHOD URL`
    let (method, url) = loop {
        let Some(line) = lines.get(i) else {
            return Err("missing request line".to_string());
        };
        let trimmed = line.trim();
        i += 1;
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            if let Some(directive) = comment.trim().strip_prefix("name:") {
                let directive = directive.trim();
                if !directive.is_empty() {
                    name = directive.to_string();
                }
            }
            continue;
        }
        let Some((method, url)) = trimmed.split_once(char::is_whitespace) else {
            return Err(format!("expected 'METHOD URL', got '{trimmed}'"));
        };
        let url = url.trim();
        if !method.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!("'{method}' is not an HTTP method"));
        }
        if url.is_empty() {
            return Err("request line has no URL".to_string());
        }
        break (method.to_string(), url.to_string());
    };

    let mut response_line = None;
    let request_headers = parse_headers(lines, &mut i, &mut response_line)?;

    // Body runs to the response marker
    let mut request_body_lines: Vec<&str> = Vec::new();
    if response_line.is_none() {
        while let Some(line) = lines.get(i) {
            i += 1;
            let trimmed = line.trim();
            if is_response_line(trimmed) {
                response_line = Some(trimmed.to_string());
                break;
            }
            request_body_lines.push(line);
        }
    }

    let Some(response_line) = response_line else {
        return Err("missing RESPONSE section".to_string());
    };
    let response_code = parse_status(&response_line)?;

    let mut ignored = None;
    let response_headers = parse_headers(lines, &mut i, &mut ignored)?;
    let response_body_lines: Vec<&str> = lines[i.min(lines.len())..].to_vec();

    let request_body = body_text(&request_body_lines);
    let response_body = body_text(&response_body_lines);
    let request_content = guess_content_kind(
        header_value(&request_headers, "content-type"),
        request_body.as_deref().unwrap_or(""),
    );
    let response_content = guess_content_kind(
        header_value(&response_headers, "content-type"),
        response_body.as_deref().unwrap_or(""),
    );

    Ok(RestExampleModel {
        name,
        method,
        url,
        request_headers,
        request_content,
        request_body,
        response_code,
        response_headers,
        response_content,
        response_body,
    })
}

/// Reads `Key: Value` lines until a blank line. A response marker ends
/// the section early and is handed back through `marker`.
fn parse_headers(
    lines: &[&str],
    i: &mut usize,
    marker: &mut Option<String>,
) -> Result<BTreeMap<String, String>, String> {
    let mut headers = BTreeMap::new();
    while let Some(line) = lines.get(*i) {
        let trimmed = line.trim();
        *i += 1;
        if trimmed.is_empty() {
            break;
        }
        if is_response_line(trimmed) {
            *marker = Some(trimmed.to_string());
            break;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(format!("bad header line '{trimmed}'"));
        };
        headers.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(headers)
}

fn is_response_line(line: &str) -> bool {
    line == RESPONSE_MARKER || line.starts_with("RESPONSE ")
}

fn parse_status(line: &str) -> Result<u16, String> {
    let rest = line.strip_prefix(RESPONSE_MARKER).unwrap_or("").trim();
    rest.parse::<u16>()
        .map_err(|_| format!("bad response status '{rest}'"))
}

fn body_text(lines: &[&str]) -> Option<String> {
    let text = lines.join("\n");
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn header_value<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
