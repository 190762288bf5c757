//! Language pack generation ports
//!
//! The simple generator turns REST example transcripts into mobile API
//! assets. Parsing and code generation sit behind these ports; the
//! shell only owns the orchestration. The example model mirrors what a
//! transcript captures: one named request/response exchange.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Platforms the generator can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Js,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Ios, Platform::Android, Platform::Js];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Js => "js",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            "js" => Ok(Platform::Js),
            other => Err(format!(
                "unsupported platform '{}', choose from [ios|android|js]",
                other
            )),
        }
    }
}

/// How the generator treats JSON properties with empty values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPropertyPolicy {
    #[default]
    Abort,
    Ignore,
    DefaultType,
}

impl EmptyPropertyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyPropertyPolicy::Abort => "abort",
            EmptyPropertyPolicy::Ignore => "ignore",
            EmptyPropertyPolicy::DefaultType => "default-type",
        }
    }
}

impl fmt::Display for EmptyPropertyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmptyPropertyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(EmptyPropertyPolicy::Abort),
            "ignore" => Ok(EmptyPropertyPolicy::Ignore),
            "default-type" => Ok(EmptyPropertyPolicy::DefaultType),
            other => Err(format!(
                "policy must be one of [abort|ignore|default-type], got '{}'",
                other
            )),
        }
    }
}

/// Body encodings the generator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Json,
    Form,
    Text,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::Json => "json",
            ContentKind::Form => "form",
            ContentKind::Text => "text",
        };
        f.write_str(label)
    }
}

/// Decides the content kind from a Content-Type header, falling back to
/// sniffing the body when the header is absent. `None` means no content
/// at all.
pub fn guess_content_kind(header: Option<&str>, body: &str) -> Option<ContentKind> {
    match header.map(str::trim).filter(|h| !h.is_empty()) {
        Some(header) => {
            if header.contains("json") {
                Some(ContentKind::Json)
            } else if header.contains("form") {
                Some(ContentKind::Form)
            } else {
                // Anything else, including non-text types, is treated as text
                Some(ContentKind::Text)
            }
        }
        None => {
            let body = body.trim();
            if body.is_empty() {
                return None;
            }
            if body.starts_with('{') || body.starts_with('[') {
                Some(ContentKind::Json)
            } else if body.contains('=') && !body.contains(char::is_whitespace) {
                Some(ContentKind::Form)
            } else {
                Some(ContentKind::Text)
            }
        }
    }
}

/// One parsed request/response exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestExampleModel {
    /// Operation name, used for the generated method
    pub name: String,
    pub method: String,
    pub url: String,
    pub request_headers: BTreeMap<String, String>,
    pub request_content: Option<ContentKind>,
    pub request_body: Option<String>,
    pub response_code: u16,
    pub response_headers: BTreeMap<String, String>,
    pub response_content: Option<ContentKind>,
    pub response_body: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExampleParseError {
    #[error("Parsing error: {0}")]
    Malformed(String),

    #[error("Parsing error: cannot find resource {0}")]
    Missing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Turns an example source into exchange models
pub trait ExampleParser {
    fn parse(&self, source: &Path) -> Result<Vec<RestExampleModel>, ExampleParseError>;
}

#[derive(Debug, Error)]
pub enum LangPackError {
    #[error("{0}")]
    Generation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accumulates exchange models and emits per-platform assets
pub trait LangPackGenerator {
    /// Adds one exchange to the pack
    fn add(&mut self, model: RestExampleModel);

    /// Number of exchanges added so far
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the assets for one platform under `out_dir`
    fn generate(&self, platform: Platform, out_dir: &Path) -> Result<(), LangPackError>;
}
