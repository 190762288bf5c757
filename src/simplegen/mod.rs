//! # Simple Generator
//!
//! Turns REST example transcripts into per-platform SDK descriptors,
//! driven by the `mab-simple-gen` binary. Parsing and emission sit
//! behind the [`ExampleParser`] and [`LangPackGenerator`] ports from
//! [`crate::extension`]; this module ships a transcript parser and a
//! JSON descriptor emitter as the default pair and orchestrates a run:
//!
//! 1. collect example files from `-e` (file, or every file in a
//!    directory)
//! 2. with `-f`, delete the output directory from a previous run
//! 3. parse every example into the generator
//! 4. generate once per platform, into `out` for a single platform or
//!    `out/<platform>` for several
//!
//! Remote example locations are refused; examples must be local files.

mod emit;
mod parser;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::extension::{ExampleParseError, ExampleParser, LangPackError, LangPackGenerator, Platform};
use crate::shell::Console;

pub use emit::DescriptorGenerator;
pub use parser::TranscriptParser;

pub const TOOL_NAME: &str = "mab-simple-gen";
pub const DEFAULT_OUT_DIR: &str = "mobile";
pub const DEFAULT_CONTROLLER_CLASS: &str = "RestController";
pub const DEFAULT_PACKAGE: &str = "com.magnet";

/// One generator run, as resolved from the command line
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Target platforms; empty means all of them
    pub platforms: Vec<Platform>,
    /// Example location, a file or a directory
    pub examples: String,
    pub out_dir: PathBuf,
    /// Delete `out_dir` before generating
    pub force: bool,
}

#[derive(Debug, Error)]
pub enum SimpleGenError {
    #[error("-e|--examples option is mandatory")]
    ExamplesRequired,
    #[error("Remote examples are not supported: {0}")]
    RemoteExamples(String),
    #[error("{0}")]
    InvalidOption(String),
    #[error(transparent)]
    Parse(#[from] ExampleParseError),
    #[error(transparent)]
    Generate(#[from] LangPackError),
    #[error("Cannot clean {}: {source}", .dir.display())]
    Cleanup { dir: PathBuf, source: io::Error },
    #[error("Cannot create {}: {source}", .dir.display())]
    CreateDir { dir: PathBuf, source: io::Error },
}

/// Runs the generator end to end. Examples are collected before any
/// cleanup so a bad `-e` never wipes the output directory.
pub fn generate(
    request: &GenerateRequest,
    parser: &dyn ExampleParser,
    generator: &mut dyn LangPackGenerator,
    console: &mut Console,
) -> Result<(), SimpleGenError> {
    let sources = collect_sources(&request.examples)?;
    let platforms: &[Platform] = if request.platforms.is_empty() {
        &Platform::ALL
    } else {
        &request.platforms
    };

    if request.force && request.out_dir.exists() {
        console.info(&format!("Cleanup directory {}", request.out_dir.display()));
        fs::remove_dir_all(&request.out_dir).map_err(|source| SimpleGenError::Cleanup {
            dir: request.out_dir.clone(),
            source,
        })?;
    }

    for source in &sources {
        console.verbose(&format!("Parsing example {}", source.display()));
        for model in parser.parse(source)? {
            generator.add(model);
        }
    }

    for platform in platforms {
        let dir = platform_dir(&request.out_dir, platforms.len(), *platform);
        fs::create_dir_all(&dir).map_err(|source| SimpleGenError::CreateDir {
            dir: dir.clone(),
            source,
        })?;
        console.info(&format!(
            "Generating assets for {platform} under {}",
            dir.display()
        ));
        generator.generate(*platform, &dir)?;
    }

    console.bold_green(&format!(
        "Success! The mobile API is generated under {}",
        request.out_dir.display()
    ));
    Ok(())
}

/// A file stands alone; a directory contributes every non-hidden file
fn collect_sources(examples: &str) -> Result<Vec<PathBuf>, SimpleGenError> {
    if examples.contains("://") {
        return Err(SimpleGenError::RemoteExamples(examples.to_string()));
    }
    let path = Path::new(examples);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if path.is_dir() {
        let mut sources = Vec::new();
        for entry in fs::read_dir(path).map_err(ExampleParseError::from)? {
            let entry = entry.map_err(ExampleParseError::from)?;
            let hidden = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'));
            let entry_path = entry.path();
            if entry_path.is_file() && !hidden {
                sources.push(entry_path);
            }
        }
        sources.sort();
        if sources.is_empty() {
            return Err(ExampleParseError::Missing(examples.to_string()).into());
        }
        return Ok(sources);
    }
    Err(ExampleParseError::Missing(examples.to_string()).into())
}

fn platform_dir(out: &Path, platform_count: usize, platform: Platform) -> PathBuf {
    if platform_count == 1 {
        out.to_path_buf()
    } else {
        out.join(platform.as_str())
    }
}
