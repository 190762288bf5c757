//! Command history
//!
//! Recorded lines are kept in memory for expansion designators and
//! appended to `~/.mab/history`, one line per entry. A line filter
//! injected at construction decides which lines are ever recorded;
//! the default filter drops expansion markers so only resolved
//! commands reach the file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// History storage failure. Treated as fatal by the session loop.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History file {} is unusable: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Decides which lines stay out of the history
pub trait LineFilter {
    fn excludes(&self, line: &str) -> bool;
}

/// Default filter: expansion markers and blank lines are not history
pub struct MarkerFilter;

impl LineFilter for MarkerFilter {
    fn excludes(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed.is_empty() || trimmed.starts_with('!') || trimmed.starts_with('^')
    }
}

/// Session command history backed by a plain text file
pub struct HistoryLog {
    path: PathBuf,
    entries: Vec<String>,
    filter: Box<dyn LineFilter>,
    writer: Option<BufWriter<File>>,
}

impl HistoryLog {
    /// Opens the history at `path`, loading prior entries. Lines the
    /// filter excludes are dropped on load as well.
    pub fn open(
        path: impl Into<PathBuf>,
        filter: Box<dyn LineFilter>,
    ) -> Result<Self, HistoryError> {
        let path = path.into();
        let mut entries = Vec::new();

        if path.exists() {
            let file = File::open(&path).map_err(|source| HistoryError::Persistence {
                path: path.clone(),
                source,
            })?;
            let reader = BufReader::new(file);
            for line in reader.lines() {
                let line = line.map_err(|source| HistoryError::Persistence {
                    path: path.clone(),
                    source,
                })?;
                if !filter.excludes(&line) {
                    entries.push(line);
                }
            }
        }

        Ok(Self {
            path,
            entries,
            filter,
            writer: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recorded lines, oldest first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by one-based position, as listed by the history command
    pub fn get(&self, position: usize) -> Option<&str> {
        if position == 0 {
            return None;
        }
        self.entries.get(position - 1).map(String::as_str)
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Entry counting back from the end, one-based
    pub fn from_end(&self, back: usize) -> Option<&str> {
        if back == 0 || back > self.entries.len() {
            return None;
        }
        self.entries
            .get(self.entries.len() - back)
            .map(String::as_str)
    }

    /// Most recent entry starting with `prefix`
    pub fn last_with_prefix(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.starts_with(prefix))
            .map(String::as_str)
    }

    /// Records a line in memory and on disk. Returns false when the
    /// filter rejected it.
    pub fn record(&mut self, line: &str) -> Result<bool, HistoryError> {
        if self.filter.excludes(line) {
            return Ok(false);
        }

        let writer = self.appender()?;
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|source| HistoryError::Persistence {
                path: self.path.clone(),
                source,
            })?;

        self.entries.push(line.to_string());
        Ok(true)
    }

    /// Deletes the history file and starts over empty
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        // Release the appender and its lock before touching the file
        self.writer = None;

        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| HistoryError::Persistence {
                path: self.path.clone(),
                source,
            })?;
        }
        File::create(&self.path).map_err(|source| HistoryError::Persistence {
            path: self.path.clone(),
            source,
        })?;

        self.entries.clear();
        Ok(())
    }

    /// Flushes and releases the underlying file
    pub fn close(&mut self) -> Result<(), HistoryError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|source| HistoryError::Persistence {
                path: self.path.clone(),
                source,
            })?;
        }
        self.writer = None;
        Ok(())
    }

    fn appender(&mut self) -> Result<&mut BufWriter<File>, HistoryError> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).map_err(|source| HistoryError::Persistence {
                    path: self.path.clone(),
                    source,
                })?;
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|source| HistoryError::Persistence {
                    path: self.path.clone(),
                    source,
                })?;
            file.lock_exclusive()
                .map_err(|source| HistoryError::Persistence {
                    path: self.path.clone(),
                    source,
                })?;
            self.writer = Some(BufWriter::new(file));
        }

        match self.writer.as_mut() {
            Some(writer) => Ok(writer),
            None => unreachable!("appender was installed above"),
        }
    }
}
