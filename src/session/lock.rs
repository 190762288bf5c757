//! Session lock
//!
//! One interactive session per state directory. The advisory lock is
//! what keeps a second session out; the pid written into the file is
//! only there for whoever inspects a stale lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

pub const LOCK_FILE_NAME: &str = "mab.lock";

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Another mab session is already running{}", holder_suffix(.holder))]
    Held { path: PathBuf, holder: Option<u32> },

    #[error("Failed to create session lock {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn holder_suffix(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!(" (pid {})", pid),
        None => String::new(),
    }
}

/// Exclusive lock on the state directory, released on drop
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
}

impl SessionLock {
    /// Takes the lock, failing fast when another session holds it
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::Io {
                path: path.clone(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            let holder = fs::read_to_string(&path)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok());
            return Err(LockError::Held { path, holder });
        }

        // Best effort; the advisory lock is authoritative
        let _ = file.set_len(0);
        let _ = writeln!(&file, "{}", std::process::id());

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}
