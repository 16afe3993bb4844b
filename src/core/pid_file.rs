//! # PID file guard.
//!
//! [`PidFile`] records the current process id at a path and removes the file
//! when dropped. Creation fails with [`DaemonError::PidFileExists`] when the
//! path is already taken, which is how a second instance is refused.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::DaemonError;

/// Owns a PID file on disk for as long as it lives.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Creates `path` exclusively and writes the decimal process id into it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DaemonError> {
        let path = path.as_ref().to_path_buf();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(DaemonError::PidFileExists { path });
            }
            Err(source) => return Err(DaemonError::PidFile { path, source }),
        };

        if let Err(source) = write!(file, "{}", std::process::id()) {
            let _ = fs::remove_file(&path);
            return Err(DaemonError::PidFile { path, source });
        }
        info!(path = %path.display(), pid = std::process::id(), "pid file written");
        Ok(Self { path })
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove pid file"),
        }
    }
}
