use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use thiserror::Error;

use freight_core::Artifact;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{}: not a usable output directory ({reason})", path.display())]
    OutputDir { path: PathBuf, reason: String },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn output_dir_error(dir: &Path, reason: impl Display) -> PersistError {
    PersistError::OutputDir {
        path: dir.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Creates `dir` when missing; fails when the path exists but is not a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(output_dir_error(dir, "exists and is not a directory")),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| output_dir_error(dir, err))
        }
        Err(err) => Err(output_dir_error(dir, err)),
    }
}

/// Saves spreadsheets into one directory. Content goes to a `.partial-*` temp
/// file next to the target and is renamed over it once synced.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;
        let target = self.dir.join(filename);
        let failed = |source: io::Error| PersistError::Write {
            path: target.clone(),
            source,
        };

        let mut partial = Builder::new()
            .prefix(".partial-")
            .tempfile_in(&self.dir)
            .map_err(failed)?;
        partial.write_all(content).map_err(failed)?;
        partial.as_file().sync_all().map_err(failed)?;
        partial.persist(&target).map_err(|err| failed(err.error))?;
        Ok(target)
    }

    /// Stores a finished batch result under its own filename.
    pub fn write_artifact(&self, artifact: &Artifact) -> Result<PathBuf, PersistError> {
        self.write(&artifact.filename, &artifact.bytes)
    }
}
