//! Durable pending-tag checkpoint
//!
//! The checkpoint is a UTF-8 text file holding one pending tag per line. Every
//! write replaces the whole file through a temp-file rename, so after a crash the
//! file holds either the previous or the next complete list, never a torn one.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::Span;

/// Errors raised while reading or rewriting the checkpoint file
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// File-backed list of tags not yet fully processed
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    span: Span,
}

impl CheckpointStore {
    /// Creates a store over `path`; nothing is read or written yet
    pub fn new(path: impl Into<PathBuf>, span: Span) -> Self {
        Self {
            path: path.into(),
            span,
        }
    }

    /// Path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the pending tags in file order
    ///
    /// A missing file means no pending work. Blank lines are skipped and
    /// repeated tags collapse onto their first occurrence.
    pub fn load(&self) -> CheckpointResult<Vec<String>> {
        let _entered = self.span.enter();

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let tags = dedup_tags(content.lines());
        tracing::debug!("Loaded {} pending tags from {}", tags.len(), self.path.display());
        Ok(tags)
    }

    /// Replaces the checkpoint with `tags`
    ///
    /// Entries that cannot be stored on a single line are dropped with a warning.
    pub fn save(&self, tags: &[String]) -> CheckpointResult<()> {
        let _entered = self.span.enter();

        let mut body = String::new();
        let mut written = 0usize;
        for tag in dedup_tags(tags.iter().map(String::as_str)) {
            if tag.contains('\n') || tag.contains('\r') {
                tracing::warn!("Skipping tag with a line break: {:?}", tag);
                continue;
            }
            body.push_str(&tag);
            body.push('\n');
            written += 1;
        }

        self.write_atomically(body.as_bytes())?;
        tracing::debug!("Saved {} pending tags to {}", written, self.path.display());
        Ok(())
    }

    /// Removes one occurrence of `tag` and rewrites the file
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The tag was pending and has been removed
    /// * `Ok(false)` - The tag was not pending; the file is untouched
    pub fn remove(&self, tag: &str) -> CheckpointResult<bool> {
        let mut tags = self.load()?;

        let Some(position) = tags.iter().position(|pending| pending == tag) else {
            return Ok(false);
        };

        tags.remove(position);
        self.save(&tags)?;

        let _entered = self.span.enter();
        tracing::info!("Tag '{}' removed from checkpoint ({} left)", tag, tags.len());
        Ok(true)
    }

    /// Empties the checkpoint
    pub fn clear(&self) -> CheckpointResult<()> {
        self.save(&[])
    }

    fn write_atomically(&self, bytes: &[u8]) -> CheckpointResult<()> {
        let io_err = |source| CheckpointError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(io_err)?;

        let mut file = NamedTempFile::new_in(&parent).map_err(io_err)?;
        file.write_all(bytes).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

fn dedup_tags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_string()))
        .map(str::to_string)
        .collect()
}
