//! Registry of temporary files created while rewriting fallback arguments.
//!
//! The registry is owned by the dispatch invocation that fills it and is
//! drained when that invocation finishes. Paths are backed by
//! [`tempfile::TempPath`], so even an un-drained registry removes its files
//! when dropped.

use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

/// Append-only list of temp files awaiting deletion.
#[derive(Debug, Default)]
pub struct TempFileRegistry {
    files: Vec<TempPath>,
}

impl TempFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a temp file for deferred deletion.
    pub fn register(&mut self, path: TempPath) {
        self.files.push(path);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Paths currently held, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|p| p.as_ref())
    }

    /// Delete every recorded file. Each deletion is attempted independently;
    /// a failure is logged and the remaining files are still removed.
    pub fn cleanup(self) {
        for path in self.files {
            debug!("deleting tmp file {}", path.display());
            if let Err(e) = path.close() {
                warn!("failed to delete tmp file: {e}");
            }
        }
    }
}
