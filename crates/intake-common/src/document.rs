//! Rendered documents that are regenerated wholesale rather than appended to.

use std::path::{Path, PathBuf};

use crate::error::CommonError;
use crate::file::write_atomic;

pub trait DocumentSink: Send + Sync {
    /// Replace the document with `body`. Readers see either the old or the new body.
    fn publish(&self, body: &str) -> Result<(), CommonError>;

    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSink for FileDocument {
    fn publish(&self, body: &str) -> Result<(), CommonError> {
        write_atomic(&self.path, body.as_bytes())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
