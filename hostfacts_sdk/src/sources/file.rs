//! File-backed source

use hostfacts_core::component::{Component, ComponentError, Fact, Inputs};
use hostfacts_core::log_debug;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maximum file size read by a source (10MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Reads one file and produces `{ "path", "content" }`
///
/// A missing or unreadable file is a benign absence on this host; any other
/// I/O error is a failure.
#[derive(Debug, Clone)]
pub struct FileContentSource {
    path: PathBuf,
    max_size: u64,
}

impl FileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: MAX_FILE_SIZE,
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, ComponentError> {
        log_debug!("Reading file source", "path" => self.path.display());
        let metadata = fs::metadata(&self.path).map_err(|e| self.classify(e))?;
        if !metadata.is_file() {
            return Err(ComponentError::skip(format!(
                "not a regular file: {}",
                self.path.display()
            )));
        }
        if metadata.len() > self.max_size {
            return Err(ComponentError::content(format!(
                "{} is {} bytes, limit is {}",
                self.path.display(),
                metadata.len(),
                self.max_size
            )));
        }

        fs::read_to_string(&self.path).map_err(|e| self.classify(e))
    }

    fn classify(&self, error: std::io::Error) -> ComponentError {
        match error.kind() {
            ErrorKind::NotFound => {
                ComponentError::skip(format!("file not found: {}", self.path.display()))
            }
            ErrorKind::PermissionDenied => {
                ComponentError::skip(format!("permission denied: {}", self.path.display()))
            }
            _ => ComponentError::Io(error),
        }
    }
}

impl Component for FileContentSource {
    fn invoke(&self, _inputs: &Inputs) -> Result<Fact, ComponentError> {
        let content = self.read()?;
        Ok(json!({
            "path": self.path.display().to_string(),
            "content": content,
        }))
    }
}
