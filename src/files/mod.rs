//! Process-wide file store keyed by opaque handle ids.
//!
//! Entries are created on demand (explicit registration or `file`-typed
//! variable writes) and removed on explicit request; the store never scans
//! or cleans up on its own.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};

/// Metadata for one registered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub temp_path: PathBuf,
    pub mime_type: String,
    pub size: u64,
}

/// Shared file registry. Cheap to clone handles around via `Arc`.
#[derive(Default)]
pub struct FlowFileStore {
    entries: DashMap<String, FileEntry>,
}

impl FlowFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filesystem path, returning its entry. The path must exist.
    pub fn register_file(&self, path: impl AsRef<Path>) -> NodeResult<FileEntry> {
        let path = path.as_ref();
        let meta = fs::metadata(path)
            .map_err(|e| NodeError::FileError(format!("{}: {}", path.display(), e)))?;
        if !meta.is_file() {
            return Err(NodeError::FileError(format!(
                "{}: not a regular file",
                path.display()
            )));
        }

        let id = format!("file-{}", uuid::Uuid::new_v4());
        let entry = FileEntry {
            id: id.clone(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            temp_path: path.to_path_buf(),
            mime_type: mime_for_path(path).to_string(),
            size: meta.len(),
        };
        self.entries.insert(id, entry.clone());
        Ok(entry)
    }

    pub fn has_file(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get_file(&self, id: &str) -> Option<FileEntry> {
        self.entries.get(id).map(|e| e.clone())
    }

    pub fn is_image(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .map(|e| e.mime_type.starts_with("image/"))
            .unwrap_or(false)
    }

    /// Read the file and encode it as a `data:` URL.
    pub fn get_file_data_url(&self, id: &str) -> NodeResult<String> {
        let entry = self
            .get_file(id)
            .ok_or_else(|| NodeError::FileError(format!("unknown file id: {}", id)))?;
        let bytes = fs::read(&entry.temp_path)
            .map_err(|e| NodeError::FileError(format!("{}: {}", entry.temp_path.display(), e)))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(format!("data:{};base64,{}", entry.mime_type, encoded))
    }

    pub fn remove_file(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}
