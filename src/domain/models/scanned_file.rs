use serde::{Deserialize, Serialize};

use super::Language;

/// One file as seen by the scanner (C2): path, size, and content hash. Never
/// touches the database — purely a filesystem observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    pub path: String,
    pub size_bytes: u64,
    pub content_hash: String,
    pub language: Language,
}

impl ScannedFile {
    pub fn new(path: impl Into<String>, size_bytes: u64, content_hash: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            content_hash: content_hash.into(),
            language,
        }
    }
}
