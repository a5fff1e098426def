use async_trait::async_trait;

use crate::domain::{IndexError, ScannedFile};

/// Configuration the scanner applies while walking a repository root (§4.1,
/// §6 `supportedExtensions`/`ignorePatterns`).
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub supported_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            supported_extensions: Vec::new(),
            ignore_patterns: Vec::new(),
        }
    }
}

/// Enumerates candidate files under a repository root and content-hashes
/// each one. MUST NOT open the database (§4.1) — the scanner is pure
/// filesystem I/O.
#[async_trait]
pub trait FileScanner: Send + Sync {
    async fn scan(&self, root: &str, config: &ScanConfig) -> Result<Vec<ScannedFile>, IndexError>;
}
