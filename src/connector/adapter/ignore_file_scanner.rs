use async_trait::async_trait;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tracing::warn;

use crate::application::{FileScanner, ScanConfig};
use crate::domain::{compute_file_hash, IndexError, Language, ScannedFile};

/// Enumerates a repository root with the same `.gitignore`-respecting walk
/// the teacher uses for its own indexing pass (§4.1), plus `ignorePatterns`
/// applied as an additional override glob set.
pub struct IgnoreFileScanner;

impl IgnoreFileScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IgnoreFileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileScanner for IgnoreFileScanner {
    async fn scan(&self, root: &str, config: &ScanConfig) -> Result<Vec<ScannedFile>, IndexError> {
        let root = root.to_string();
        let config = config.clone();
        tokio::task::spawn_blocking(move || scan_blocking(&root, &config))
            .await
            .map_err(|e| IndexError::internal(format!("scan task panicked: {e}")))?
    }
}

fn scan_blocking(root: &str, config: &ScanConfig) -> Result<Vec<ScannedFile>, IndexError> {
    let root_path = std::path::Path::new(root);

    let mut overrides = OverrideBuilder::new(root_path);
    for pattern in &config.ignore_patterns {
        let negated = format!("!{pattern}");
        overrides
            .add(&negated)
            .map_err(|e| IndexError::invalid_input(format!("invalid ignore pattern '{pattern}': {e}")))?;
    }
    let overrides = overrides
        .build()
        .map_err(|e| IndexError::invalid_input(format!("failed to build ignore overrides: {e}")))?;

    let walker = WalkBuilder::new(root_path)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .overrides(overrides)
        .build();

    let mut scanned = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable directory entry: {e}");
                continue;
            }
        };
        if !entry.path().is_file() {
            continue;
        }

        let language = Language::from_path(entry.path());
        if !config.supported_extensions.is_empty() {
            let ext = entry.path().extension().and_then(|e| e.to_str()).unwrap_or("");
            if !config.supported_extensions.iter().any(|e| e == ext) {
                continue;
            }
        } else if language == Language::Unknown {
            continue;
        }

        let relative_path = entry
            .path()
            .strip_prefix(root_path)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        let content = match std::fs::read(entry.path()) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to read {}: {e}", relative_path);
                continue;
            }
        };

        let content_hash = compute_file_hash(&content);
        scanned.push(ScannedFile::new(relative_path, content.len() as u64, content_hash, language));
    }

    Ok(scanned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn scans_supported_files_and_skips_unknown_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let rs_path = dir.path().join("lib.rs");
        let mut f = std::fs::File::create(&rs_path).unwrap();
        writeln!(f, "fn main() {{}}").unwrap();

        let bin_path = dir.path().join("data.bin");
        std::fs::write(&bin_path, [0u8, 1, 2]).unwrap();

        let scanner = IgnoreFileScanner::new();
        let config = ScanConfig::default();
        let files = scanner.scan(dir.path().to_str().unwrap(), &config).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "lib.rs");
        assert_eq!(files[0].language, Language::Rust);
    }

    #[tokio::test]
    async fn respects_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "ignored.rs\n").unwrap();
        std::fs::write(dir.path().join("ignored.rs"), "fn x() {}").unwrap();
        std::fs::write(dir.path().join("kept.rs"), "fn y() {}").unwrap();

        let scanner = IgnoreFileScanner::new();
        let config = ScanConfig::default();
        let files = scanner.scan(dir.path().to_str().unwrap(), &config).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "kept.rs");
    }
}
