use async_trait::async_trait;
use git2::{Cred, Delta, DiffOptions, FetchOptions, Oid, RemoteCallbacks, Repository};

use crate::application::{CloneOptions, RenamedPath, VcsDiff, VcsDriver};
use crate::domain::IndexError;

/// `VcsDriver` over `git2` (§4.2). Every call opens (or clones into) the
/// repository fresh rather than caching a handle, since this adapter is
/// invoked at most a few times per run and `git2::Repository` isn't
/// `Send`-friendly to stash behind a long-lived field.
pub struct Git2VcsDriver;

impl Git2VcsDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Git2VcsDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VcsDriver for Git2VcsDriver {
    async fn is_repo(&self, dir: &str) -> bool {
        let dir = dir.to_string();
        tokio::task::spawn_blocking(move || Repository::open(&dir).is_ok())
            .await
            .unwrap_or(false)
    }

    async fn head_sha(&self, dir: &str) -> Result<Option<String>, IndexError> {
        let dir = dir.to_string();
        tokio::task::spawn_blocking(move || head_sha_blocking(&dir))
            .await
            .map_err(|e| IndexError::vcs(format!("head_sha task panicked: {e}")))?
    }

    async fn diff(&self, dir: &str, from_sha: &str, to_sha: Option<&str>) -> Result<VcsDiff, IndexError> {
        let dir = dir.to_string();
        let from_sha = from_sha.to_string();
        let to_sha = to_sha.map(|s| s.to_string());
        tokio::task::spawn_blocking(move || diff_blocking(&dir, &from_sha, to_sha.as_deref()))
            .await
            .map_err(|e| IndexError::vcs(format!("diff task panicked: {e}")))?
    }

    async fn untracked(&self, dir: &str) -> Result<Vec<String>, IndexError> {
        let dir = dir.to_string();
        tokio::task::spawn_blocking(move || untracked_blocking(&dir))
            .await
            .map_err(|e| IndexError::vcs(format!("untracked task panicked: {e}")))?
    }

    async fn clone(&self, url: &str, dest: &str, options: &CloneOptions) -> Result<(), IndexError> {
        let url = url.to_string();
        let dest = dest.to_string();
        let options = options.clone();
        tokio::task::spawn_blocking(move || clone_blocking(&url, &dest, &options))
            .await
            .map_err(|e| IndexError::vcs(format!("clone task panicked: {e}")))?
    }
}

fn head_sha_blocking(dir: &str) -> Result<Option<String>, IndexError> {
    let repo = match Repository::open(dir) {
        Ok(r) => r,
        Err(_) => return Ok(None),
    };
    match repo.head() {
        Ok(head) => Ok(head.peel_to_commit().ok().map(|c| c.id().to_string())),
        Err(_) => Ok(None),
    }
}

fn diff_blocking(dir: &str, from_sha: &str, to_sha: Option<&str>) -> Result<VcsDiff, IndexError> {
    let repo = Repository::open(dir).map_err(|e| IndexError::vcs(format!("failed to open repository: {e}")))?;

    let old_oid = Oid::from_str(from_sha).map_err(|e| IndexError::vcs(format!("invalid fromSha '{from_sha}': {e}")))?;
    let old_commit = repo
        .find_commit(old_oid)
        .map_err(|e| IndexError::vcs(format!("commit '{from_sha}' not found: {e}")))?;
    let old_tree = old_commit
        .tree()
        .map_err(|e| IndexError::vcs(format!("failed to load tree for '{from_sha}': {e}")))?;

    let new_tree = match to_sha {
        Some(sha) => {
            let new_oid = Oid::from_str(sha).map_err(|e| IndexError::vcs(format!("invalid toSha '{sha}': {e}")))?;
            let new_commit = repo
                .find_commit(new_oid)
                .map_err(|e| IndexError::vcs(format!("commit '{sha}' not found: {e}")))?;
            Some(
                new_commit
                    .tree()
                    .map_err(|e| IndexError::vcs(format!("failed to load tree for '{sha}': {e}")))?,
            )
        }
        None => {
            let head = repo.head().map_err(|e| IndexError::vcs(format!("failed to resolve HEAD: {e}")))?;
            Some(
                head.peel_to_tree()
                    .map_err(|e| IndexError::vcs(format!("failed to load HEAD tree: {e}")))?,
            )
        }
    };

    let mut opts = DiffOptions::new();
    opts.ignore_filemode(true);

    let mut diff = repo
        .diff_tree_to_tree(Some(&old_tree), new_tree.as_ref(), Some(&mut opts))
        .map_err(|e| IndexError::vcs(format!("failed to diff trees: {e}")))?;

    let mut find_opts = git2::DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| IndexError::vcs(format!("failed to detect renames: {e}")))?;

    let mut result = VcsDiff::default();
    for delta in diff.deltas() {
        let old_path = delta.old_file().path().map(|p| p.to_string_lossy().into_owned());
        let new_path = delta.new_file().path().map(|p| p.to_string_lossy().into_owned());
        match delta.status() {
            Delta::Added => {
                if let Some(p) = new_path {
                    result.added.push(p);
                }
            }
            Delta::Deleted => {
                if let Some(p) = old_path {
                    result.deleted.push(p);
                }
            }
            Delta::Modified | Delta::Typechange => {
                if let Some(p) = new_path {
                    result.modified.push(p);
                }
            }
            Delta::Renamed => {
                if let (Some(old), Some(new)) = (old_path, new_path) {
                    let similarity: f32 = if delta.old_file().id() == delta.new_file().id() { 1.0 } else { 0.5 };
                    result.renamed.push(RenamedPath {
                        old_path: old,
                        new_path: new,
                        similarity,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(result)
}

fn untracked_blocking(dir: &str) -> Result<Vec<String>, IndexError> {
    let repo = Repository::open(dir).map_err(|e| IndexError::vcs(format!("failed to open repository: {e}")))?;
    let mut opts = git2::StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo
        .statuses(Some(&mut opts))
        .map_err(|e| IndexError::vcs(format!("failed to read status: {e}")))?;

    let mut paths = Vec::new();
    for entry in statuses.iter() {
        if entry.status().contains(git2::Status::WT_NEW) {
            if let Some(path) = entry.path() {
                paths.push(path.to_string());
            }
        }
    }
    Ok(paths)
}

fn clone_blocking(url: &str, dest: &str, options: &CloneOptions) -> Result<(), IndexError> {
    let mut callbacks = RemoteCallbacks::new();
    if let Some(token) = options.auth_token.clone() {
        callbacks.credentials(move |_url, _username, _allowed| Cred::userpass_plaintext(&token, ""));
    }

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if let Some(depth) = options.depth {
        fetch_options.depth(depth as i32);
    }

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = &options.branch {
        builder.branch(branch);
    }

    builder
        .clone(url, std::path::Path::new(dest))
        .map_err(|e| IndexError::vcs(format!("failed to clone {url}: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn commit_all(repo: &Repository, message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let parents: Vec<git2::Commit> = match repo.head().ok().and_then(|h| h.peel_to_commit().ok()) {
            Some(c) => vec![c],
            None => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs).unwrap()
    }

    #[tokio::test]
    async fn is_repo_detects_initialized_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Git2VcsDriver::new();
        assert!(!driver.is_repo(dir.path().to_str().unwrap()).await);

        Repository::init(dir.path()).unwrap();
        assert!(driver.is_repo(dir.path().to_str().unwrap()).await);
    }

    #[tokio::test]
    async fn diff_reports_added_and_modified_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let first = commit_all(&repo, "initial");

        fs::write(dir.path().join("a.rs"), "fn a() { /* changed */ }").unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}").unwrap();
        commit_all(&repo, "second");

        let driver = Git2VcsDriver::new();
        let diff = driver
            .diff(dir.path().to_str().unwrap(), &first.to_string(), None)
            .await
            .unwrap();

        assert!(diff.added.contains(&"b.rs".to_string()));
        assert!(diff.modified.contains(&"a.rs".to_string()));
    }

    #[tokio::test]
    async fn untracked_lists_new_unstaged_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        commit_all(&repo, "initial");
        fs::write(dir.path().join("c.rs"), "fn c() {}").unwrap();

        let driver = Git2VcsDriver::new();
        let files = driver.untracked(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(files, vec!["c.rs".to_string()]);
    }
}
