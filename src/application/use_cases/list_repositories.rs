use std::sync::Arc;

use crate::application::RepositoryStore;
use crate::domain::{IndexError, Repository};

/// Read-only repository directory queries backing the CLI `list`/`status`
/// commands (§10).
pub struct ListRepositoriesUseCase {
    repository_store: Arc<dyn RepositoryStore>,
}

impl ListRepositoriesUseCase {
    pub fn new(repository_store: Arc<dyn RepositoryStore>) -> Self {
        Self { repository_store }
    }

    pub async fn execute(&self) -> Result<Vec<Repository>, IndexError> {
        self.repository_store.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Repository>, IndexError> {
        self.repository_store.find_by_id(id).await
    }

    pub async fn get_by_path(&self, path: &str) -> Result<Option<Repository>, IndexError> {
        self.repository_store.find_by_path(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepositoryStore {
        repos: Mutex<HashMap<String, Repository>>,
    }

    #[async_trait]
    impl RepositoryStore for FakeRepositoryStore {
        async fn save(&self, repository: &Repository) -> Result<(), IndexError> {
            self.repos
                .lock()
                .unwrap()
                .insert(repository.id().to_string(), repository.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Repository>, IndexError> {
            Ok(self.repos.lock().unwrap().get(id).cloned())
        }

        async fn find_by_path(&self, path: &str) -> Result<Option<Repository>, IndexError> {
            Ok(self.repos.lock().unwrap().values().find(|r| r.matches_path(path)).cloned())
        }

        async fn list(&self) -> Result<Vec<Repository>, IndexError> {
            Ok(self.repos.lock().unwrap().values().cloned().collect())
        }

        async fn delete(&self, id: &str) -> Result<(), IndexError> {
            self.repos.lock().unwrap().remove(id);
            Ok(())
        }

        async fn update_stats(
            &self,
            _id: &str,
            _node_count: u64,
            _edge_count: u64,
            _file_count: u64,
        ) -> Result<(), IndexError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn execute_lists_all_saved_repositories() {
        let store = Arc::new(FakeRepositoryStore::default());
        let a = Repository::new("a".to_string(), "/tmp/a".to_string());
        let b = Repository::new("b".to_string(), "/tmp/b".to_string());
        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        let use_case = ListRepositoriesUseCase::new(store);
        let repos = use_case.execute().await.unwrap();
        assert_eq!(repos.len(), 2);
    }

    #[tokio::test]
    async fn get_by_path_finds_matching_repository() {
        let store = Arc::new(FakeRepositoryStore::default());
        let repo = Repository::new("acme".to_string(), "/tmp/acme".to_string());
        store.save(&repo).await.unwrap();

        let use_case = ListRepositoriesUseCase::new(store);
        let found = use_case.get_by_path("/tmp/acme").await.unwrap();
        assert!(found.is_some());
    }
}
