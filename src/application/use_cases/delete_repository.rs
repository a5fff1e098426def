use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::application::{GraphDatabase, RepositoryStore};
use crate::domain::IndexError;

/// Removes a repository and everything indexed for it (§4.4, CLI `delete`):
/// graph contents first, then the repository's own lifecycle record.
pub struct DeleteRepositoryUseCase {
    repository_store: Arc<dyn RepositoryStore>,
    graph_database: Arc<dyn GraphDatabase>,
}

impl DeleteRepositoryUseCase {
    pub fn new(repository_store: Arc<dyn RepositoryStore>, graph_database: Arc<dyn GraphDatabase>) -> Self {
        Self {
            repository_store,
            graph_database,
        }
    }

    pub async fn execute(&self, id: &str) -> Result<(), IndexError> {
        let repo = self
            .repository_store
            .find_by_id(id)
            .await?
            .ok_or_else(|| IndexError::not_found(format!("repository not found: {id}")))?;

        info!(id, name = repo.name(), path = repo.path(), "deleting repository");

        self.graph_database.reset_repository(id).await?;
        self.repository_store.delete(id).await?;

        info!(id, "repository deleted");
        Ok(())
    }

    pub async fn delete_by_path(&self, path: &str) -> Result<(), IndexError> {
        let canonical_path = Path::new(path)
            .canonicalize()
            .map_err(|e| IndexError::invalid_input(format!("invalid path '{path}': {e}")))?
            .to_string_lossy()
            .to_string();

        let repo = self
            .repository_store
            .find_by_path(&canonical_path)
            .await?
            .ok_or_else(|| IndexError::not_found(format!("repository not found at path: {path}")))?;

        self.execute(repo.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DeletionCounts;
    use crate::domain::{EdgeRecord, Node, Repository};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepositoryStore {
        repos: Mutex<HashMap<String, Repository>>,
        deleted: Mutex<Vec<String>>,
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
            self.deleted.lock().unwrap().push(id.to_string());
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

    #[derive(Default)]
    struct FakeGraphDatabase {
        reset_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GraphDatabase for FakeGraphDatabase {
        async fn save_nodes_batch(&self, _nodes: &[Node]) -> Result<(), IndexError> {
            Ok(())
        }

        async fn save_relationships_batch(&self, _edges: &[EdgeRecord]) -> Result<(), IndexError> {
            Ok(())
        }

        async fn delete_by_file_path(
            &self,
            _repository_id: &str,
            _file_path: &str,
        ) -> Result<DeletionCounts, IndexError> {
            Ok(DeletionCounts::default())
        }

        async fn node_count(&self, _repository_id: &str) -> Result<u64, IndexError> {
            Ok(0)
        }

        async fn edge_count(&self, _repository_id: &str) -> Result<u64, IndexError> {
            Ok(0)
        }

        async fn load_nodes_for_repository(&self, _repository_id: &str) -> Result<Vec<Node>, IndexError> {
            Ok(Vec::new())
        }

        async fn load_edges_for_repository(&self, _repository_id: &str) -> Result<Vec<EdgeRecord>, IndexError> {
            Ok(Vec::new())
        }

        async fn write_analytics_properties(
            &self,
            _page_rank: &HashMap<String, f64>,
            _dependency_depth: &HashMap<String, u32>,
        ) -> Result<(), IndexError> {
            Ok(())
        }

        async fn reset_repository(&self, repository_id: &str) -> Result<(), IndexError> {
            self.reset_calls.lock().unwrap().push(repository_id.to_string());
            Ok(())
        }

        async fn apply_schema(&self, _force_update: bool) -> Result<(), IndexError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn execute_resets_graph_then_deletes_repository() {
        let store = Arc::new(FakeRepositoryStore::default());
        let repo = Repository::new("acme".to_string(), "/tmp/acme".to_string());
        let id = repo.id().to_string();
        store.save(&repo).await.unwrap();
        let graph = Arc::new(FakeGraphDatabase::default());

        let use_case = DeleteRepositoryUseCase::new(store.clone(), graph.clone());
        use_case.execute(&id).await.unwrap();

        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert_eq!(graph.reset_calls.lock().unwrap().as_slice(), [id]);
    }

    #[tokio::test]
    async fn execute_unknown_id_is_not_found() {
        let store = Arc::new(FakeRepositoryStore::default());
        let graph = Arc::new(FakeGraphDatabase::default());
        let use_case = DeleteRepositoryUseCase::new(store, graph);
        let err = use_case.execute("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
