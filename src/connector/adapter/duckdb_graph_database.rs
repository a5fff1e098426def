use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{DeletionCounts, GraphDatabase};
use crate::domain::{EdgeRecord, EdgeType, IndexError, Language, Node, NodeKind, Span};

/// The abstract property-graph store (§4.8/§4.9) realized over two DuckDB
/// tables. Nodes and edges are both keyed by `entity_id` so a retried batch
/// upsert (`ON CONFLICT ... DO UPDATE`) is always safe to replay. Edges
/// don't carry their own `repository_id` (§3.1), so repository-scoped edge
/// queries join through the source node.
pub struct DuckdbGraphDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbGraphDatabase {
    pub fn new(db_path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(db_path).map_err(|e| IndexError::schema(format!("failed to open database: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_node(row: &duckdb::Row<'_>) -> duckdb::Result<Node> {
        let kind_str: String = row.get(1)?;
        let labels_json: String = row.get(2)?;
        let language_str: String = row.get(5)?;
        let properties_json: String = row.get(11)?;

        let mut node = Node::new(
            row.get::<_, String>(0)?,
            kind_from_str(&kind_str),
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            Language::parse(&language_str),
            Span {
                start_line: row.get::<_, i64>(6)? as u32,
                end_line: row.get::<_, i64>(7)? as u32,
                start_column: row.get::<_, i64>(8)? as u32,
                end_column: row.get::<_, i64>(9)? as u32,
            },
            row.get::<_, String>(12)?,
        );
        node.extra_labels = serde_json::from_str(&labels_json).unwrap_or_default();
        node.created_at = row.get(10)?;
        node.properties = serde_json::from_str(&properties_json).unwrap_or_default();
        Ok(node)
    }

    fn row_to_edge(row: &duckdb::Row<'_>) -> duckdb::Result<EdgeRecord> {
        let edge_type_str: String = row.get(1)?;
        let properties_json: String = row.get(9)?;
        let mut edge = EdgeRecord::new(edge_type_from_str(&edge_type_str), row.get::<_, String>(2)?, row.get::<_, String>(3)?);
        edge.entity_id = row.get(0)?;
        edge.weight = row.get(4)?;
        edge.cross_file = row.get(5)?;
        edge.ambiguous = row.get(6)?;
        edge.unresolved = row.get(7)?;
        edge.created_at = row.get(8)?;
        edge.properties = serde_json::from_str(&properties_json).unwrap_or_default();
        Ok(edge)
    }
}

fn kind_from_str(s: &str) -> NodeKind {
    use NodeKind::*;
    match s {
        "File" => File,
        "Directory" => Directory,
        "Package" => Package,
        "Class" => Class,
        "Interface" => Interface,
        "Enum" => Enum,
        "Struct" => Struct,
        "Function" => Function,
        "Method" => Method,
        "Field" => Field,
        "AnonymousCallback" => AnonymousCallback,
        "RestEndpoint" => RestEndpoint,
        "ScheduledTask" => ScheduledTask,
        "CLICommand" => CliCommand,
        "EventHandler" => EventHandler,
        "GraphQLOperation" => GraphQlOperation,
        "SQLStatement" => SqlStatement,
        "SQLTable" => SqlTable,
        "TestFile" => TestFile,
        "TestCase" => TestCase,
        "UIRoute" => UiRoute,
        "UIPage" => UiPage,
        "MenuItem" => MenuItem,
        "Screen" => Screen,
        "BusinessRule" => BusinessRule,
        "SecurityRule" => SecurityRule,
        "ValidationChain" => ValidationChain,
        "EnrichedBusinessRule" => EnrichedBusinessRule,
        _ => Placeholder,
    }
}

fn edge_type_from_str(s: &str) -> EdgeType {
    use EdgeType::*;
    match s {
        "CONTAINS" => Contains,
        "HAS_METHOD" => HasMethod,
        "HAS_FIELD" => HasField,
        "DEFINES_CLASS" => DefinesClass,
        "DECLARES_PACKAGE" => DeclaresPackage,
        "CALLS" => Calls,
        "IMPORTS" => Imports,
        "EXTENDS" => Extends,
        "IMPLEMENTS" => Implements,
        "DEPENDS_ON" => DependsOn,
        "DEPENDS_ON_MODULE" => DependsOnModule,
        "EXECUTES_SQL" => ExecutesSql,
        "TESTS" => Tests,
        "COVERS" => Covers,
        "RENDERS_PAGE" => RendersPage,
        "VALIDATES_FIELD" => ValidatesField,
        "GUARDS_METHOD" => GuardsMethod,
        "ENFORCES_RULE" => EnforcesRule,
        "BELONGS_TO" => BelongsTo,
        "HAS_INDEX_STATE" => HasIndexState,
        "ROUTE_USES_SERVICE" => RouteUsesService,
        _ => DependsOn,
    }
}

#[async_trait]
impl GraphDatabase for DuckdbGraphDatabase {
    async fn save_nodes_batch(&self, nodes: &[Node]) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| IndexError::graph_write(0, format!("failed to open transaction: {e}"), Vec::new()))?;
        for node in nodes {
            let labels_json = serde_json::to_string(&node.label_set()).unwrap_or_default();
            let properties_json = serde_json::to_string(&node.properties).unwrap_or_default();
            tx.execute(
                r#"
                INSERT INTO graph_nodes (
                    entity_id, kind, labels, name, file_path, language,
                    start_line, end_line, start_column, end_column, created_at, properties, repository_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT (entity_id) DO UPDATE SET
                    kind = excluded.kind,
                    labels = excluded.labels,
                    name = excluded.name,
                    file_path = excluded.file_path,
                    language = excluded.language,
                    start_line = excluded.start_line,
                    end_line = excluded.end_line,
                    start_column = excluded.start_column,
                    end_column = excluded.end_column,
                    properties = excluded.properties,
                    repository_id = excluded.repository_id
                "#,
                params![
                    node.entity_id,
                    node.kind.as_str(),
                    labels_json,
                    node.name,
                    node.file_path,
                    node.language.as_str(),
                    node.span.start_line,
                    node.span.end_line,
                    node.span.start_column,
                    node.span.end_column,
                    node.created_at,
                    properties_json,
                    node.repository_id,
                ],
            )
            .map_err(|e| {
                IndexError::graph_write(0, format!("failed to upsert node: {e}"), vec![node.entity_id.clone()])
            })?;
        }
        tx.commit()
            .map_err(|e| IndexError::graph_write(0, format!("failed to commit node batch: {e}"), Vec::new()))?;
        Ok(())
    }

    async fn save_relationships_batch(&self, edges: &[EdgeRecord]) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| IndexError::graph_write(0, format!("failed to open transaction: {e}"), Vec::new()))?;
        for edge in edges {
            // Endpoints are MERGEd by entityId in a property-graph store so a
            // resolver-emitted edge never dangles on a node batch that
            // hasn't landed yet; here that's a lightweight placeholder row
            // that a later node upsert fills in.
            for endpoint in [&edge.source_entity_id, &edge.target_entity_id] {
                tx.execute(
                    "INSERT INTO graph_nodes (entity_id, kind, labels, name, file_path, language, start_line, end_line, start_column, end_column, created_at, properties, repository_id)
                     VALUES (?1, 'Placeholder', '[]', ?1, '', 'unknown', 1, 1, 0, 0, 0, '{}', '')
                     ON CONFLICT (entity_id) DO NOTHING",
                    params![endpoint],
                )
                .map_err(|e| IndexError::graph_write(0, format!("failed to merge endpoint: {e}"), vec![endpoint.clone()]))?;
            }

            let properties_json = serde_json::to_string(&edge.properties).unwrap_or_default();
            tx.execute(
                r#"
                INSERT INTO graph_edges (
                    entity_id, edge_type, source_entity_id, target_entity_id,
                    weight, cross_file, ambiguous, unresolved, created_at, properties
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT (entity_id) DO UPDATE SET
                    weight = excluded.weight,
                    cross_file = excluded.cross_file,
                    ambiguous = excluded.ambiguous,
                    unresolved = excluded.unresolved,
                    properties = excluded.properties
                "#,
                params![
                    edge.entity_id,
                    edge.edge_type.as_str(),
                    edge.source_entity_id,
                    edge.target_entity_id,
                    edge.weight,
                    edge.cross_file,
                    edge.ambiguous,
                    edge.unresolved,
                    edge.created_at,
                    properties_json,
                ],
            )
            .map_err(|e| IndexError::graph_write(0, format!("failed to upsert edge: {e}"), vec![edge.entity_id.clone()]))?;
        }
        tx.commit()
            .map_err(|e| IndexError::graph_write(0, format!("failed to commit edge batch: {e}"), Vec::new()))?;
        Ok(())
    }

    async fn delete_by_file_path(&self, repository_id: &str, file_path: &str) -> Result<DeletionCounts, IndexError> {
        let conn = self.conn.lock().await;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| IndexError::internal(format!("failed to open transaction: {e}")))?;

        let edges_deleted = tx
            .execute(
                r#"
                DELETE FROM graph_edges
                WHERE source_entity_id IN (SELECT entity_id FROM graph_nodes WHERE repository_id = ?1 AND file_path = ?2)
                   OR target_entity_id IN (SELECT entity_id FROM graph_nodes WHERE repository_id = ?1 AND file_path = ?2)
                "#,
                params![repository_id, file_path],
            )
            .map_err(|e| IndexError::internal(format!("failed to delete edges for {file_path}: {e}")))?;

        let nodes_deleted = tx
            .execute(
                "DELETE FROM graph_nodes WHERE repository_id = ?1 AND file_path = ?2",
                params![repository_id, file_path],
            )
            .map_err(|e| IndexError::internal(format!("failed to delete nodes for {file_path}: {e}")))?;

        tx.commit().map_err(|e| IndexError::internal(format!("failed to commit cleanup: {e}")))?;

        Ok(DeletionCounts {
            nodes_deleted: nodes_deleted as u64,
            edges_deleted: edges_deleted as u64,
        })
    }

    async fn node_count(&self, repository_id: &str) -> Result<u64, IndexError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT COUNT(*) FROM graph_nodes WHERE repository_id = ?1",
            params![repository_id],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n as u64)
        .map_err(|e| IndexError::internal(format!("failed to count nodes: {e}")))
    }

    async fn edge_count(&self, repository_id: &str) -> Result<u64, IndexError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            r#"
            SELECT COUNT(*) FROM graph_edges e
            JOIN graph_nodes n ON e.source_entity_id = n.entity_id
            WHERE n.repository_id = ?1
            "#,
            params![repository_id],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n as u64)
        .map_err(|e| IndexError::internal(format!("failed to count edges: {e}")))
    }

    async fn load_nodes_for_repository(&self, repository_id: &str) -> Result<Vec<Node>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT entity_id, kind, labels, name, file_path, language,
                       start_line, end_line, start_column, end_column, created_at, properties, repository_id
                FROM graph_nodes WHERE repository_id = ?1
                "#,
            )
            .map_err(|e| IndexError::internal(format!("failed to prepare statement: {e}")))?;
        let rows = stmt
            .query_map(params![repository_id], Self::row_to_node)
            .map_err(|e| IndexError::internal(format!("failed to query nodes: {e}")))?;
        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row.map_err(|e| IndexError::internal(format!("failed to read node row: {e}")))?);
        }
        Ok(nodes)
    }

    async fn load_edges_for_repository(&self, repository_id: &str) -> Result<Vec<EdgeRecord>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT e.entity_id, e.edge_type, e.source_entity_id, e.target_entity_id,
                       e.weight, e.cross_file, e.ambiguous, e.unresolved, e.created_at, e.properties
                FROM graph_edges e
                JOIN graph_nodes n ON e.source_entity_id = n.entity_id
                WHERE n.repository_id = ?1
                "#,
            )
            .map_err(|e| IndexError::internal(format!("failed to prepare statement: {e}")))?;
        let rows = stmt
            .query_map(params![repository_id], Self::row_to_edge)
            .map_err(|e| IndexError::internal(format!("failed to query edges: {e}")))?;
        let mut edges = Vec::new();
        for row in rows {
            edges.push(row.map_err(|e| IndexError::internal(format!("failed to read edge row: {e}")))?);
        }
        Ok(edges)
    }

    async fn write_analytics_properties(
        &self,
        page_rank: &HashMap<String, f64>,
        dependency_depth: &HashMap<String, u32>,
    ) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| IndexError::analytics(format!("failed to open transaction: {e}")))?;
        for (entity_id, score) in page_rank {
            tx.execute(
                "UPDATE graph_nodes SET page_rank = ?1 WHERE entity_id = ?2",
                params![score, entity_id],
            )
            .map_err(|e| IndexError::analytics(format!("failed to write page rank: {e}")))?;
        }
        for (entity_id, depth) in dependency_depth {
            tx.execute(
                "UPDATE graph_nodes SET dependency_depth = ?1 WHERE entity_id = ?2",
                params![*depth as i64, entity_id],
            )
            .map_err(|e| IndexError::analytics(format!("failed to write dependency depth: {e}")))?;
        }
        tx.commit().map_err(|e| IndexError::analytics(format!("failed to commit analytics write: {e}")))?;
        Ok(())
    }

    async fn reset_repository(&self, repository_id: &str) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| IndexError::internal(format!("failed to open transaction: {e}")))?;
        tx.execute(
            r#"
            DELETE FROM graph_edges
            WHERE source_entity_id IN (SELECT entity_id FROM graph_nodes WHERE repository_id = ?1)
               OR target_entity_id IN (SELECT entity_id FROM graph_nodes WHERE repository_id = ?1)
            "#,
            params![repository_id],
        )
        .map_err(|e| IndexError::internal(format!("failed to reset edges: {e}")))?;
        tx.execute("DELETE FROM graph_nodes WHERE repository_id = ?1", params![repository_id])
            .map_err(|e| IndexError::internal(format!("failed to reset nodes: {e}")))?;
        tx.commit().map_err(|e| IndexError::internal(format!("failed to commit reset: {e}")))?;
        Ok(())
    }

    async fn apply_schema(&self, force_update: bool) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        if force_update {
            conn.execute_batch("DROP TABLE IF EXISTS graph_edges; DROP TABLE IF EXISTS graph_nodes;")
                .map_err(|e| IndexError::schema(format!("failed to drop existing schema: {e}")))?;
        }
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS graph_nodes (
                entity_id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                labels TEXT NOT NULL,
                name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                language TEXT NOT NULL,
                start_line BIGINT NOT NULL,
                end_line BIGINT NOT NULL,
                start_column BIGINT NOT NULL,
                end_column BIGINT NOT NULL,
                created_at BIGINT NOT NULL,
                properties TEXT NOT NULL,
                repository_id TEXT NOT NULL,
                page_rank DOUBLE,
                dependency_depth BIGINT
            );
            CREATE INDEX IF NOT EXISTS idx_graph_nodes_repository ON graph_nodes (repository_id);
            CREATE INDEX IF NOT EXISTS idx_graph_nodes_file ON graph_nodes (repository_id, file_path);

            CREATE TABLE IF NOT EXISTS graph_edges (
                entity_id TEXT PRIMARY KEY,
                edge_type TEXT NOT NULL,
                source_entity_id TEXT NOT NULL,
                target_entity_id TEXT NOT NULL,
                weight DOUBLE,
                cross_file BOOLEAN NOT NULL DEFAULT FALSE,
                ambiguous BOOLEAN NOT NULL DEFAULT FALSE,
                unresolved BOOLEAN NOT NULL DEFAULT FALSE,
                created_at BIGINT NOT NULL,
                properties TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_graph_edges_source ON graph_edges (source_entity_id);
            CREATE INDEX IF NOT EXISTS idx_graph_edges_target ON graph_edges (target_entity_id);
            "#,
        )
        .map_err(|e| {
            // DuckDB doesn't raise a distinguishable "already exists" error
            // for IF NOT EXISTS DDL, so there is nothing to swallow here;
            // any error at this point is a genuine schema failure.
            IndexError::schema(format!("failed to apply schema: {e}"))
        })?;
        debug!("graph schema applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, QualifiedName, Span};

    async fn harness() -> DuckdbGraphDatabase {
        let conn = Connection::open_in_memory().unwrap();
        let db = DuckdbGraphDatabase::with_connection(Arc::new(Mutex::new(conn)));
        db.apply_schema(false).await.unwrap();
        db
    }

    fn sample_node(repo: &str, name: &str, file_path: &str) -> Node {
        let qn = QualifiedName::top_level_function(file_path, name, 1);
        let entity_id = crate::domain::node_entity_id(NodeKind::Function, &qn);
        Node::new(entity_id, NodeKind::Function, name, file_path, Language::Rust, Span::point(1, 0), repo)
    }

    #[tokio::test]
    async fn save_and_load_nodes_round_trip() {
        let db = harness().await;
        let node = sample_node("repo-1", "run", "src/lib.rs");
        db.save_nodes_batch(&[node.clone()]).await.unwrap();

        let loaded = db.load_nodes_for_repository("repo-1").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].entity_id, node.entity_id);
        assert_eq!(loaded[0].kind, NodeKind::Function);
        assert_eq!(db.node_count("repo-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_relationships_merges_placeholder_endpoints() {
        let db = harness().await;
        let edge = EdgeRecord::new(EdgeType::Calls, "missing-src", "missing-tgt");
        db.save_relationships_batch(&[edge.clone()]).await.unwrap();

        let nodes = db.load_nodes_for_repository("").await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.kind == NodeKind::Placeholder));
    }

    #[tokio::test]
    async fn delete_by_file_path_removes_nodes_and_incident_edges() {
        let db = harness().await;
        let caller = sample_node("repo-1", "caller", "src/a.rs");
        let callee = sample_node("repo-1", "callee", "src/b.rs");
        db.save_nodes_batch(&[caller.clone(), callee.clone()]).await.unwrap();
        let edge = EdgeRecord::new(EdgeType::Calls, caller.entity_id.clone(), callee.entity_id.clone());
        db.save_relationships_batch(&[edge]).await.unwrap();

        let counts = db.delete_by_file_path("repo-1", "src/a.rs").await.unwrap();
        assert_eq!(counts.nodes_deleted, 1);
        assert_eq!(counts.edges_deleted, 1);
        assert_eq!(db.node_count("repo-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn write_analytics_properties_updates_existing_nodes() {
        let db = harness().await;
        let node = sample_node("repo-1", "run", "src/lib.rs");
        db.save_nodes_batch(&[node.clone()]).await.unwrap();

        let mut page_rank = HashMap::new();
        page_rank.insert(node.entity_id.clone(), 0.42);
        db.write_analytics_properties(&page_rank, &HashMap::new()).await.unwrap();

        let conn = db.conn.lock().await;
        let score: f64 = conn
            .query_row(
                "SELECT page_rank FROM graph_nodes WHERE entity_id = ?1",
                params![node.entity_id],
                |row| row.get(0),
            )
            .unwrap();
        assert!((score - 0.42).abs() < f64::EPSILON);
    }
}
