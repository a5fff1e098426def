use dashmap::DashMap;
use std::path::Path;

use tracing::debug;

use crate::domain::{
    node_entity_id, EdgeRecord, Language, Node, NodeKind, Span, SymbolicEdge,
};

/// Which attribute a candidate matched on, consumed to implement the
/// nearest-scope resolution rule (§4.7, §9): same file beats same directory
/// beats same declared package beats repository-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ScopeRank {
    RepoWide = 0,
    SamePackage = 1,
    SameDirectory = 2,
    SameFile = 3,
}

fn directory_of(path: &str) -> &str {
    Path::new(path)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or("")
}

/// Resolves pass-1 symbolic edges against the full set of pass-1 nodes
/// (§4.7). The in-memory symbol index is a `dashmap`-backed concurrent map
/// keyed by bare name so a single-threaded resolve pass and any later
/// read-side probing can share it without extra locking.
pub struct CrossFileResolverUseCase {
    symbol_index: DashMap<String, Vec<IndexedCandidate>>,
    repository_id: String,
}

#[derive(Debug, Clone)]
struct IndexedCandidate {
    entity_id: String,
    file_path: String,
    package: Option<String>,
}

/// Outcome of resolving one repository's symbolic edges: concrete edges
/// (including `CROSS_FILE_T` mirrors and ambiguous-candidate fan-out) plus
/// any synthetic `Placeholder` nodes created for unresolved targets.
#[derive(Debug, Clone, Default)]
pub struct ResolutionResult {
    pub edges: Vec<EdgeRecord>,
    pub placeholder_nodes: Vec<Node>,
}

impl CrossFileResolverUseCase {
    pub fn new(repository_id: impl Into<String>, nodes: &[Node]) -> Self {
        let symbol_index: DashMap<String, Vec<IndexedCandidate>> = DashMap::new();
        for node in nodes {
            let package = node
                .properties
                .get("package")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            symbol_index
                .entry(node.name.clone())
                .or_default()
                .push(IndexedCandidate {
                    entity_id: node.entity_id.clone(),
                    file_path: node.file_path.clone(),
                    package,
                });
        }
        Self {
            symbol_index,
            repository_id: repository_id.into(),
        }
    }

    pub fn resolve_all(&self, symbolic_edges: &[SymbolicEdge]) -> ResolutionResult {
        let mut result = ResolutionResult::default();
        for symbolic in symbolic_edges {
            self.resolve_one(symbolic, &mut result);
        }
        result
    }

    fn resolve_one(&self, symbolic: &SymbolicEdge, result: &mut ResolutionResult) {
        let candidates = self
            .symbol_index
            .get(&symbolic.target_symbol)
            .map(|entry| entry.clone())
            .unwrap_or_default();

        if candidates.is_empty() {
            self.emit_unresolved(symbolic, result);
            return;
        }

        if candidates.len() == 1 {
            self.emit_concrete(symbolic, &candidates[0], result);
            return;
        }

        let source_package = self
            .symbol_index
            .iter()
            .flat_map(|e| e.value().clone())
            .find(|c| c.entity_id == symbolic.source_entity_id)
            .and_then(|c| c.package);

        let source_dir = directory_of(&symbolic.source_file_path).to_string();
        let best_rank = candidates
            .iter()
            .map(|c| self.scope_rank(symbolic, c, &source_dir, source_package.as_deref()))
            .max()
            .unwrap_or(ScopeRank::RepoWide);

        let narrowed: Vec<&IndexedCandidate> = candidates
            .iter()
            .filter(|c| self.scope_rank(symbolic, c, &source_dir, source_package.as_deref()) == best_rank)
            .collect();

        if narrowed.len() == 1 {
            self.emit_concrete(symbolic, narrowed[0], result);
        } else {
            debug!(
                symbol = %symbolic.target_symbol,
                count = narrowed.len(),
                "ambiguous symbol resolution; emitting one edge per candidate"
            );
            for (index, candidate) in narrowed.iter().enumerate() {
                let mut edge = EdgeRecord::ambiguous_candidate(
                    symbolic.edge_type,
                    symbolic.source_entity_id.clone(),
                    candidate.entity_id.clone(),
                    index,
                );
                if symbolic.source_file_path != candidate.file_path {
                    edge.cross_file = true;
                    if let Some(mirror) = edge.cross_file_mirror() {
                        result.edges.push(mirror);
                    }
                }
                result.edges.push(edge);
            }
        }
    }

    fn scope_rank(
        &self,
        symbolic: &SymbolicEdge,
        candidate: &IndexedCandidate,
        source_dir: &str,
        source_package: Option<&str>,
    ) -> ScopeRank {
        if candidate.file_path == symbolic.source_file_path {
            ScopeRank::SameFile
        } else if directory_of(&candidate.file_path) == source_dir {
            ScopeRank::SameDirectory
        } else if candidate.package.is_some() && candidate.package.as_deref() == source_package {
            ScopeRank::SamePackage
        } else {
            ScopeRank::RepoWide
        }
    }

    fn emit_concrete(
        &self,
        symbolic: &SymbolicEdge,
        candidate: &IndexedCandidate,
        result: &mut ResolutionResult,
    ) {
        let mut edge = EdgeRecord::new(
            symbolic.edge_type,
            symbolic.source_entity_id.clone(),
            candidate.entity_id.clone(),
        );
        edge.properties = symbolic.properties.clone();
        if symbolic.source_file_path != candidate.file_path {
            edge.cross_file = true;
            if let Some(mirror) = edge.cross_file_mirror() {
                result.edges.push(mirror);
            }
        }
        result.edges.push(edge);
    }

    fn emit_unresolved(&self, symbolic: &SymbolicEdge, result: &mut ResolutionResult) {
        let placeholder_id = node_entity_id(NodeKind::Placeholder, &symbolic.target_symbol);
        let placeholder = Node::new(
            placeholder_id.clone(),
            NodeKind::Placeholder,
            symbolic.target_symbol.clone(),
            "",
            Language::Unknown,
            Span::point(0, 0),
            self.repository_id.clone(),
        );

        result.placeholder_nodes.push(placeholder);

        let edge = EdgeRecord::new(
            symbolic.edge_type,
            symbolic.source_entity_id.clone(),
            placeholder_id,
        )
        .mark_unresolved();
        result.edges.push(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EdgeType;

    fn node(name: &str, file: &str, kind: NodeKind) -> Node {
        let entity_id = node_entity_id(kind, &format!("{file}:{name}"));
        Node::new(
            entity_id,
            kind,
            name.to_string(),
            file.to_string(),
            Language::Rust,
            Span::point(1, 0),
            "repo-1",
        )
    }

    #[test]
    fn unique_match_rewrites_to_concrete_edge() {
        let target = node("helper", "src/lib.rs", NodeKind::Function);
        let nodes = vec![target.clone()];
        let resolver = CrossFileResolverUseCase::new("repo-1", &nodes);
        let symbolic = SymbolicEdge::new(EdgeType::Calls, "caller-1", "helper", "src/lib.rs");
        let result = resolver.resolve_all(&[symbolic]);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].target_entity_id, target.entity_id);
        assert!(!result.edges[0].unresolved);
    }

    #[test]
    fn no_match_creates_placeholder_and_marks_unresolved() {
        let resolver = CrossFileResolverUseCase::new("repo-1", &[]);
        let symbolic = SymbolicEdge::new(EdgeType::Calls, "caller-1", "missing_fn", "src/lib.rs");
        let result = resolver.resolve_all(&[symbolic]);
        assert_eq!(result.placeholder_nodes.len(), 1);
        assert!(result.edges[0].unresolved);
    }

    #[test]
    fn same_file_candidate_wins_over_other_files() {
        let local = node("run", "src/a.rs", NodeKind::Function);
        let distant = node("run", "src/b.rs", NodeKind::Function);
        let nodes = vec![local.clone(), distant.clone()];
        let resolver = CrossFileResolverUseCase::new("repo-1", &nodes);
        let symbolic = SymbolicEdge::new(EdgeType::Calls, "caller-1", "run", "src/a.rs");
        let result = resolver.resolve_all(&[symbolic]);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].target_entity_id, local.entity_id);
    }

    #[test]
    fn truly_ambiguous_emits_one_edge_per_candidate() {
        let a = node("run", "pkg1/a.rs", NodeKind::Function);
        let b = node("run", "pkg2/b.rs", NodeKind::Function);
        let nodes = vec![a, b];
        let resolver = CrossFileResolverUseCase::new("repo-1", &nodes);
        let symbolic = SymbolicEdge::new(EdgeType::Calls, "caller-1", "run", "other/caller.rs");
        let result = resolver.resolve_all(&[symbolic]);
        let ambiguous_count = result.edges.iter().filter(|e| e.ambiguous).count();
        assert_eq!(ambiguous_count, 2);
    }
}
