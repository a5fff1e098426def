use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{info, warn};

use crate::domain::{
    degree_fallback_score, normalize_to_unit_range, AnalyticsMode, AnalyticsResult, EdgeRecord,
    IndexError, Node, NodeKind,
};

const DAMPING_FACTOR: f64 = 0.85;
const MAX_ITERATIONS: usize = 20;
const MAX_BFS_DEPTH: u32 = 10;

fn is_entry_point(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::RestEndpoint | NodeKind::UiRoute | NodeKind::CliCommand | NodeKind::ScheduledTask
    )
}

/// Post-index graph analytics (C10, §4.10): PageRank (or a degree-based
/// fallback when no analytics primitive is available) plus a dependency-depth
/// BFS from entry-point nodes, both run in-process over `petgraph`.
pub struct PostIndexAnalyticsUseCase {
    native_pagerank_available: bool,
}

impl PostIndexAnalyticsUseCase {
    /// `native_pagerank_available` distinguishes the two analytics modes at
    /// the call site even though, per the implementation note in §4.10, both
    /// paths run the identical `petgraph` computation in this codebase — the
    /// distinction is recorded in `AnalyticsMode`, not in two engines.
    pub fn new(native_pagerank_available: bool) -> Self {
        Self {
            native_pagerank_available,
        }
    }

    pub fn run(&self, nodes: &[Node], edges: &[EdgeRecord]) -> Result<AnalyticsResult, IndexError> {
        if nodes.is_empty() {
            return Ok(AnalyticsResult::empty());
        }

        let pagerank_edges: Vec<&EdgeRecord> =
            edges.iter().filter(|e| e.edge_type.is_pagerank_edge()).collect();

        let mode = if self.native_pagerank_available {
            AnalyticsMode::Pagerank
        } else {
            AnalyticsMode::DegreeFallback
        };

        let page_rank = match mode {
            AnalyticsMode::Pagerank => self.compute_pagerank(nodes, &pagerank_edges),
            AnalyticsMode::DegreeFallback => self.compute_degree_fallback(nodes, &pagerank_edges),
            AnalyticsMode::Disabled => HashMap::new(),
        };

        let depth_edges: Vec<&EdgeRecord> =
            edges.iter().filter(|e| e.edge_type.is_dependency_depth_edge()).collect();
        let dependency_depth = self.compute_dependency_depth(nodes, &depth_edges);

        info!(
            nodes = nodes.len(),
            scored = page_rank.len(),
            mode = mode.as_str(),
            "post-index analytics complete"
        );

        Ok(AnalyticsResult {
            page_rank,
            dependency_depth,
            mode: Some(mode),
        })
    }

    fn compute_pagerank(&self, nodes: &[Node], edges: &[&EdgeRecord]) -> HashMap<String, f64> {
        let (graph, index_of) = self.build_digraph(nodes, edges);
        if graph.node_count() == 0 {
            return HashMap::new();
        }

        let n = graph.node_count();
        let mut scores: Vec<f64> = vec![1.0 / n as f64; n];

        for _ in 0..MAX_ITERATIONS {
            let mut next = vec![(1.0 - DAMPING_FACTOR) / n as f64; n];
            for node_index in graph.node_indices() {
                let out_degree = graph.edges(node_index).count();
                if out_degree == 0 {
                    continue;
                }
                let share = DAMPING_FACTOR * scores[node_index.index()] / out_degree as f64;
                for edge in graph.edges(node_index) {
                    next[edge.target().index()] += share;
                }
            }
            scores = next;
        }

        let max = scores.iter().cloned().fold(0.0_f64, f64::max);
        index_of
            .into_iter()
            .map(|(entity_id, idx)| {
                let raw = scores[idx.index()];
                let normalized = if max > 0.0 { raw / max } else { 0.0 };
                (entity_id, normalized)
            })
            .collect()
    }

    fn compute_degree_fallback(&self, nodes: &[Node], edges: &[&EdgeRecord]) -> HashMap<String, f64> {
        warn!("no analytics primitive available; using degree fallback");
        let total_edges = edges.len() as u64;
        let mut in_degree: HashMap<String, u64> = HashMap::new();
        for edge in edges {
            *in_degree.entry(edge.target_entity_id.clone()).or_insert(0) += 1;
        }

        let raw: HashMap<String, f64> = nodes
            .iter()
            .map(|n| {
                let degree = in_degree.get(&n.entity_id).copied().unwrap_or(0);
                (n.entity_id.clone(), degree_fallback_score(degree, total_edges))
            })
            .collect();

        normalize_to_unit_range(raw)
    }

    fn compute_dependency_depth(&self, nodes: &[Node], edges: &[&EdgeRecord]) -> HashMap<String, u32> {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in edges {
            adjacency
                .entry(edge.source_entity_id.as_str())
                .or_default()
                .push(edge.target_entity_id.as_str());
        }

        let mut depth: HashMap<String, u32> = HashMap::new();
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        for node in nodes.iter().filter(|n| is_entry_point(n.kind)) {
            if visited.insert(node.entity_id.clone()) {
                depth.insert(node.entity_id.clone(), 0);
                queue.push_back((node.entity_id.clone(), 0));
            }
        }

        while let Some((entity_id, current_depth)) = queue.pop_front() {
            if current_depth >= MAX_BFS_DEPTH {
                continue;
            }
            if let Some(neighbors) = adjacency.get(entity_id.as_str()) {
                for &neighbor in neighbors {
                    let next_depth = current_depth + 1;
                    let improves = depth
                        .get(neighbor)
                        .map(|&existing| next_depth < existing)
                        .unwrap_or(true);
                    if improves {
                        depth.insert(neighbor.to_string(), next_depth);
                        queue.push_back((neighbor.to_string(), next_depth));
                    }
                }
            }
        }

        depth
    }

    fn build_digraph(
        &self,
        nodes: &[Node],
        edges: &[&EdgeRecord],
    ) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

        for node in nodes {
            let idx = graph.add_node(node.entity_id.clone());
            index_of.insert(node.entity_id.clone(), idx);
        }

        for edge in edges {
            if let (Some(&source), Some(&target)) = (
                index_of.get(&edge.source_entity_id),
                index_of.get(&edge.target_entity_id),
            ) {
                graph.add_edge(source, target, ());
            }
        }

        (graph, index_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeType, Language, Span};

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id.to_string(), kind, id.to_string(), "f.rs", Language::Rust, Span::point(1, 0), "repo-1")
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let use_case = PostIndexAnalyticsUseCase::new(true);
        let result = use_case.run(&[], &[]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn pagerank_scores_stay_in_unit_range() {
        let use_case = PostIndexAnalyticsUseCase::new(true);
        let a = node("a", NodeKind::Function);
        let b = node("b", NodeKind::Function);
        let c = node("c", NodeKind::Function);
        let edges = vec![
            EdgeRecord::new(EdgeType::Calls, "a", "b"),
            EdgeRecord::new(EdgeType::Calls, "c", "b"),
        ];
        let result = use_case.run(&[a, b, c], &edges).unwrap();
        for score in result.page_rank.values() {
            assert!(*score >= 0.0 && *score <= 1.0);
        }
        assert_eq!(result.mode, Some(AnalyticsMode::Pagerank));
    }

    #[test]
    fn degree_fallback_used_when_no_native_primitive() {
        let use_case = PostIndexAnalyticsUseCase::new(false);
        let a = node("a", NodeKind::Function);
        let b = node("b", NodeKind::Function);
        let edges = vec![EdgeRecord::new(EdgeType::Calls, "a", "b")];
        let result = use_case.run(&[a, b], &edges).unwrap();
        assert_eq!(result.mode, Some(AnalyticsMode::DegreeFallback));
    }

    #[test]
    fn dependency_depth_bfs_respects_min_hops() {
        let use_case = PostIndexAnalyticsUseCase::new(true);
        let entry = node("endpoint", NodeKind::RestEndpoint);
        let middle = node("service", NodeKind::Function);
        let leaf = node("repo_call", NodeKind::Function);
        let edges = vec![
            EdgeRecord::new(EdgeType::Calls, "endpoint", "service"),
            EdgeRecord::new(EdgeType::Calls, "service", "repo_call"),
        ];
        let result = use_case.run(&[entry, middle, leaf], &edges).unwrap();
        assert_eq!(result.dependency_depth.get("endpoint"), Some(&0));
        assert_eq!(result.dependency_depth.get("service"), Some(&1));
        assert_eq!(result.dependency_depth.get("repo_call"), Some(&2));
    }
}
