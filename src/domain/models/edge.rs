use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{current_timestamp, edge_fingerprint};

/// Abstract edge type catalog (§3.3). Every reference-family variant has an
/// implicit cross-file counterpart emitted by the resolver rather than a
/// distinct enum member — see [`EdgeType::is_reference`] and
/// [`EdgeRecord::cross_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    Contains,
    HasMethod,
    HasField,
    DefinesClass,
    DeclaresPackage,
    Calls,
    Imports,
    Extends,
    Implements,
    DependsOn,
    DependsOnModule,
    ExecutesSql,
    Tests,
    Covers,
    RendersPage,
    ValidatesField,
    GuardsMethod,
    EnforcesRule,
    BelongsTo,
    HasIndexState,
    RouteUsesService,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Contains => "CONTAINS",
            EdgeType::HasMethod => "HAS_METHOD",
            EdgeType::HasField => "HAS_FIELD",
            EdgeType::DefinesClass => "DEFINES_CLASS",
            EdgeType::DeclaresPackage => "DECLARES_PACKAGE",
            EdgeType::Calls => "CALLS",
            EdgeType::Imports => "IMPORTS",
            EdgeType::Extends => "EXTENDS",
            EdgeType::Implements => "IMPLEMENTS",
            EdgeType::DependsOn => "DEPENDS_ON",
            EdgeType::DependsOnModule => "DEPENDS_ON_MODULE",
            EdgeType::ExecutesSql => "EXECUTES_SQL",
            EdgeType::Tests => "TESTS",
            EdgeType::Covers => "COVERS",
            EdgeType::RendersPage => "RENDERS_PAGE",
            EdgeType::ValidatesField => "VALIDATES_FIELD",
            EdgeType::GuardsMethod => "GUARDS_METHOD",
            EdgeType::EnforcesRule => "ENFORCES_RULE",
            EdgeType::BelongsTo => "BELONGS_TO",
            EdgeType::HasIndexState => "HAS_INDEX_STATE",
            EdgeType::RouteUsesService => "ROUTE_USES_SERVICE",
        }
    }

    /// Reference-family edges (as opposed to containment/behavioral/lifecycle)
    /// are the only ones eligible for a `CROSS_FILE_T` mirror per §3.3.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            EdgeType::Calls
                | EdgeType::Imports
                | EdgeType::Extends
                | EdgeType::Implements
                | EdgeType::DependsOn
                | EdgeType::DependsOnModule
        )
    }

    /// Edge types considered for the PageRank component subgraph (§4.10).
    pub fn is_pagerank_edge(&self) -> bool {
        matches!(
            self,
            EdgeType::Calls
                | EdgeType::Imports
                | EdgeType::Extends
                | EdgeType::Implements
                | EdgeType::DependsOn
                | EdgeType::DependsOnModule
        )
    }

    /// Edge types traversed by the dependency-depth BFS (§4.10).
    pub fn is_dependency_depth_edge(&self) -> bool {
        matches!(
            self,
            EdgeType::Calls | EdgeType::RendersPage | EdgeType::RouteUsesService
        )
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The uniform edge record (§3.1/§3.2). `cross_file` marks the `CROSS_FILE_T`
/// mirror emitted by the resolver when source and target live in different
/// files; `ambiguous` and `unresolved` are resolver-only flags (pass-1 edges
/// are always concrete or symbolic, never ambiguous/unresolved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub entity_id: String,
    pub edge_type: EdgeType,
    pub source_entity_id: String,
    pub target_entity_id: String,
    pub weight: Option<f64>,
    pub cross_file: bool,
    pub ambiguous: bool,
    pub unresolved: bool,
    pub created_at: i64,
    pub properties: BTreeMap<String, Value>,
}

impl EdgeRecord {
    pub fn new(
        edge_type: EdgeType,
        source_entity_id: impl Into<String>,
        target_entity_id: impl Into<String>,
    ) -> Self {
        let source = source_entity_id.into();
        let target = target_entity_id.into();
        let entity_id = edge_fingerprint(edge_type.as_str(), &source, &target, None);
        Self {
            entity_id,
            edge_type,
            source_entity_id: source,
            target_entity_id: target,
            weight: None,
            cross_file: false,
            ambiguous: false,
            unresolved: false,
            created_at: current_timestamp(),
            properties: BTreeMap::new(),
        }
    }

    /// Builds the `CROSS_FILE_T` mirror of a reference edge that crosses a
    /// file boundary (§3.3, §4.7).
    pub fn cross_file_mirror(&self) -> Option<Self> {
        if !self.edge_type.is_reference() || self.cross_file {
            return None;
        }
        let mut mirror = Self::new(self.edge_type, self.source_entity_id.clone(), self.target_entity_id.clone());
        mirror.entity_id = edge_fingerprint(
            &format!("CROSS_FILE_{}", self.edge_type.as_str()),
            &self.source_entity_id,
            &self.target_entity_id,
            None,
        );
        mirror.cross_file = true;
        Some(mirror)
    }

    /// An ambiguous-match edge carries a disambiguator in its fingerprint so
    /// multiple candidate edges for the same symbolic reference don't
    /// collide on `entityId` (§4.7 "emit one edge per candidate").
    pub fn ambiguous_candidate(
        edge_type: EdgeType,
        source_entity_id: impl Into<String>,
        target_entity_id: impl Into<String>,
        candidate_index: usize,
    ) -> Self {
        let source = source_entity_id.into();
        let target = target_entity_id.into();
        let disambiguator = format!("ambiguous-{candidate_index}");
        let entity_id = edge_fingerprint(edge_type.as_str(), &source, &target, Some(&disambiguator));
        Self {
            entity_id,
            edge_type,
            source_entity_id: source,
            target_entity_id: target,
            weight: None,
            cross_file: false,
            ambiguous: true,
            unresolved: false,
            created_at: current_timestamp(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn mark_unresolved(mut self) -> Self {
        self.unresolved = true;
        self
    }
}

/// A pass-1 edge whose target is a name, not yet an `entityId` (§4.6). The
/// resolver (pass 2) consumes these and produces concrete [`EdgeRecord`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolicEdge {
    pub edge_type: EdgeType,
    pub source_entity_id: String,
    pub target_symbol: String,
    /// Scope hint narrowing resolution (e.g. the source file's directory),
    /// consumed by the nearest-scope resolution rule (§4.7, §9).
    pub source_file_path: String,
    pub properties: BTreeMap<String, Value>,
}

impl SymbolicEdge {
    pub fn new(
        edge_type: EdgeType,
        source_entity_id: impl Into<String>,
        target_symbol: impl Into<String>,
        source_file_path: impl Into<String>,
    ) -> Self {
        Self {
            edge_type,
            source_entity_id: source_entity_id.into(),
            target_symbol: target_symbol.into(),
            source_file_path: source_file_path.into(),
            properties: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_is_stable_for_identical_inputs() {
        let a = EdgeRecord::new(EdgeType::Calls, "src1", "tgt1");
        let b = EdgeRecord::new(EdgeType::Calls, "src1", "tgt1");
        assert_eq!(a.entity_id, b.entity_id);
    }

    #[test]
    fn cross_file_mirror_only_for_reference_edges() {
        let containment = EdgeRecord::new(EdgeType::Contains, "file1", "class1");
        assert!(containment.cross_file_mirror().is_none());

        let call = EdgeRecord::new(EdgeType::Calls, "m1", "m2");
        let mirror = call.cross_file_mirror().expect("calls is a reference edge");
        assert!(mirror.cross_file);
        assert_ne!(mirror.entity_id, call.entity_id);
    }

    #[test]
    fn ambiguous_candidates_get_distinct_entity_ids() {
        let a = EdgeRecord::ambiguous_candidate(EdgeType::Calls, "src1", "tgtA", 0);
        let b = EdgeRecord::ambiguous_candidate(EdgeType::Calls, "src1", "tgtB", 1);
        assert_ne!(a.entity_id, b.entity_id);
        assert!(a.ambiguous && b.ambiguous);
    }
}
