use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{current_timestamp, Language};

/// The label-bearing kind of a graph node. Label *sets* are derived from a
/// kind by [`NodeKind::labels`] rather than stored independently, so an
/// upsert can always recompute and replace an entity's labels from its kind
/// alone (§3.2 invariant: no two semantically exclusive labels coexist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodeKind {
    File,
    Directory,
    Package,
    Class,
    Interface,
    Enum,
    Struct,
    Function,
    Method,
    Field,
    AnonymousCallback,
    RestEndpoint,
    ScheduledTask,
    CliCommand,
    EventHandler,
    GraphQlOperation,
    SqlStatement,
    SqlTable,
    TestFile,
    TestCase,
    UiRoute,
    UiPage,
    MenuItem,
    Screen,
    BusinessRule,
    SecurityRule,
    ValidationChain,
    EnrichedBusinessRule,
    Placeholder,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "File",
            NodeKind::Directory => "Directory",
            NodeKind::Package => "Package",
            NodeKind::Class => "Class",
            NodeKind::Interface => "Interface",
            NodeKind::Enum => "Enum",
            NodeKind::Struct => "Struct",
            NodeKind::Function => "Function",
            NodeKind::Method => "Method",
            NodeKind::Field => "Field",
            NodeKind::AnonymousCallback => "AnonymousCallback",
            NodeKind::RestEndpoint => "RestEndpoint",
            NodeKind::ScheduledTask => "ScheduledTask",
            NodeKind::CliCommand => "CLICommand",
            NodeKind::EventHandler => "EventHandler",
            NodeKind::GraphQlOperation => "GraphQLOperation",
            NodeKind::SqlStatement => "SQLStatement",
            NodeKind::SqlTable => "SQLTable",
            NodeKind::TestFile => "TestFile",
            NodeKind::TestCase => "TestCase",
            NodeKind::UiRoute => "UIRoute",
            NodeKind::UiPage => "UIPage",
            NodeKind::MenuItem => "MenuItem",
            NodeKind::Screen => "Screen",
            NodeKind::BusinessRule => "BusinessRule",
            NodeKind::SecurityRule => "SecurityRule",
            NodeKind::ValidationChain => "ValidationChain",
            NodeKind::EnrichedBusinessRule => "EnrichedBusinessRule",
            NodeKind::Placeholder => "Placeholder",
        }
    }

    /// The full label set written on upsert. Language-specific labels (e.g.
    /// `JavaClass`) are layered on top by the parser that produced the node,
    /// via `Node::with_extra_label`; this is the kind-derived baseline.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            NodeKind::File | NodeKind::Directory => &["Structural"],
            NodeKind::Class | NodeKind::Interface | NodeKind::Enum | NodeKind::Struct => {
                &["TypeDeclaration"]
            }
            NodeKind::Function | NodeKind::Method | NodeKind::AnonymousCallback => &["Callable"],
            NodeKind::Field => &["Member"],
            NodeKind::RestEndpoint
            | NodeKind::ScheduledTask
            | NodeKind::CliCommand
            | NodeKind::EventHandler
            | NodeKind::GraphQlOperation => &["EntryPoint"],
            NodeKind::SqlStatement | NodeKind::SqlTable => &["Persistence"],
            NodeKind::TestFile | NodeKind::TestCase => &["TestArtifact"],
            NodeKind::UiRoute | NodeKind::UiPage => &["UI"],
            NodeKind::MenuItem | NodeKind::Screen => &["UI"],
            NodeKind::BusinessRule | NodeKind::SecurityRule | NodeKind::EnrichedBusinessRule => {
                &["Documentation"]
            }
            NodeKind::ValidationChain => &["Documentation"],
            NodeKind::Package => &["Structural"],
            NodeKind::Placeholder => &["Placeholder"],
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Location span for a node or edge provenance, 1-based lines and 0-based
/// columns per §4.6; `end_line` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl Span {
    pub fn point(line: u32, column: u32) -> Self {
        Self {
            start_line: line,
            end_line: line,
            start_column: column,
            end_column: column,
        }
    }
}

/// The uniform node record emitted by every language parser and consumed by
/// the graph writer (§3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub entity_id: String,
    pub kind: NodeKind,
    pub extra_labels: Vec<String>,
    pub name: String,
    pub file_path: String,
    pub language: Language,
    pub span: Span,
    pub created_at: i64,
    pub repository_id: String,
    /// Per-kind dynamic property bag (§9): primitives pass through; nested
    /// composites are JSON-serialized by the writer before storage.
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(
        entity_id: impl Into<String>,
        kind: NodeKind,
        name: impl Into<String>,
        file_path: impl Into<String>,
        language: Language,
        span: Span,
        repository_id: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            kind,
            extra_labels: Vec::new(),
            name: name.into(),
            file_path: file_path.into(),
            language,
            span,
            created_at: current_timestamp(),
            repository_id: repository_id.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_extra_label(mut self, label: impl Into<String>) -> Self {
        self.extra_labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// The label set to write on upsert: kind-derived baseline plus any
    /// language- or framework-specific labels the parser attached.
    pub fn label_set(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.kind.labels().iter().map(|s| s.to_string()).collect();
        labels.extend(self.extra_labels.iter().cloned());
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_set_combines_kind_and_extra_labels() {
        let node = Node::new(
            "abc",
            NodeKind::Class,
            "UserService",
            "src/UserService.java",
            Language::Java,
            Span::point(1, 0),
            "repo-1",
        )
        .with_extra_label("JavaClass");

        let labels = node.label_set();
        assert!(labels.contains(&"TypeDeclaration".to_string()));
        assert!(labels.contains(&"JavaClass".to_string()));
    }

    #[test]
    fn properties_roundtrip_through_json_value() {
        let node = Node::new(
            "abc",
            NodeKind::Method,
            "findById",
            "src/UserService.java",
            Language::Java,
            Span::point(10, 4),
            "repo-1",
        )
        .with_property("stereotype", "Service")
        .with_property("isStatic", false);

        assert_eq!(
            node.properties.get("stereotype"),
            Some(&Value::String("Service".to_string()))
        );
        assert_eq!(node.properties.get("isStatic"), Some(&Value::Bool(false)));
    }
}
