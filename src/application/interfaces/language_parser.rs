use async_trait::async_trait;

use crate::domain::{EdgeRecord, IndexError, Language, Node, SymbolicEdge};

/// One file's pass-1 parse output (§4.6): local nodes, concrete local edges
/// (containment), and symbolic edges whose target is a bare name the
/// cross-file resolver (C7) will rewrite in pass 2.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
    pub symbolic_edges: Vec<SymbolicEdge>,
}

impl ParseOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: ParseOutput) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
        self.symbolic_edges.extend(other.symbolic_edges);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.symbolic_edges.is_empty()
    }
}

/// Transforms one file's AST into a uniform node/edge IR (§4.6). One
/// implementation dispatches across every supported `Language` the way
/// `TreeSitterParser` does today; specialized extractors (SQL, routes,
/// tests, stereotypes, validation chains) run over the same AST and fold
/// their output into the same `ParseOutput`.
#[async_trait]
pub trait LanguageParser: Send + Sync {
    async fn parse_file(
        &self,
        content: &[u8],
        file_path: &str,
        language: Language,
        repository_id: &str,
    ) -> Result<ParseOutput, IndexError>;

    fn supported_languages(&self) -> Vec<Language>;

    fn supports_language(&self, language: Language) -> bool {
        self.supported_languages().contains(&language)
    }
}
