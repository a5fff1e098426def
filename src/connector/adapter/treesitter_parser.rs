use async_trait::async_trait;
use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Parser, Query, QueryCursor};

use crate::application::{LanguageParser, ParseOutput};
use crate::connector::adapter::extractors;
use crate::domain::{
    node_entity_id, EdgeRecord, EdgeType, IndexError, Language, Node, NodeKind, QualifiedName, Signature, Span,
    SymbolicEdge,
};

/// Strips surrounding quotes/angle-brackets from an import literal.
/// Go imports: `"fmt"` -> `fmt`. C++ includes: `"header.h"` -> `header.h`,
/// `<iostream>` -> `iostream`.
fn normalize_import_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.len() < 2 {
        return trimmed.to_string();
    }
    if (trimmed.starts_with('"') && trimmed.ends_with('"')) || (trimmed.starts_with('\'') && trimmed.ends_with('\'')) {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    trimmed.to_string()
}

/// Dispatches parsing across every supported language from one facade, each
/// language owning its own pair of tree-sitter query patterns: one for
/// declarations (§4.6 containment), one for references (symbolic edges).
/// SQL and XML have no grammar and are handled by the specialized extractors
/// directly over file content instead (`Language::has_treesitter_grammar`).
pub struct TreeSitterParser {
    supported_languages: Vec<Language>,
}

impl TreeSitterParser {
    pub fn new() -> Self {
        Self {
            supported_languages: vec![
                Language::Rust,
                Language::Python,
                Language::JavaScript,
                Language::TypeScript,
                Language::Java,
                Language::Go,
                Language::Php,
                Language::C,
                Language::Cpp,
                Language::CSharp,
                Language::Sql,
                Language::Xml,
            ],
        }
    }

    fn get_ts_language(&self, language: Language) -> Option<tree_sitter::Language> {
        match language {
            Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
            Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
            Language::Php => Some(tree_sitter_php::LANGUAGE_PHP.into()),
            Language::C => Some(tree_sitter_cpp::LANGUAGE.into()),
            Language::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
            Language::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
            Language::Sql | Language::Xml | Language::Unknown => None,
        }
    }

    fn get_declaration_query(&self, language: Language) -> &'static str {
        match language {
            Language::Rust => {
                r#"
                (function_item name: (identifier) @name) @function
                (struct_item name: (type_identifier) @name) @struct
                (enum_item name: (type_identifier) @name) @enum
                (trait_item name: (type_identifier) @name) @trait
                (mod_item name: (identifier) @name) @module
                "#
            }
            Language::Python => {
                r#"
                (function_definition name: (identifier) @name) @function
                (class_definition name: (identifier) @name) @class
                "#
            }
            Language::JavaScript => {
                r#"
                (function_declaration name: (identifier) @name) @function
                (class_declaration name: (identifier) @name) @class
                (method_definition name: (property_identifier) @name) @function
                "#
            }
            Language::TypeScript => {
                r#"
                (function_declaration name: (identifier) @name) @function
                (class_declaration name: (type_identifier) @name) @class
                (method_definition name: (property_identifier) @name) @function
                (interface_declaration name: (type_identifier) @name) @interface
                "#
            }
            Language::Java => {
                r#"
                (class_declaration name: (identifier) @name) @class
                (interface_declaration name: (identifier) @name) @interface
                (enum_declaration name: (identifier) @name) @enum
                (method_declaration name: (identifier) @name) @function
                (field_declaration declarator: (variable_declarator name: (identifier) @name)) @field
                "#
            }
            Language::Go => {
                r#"
                (function_declaration name: (identifier) @name) @function
                (method_declaration name: (field_identifier) @name) @function
                (type_declaration (type_spec name: (type_identifier) @name)) @struct
                "#
            }
            Language::Php => {
                r#"
                (function_definition name: (name) @name) @function
                (method_declaration name: (name) @name) @function
                (class_declaration name: (name) @name) @class
                (interface_declaration name: (name) @name) @interface
                (trait_declaration name: (name) @name) @trait
                "#
            }
            Language::C | Language::Cpp => {
                r#"
                (class_specifier name: (type_identifier) @name) @class
                (struct_specifier name: (type_identifier) @name) @struct
                (function_definition declarator: (function_declarator declarator: (identifier) @name)) @function
                (function_definition declarator: (function_declarator declarator: (field_identifier) @name)) @function
                "#
            }
            Language::CSharp => {
                r#"
                (class_declaration name: (identifier) @name) @class
                (interface_declaration name: (identifier) @name) @interface
                (struct_declaration name: (identifier) @name) @struct
                (enum_declaration name: (identifier) @name) @enum
                (method_declaration name: (identifier) @name) @function
                "#
            }
            Language::Sql | Language::Xml | Language::Unknown => "",
        }
    }

    fn get_reference_query(&self, language: Language) -> &'static str {
        match language {
            Language::Rust => {
                r#"
                (call_expression function: (identifier) @callee) @call
                (call_expression function: (field_expression field: (field_identifier) @callee)) @method_call
                (call_expression function: (scoped_identifier name: (identifier) @callee)) @call
                (use_declaration argument: (scoped_identifier name: (identifier) @callee)) @import
                (use_declaration argument: (identifier) @callee) @import
                "#
            }
            Language::Python => {
                r#"
                (call function: (identifier) @callee) @call
                (call function: (attribute attribute: (identifier) @callee)) @method_call
                (import_statement name: (dotted_name (identifier) @callee)) @import
                (import_from_statement name: (dotted_name (identifier) @callee)) @import
                "#
            }
            Language::JavaScript | Language::TypeScript => {
                r#"
                (call_expression function: (identifier) @callee) @call
                (call_expression function: (member_expression property: (property_identifier) @callee)) @method_call
                (new_expression constructor: (identifier) @callee) @instantiation
                (import_statement (import_clause (identifier) @callee)) @import
                "#
            }
            Language::Java => {
                r#"
                (method_invocation name: (identifier) @callee) @method_call
                (object_creation_expression type: (type_identifier) @callee) @instantiation
                (import_declaration (scoped_identifier name: (identifier) @callee)) @import
                (superclass (type_identifier) @callee) @inheritance
                (super_interfaces (type_list (type_identifier) @callee)) @implementation
                "#
            }
            Language::Go => {
                r#"
                (call_expression function: (identifier) @callee) @call
                (call_expression function: (selector_expression field: (field_identifier) @callee)) @call
                (import_spec path: (interpreted_string_literal) @callee) @import
                "#
            }
            Language::Php => {
                r#"
                (function_call_expression function: (name) @callee) @call
                (member_call_expression name: (name) @callee) @method_call
                (object_creation_expression (name) @callee) @instantiation
                (namespace_use_clause (qualified_name) @callee) @import
                (base_clause (name) @callee) @inheritance
                (class_interface_clause (name) @callee) @implementation
                "#
            }
            Language::C | Language::Cpp => {
                r#"
                (call_expression function: (identifier) @callee) @call
                (call_expression function: (field_expression field: (field_identifier) @callee)) @method_call
                (preproc_include path: (string_literal) @callee) @import
                (preproc_include path: (system_lib_string) @callee) @import
                (base_class_clause (type_identifier) @callee) @inheritance
                "#
            }
            Language::CSharp => {
                r#"
                (invocation_expression function: (identifier) @callee) @call
                (invocation_expression function: (member_access_expression name: (identifier) @callee)) @method_call
                (object_creation_expression type: (identifier) @callee) @instantiation
                (using_directive (identifier) @callee) @import
                (base_list (identifier) @callee) @inheritance
                "#
            }
            Language::Sql | Language::Xml | Language::Unknown => "",
        }
    }

    fn capture_to_node_kind(capture_name: &str) -> NodeKind {
        match capture_name {
            "function" => NodeKind::Method,
            "class" => NodeKind::Class,
            "struct" => NodeKind::Struct,
            "enum" => NodeKind::Enum,
            "trait" | "interface" => NodeKind::Interface,
            "module" => NodeKind::Package,
            "field" => NodeKind::Field,
            _ => NodeKind::Class,
        }
    }

    fn capture_to_edge_type(capture_name: &str) -> EdgeType {
        match capture_name {
            "call" | "method_call" | "instantiation" => EdgeType::Calls,
            "import" => EdgeType::Imports,
            "inheritance" => EdgeType::Extends,
            "implementation" => EdgeType::Implements,
            _ => EdgeType::DependsOn,
        }
    }
}

impl Default for TreeSitterParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageParser for TreeSitterParser {
    async fn parse_file(
        &self,
        content: &[u8],
        file_path: &str,
        language: Language,
        repository_id: &str,
    ) -> Result<ParseOutput, IndexError> {
        let mut output = ParseOutput::new();

        let file_entity_id = node_entity_id(NodeKind::File, &QualifiedName::file(file_path));
        let file_node = Node::new(
            file_entity_id.clone(),
            NodeKind::File,
            file_path,
            file_path,
            language,
            Span::point(1, 0),
            repository_id,
        );
        output.nodes.push(file_node);

        if language.has_treesitter_grammar() {
            let source = String::from_utf8_lossy(content);
            self.parse_with_grammar(&source, file_path, language, repository_id, &file_entity_id, &mut output)?;
        }

        extractors::run_all(content, file_path, language, repository_id, &file_entity_id, &mut output);

        debug!(file_path, nodes = output.nodes.len(), edges = output.edges.len(), "parsed file");
        Ok(output)
    }

    fn supported_languages(&self) -> Vec<Language> {
        self.supported_languages.clone()
    }
}

impl TreeSitterParser {
    fn parse_with_grammar(
        &self,
        content: &str,
        file_path: &str,
        language: Language,
        repository_id: &str,
        file_entity_id: &str,
        output: &mut ParseOutput,
    ) -> Result<(), IndexError> {
        let ts_language = self
            .get_ts_language(language)
            .ok_or_else(|| IndexError::parse(file_path, format!("unsupported language: {language:?}")))?;

        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| IndexError::parse(file_path, format!("failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| IndexError::parse(file_path, "tree-sitter failed to parse file"))?;
        let text_bytes = content.as_bytes();

        let decl_source = self.get_declaration_query(language);
        if !decl_source.is_empty() {
            let query = Query::new(&ts_language, decl_source)
                .map_err(|e| IndexError::parse(file_path, format!("bad declaration query: {e}")))?;
            let capture_names: Vec<&str> = query.capture_names().to_vec();
            let mut cursor = QueryCursor::new();
            let mut matches_iter = cursor.matches(&query, tree.root_node(), text_bytes);

            while let Some(query_match) = matches_iter.next() {
                let mut name: Option<String> = None;
                let mut main_node = None;
                let mut kind = NodeKind::Class;

                for capture in query_match.captures {
                    let capture_name = capture_names.get(capture.index as usize).copied().unwrap_or("");
                    if capture_name == "name" {
                        name = Some(content[capture.node.byte_range()].to_string());
                    } else {
                        main_node = Some(capture.node);
                        kind = Self::capture_to_node_kind(capture_name);
                    }
                }

                if let (Some(node), Some(name)) = (main_node, name) {
                    let start_line = node.start_position().row as u32 + 1;
                    let end_line = node.end_position().row as u32 + 1;
                    let start_column = node.start_position().column as u32;
                    let end_column = node.end_position().column as u32;

                    let qualified_name = match kind {
                        NodeKind::Method | NodeKind::Field => {
                            QualifiedName::member(file_entity_id, &name, None)
                        }
                        NodeKind::Class | NodeKind::Interface | NodeKind::Enum | NodeKind::Struct => {
                            QualifiedName::type_decl(None, file_path, &name)
                        }
                        _ => QualifiedName::top_level_function(file_path, &name, start_line),
                    };
                    let entity_id = node_entity_id(kind, &qualified_name);

                    let mut signature = Signature::new();
                    if matches!(kind, NodeKind::Method) {
                        signature.return_type = None;
                    }
                    let mut graph_node = Node::new(
                        entity_id.clone(),
                        kind,
                        name,
                        file_path,
                        language,
                        Span {
                            start_line,
                            end_line,
                            start_column,
                            end_column,
                        },
                        repository_id,
                    );
                    graph_node.set_property("signature", serde_json::to_value(&signature).unwrap_or_default());
                    output.nodes.push(graph_node);

                    let containment_edge_type = match kind {
                        NodeKind::Method => EdgeType::HasMethod,
                        NodeKind::Field => EdgeType::HasField,
                        NodeKind::Class | NodeKind::Interface | NodeKind::Enum | NodeKind::Struct => {
                            EdgeType::DefinesClass
                        }
                        _ => EdgeType::Contains,
                    };
                    output
                        .edges
                        .push(EdgeRecord::new(containment_edge_type, file_entity_id, entity_id));
                }
            }
        }

        let ref_source = self.get_reference_query(language);
        if ref_source.is_empty() {
            return Ok(());
        }
        let query = Query::new(&ts_language, ref_source)
            .map_err(|e| IndexError::parse(file_path, format!("bad reference query: {e}")))?;
        let capture_names: Vec<&str> = query.capture_names().to_vec();
        let mut cursor = QueryCursor::new();
        let mut matches_iter = cursor.matches(&query, tree.root_node(), text_bytes);

        while let Some(query_match) = matches_iter.next() {
            let mut callee: Option<String> = None;
            let mut edge_type = EdgeType::DependsOn;

            for capture in query_match.captures {
                let capture_name = capture_names.get(capture.index as usize).copied().unwrap_or("");
                if capture_name == "callee" {
                    callee = Some(content[capture.node.byte_range()].to_string());
                } else {
                    edge_type = Self::capture_to_edge_type(capture_name);
                }
            }

            if let Some(mut target) = callee {
                if edge_type == EdgeType::Imports {
                    target = normalize_import_path(&target);
                }
                if target.len() < 2 {
                    continue;
                }
                output
                    .symbolic_edges
                    .push(SymbolicEdge::new(edge_type, file_entity_id, target, file_path));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TreeSitterParser {
        TreeSitterParser::new()
    }

    #[tokio::test]
    async fn parses_rust_function_and_struct() {
        let content = br#"
            struct Widget { id: u32 }

            fn build_widget() -> Widget {
                Widget { id: 1 }
            }
        "#;
        let output = parser()
            .parse_file(content, "src/widget.rs", Language::Rust, "repo-1")
            .await
            .unwrap();

        assert!(output.nodes.iter().any(|n| n.kind == NodeKind::Struct && n.name == "Widget"));
        assert!(output.nodes.iter().any(|n| n.kind == NodeKind::Method && n.name == "build_widget"));
        assert!(output.edges.iter().any(|e| e.edge_type == EdgeType::DefinesClass));
    }

    #[tokio::test]
    async fn parses_python_call_as_symbolic_edge() {
        let content = b"def handler():\n    helper()\n";
        let output = parser()
            .parse_file(content, "src/handler.py", Language::Python, "repo-1")
            .await
            .unwrap();

        assert!(output
            .symbolic_edges
            .iter()
            .any(|e| e.target_symbol == "helper" && e.edge_type == EdgeType::Calls));
    }

    #[tokio::test]
    async fn unsupported_grammar_still_emits_file_node() {
        let content = b"SELECT * FROM users;";
        let output = parser()
            .parse_file(content, "queries/users.sql", Language::Sql, "repo-1")
            .await
            .unwrap();

        assert!(output.nodes.iter().any(|n| n.kind == NodeKind::File));
    }

    #[test]
    fn supports_every_declared_language() {
        let langs = parser().supported_languages();
        assert!(langs.contains(&Language::Java));
        assert!(langs.contains(&Language::CSharp));
        assert!(langs.contains(&Language::Sql));
        assert!(!langs.contains(&Language::Unknown));
    }
}
