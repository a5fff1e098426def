use regex::Regex;
use std::sync::OnceLock;

use crate::application::ParseOutput;
use crate::domain::{
    node_entity_id, EdgeRecord, EdgeType, GuardClause, GuardKind, Node, NodeKind, Span, ValidationChain,
};

fn guard_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:if\s*\(?\s*(\w+)\s*(?:==\s*null|is\s+None|\.is_none\(\))|assert\s*\(?\s*(\w+)|Objects\.requireNonNull\(\s*(\w+))")
            .expect("valid regex")
    })
}

fn field_constraint_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(NotNull|NotEmpty|NotBlank|Size|Pattern|Min|Max|Email)(\(([^)]*)\))?\s*\n?\s*(?:private|public|protected)?\s*\w[\w<>\[\]]*\s+(\w+)\s*;").expect("valid regex"))
}

/// Finds the `Field` node with this name already emitted for this file
/// (by the base tree-sitter pass that runs before extractors fold in).
fn find_field<'a>(output: &'a ParseOutput, file_path: &str, name: &str) -> Option<&'a Node> {
    output
        .nodes
        .iter()
        .find(|n| n.file_path == file_path && n.kind == NodeKind::Field && n.name == name)
}

/// Finds the tightest enclosing `Method` node for a line, falling back to
/// the tightest enclosing `Class`/`Struct`/`Interface` node when the
/// constraint sits outside any method (e.g. a plain annotated field).
fn enclosing_container<'a>(output: &'a ParseOutput, file_path: &str, line: u32) -> Option<&'a Node> {
    output
        .nodes
        .iter()
        .filter(|n| n.file_path == file_path && n.kind == NodeKind::Method && n.span.start_line <= line)
        .max_by_key(|n| n.span.start_line)
        .or_else(|| {
            output
                .nodes
                .iter()
                .filter(|n| {
                    n.file_path == file_path
                        && matches!(n.kind, NodeKind::Class | NodeKind::Struct | NodeKind::Interface)
                        && n.span.start_line <= line
                })
                .max_by_key(|n| n.span.start_line)
        })
}

/// Collects guard clauses and field constraints for each `Method` node in
/// the file. Guard clauses become a `ValidationChain` node with a
/// `GUARDS_METHOD` edge to the method and, where a guarded subject matches a
/// known field, a `VALIDATES_FIELD` edge to it. Annotation-based field
/// constraints become an `EnrichedBusinessRule` node with an `ENFORCES_RULE`
/// edge from the enclosing method/class and, where the field is known, a
/// `VALIDATES_FIELD` edge to it (§4.6).
pub fn extract(content: &str, file_path: &str, repository_id: &str, output: &mut ParseOutput) {
    let method_entities: Vec<(String, u32, u32)> = output
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Method)
        .map(|n| (n.entity_id.clone(), n.span.start_line, n.span.end_line))
        .collect();

    let mut new_edges = Vec::new();

    for (method_id, start_line, end_line) in method_entities {
        let mut chain = ValidationChain::new(method_id.clone());

        for mat in guard_pattern().find_iter(content) {
            let line_number = content[..mat.start()].matches('\n').count() as u32 + 1;
            if line_number < start_line || line_number > end_line {
                continue;
            }
            let subject = mat
                .as_str()
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .find(|s| !s.is_empty() && *s != "if" && *s != "assert")
                .unwrap_or("")
                .to_string();
            chain.guards.push(GuardClause {
                kind: if mat.as_str().contains("assert") { GuardKind::Assertion } else { GuardKind::NullCheck },
                subject,
                line_number,
            });
        }

        if chain.is_empty() {
            continue;
        }

        let qualified = format!("{method_id}:validation-chain");
        let entity_id = node_entity_id(NodeKind::ValidationChain, &qualified);
        let node = Node::new(
            entity_id.clone(),
            NodeKind::ValidationChain,
            format!("{} validation", method_id),
            file_path,
            crate::domain::Language::Unknown,
            Span::point(start_line, 0),
            repository_id,
        );
        output.nodes.push(node);
        new_edges.push(EdgeRecord::new(EdgeType::GuardsMethod, entity_id.clone(), method_id));

        for guard in &chain.guards {
            if let Some(field) = find_field(output, file_path, &guard.subject) {
                new_edges.push(EdgeRecord::new(EdgeType::ValidatesField, entity_id.clone(), field.entity_id.clone()));
            }
        }
    }

    for cap in field_constraint_pattern().captures_iter(content) {
        let field_name = cap.get(4).map(|m| m.as_str()).unwrap_or("");
        let constraint = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        if field_name.is_empty() {
            continue;
        }
        let line_number = content[..cap.get(0).unwrap().start()].matches('\n').count() as u32 + 1;
        let qualified = format!("{file_path}:{field_name}:{constraint}");
        let entity_id = node_entity_id(NodeKind::EnrichedBusinessRule, &qualified);
        let mut node = Node::new(
            entity_id.clone(),
            NodeKind::EnrichedBusinessRule,
            format!("{field_name} must satisfy {constraint}"),
            file_path,
            crate::domain::Language::Unknown,
            Span::point(line_number, 0),
            repository_id,
        );
        node.set_property("field", field_name);
        node.set_property("constraint", constraint);
        output.nodes.push(node);

        if let Some(container) = enclosing_container(output, file_path, line_number) {
            new_edges.push(EdgeRecord::new(EdgeType::EnforcesRule, container.entity_id.clone(), entity_id.clone()));
            if let Some(field) = find_field(output, file_path, field_name) {
                new_edges.push(EdgeRecord::new(EdgeType::ValidatesField, container.entity_id.clone(), field.entity_id.clone()));
            }
        }
    }

    output.edges.extend(new_edges);
}
