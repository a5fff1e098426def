use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::application::ParseOutput;
use crate::domain::{
    looks_like_test_path, node_entity_id, EdgeRecord, EdgeType, Language, Node, NodeKind, Span, SymbolicEdge,
};

fn test_case_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*(?:(#\[test\])|it\(\s*["']([^"']+)["']|test\(\s*["']([^"']+)["']|def\s+(test_\w+)|@Test\b)"#,
        )
        .expect("valid regex")
    })
}

fn content_sniff_import(content: &str) -> bool {
    content.contains("junit") || content.contains("pytest") || content.contains("jest") || content.contains("#[test]")
}

/// Strips a common test-file naming marker off a bare file stem (no
/// directory, no extension), returning the stem of the source file it
/// probably tests. `None` when the stem carries none of the recognized
/// markers — this is a naming-convention heuristic, not a real import/module
/// resolution, so it only covers the JUnit/pytest/jest conventions
/// `content_sniff_import` already assumes.
fn strip_test_marker(stem: &str) -> Option<String> {
    for suffix in [".test", ".spec", "_test", "Test", "Tests", "Spec"] {
        if let Some(stripped) = stem.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return Some(stripped.to_string());
            }
        }
    }
    for prefix in ["test_", "Test"] {
        if let Some(stripped) = stem.strip_prefix(prefix) {
            if !stripped.is_empty() {
                return Some(stripped.to_string());
            }
        }
    }
    None
}

/// Infers the full path of the source file a test file probably covers by
/// stripping a test-naming marker from its basename while keeping its
/// directory and extension, since `File` nodes are named by their full
/// path (§4.7's `TESTS` edge resolves against that name, not a bare symbol).
fn inferred_tested_file_path(file_path: &str) -> Option<String> {
    let path = Path::new(file_path);
    let stem = path.file_stem()?.to_str()?;
    let stripped_stem = strip_test_marker(stem)?;

    let mut candidate = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(&stripped_stem),
        _ => std::path::PathBuf::from(&stripped_stem),
    };
    if let Some(ext) = path.extension() {
        candidate.set_extension(ext);
    }
    Some(candidate.to_string_lossy().into_owned())
}

/// Classifies test files by path convention first, content sniffing second
/// (§4.6), and extracts one `TestCase` node per recognized test marker,
/// contained by the owning file. When the test file's basename carries a
/// recognized marker, also emits a `TESTS` symbolic edge to the inferred
/// source file, resolved against the loaded node set by the cross-file
/// resolver in pass 2.
pub fn extract(
    content: &str,
    file_path: &str,
    language: Language,
    repository_id: &str,
    file_entity_id: &str,
    output: &mut ParseOutput,
) {
    let is_test = looks_like_test_path(file_path) || content_sniff_import(content);
    if !is_test {
        return;
    }

    let mut found_any = false;
    for mat in test_case_pattern().find_iter(content) {
        found_any = true;
        let line_number = content[..mat.start()].matches('\n').count() as u32 + 1;
        let name = mat
            .as_str()
            .rsplit(['"', '\''])
            .nth(1)
            .unwrap_or(mat.as_str())
            .trim()
            .to_string();
        let qualified = format!("{file_path}:{line_number}:{name}");
        let entity_id = node_entity_id(NodeKind::TestCase, &qualified);
        let is_skipped = content[..mat.start()].lines().last().map(|l| l.contains("skip")).unwrap_or(false);
        let mut node = Node::new(entity_id.clone(), NodeKind::TestCase, name, file_path, language, Span::point(line_number, 0), repository_id);
        node.set_property("isSkipped", is_skipped);
        node.set_property("isFocused", mat.as_str().contains(".only"));
        output.nodes.push(node);
        output.edges.push(EdgeRecord::new(EdgeType::Contains, file_entity_id, entity_id));
    }

    if found_any {
        // Tag the owning File node so downstream queries can find it without
        // re-running path/content sniffing.
        if let Some(file_node) = output.nodes.iter_mut().find(|n| n.entity_id == file_entity_id) {
            file_node.extra_labels.push("TestFile".to_string());
        }

        if let Some(target_symbol) = inferred_tested_file_path(file_path) {
            output.symbolic_edges.push(SymbolicEdge {
                edge_type: EdgeType::Tests,
                source_entity_id: file_entity_id.to_string(),
                target_symbol,
                source_file_path: file_path.to_string(),
                properties: BTreeMap::new(),
            });
        }
    }
}
