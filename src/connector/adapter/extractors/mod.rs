//! Specialized extractors layered on top of the per-language tree-sitter
//! pass (§4.6). Each one scans the same file content with its own
//! lightweight heuristics and folds whatever it finds into the shared
//! [`ParseOutput`] rather than maintaining a separate AST walk.

mod manifest;
mod routes;
mod sql;
mod stereotype;
mod test_detector;
mod validation;

pub use manifest::{classify_manifest, FrameworkTag};

use crate::application::ParseOutput;
use crate::domain::Language;

/// Runs every specialized extractor over one file's content. Called once
/// per file, after the grammar-driven declaration/reference pass has
/// populated `output` with the file's own nodes.
pub fn run_all(
    content: &[u8],
    file_path: &str,
    language: Language,
    repository_id: &str,
    file_entity_id: &str,
    output: &mut ParseOutput,
) {
    let text = String::from_utf8_lossy(content);

    sql::extract(&text, file_path, repository_id, output);
    routes::extract(&text, file_path, language, repository_id, file_entity_id, output);
    test_detector::extract(&text, file_path, language, repository_id, file_entity_id, output);
    stereotype::annotate(&text, repository_id, output);
    validation::extract(&text, file_path, repository_id, output);
}
