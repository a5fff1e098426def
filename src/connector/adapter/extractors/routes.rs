use regex::Regex;
use std::sync::OnceLock;

use crate::application::ParseOutput;
use crate::domain::{node_entity_id, EdgeRecord, EdgeType, Language, Node, NodeKind, Span, UiRoute};

fn react_router_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<Route\s+[^>]*path=["']([^"']+)["']"#).expect("valid regex"))
}

fn express_style_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:router|app)\.(get|post|put|delete|patch)\(\s*["']([^"']+)["']"#).expect("valid regex")
    })
}

fn vue_route_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"path:\s*["']([^"']+)["']"#).expect("valid regex"))
}

/// File-based routing conventions (Next.js `app/`/`pages/`, Nuxt, SvelteKit,
/// Remix): the route path is derived from the file's own location, not its
/// content, so this only needs `file_path`.
fn file_based_route(file_path: &str) -> Option<(String, crate::domain::RouteFramework)> {
    use crate::domain::RouteFramework;

    let lower = file_path.to_lowercase();
    if let Some(idx) = lower.find("/app/") {
        if lower.ends_with("page.tsx") || lower.ends_with("page.jsx") || lower.ends_with("page.ts") {
            return Some((route_from_segments(&file_path[idx + 5..]), RouteFramework::NextJsAppRouter));
        }
    }
    if let Some(idx) = lower.find("/pages/") {
        if !lower.contains("/api/") {
            return Some((route_from_segments(&file_path[idx + 7..]), RouteFramework::NextJsPagesRouter));
        }
    }
    None
}

fn route_from_segments(relative: &str) -> String {
    let trimmed = relative.trim_end_matches(|c: char| c != '/').trim_end_matches('/');
    let without_file = relative.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(trimmed);
    if without_file.is_empty() {
        "/".to_string()
    } else {
        format!("/{without_file}")
    }
}

/// Recognizes programmatic routing calls and file-based routing
/// conventions (§4.6 route detector) and emits `UIRoute` nodes with a
/// `RENDERS_PAGE` edge back to the owning file.
pub fn extract(
    content: &str,
    file_path: &str,
    language: Language,
    repository_id: &str,
    file_entity_id: &str,
    output: &mut ParseOutput,
) {
    use crate::domain::RouteFramework;

    let mut routes: Vec<(String, RouteFramework)> = Vec::new();

    if matches!(language, Language::JavaScript | Language::TypeScript) {
        for cap in react_router_pattern().captures_iter(content) {
            routes.push((cap[1].to_string(), RouteFramework::ReactRouter));
        }
        for cap in express_style_pattern().captures_iter(content) {
            routes.push((cap[2].to_string(), RouteFramework::ReactRouter));
        }
        if content.contains("Vue.Router") || content.contains("createRouter") {
            for cap in vue_route_pattern().captures_iter(content) {
                routes.push((cap[1].to_string(), RouteFramework::VueRouter));
            }
        }
        if let Some(route) = file_based_route(file_path) {
            routes.push(route);
        }
    }

    for (path, framework) in routes {
        let path_parameters = UiRoute::extract_path_parameters(&path);
        let is_dynamic = UiRoute::is_dynamic(&path);
        let qualified = format!("{}:{}", framework.as_str(), path);
        let entity_id = node_entity_id(NodeKind::UiRoute, &qualified);
        let mut node = Node::new(
            entity_id.clone(),
            NodeKind::UiRoute,
            path.clone(),
            file_path,
            language,
            Span::point(1, 0),
            repository_id,
        );
        node.set_property("path", path);
        node.set_property("framework", framework.as_str());
        node.set_property("isDynamic", is_dynamic);
        node.set_property("pathParameters", serde_json::to_value(&path_parameters).unwrap_or_default());
        output.nodes.push(node.clone());
        output.edges.push(EdgeRecord::new(EdgeType::RendersPage, file_entity_id, entity_id));
    }
}
