use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteFramework {
    ReactRouter,
    VueRouter,
    Angular,
    NextJsAppRouter,
    NextJsPagesRouter,
    Nuxt,
    SvelteKit,
    Remix,
}

impl RouteFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteFramework::ReactRouter => "react-router",
            RouteFramework::VueRouter => "vue-router",
            RouteFramework::Angular => "angular",
            RouteFramework::NextJsAppRouter => "nextjs-app",
            RouteFramework::NextJsPagesRouter => "nextjs-pages",
            RouteFramework::Nuxt => "nuxt",
            RouteFramework::SvelteKit => "sveltekit",
            RouteFramework::Remix => "remix",
        }
    }
}

/// A `UIRoute`/`UIPage` entity recognized by the route detector (§4.6),
/// covering both programmatic routing APIs and file-based conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiRoute {
    pub path: String,
    pub path_parameters: Vec<String>,
    pub framework: RouteFramework,
    pub is_dynamic: bool,
    pub guards: Vec<String>,
    pub layout: Option<String>,
}

impl UiRoute {
    /// Extracts `:id`-and `[id]`-style path parameters from a route path.
    pub fn extract_path_parameters(path: &str) -> Vec<String> {
        path.split('/')
            .filter_map(|segment| {
                if let Some(stripped) = segment.strip_prefix(':') {
                    Some(stripped.to_string())
                } else if segment.starts_with('[') && segment.ends_with(']') {
                    Some(segment.trim_start_matches('[').trim_end_matches(']').trim_start_matches("...").to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn is_dynamic(path: &str) -> bool {
        path.contains(':') || path.contains('[')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_express_style_parameters() {
        assert_eq!(
            UiRoute::extract_path_parameters("/users/:id/posts/:postId"),
            vec!["id".to_string(), "postId".to_string()]
        );
    }

    #[test]
    fn extracts_nextjs_bracket_parameters() {
        assert_eq!(
            UiRoute::extract_path_parameters("/users/[id]"),
            vec!["id".to_string()]
        );
    }

    #[test]
    fn detects_dynamic_routes() {
        assert!(UiRoute::is_dynamic("/users/:id"));
        assert!(UiRoute::is_dynamic("/users/[id]"));
        assert!(!UiRoute::is_dynamic("/users"));
    }
}
