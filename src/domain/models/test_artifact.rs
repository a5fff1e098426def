use serde::{Deserialize, Serialize};

/// A single test case extracted from a test file (§4.6), regardless of the
/// per-language test framework it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub suite: Option<String>,
    pub is_skipped: bool,
    pub is_focused: bool,
    pub line_number: u32,
}

/// Path-pattern signals the test detector checks before falling back to
/// content sniffing (import/include statements) (§4.6).
pub fn looks_like_test_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains("/test/")
        || lower.contains("/tests/")
        || lower.contains("/__tests__/")
        || lower.contains("/spec/")
        || lower.ends_with("_test.rs")
        || lower.ends_with("_test.go")
        || lower.ends_with(".test.js")
        || lower.ends_with(".test.ts")
        || lower.ends_with(".spec.js")
        || lower.ends_with(".spec.ts")
        || lower.ends_with("test.java")
        || lower.ends_with("tests.java")
        || lower.ends_with("test.py")
        || lower.starts_with("test_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_test_path_conventions() {
        assert!(looks_like_test_path("src/tests/user_test.rs"));
        assert!(looks_like_test_path("__tests__/App.test.js"));
        assert!(looks_like_test_path("test_models.py"));
        assert!(looks_like_test_path("com/acme/UserServiceTest.java"));
        assert!(!looks_like_test_path("src/main/UserService.java"));
    }
}
