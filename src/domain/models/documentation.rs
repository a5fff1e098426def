use serde::{Deserialize, Serialize};

/// A doc-comment tag normalized from its per-language spelling (`@return` →
/// `returns`, `:param:` → `param`, …) per §4.6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    pub value: String,
}

/// Normalized documentation extracted alongside a declaration (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Documentation {
    pub summary: Option<String>,
    pub raw_comment: Option<String>,
    pub tags: Vec<DocTag>,
    pub format: DocFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocFormat {
    #[default]
    PlainComment,
    Javadoc,
    Docstring,
    JsDoc,
    XmlDoc,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.raw_comment.is_none() && self.tags.is_empty()
    }

    pub fn normalize_tag_name(raw: &str) -> String {
        let trimmed = raw.trim_start_matches('@').trim_start_matches(':').trim_end_matches(':');
        match trimmed.to_lowercase().as_str() {
            "return" => "returns".to_string(),
            "param" => "param".to_string(),
            "throws" | "exception" => "throws".to_string(),
            "deprecated" => "deprecated".to_string(),
            "see" => "see".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_javadoc_return_tag() {
        assert_eq!(Documentation::normalize_tag_name("@return"), "returns");
        assert_eq!(Documentation::normalize_tag_name("@throws"), "throws");
    }

    #[test]
    fn empty_documentation_reports_empty() {
        assert!(Documentation::default().is_empty());
    }
}
