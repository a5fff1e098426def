use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Php,
    C,
    Cpp,
    CSharp,
    Sql,
    Xml,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "go" => Language::Go,
            "php" => Language::Php,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Language::Cpp,
            "cs" => Language::CSharp,
            "sql" => Language::Sql,
            "xml" | "xsd" | "wsdl" => Language::Xml,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "rust" => Language::Rust,
            "python" => Language::Python,
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "java" => Language::Java,
            "go" => Language::Go,
            "php" => Language::Php,
            "c" => Language::C,
            "cpp" | "c++" => Language::Cpp,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "sql" => Language::Sql,
            "xml" => Language::Xml,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Php => "php",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Sql => "sql",
            Language::Xml => "xml",
            Language::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Whether this language is driven by a tree-sitter grammar, as opposed
    /// to the regex-based SQL extractor or the quick-xml framework reader.
    pub fn has_treesitter_grammar(&self) -> bool {
        !matches!(self, Language::Sql | Language::Xml | Language::Unknown)
    }

    pub fn primary_extension(&self) -> &'static str {
        match self {
            Language::Rust => "rs",
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Java => "java",
            Language::Go => "go",
            Language::Php => "php",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "cs",
            Language::Sql => "sql",
            Language::Xml => "xml",
            Language::Unknown => "",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Rust => &["rs"],
            Language::Python => &["py", "pyi"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Java => &["java"],
            Language::Go => &["go"],
            Language::Php => &["php"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hh"],
            Language::CSharp => &["cs"],
            Language::Sql => &["sql"],
            Language::Xml => &["xml", "xsd", "wsdl"],
            Language::Unknown => &[],
        }
    }

    pub fn uses_braces(&self) -> bool {
        matches!(
            self,
            Language::Rust
                | Language::JavaScript
                | Language::TypeScript
                | Language::Java
                | Language::Go
                | Language::Php
                | Language::C
                | Language::Cpp
                | Language::CSharp
        )
    }

    pub fn is_statically_typed(&self) -> bool {
        matches!(
            self,
            Language::Rust
                | Language::TypeScript
                | Language::Java
                | Language::Go
                | Language::Php
                | Language::C
                | Language::Cpp
                | Language::CSharp
        )
    }

    pub fn all_supported() -> Vec<Language> {
        vec![
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
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("js"), Language::JavaScript);
        assert_eq!(Language::from_extension("ts"), Language::TypeScript);
        assert_eq!(Language::from_extension("java"), Language::Java);
        assert_eq!(Language::from_extension("go"), Language::Go);
        assert_eq!(Language::from_extension("php"), Language::Php);
        assert_eq!(Language::from_extension("cs"), Language::CSharp);
        assert_eq!(Language::from_extension("sql"), Language::Sql);
        assert_eq!(Language::from_extension("xml"), Language::Xml);
        assert_eq!(Language::from_extension("txt"), Language::Unknown);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("src/main.rs")), Language::Rust);
        assert_eq!(Language::from_path(Path::new("script.py")), Language::Python);
        assert_eq!(
            Language::from_path(Path::new("UserService.java")),
            Language::Java
        );
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::parse("rust"), Language::Rust);
        assert_eq!(Language::parse("PYTHON"), Language::Python);
        assert_eq!(Language::parse("unknown_lang"), Language::Unknown);
    }

    #[test]
    fn test_is_known() {
        assert!(Language::Rust.is_known());
        assert!(Language::Java.is_known());
        assert!(!Language::Unknown.is_known());
    }

    #[test]
    fn test_sql_and_xml_have_no_grammar() {
        assert!(!Language::Sql.has_treesitter_grammar());
        assert!(!Language::Xml.has_treesitter_grammar());
        assert!(Language::Java.has_treesitter_grammar());
    }

    #[test]
    fn test_all_supported() {
        let supported = Language::all_supported();
        assert!(supported.contains(&Language::Rust));
        assert!(supported.contains(&Language::Java));
        assert!(supported.contains(&Language::CSharp));
        assert!(supported.contains(&Language::Sql));
        assert!(!supported.contains(&Language::Unknown));
    }
}
