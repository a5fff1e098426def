use serde::{Deserialize, Serialize};

/// A framework identified from a dependency manifest file, used to tag
/// entities parsed from files under the same project root (§4.6: "Framework
/// detectors run over aggregated file sets and dependency manifests").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameworkTag {
    SpringBoot,
    React,
    Vue,
    Angular,
    NextJs,
    Django,
    Flask,
    GoModule,
}

impl FrameworkTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkTag::SpringBoot => "spring-boot",
            FrameworkTag::React => "react",
            FrameworkTag::Vue => "vue",
            FrameworkTag::Angular => "angular",
            FrameworkTag::NextJs => "nextjs",
            FrameworkTag::Django => "django",
            FrameworkTag::Flask => "flask",
            FrameworkTag::GoModule => "go-module",
        }
    }
}

/// Classifies the framework(s) in play from the content of a dependency
/// manifest (`package.json`, `pom.xml`, `requirements.txt`, `go.mod`),
/// identified by its own file name.
pub fn classify_manifest(file_name: &str, content: &str) -> Vec<FrameworkTag> {
    let mut tags = Vec::new();

    match file_name {
        "package.json" => {
            if content.contains("\"next\"") {
                tags.push(FrameworkTag::NextJs);
            }
            if content.contains("\"react\"") {
                tags.push(FrameworkTag::React);
            }
            if content.contains("\"vue\"") {
                tags.push(FrameworkTag::Vue);
            }
            if content.contains("\"@angular/core\"") {
                tags.push(FrameworkTag::Angular);
            }
        }
        "pom.xml" => {
            if content.contains("spring-boot") {
                tags.push(FrameworkTag::SpringBoot);
            }
        }
        "requirements.txt" => {
            if content.to_lowercase().contains("django") {
                tags.push(FrameworkTag::Django);
            }
            if content.to_lowercase().contains("flask") {
                tags.push(FrameworkTag::Flask);
            }
        }
        "go.mod" => tags.push(FrameworkTag::GoModule),
        _ => {}
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_spring_boot_from_pom() {
        let tags = classify_manifest("pom.xml", "<artifactId>spring-boot-starter-web</artifactId>");
        assert!(tags.contains(&FrameworkTag::SpringBoot));
    }

    #[test]
    fn detects_react_and_next_from_package_json() {
        let tags = classify_manifest("package.json", r#"{"dependencies": {"react": "^18.0.0", "next": "^14.0.0"}}"#);
        assert!(tags.contains(&FrameworkTag::React));
        assert!(tags.contains(&FrameworkTag::NextJs));
    }

    #[test]
    fn unknown_manifest_has_no_tags() {
        assert!(classify_manifest("Cargo.toml", "[package]").is_empty());
    }
}
