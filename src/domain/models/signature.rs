use serde::{Deserialize, Serialize};

/// One parameter of a function-like entity (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: Option<String>,
    pub default_value: Option<String>,
    pub is_variadic: bool,
    pub is_optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            default_value: None,
            is_variadic: false,
            is_optional: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
    PackagePrivate,
}

/// The full recorded signature of a function-like entity (§4.6): enough to
/// both disambiguate overloads (arity) and render a short display string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub visibility: Visibility,
    pub modifiers: Vec<String>,
    pub is_async: bool,
    pub is_static: bool,
    pub is_abstract: bool,
}

impl Signature {
    pub fn new() -> Self {
        Self {
            parameters: Vec::new(),
            return_type: None,
            visibility: Visibility::default(),
            modifiers: Vec::new(),
            is_async: false,
            is_static: false,
            is_abstract: false,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Pre-rendered short signature string, e.g. `findById(id: Long): User`.
    pub fn render_short(&self, name: &str) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| match &p.type_name {
                Some(t) => format!("{}: {}", p.name, t),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        match &self.return_type {
            Some(ret) => format!("{name}({params}): {ret}"),
            None => format!("{name}({params})"),
        }
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_matches_parameter_count() {
        let mut sig = Signature::new();
        sig.parameters.push(Parameter::new("id"));
        sig.parameters.push(Parameter::new("name"));
        assert_eq!(sig.arity(), 2);
    }

    #[test]
    fn render_short_includes_types_and_return() {
        let mut sig = Signature::new();
        let mut id = Parameter::new("id");
        id.type_name = Some("Long".to_string());
        sig.parameters.push(id);
        sig.return_type = Some("User".to_string());
        assert_eq!(sig.render_short("findById"), "findById(id: Long): User");
    }
}
