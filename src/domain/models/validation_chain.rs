use serde::{Deserialize, Serialize};

/// A guard clause recognized at the top of an entry method: null/empty
/// checks, assertions, precondition calls (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardClause {
    pub kind: GuardKind,
    pub subject: String,
    pub line_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    NullCheck,
    EmptyCheck,
    Assertion,
    Precondition,
}

/// A field-level constraint from annotations such as `@NotNull`, `@Size(…)`,
/// `@Pattern(…)` (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub field_name: String,
    pub constraint: String,
    pub arguments: Vec<String>,
}

/// The chain of guard clauses, downstream validator calls, and field
/// constraints collected from an entry method (§4.6). Emitted as a
/// `ValidationChain` node with `VALIDATES_FIELD`/`GUARDS_METHOD`/
/// `ENFORCES_RULE` edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationChain {
    pub entry_method_entity_id: String,
    pub guards: Vec<GuardClause>,
    pub downstream_validators: Vec<String>,
    pub field_constraints: Vec<FieldConstraint>,
}

impl ValidationChain {
    pub fn new(entry_method_entity_id: impl Into<String>) -> Self {
        Self {
            entry_method_entity_id: entry_method_entity_id.into(),
            guards: Vec::new(),
            downstream_validators: Vec::new(),
            field_constraints: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty() && self.downstream_validators.is_empty() && self.field_constraints.is_empty()
    }
}

/// A business rule surfaced by the validation-chain extractor and enriched
/// with the guard/constraint context it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedBusinessRule {
    pub description: String,
    pub source_entity_id: String,
    pub derived_from: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_reports_empty() {
        let chain = ValidationChain::new("method-1");
        assert!(chain.is_empty());
    }

    #[test]
    fn non_empty_chain_reports_not_empty() {
        let mut chain = ValidationChain::new("method-1");
        chain.guards.push(GuardClause {
            kind: GuardKind::NullCheck,
            subject: "id".to_string(),
            line_number: 12,
        });
        assert!(!chain.is_empty());
    }
}
