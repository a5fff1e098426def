use sha2::{Digest, Sha256};

use super::NodeKind;

/// A stable, deterministic identifier for a graph entity (node or edge).
///
/// `EntityId` is the sole key used by the graph writer's upsert logic
/// (`MERGE ... entityId`). It is always derived by [`fingerprint`] from a
/// `(kind, qualified-name)` pair — never from a counter or a random value —
/// so that two independent runs over identical inputs produce identical ids.
pub type EntityId = String;

/// Computes `entityId = fingerprint(kind, qualified-name)`.
///
/// The fingerprint is a SHA-256 digest of `"{kind}\u{1}{qualified_name}"`,
/// hex-encoded. The unit-separator byte between the two fields prevents
/// collisions between e.g. kind="Fo" name="oBar" and kind="FoBar" name="".
pub fn fingerprint(kind: &str, qualified_name: &str) -> EntityId {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update([0x1u8]);
    hasher.update(qualified_name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Computes the entity id for an edge: `fingerprint(type, source, target[, disambiguator])`.
pub fn edge_fingerprint(
    edge_type: &str,
    source_entity_id: &str,
    target_entity_id: &str,
    disambiguator: Option<&str>,
) -> EntityId {
    let qualified = match disambiguator {
        Some(d) => format!("{source_entity_id}\u{1}{target_entity_id}\u{1}{d}"),
        None => format!("{source_entity_id}\u{1}{target_entity_id}"),
    };
    fingerprint(edge_type, &qualified)
}

/// Normalizes a filesystem path to the forward-slash, non-absolute form used
/// throughout qualified names, regardless of host OS path separators.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Builders for the per-kind qualified-name schemes of §3.2.
///
/// Every helper here is a pure function: given the same inputs it always
/// returns the same string, which is what makes `fingerprint` deterministic
/// across runs.
pub struct QualifiedName;

impl QualifiedName {
    pub fn file(absolute_path: &str) -> String {
        normalize_path(absolute_path)
    }

    pub fn package_or_namespace(file_path: &str, name: &str) -> String {
        format!("{}:{}", normalize_path(file_path), name)
    }

    /// Fully-qualified class/interface/enum name, falling back to
    /// `filePath:name` when no package/namespace is known (file-scoped kinds).
    pub fn type_decl(package: Option<&str>, file_path: &str, name: &str) -> String {
        match package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{name}"),
            _ => format!("{}:{}", normalize_path(file_path), name),
        }
    }

    /// Method/field qualified name: `parentEntityId.memberName`.
    ///
    /// Per DESIGN.md's resolution of the overload open question, method
    /// names additionally encode parameter arity so overloads do not
    /// collide: `parentEntityId.memberName/argc`.
    pub fn member(parent_entity_id: &str, member_name: &str, arity: Option<usize>) -> String {
        match arity {
            Some(argc) => format!("{parent_entity_id}.{member_name}/{argc}"),
            None => format!("{parent_entity_id}.{member_name}"),
        }
    }

    /// Top-level function qualified name: `filePath:name:startLine`.
    pub fn top_level_function(file_path: &str, name: &str, start_line: u32) -> String {
        format!("{}:{}:{}", normalize_path(file_path), name, start_line)
    }

    /// Anonymous callback qualified name, location-disambiguated by the
    /// caller appending the enclosing function's own qualified name.
    pub fn anonymous_callback(caller_name: &str, arg_index: usize, file_path: &str, start_line: u32) -> String {
        format!(
            "callback_{caller_name}_arg{arg_index}@{}:{}",
            normalize_path(file_path),
            start_line
        )
    }

    pub fn sql_statement(file_path: &str, line_number: u32, stmt_type: &str, primary_table: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            normalize_path(file_path),
            line_number,
            stmt_type,
            primary_table
        )
    }
}

/// Computes the `entityId` for a node of a given kind from its qualified
/// name, using the kind's string tag as the fingerprint namespace.
pub fn node_entity_id(kind: NodeKind, qualified_name: &str) -> EntityId {
    fingerprint(kind.as_str(), qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("JavaClass", "com.acme.UserService");
        let b = fingerprint("JavaClass", "com.acme.UserService");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_distinguishes_kind_name_split() {
        let a = fingerprint("Fo", "oBar");
        let b = fingerprint("FoBar", "");
        assert_ne!(a, b);
    }

    #[test]
    fn member_qualified_name_encodes_arity() {
        let one_arg = QualifiedName::member("parent123", "findById", Some(1));
        let two_arg = QualifiedName::member("parent123", "findById", Some(2));
        assert_ne!(one_arg, two_arg);
        assert_eq!(one_arg, "parent123.findById/1");
    }

    #[test]
    fn normalize_path_converts_separators() {
        assert_eq!(normalize_path(r"src\main\Foo.java"), "src/main/Foo.java");
    }

    #[test]
    fn edge_fingerprint_distinguishes_disambiguator() {
        let a = edge_fingerprint("CALLS", "src1", "tgt1", None);
        let b = edge_fingerprint("CALLS", "src1", "tgt1", Some("ambiguous-0"));
        assert_ne!(a, b);
    }
}
