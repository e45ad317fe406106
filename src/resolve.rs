//! Field resolution
//!
//! Answers two questions for the dependency engine: is a field present in
//! a flattened field list (and is it carrying a value), and is a field
//! obtainable from any of a component's other consumed components without
//! an explicit mapping.

use crate::component::Component;
use crate::flatten::{flatten, FieldDescriptor};

/// Message attached when a field exists in the schema with a null value
pub const PRESENT_BUT_EMPTY: &str = "Field is present but empty";

/// Outcome of a presence lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPresence {
    pub found: bool,
    /// `None` when the field is absent outright; the present-but-empty
    /// text when it exists with a null value
    pub message: Option<String>,
}

impl FieldPresence {
    fn absent() -> Self {
        Self { found: false, message: None }
    }

    fn empty() -> Self {
        Self {
            found: false,
            message: Some(PRESENT_BUT_EMPTY.to_string()),
        }
    }

    fn found() -> Self {
        Self { found: true, message: None }
    }
}

/// Look up `path` in a flattened field list by exact match (first match
/// wins). A null value counts as present-but-empty, not as found.
pub fn verify_field_presence(fields: &[FieldDescriptor], path: &str) -> FieldPresence {
    match fields.iter().find(|f| f.path == path) {
        None => FieldPresence::absent(),
        Some(field) if field.value.is_null() => FieldPresence::empty(),
        Some(_) => FieldPresence::found(),
    }
}

/// Whether `field` is supplied by the input of any consumed component
/// other than `exclude_id`.
///
/// Models: even without an explicit mapping, a requirement is satisfied
/// when another dependency already guarantees the field upstream. Only a
/// real value counts; present-but-empty does not.
pub fn available_in_consumed(
    field: &str,
    exclude_id: Option<&str>,
    consumed_ids: &[String],
    components: &[Component],
) -> bool {
    for consumed_id in consumed_ids {
        if exclude_id == Some(consumed_id.as_str()) {
            continue;
        }
        let Some(consumed) = components.iter().find(|c| &c.id == consumed_id) else {
            continue;
        };
        let consumed_fields = flatten(&consumed.input);
        if verify_field_presence(&consumed_fields, field).found {
            return true;
        }
    }
    false
}
