//! Mapping record operations
//!
//! Pure helpers the mutation and interactive layers build on: creating a
//! mapping from a selected candidate field, list edits, lookups, cleanup
//! when a schema field disappears, completeness against a required-field
//! list, and the data behind the "add mapping" affordance (which fields
//! can satisfy a target, and where a component's fields are used
//! elsewhere).

use serde::Serialize;
use tracing::warn;

use crate::component::{Component, ComponentId, Mapping};
use crate::error::{Result, WiremapError};
use crate::flatten::field_paths;

/// A field offered to satisfy a mapping target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingCandidate {
    pub field: String,
    /// Name of the component supplying the field
    pub source: String,
    pub source_id: ComponentId,
    /// Human-facing label, `"<path> (from <name>)"`
    pub display: String,
}

impl MappingCandidate {
    fn new(field: String, component: &Component) -> Self {
        let display = format!("{} (from {})", field, component.name);
        Self {
            field,
            source: component.name.clone(),
            source_id: component.id.clone(),
            display,
        }
    }
}

/// An occurrence of a component's field as a mapping source elsewhere
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldUsage {
    pub field: String,
    pub used_by_component: String,
    pub used_by_component_id: ComponentId,
    pub mapped_to_field: String,
}

/// Which side of a mapping a component id is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSide {
    Target,
    Source,
}

/// A required (component, field) pair for the completeness check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredField {
    pub component_id: ComponentId,
    pub field: String,
}

/// Result of checking mappings against a required-field list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingCompleteness {
    pub is_complete: bool,
    pub missing: Vec<RequiredField>,
    pub total_required: usize,
    pub total_mapped: usize,
}

/// Build a mapping from an autocomplete selection.
///
/// The candidate's `source` names the component the selected field comes
/// from; when that is not the component being edited, the mapping becomes
/// cross-component and records the source component's id.
pub fn create_field_mapping(
    target_field: &str,
    target_component_name: &str,
    candidate: &MappingCandidate,
    components: &[Component],
    current_component_id: &str,
    current_component_name: &str,
) -> Result<Mapping> {
    if target_field.is_empty() {
        return Err(WiremapError::InvalidMapping("missing target field".into()));
    }
    if target_component_name.is_empty() {
        return Err(WiremapError::InvalidMapping(
            "missing target component name".into(),
        ));
    }
    if current_component_id.is_empty() {
        return Err(WiremapError::InvalidMapping(
            "current component ID is required".into(),
        ));
    }
    if candidate.field.is_empty() || candidate.source.is_empty() {
        return Err(WiremapError::InvalidMapping(
            "selected field must carry a field path and a source component".into(),
        ));
    }

    let target_component = components
        .iter()
        .find(|c| c.name == target_component_name)
        .ok_or_else(|| {
            WiremapError::InvalidMapping(format!(
                "target component not found: {}",
                target_component_name
            ))
        })?;

    let mapping = Mapping::new(
        target_component.id.clone(),
        target_field,
        candidate.field.clone(),
    );

    if candidate.source == current_component_name {
        return Ok(mapping);
    }

    let source_component = components
        .iter()
        .find(|c| c.name == candidate.source)
        .ok_or_else(|| {
            WiremapError::InvalidMapping(format!(
                "source component not found: {}",
                candidate.source
            ))
        })?;

    Ok(mapping.with_source(source_component.id.clone()))
}

/// Append a mapping, returning the updated list
pub fn add_mapping(mappings: &[Mapping], new_mapping: Mapping) -> Vec<Mapping> {
    let mut updated = mappings.to_vec();
    updated.push(new_mapping);
    updated
}

/// Remove the first mapping matching target component, target field, and
/// source field. An unmatched removal leaves the list unchanged.
pub fn remove_mapping(mappings: &[Mapping], to_remove: &Mapping) -> Vec<Mapping> {
    let Some(index) = mappings.iter().position(|m| {
        m.target_component_id == to_remove.target_component_id
            && m.target_field == to_remove.target_field
            && m.source_field == to_remove.source_field
    }) else {
        warn!(
            target_field = %to_remove.target_field,
            "mapping not found for removal"
        );
        return mappings.to_vec();
    };

    let mut updated = mappings.to_vec();
    updated.remove(index);
    updated
}

/// Whether a (target component, target field) pair already has a mapping
pub fn has_mapping(mappings: &[Mapping], target_component_id: &str, target_field: &str) -> bool {
    mappings.iter().any(|m| {
        m.target_component_id == target_component_id && m.target_field == target_field
    })
}

/// Mappings touching a component on the given side
pub fn mappings_for_component<'a>(
    mappings: &'a [Mapping],
    component_id: &str,
    side: MappingSide,
) -> Vec<&'a Mapping> {
    mappings
        .iter()
        .filter(|m| match side {
            MappingSide::Target => m.target_component_id == component_id,
            MappingSide::Source => m.source_component_id.as_deref() == Some(component_id),
        })
        .collect()
}

/// Drop mappings that reference a deleted schema field on either side
pub fn cleanup_mappings_for_deleted_field(
    mappings: &[Mapping],
    deleted_field_path: &str,
) -> Vec<Mapping> {
    mappings
        .iter()
        .filter(|m| m.target_field != deleted_field_path && m.source_field != deleted_field_path)
        .cloned()
        .collect()
}

/// Check that every required (component, field) pair has a mapping
pub fn validate_completeness(
    mappings: &[Mapping],
    required: &[RequiredField],
) -> MappingCompleteness {
    let missing: Vec<RequiredField> = required
        .iter()
        .filter(|r| !has_mapping(mappings, &r.component_id, &r.field))
        .cloned()
        .collect();

    MappingCompleteness {
        is_complete: missing.is_empty(),
        total_required: required.len(),
        total_mapped: required.len() - missing.len(),
        missing,
    }
}

/// Fields that can be offered to satisfy a target component's field:
/// the current component's own input and output, plus the outputs of its
/// consumed components (excluding the target itself).
pub fn mapping_candidates(
    current_component_id: &str,
    target_component_name: &str,
    components: &[Component],
) -> Vec<MappingCandidate> {
    let Some(current) = components.iter().find(|c| c.id == current_component_id) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();

    for path in field_paths(&current.input) {
        candidates.push(MappingCandidate::new(path, current));
    }
    for path in field_paths(&current.output) {
        candidates.push(MappingCandidate::new(path, current));
    }

    for consumed_id in &current.consumes {
        let Some(consumed) = components.iter().find(|c| &c.id == consumed_id) else {
            continue;
        };
        if consumed.name == target_component_name {
            continue;
        }
        for path in field_paths(&consumed.output) {
            candidates.push(MappingCandidate::new(path, consumed));
        }
    }

    candidates
}

/// Occurrences of the component's fields being used as mapping sources in
/// other components
pub fn field_usage(current_component_id: &str, components: &[Component]) -> Vec<FieldUsage> {
    let Some(current) = components.iter().find(|c| c.id == current_component_id) else {
        return Vec::new();
    };

    let mut current_fields = field_paths(&current.input);
    current_fields.extend(field_paths(&current.output));

    components
        .iter()
        .filter(|c| c.id != current_component_id)
        .flat_map(|component| {
            component
                .mappings
                .iter()
                .filter(|m| {
                    m.source_component_id.as_deref() == Some(current_component_id)
                        && current_fields.contains(&m.source_field)
                })
                .map(|m| FieldUsage {
                    field: m.source_field.clone(),
                    used_by_component: component.name.clone(),
                    used_by_component_id: component.id.clone(),
                    mapped_to_field: m.target_field.clone(),
                })
        })
        .collect()
}
