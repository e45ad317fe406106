//! Dependency and mapping validation engine
//!
//! For one component, resolves every field required by its consumed
//! components through a fixed-priority rule chain and reports the
//! unresolved ones with a diagnostic message a user can act on:
//!
//! 1. the field is present in the component's own input — satisfied;
//! 2. an explicit mapping exists for (consumed component, field) — the
//!    mapping is validated on its own terms (mappings take precedence;
//!    cross-component availability is never consulted here);
//! 3. otherwise the field is missing.
//!
//! Resolution failures are not errors: they are the output. The one hard
//! failure is a component id that does not exist in the collection, which
//! signals a caller bug rather than a data-quality issue.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::component::{Component, ComponentId};
use crate::error::{Result, WiremapError};
use crate::flatten::{field_paths, flatten, FieldDescriptor, FieldType};
use crate::resolve::{available_in_consumed, verify_field_presence};

/// A required field that could not be proven satisfied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingField {
    pub path: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub value: Value,
    /// Id of the consumed component that requires the field
    pub from: ComponentId,
    /// `None` when the field is simply absent; otherwise the reason the
    /// existing state does not satisfy it
    pub message: Option<String>,
}

impl MissingField {
    fn new(descriptor: FieldDescriptor, from: ComponentId, message: Option<String>) -> Self {
        Self {
            path: descriptor.path,
            ty: descriptor.ty,
            value: descriptor.value,
            from,
            message,
        }
    }
}

/// Per-component dependency report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyReport {
    pub has_missing_dependencies: bool,
    pub missing_fields: Vec<MissingField>,
}

impl DependencyReport {
    fn from_missing(missing_fields: Vec<MissingField>) -> Self {
        Self {
            has_missing_dependencies: !missing_fields.is_empty(),
            missing_fields,
        }
    }
}

/// Check every field requirement the consumed components impose on one
/// component.
///
/// Non-endpoints and components without `consumes` entries are never
/// checked. Consumed components are skipped when they do not exist in the
/// snapshot, are not endpoints, or carry no input schema. Fails fast when
/// `component_id` itself is unknown.
pub fn check_dependencies(
    component_id: &str,
    components: &[Component],
) -> Result<DependencyReport> {
    let component = components
        .iter()
        .find(|c| c.id == component_id)
        .ok_or_else(|| WiremapError::ComponentNotFound(component_id.to_string()))?;

    if !component.is_endpoint() || component.consumes.is_empty() {
        return Ok(DependencyReport::default());
    }

    let current_fields = flatten(&component.input);
    let mut missing_fields = Vec::new();

    for consumed_id in &component.consumes {
        let Some(consumed) = components.iter().find(|c| &c.id == consumed_id) else {
            continue;
        };
        if !consumed.is_endpoint() {
            continue;
        }

        for field in flatten(&consumed.input) {
            let presence = verify_field_presence(&current_fields, &field.path);
            if presence.found {
                continue;
            }

            let Some(mapping) = component.mapping_for(&consumed.id, &field.path) else {
                missing_fields.push(MissingField::new(
                    field,
                    consumed.id.clone(),
                    presence.message,
                ));
                continue;
            };

            match &mapping.source_component_id {
                // Same-component mapping: source must exist in our own input
                None => {
                    let source = verify_field_presence(&current_fields, &mapping.source_field);
                    if !source.found {
                        let message = source.message.unwrap_or_else(|| {
                            format!(
                                "Invalid mapping: {} not found in the input of component {}",
                                mapping.source_field, component.name
                            )
                        });
                        missing_fields.push(MissingField::new(
                            field,
                            consumed.id.clone(),
                            Some(message),
                        ));
                    }
                }
                // Cross-component mapping: source field must exist in the
                // named component's output
                Some(source_id) => {
                    match components.iter().find(|c| &c.id == source_id) {
                        None => missing_fields.push(MissingField::new(
                            field,
                            consumed.id.clone(),
                            Some("Invalid existing mapping: source component not found".into()),
                        )),
                        Some(source_component) => {
                            let source_fields = flatten(&source_component.output);
                            let source =
                                verify_field_presence(&source_fields, &mapping.source_field);
                            if !source.found {
                                let message = source.message.unwrap_or_else(|| {
                                    format!(
                                        "Invalid mapping: {} not found in source component {}",
                                        mapping.source_field, source_component.name
                                    )
                                });
                                missing_fields.push(MissingField::new(
                                    field,
                                    consumed.id.clone(),
                                    Some(message),
                                ));
                            }
                        }
                    }
                }
            }
        }
    }

    debug!(
        component = %component.name,
        missing = missing_fields.len(),
        "dependency check complete"
    );

    Ok(DependencyReport::from_missing(missing_fields))
}

/// A field the interactive layer should offer a mapping prompt for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedField {
    pub field: String,
    pub from_component: String,
    pub from_component_id: ComponentId,
}

/// Outcome of the permissive, prompt-driving validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDependencyOutcome {
    pub has_valid_dependencies: bool,
    pub has_missing_dependencies: bool,
    pub missing_fields: Vec<UnmappedField>,
}

/// Permissive variant used by the interactive "create mapping" flow.
///
/// A field counts as resolved when it is present in the component's own
/// input paths, OR obtainable from another consumed component, OR covered
/// by a mapping record matched by target id and field — existence only,
/// not deep-validated. This decides which mapping affordances to show,
/// not whether a save should be blocked.
pub fn validate_field_dependencies(
    component: &Component,
    components: &[Component],
) -> FieldDependencyOutcome {
    if component.consumes.is_empty() {
        return FieldDependencyOutcome {
            has_valid_dependencies: true,
            ..Default::default()
        };
    }

    let current_fields = field_paths(&component.input);
    let mut missing_fields = Vec::new();

    for consumed_id in &component.consumes {
        let Some(consumed) = components.iter().find(|c| &c.id == consumed_id) else {
            continue;
        };
        if !consumed.is_endpoint() {
            continue;
        }

        for field in field_paths(&consumed.input) {
            let resolved = current_fields.contains(&field)
                || available_in_consumed(
                    &field,
                    Some(consumed.id.as_str()),
                    &component.consumes,
                    components,
                )
                || component.mapping_for(&consumed.id, &field).is_some();

            if !resolved {
                missing_fields.push(UnmappedField {
                    field,
                    from_component: consumed.name.clone(),
                    from_component_id: consumed.id.clone(),
                });
            }
        }
    }

    FieldDependencyOutcome {
        has_valid_dependencies: missing_fields.is_empty(),
        has_missing_dependencies: !missing_fields.is_empty(),
        missing_fields,
    }
}

/// One row of the collection-wide missing-mapping overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingMappingRow {
    pub component_name: String,
    pub component_id: ComponentId,
    pub missing_field: String,
    pub from_component: String,
    pub from_component_id: ComponentId,
    pub message: Option<String>,
}

/// Run the engine over every endpoint component and flatten the results
/// into display rows
pub fn all_missing_mappings(components: &[Component]) -> Result<Vec<MissingMappingRow>> {
    let mut rows = Vec::new();

    for component in components {
        if !component.is_endpoint() || component.consumes.is_empty() {
            continue;
        }

        let report = check_dependencies(&component.id, components)?;
        for missing in report.missing_fields {
            let from_name = components
                .iter()
                .find(|c| c.id == missing.from)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            rows.push(MissingMappingRow {
                component_name: component.name.clone(),
                component_id: component.id.clone(),
                missing_field: missing.path,
                from_component: from_name,
                from_component_id: missing.from,
                message: missing.message,
            });
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentType, Mapping};
    use crate::resolve::PRESENT_BUT_EMPTY;
    use serde_json::json;

    fn endpoint(id: &str, name: &str, input: Value) -> Component {
        Component {
            id: id.into(),
            name: name.into(),
            kind: ComponentType::Endpoint,
            input,
            output: json!({}),
            consumes: Vec::new(),
            mappings: Vec::new(),
            color: None,
        }
    }

    #[test]
    fn test_unknown_component_id_fails_fast() {
        let err = check_dependencies("non-existent-id", &[]).unwrap_err();
        assert!(matches!(err, WiremapError::ComponentNotFound(_)));
        assert_eq!(err.to_string(), "Component with ID non-existent-id not found");
    }

    #[test]
    fn test_database_tables_are_never_checked() {
        let mut table = endpoint("db-1", "Users Table", json!({ "user_id": "string" }));
        table.kind = ComponentType::DatabaseTable;
        table.consumes = vec!["endpoint-1".into()];

        let report = check_dependencies("db-1", &[table]).unwrap();
        assert_eq!(report, DependencyReport::default());
    }

    #[test]
    fn test_empty_consumes_is_clean() {
        let component = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        let report = check_dependencies("endpoint-1", &[component]).unwrap();
        assert!(!report.has_missing_dependencies);
        assert!(report.missing_fields.is_empty());
    }

    #[test]
    fn test_missing_field_is_reported_with_descriptor() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["endpoint-2".into()];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert!(report.has_missing_dependencies);
        assert_eq!(
            report.missing_fields,
            vec![MissingField {
                path: "profile_data".into(),
                ty: FieldType::String,
                value: json!("object"),
                from: "endpoint-2".into(),
                message: None,
            }]
        );
    }

    #[test]
    fn test_all_fields_present_is_clean() {
        let mut consumer = endpoint(
            "endpoint-1",
            "User Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );
        consumer.consumes = vec!["endpoint-2".into()];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert!(!report.has_missing_dependencies);
    }

    #[test]
    fn test_valid_internal_mapping_resolves() {
        let mut consumer = endpoint(
            "endpoint-1",
            "User Service",
            json!({ "user_id": "string", "internal_profile": "object" }),
        );
        consumer.consumes = vec!["endpoint-2".into()];
        consumer.mappings = vec![Mapping::new("endpoint-2", "profile_data", "internal_profile")];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert!(!report.has_missing_dependencies);
    }

    #[test]
    fn test_internal_mapping_with_unknown_source_field() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["endpoint-2".into()];
        consumer.mappings = vec![Mapping::new("endpoint-2", "profile_data", "non_existent_field")];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert_eq!(
            report.missing_fields[0].message.as_deref(),
            Some("Invalid mapping: non_existent_field not found in the input of component User Service")
        );
    }

    #[test]
    fn test_valid_cross_component_mapping_resolves() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["endpoint-2".into()];
        consumer.mappings = vec![
            Mapping::new("endpoint-2", "profile_data", "user_profile").with_source("endpoint-3"),
        ];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );
        // Source component is NOT in consumes; that is allowed
        let mut source = endpoint("endpoint-3", "Data Source", json!({}));
        source.output = json!({ "user_profile": "object" });

        let report = check_dependencies("endpoint-1", &[consumer, provider, source]).unwrap();
        assert!(!report.has_missing_dependencies);
    }

    #[test]
    fn test_cross_component_mapping_with_missing_source_component() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["endpoint-2".into()];
        consumer.mappings = vec![
            Mapping::new("endpoint-2", "profile_data", "user_profile")
                .with_source("non-existent-component"),
        ];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert_eq!(
            report.missing_fields[0].message.as_deref(),
            Some("Invalid existing mapping: source component not found")
        );
    }

    #[test]
    fn test_cross_component_mapping_with_missing_source_field() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["endpoint-2".into()];
        consumer.mappings = vec![
            Mapping::new("endpoint-2", "profile_data", "non_existent_field")
                .with_source("endpoint-3"),
        ];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile_data": "object" }),
        );
        let mut source = endpoint("endpoint-3", "Data Source", json!({}));
        source.output = json!({ "user_profile": "object" });

        let report = check_dependencies("endpoint-1", &[consumer, provider, source]).unwrap();
        assert_eq!(
            report.missing_fields[0].message.as_deref(),
            Some("Invalid mapping: non_existent_field not found in source component Data Source")
        );
    }

    #[test]
    fn test_consumed_database_table_imposes_no_requirements() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["db-1".into()];
        let mut table = endpoint(
            "db-1",
            "Users Table",
            json!({ "user_id": "string", "user_data": "object" }),
        );
        table.kind = ComponentType::DatabaseTable;

        let report = check_dependencies("endpoint-1", &[consumer, table]).unwrap();
        assert!(!report.has_missing_dependencies);
    }

    #[test]
    fn test_missing_consumed_component_is_skipped() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["non-existent-component".into()];

        let report = check_dependencies("endpoint-1", &[consumer]).unwrap();
        assert!(!report.has_missing_dependencies);
    }

    #[test]
    fn test_consumed_component_without_input_is_skipped() {
        let mut consumer = endpoint("endpoint-1", "User Service", json!({ "user_id": "string" }));
        consumer.consumes = vec!["endpoint-2".into()];
        let provider = endpoint("endpoint-2", "Profile Service", json!({}));

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert!(!report.has_missing_dependencies);
    }

    #[test]
    fn test_nested_field_paths() {
        let mut consumer = endpoint(
            "endpoint-1",
            "User Service",
            json!({ "user_id": "string", "profile": { "personal": { "name": "string" } } }),
        );
        consumer.consumes = vec!["endpoint-2".into()];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "profile": { "personal": { "name": "string", "age": 25 } } }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert_eq!(report.missing_fields.len(), 1);
        assert_eq!(report.missing_fields[0].path, "profile.personal.age");
    }

    #[test]
    fn test_array_wildcard_paths() {
        let mut consumer = endpoint(
            "endpoint-1",
            "User Service",
            json!({ "user_id": "string", "items": [{ "id": 1, "name": "item1" }] }),
        );
        consumer.consumes = vec!["endpoint-2".into()];
        let provider = endpoint(
            "endpoint-2",
            "Item Service",
            json!({ "user_id": "string", "items": [{ "id": 1, "name": "item1", "description": "desc" }] }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert_eq!(report.missing_fields.len(), 1);
        assert_eq!(report.missing_fields[0].path, "items[:].description");
    }

    #[test]
    fn test_null_on_both_sides_is_present_but_empty() {
        let mut consumer = endpoint(
            "endpoint-1",
            "User Service",
            json!({ "user_id": "string", "optional_field": null }),
        );
        consumer.consumes = vec!["endpoint-2".into()];
        let provider = endpoint(
            "endpoint-2",
            "Profile Service",
            json!({ "user_id": "string", "optional_field": null }),
        );

        let report = check_dependencies("endpoint-1", &[consumer, provider]).unwrap();
        assert_eq!(
            report.missing_fields,
            vec![MissingField {
                path: "optional_field".into(),
                ty: FieldType::Object,
                value: Value::Null,
                from: "endpoint-2".into(),
                message: Some(PRESENT_BUT_EMPTY.into()),
            }]
        );
    }

    #[test]
    fn test_mapping_takes_precedence_over_availability() {
        // The field is available through another consumed component, but an
        // explicit (broken) mapping exists; the engine validates the mapping
        // on its own terms and still reports the field.
        let mut consumer = endpoint("a", "Consumer", json!({ "x": 1 }));
        consumer.consumes = vec!["b".into(), "c".into()];
        consumer.mappings = vec![Mapping::new("b", "need", "nope")];
        let b = endpoint("b", "B", json!({ "need": 1 }));
        let c = endpoint("c", "C", json!({ "need": 1 }));

        let report = check_dependencies("a", &[consumer, b, c]).unwrap();
        assert!(report.has_missing_dependencies);
        assert_eq!(report.missing_fields[0].path, "need");
    }

    #[test]
    fn test_permissive_variant_accepts_availability_and_bare_mappings() {
        let mut consumer = endpoint("a", "Consumer", json!({ "x": 1 }));
        consumer.consumes = vec!["b".into(), "c".into()];
        // Bare mapping record for b.need — existence is enough here
        consumer.mappings = vec![Mapping::new("b", "need", "whatever")];
        let b = endpoint("b", "B", json!({ "need": 1, "extra": 2 }));
        // c supplies "extra" so it is available without any mapping
        let c = endpoint("c", "C", json!({ "extra": 2 }));

        let components = vec![consumer.clone(), b, c];
        let outcome = validate_field_dependencies(&consumer, &components);
        assert!(outcome.has_valid_dependencies);
        assert!(outcome.missing_fields.is_empty());
    }

    #[test]
    fn test_permissive_variant_reports_unmapped_fields() {
        let mut consumer = endpoint("a", "Consumer", json!({ "x": 1 }));
        consumer.consumes = vec!["b".into()];
        let b = endpoint("b", "Billing", json!({ "x": 1, "y": 2 }));

        let components = vec![consumer.clone(), b];
        let outcome = validate_field_dependencies(&consumer, &components);
        assert_eq!(
            outcome.missing_fields,
            vec![UnmappedField {
                field: "y".into(),
                from_component: "Billing".into(),
                from_component_id: "b".into(),
            }]
        );
    }

    #[test]
    fn test_all_missing_mappings_rows() {
        let mut consumer = endpoint("a", "Consumer", json!({ "x": 1 }));
        consumer.consumes = vec!["b".into()];
        let b = endpoint("b", "Billing", json!({ "x": 1, "y": 2 }));

        let rows = all_missing_mappings(&[consumer, b]).unwrap();
        assert_eq!(
            rows,
            vec![MissingMappingRow {
                component_name: "Consumer".into(),
                component_id: "a".into(),
                missing_field: "y".into(),
                from_component: "Billing".into(),
                from_component_id: "b".into(),
                message: None,
            }]
        );
    }
}
