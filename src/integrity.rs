//! Collection-wide mapping integrity
//!
//! A structural sanity pass over the entire component set, distinct from
//! the per-field resolution of the dependency engine: referential
//! integrity of mapping records (dangling ids, structural completeness),
//! `consumes` invariants, and collection-level uniqueness. Violations are
//! collected as data and never thrown; callers decide whether a save
//! should be blocked.
//!
//! Orphan cleanup lives here too: the pure transformation that keeps the
//! collection referentially intact after a component is deleted.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::component::{Component, ComponentId};
use crate::graph::ConsumesGraph;

// =============================================================================
// Issue Codes
// =============================================================================

/// Code categorizing an integrity issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    /// Mapping targets a component id that does not exist
    UnknownTargetComponent,
    /// Mapping targets a component the owner does not consume
    TargetNotConsumed,
    /// Mapping lacks target_field or source_field
    IncompleteMapping,
    /// Mapping names a source component id that does not exist
    UnknownSourceComponent,
    /// `consumes` entry points at a component id that does not exist
    UnknownConsumedComponent,
    /// Component consumes itself
    SelfConsume,
    /// Two components share an id
    DuplicateComponentId,
    /// Two components share a name (name lookups pick the first)
    DuplicateComponentName,
    /// Circular consume chain
    ConsumesCycle,
    /// Field path with empty segments or whitespace
    MalformedFieldPath,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownTargetComponent => "E001",
            Self::TargetNotConsumed => "E002",
            Self::IncompleteMapping => "E003",
            Self::UnknownSourceComponent => "E004",
            Self::UnknownConsumedComponent => "E005",
            Self::SelfConsume => "E006",
            Self::DuplicateComponentId => "E007",
            Self::DuplicateComponentName => "W001",
            Self::ConsumesCycle => "W002",
            Self::MalformedFieldPath => "W003",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownTargetComponent
            | Self::TargetNotConsumed
            | Self::IncompleteMapping
            | Self::UnknownSourceComponent
            | Self::UnknownConsumedComponent
            | Self::SelfConsume
            | Self::DuplicateComponentId => Severity::Error,

            Self::DuplicateComponentName | Self::ConsumesCycle | Self::MalformedFieldPath => {
                Severity::Warning
            }
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Issues and Report
// =============================================================================

/// A single integrity violation
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityIssue {
    /// Name of the component the issue was found on
    pub component: String,
    pub component_id: ComponentId,
    pub code: IssueCode,
    pub message: String,
    /// Target component id of the offending mapping bucket, when relevant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<ComponentId>,
}

impl IntegrityIssue {
    fn new(component: &Component, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            component: component.name.clone(),
            component_id: component.id.clone(),
            code,
            message: message.into(),
            target_id: None,
        }
    }

    fn with_target(mut self, target_id: impl Into<ComponentId>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.severity(),
            self.message,
            self.component
        )
    }
}

/// All violations found by an integrity pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn push(&mut self, issue: IntegrityIssue) {
        self.issues.push(issue);
    }

    pub fn all(&self) -> &[IntegrityIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues.iter().filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        if !self.is_empty() {
            writeln!(
                f,
                "\n{} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            )?;
        }
        Ok(())
    }
}

impl IntoIterator for IntegrityReport {
    type Item = IntegrityIssue;
    type IntoIter = std::vec::IntoIter<IntegrityIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

// =============================================================================
// Checker
// =============================================================================

/// The collection-wide integrity checker
pub struct IntegrityChecker {
    /// Dot-separated segments, optionally `[:]`-suffixed, no whitespace
    field_path: Regex,
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            field_path: Regex::new(r"^[^.\s]+(\.[^.\s]+)*$").unwrap(),
        }
    }

    /// Run the full pass over a collection snapshot
    pub fn check(&self, components: &[Component]) -> IntegrityReport {
        let mut report = IntegrityReport::default();

        let known_ids: HashSet<&str> = components.iter().map(|c| c.id.as_str()).collect();
        self.check_uniqueness(components, &mut report);

        for component in components {
            self.check_consumes(component, &known_ids, &mut report);
            self.check_mappings(component, &known_ids, &mut report);
        }

        self.check_cycles(components, &mut report);
        report
    }

    fn check_uniqueness(&self, components: &[Component], report: &mut IntegrityReport) {
        let mut seen_ids: HashMap<&str, &Component> = HashMap::new();
        let mut seen_names: HashMap<&str, &Component> = HashMap::new();

        for component in components {
            if seen_ids.insert(component.id.as_str(), component).is_some() {
                report.push(IntegrityIssue::new(
                    component,
                    IssueCode::DuplicateComponentId,
                    format!("Duplicate component id: {}", component.id),
                ));
            }
            if let Some(first) = seen_names.insert(component.name.as_str(), component) {
                report.push(IntegrityIssue::new(
                    component,
                    IssueCode::DuplicateComponentName,
                    format!(
                        "Duplicate component name '{}' (also used by {})",
                        component.name, first.id
                    ),
                ));
            }
        }
    }

    fn check_consumes(
        &self,
        component: &Component,
        known_ids: &HashSet<&str>,
        report: &mut IntegrityReport,
    ) {
        for consumed_id in &component.consumes {
            if consumed_id == &component.id {
                report.push(IntegrityIssue::new(
                    component,
                    IssueCode::SelfConsume,
                    "Component consumes itself",
                ));
            } else if !known_ids.contains(consumed_id.as_str()) {
                report.push(
                    IntegrityIssue::new(
                        component,
                        IssueCode::UnknownConsumedComponent,
                        format!("Consumed component does not exist: {}", consumed_id),
                    )
                    .with_target(consumed_id.clone()),
                );
            }
        }
    }

    fn check_mappings(
        &self,
        component: &Component,
        known_ids: &HashSet<&str>,
        report: &mut IntegrityReport,
    ) {
        // The keyed-by-target semantics of the legacy shape, expressed over
        // a grouped view of the canonical array.
        for (target_id, mappings) in component.mappings_by_target() {
            if !known_ids.contains(target_id) {
                report.push(
                    IntegrityIssue::new(
                        component,
                        IssueCode::UnknownTargetComponent,
                        format!("Invalid target component ID in mappings: {}", target_id),
                    )
                    .with_target(target_id),
                );
            }

            if !component.consumes.iter().any(|id| id.as_str() == target_id) {
                report.push(
                    IntegrityIssue::new(
                        component,
                        IssueCode::TargetNotConsumed,
                        format!("Target component ID {} not in consumes array", target_id),
                    )
                    .with_target(target_id),
                );
            }

            for mapping in mappings {
                if !mapping.is_complete() {
                    report.push(
                        IntegrityIssue::new(
                            component,
                            IssueCode::IncompleteMapping,
                            "Mapping must have both target_field and source_field",
                        )
                        .with_target(target_id),
                    );
                }

                if let Some(source_id) = &mapping.source_component_id {
                    if !known_ids.contains(source_id.as_str()) {
                        report.push(
                            IntegrityIssue::new(
                                component,
                                IssueCode::UnknownSourceComponent,
                                format!("Invalid source_component_id: {}", source_id),
                            )
                            .with_target(target_id),
                        );
                    }
                }

                for path in [&mapping.target_field, &mapping.source_field] {
                    if !path.is_empty() && !self.field_path.is_match(path) {
                        report.push(
                            IntegrityIssue::new(
                                component,
                                IssueCode::MalformedFieldPath,
                                format!("Field path is not well formed: '{}'", path),
                            )
                            .with_target(target_id),
                        );
                    }
                }
            }
        }
    }

    fn check_cycles(&self, components: &[Component], report: &mut IntegrityReport) {
        let graph = ConsumesGraph::build(components);
        for cycle in graph.cycles() {
            // Attribute the cycle to its first member to keep one issue per
            // cycle rather than one per participant.
            let Some(owner) = components.iter().find(|c| c.id == cycle[0]) else {
                continue;
            };
            report.push(IntegrityIssue::new(
                owner,
                IssueCode::ConsumesCycle,
                format!("Circular consumes chain: {}", cycle.join(" -> ")),
            ));
        }
    }
}

/// Validate mapping integrity across a collection (convenience wrapper)
pub fn validate_mappings(components: &[Component]) -> IntegrityReport {
    IntegrityChecker::new().check(components)
}

// =============================================================================
// Orphan Cleanup
// =============================================================================

/// Strip every reference to a deleted component from the remaining
/// collection: mappings targeting it, mappings sourcing from it, and
/// `consumes` entries. Pure and idempotent.
pub fn clean_orphaned_mappings(components: &[Component], deleted_id: &str) -> Vec<Component> {
    components
        .iter()
        .map(|component| {
            let mut updated = component.clone();
            updated.mappings.retain(|m| {
                m.target_component_id != deleted_id
                    && m.source_component_id.as_deref() != Some(deleted_id)
            });
            updated.consumes.retain(|id| id != deleted_id);
            updated
        })
        .collect()
}
