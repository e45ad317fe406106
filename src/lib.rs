//! Wiremap
//!
//! Dependency and field-mapping governance for a collection of components
//! (API endpoints and database tables). Each component carries an input
//! and an output JSON schema plus the ids of the components it consumes;
//! wiremap answers which fields required by those consumed components are
//! unsatisfied, and why.
//!
//! ## Features
//!
//! - **Schema path flattening**: nested schemas become flat lists of
//!   addressable leaf fields, with a `[:]` wildcard for array elements
//! - **Dependency resolution**: per-component reports distinguishing
//!   absent fields, present-but-empty fields, and broken mappings
//! - **Mapping integrity**: a collection-wide structural pass with
//!   referential checks, collected as data for the persistence layer
//! - **Orphan cleanup**: pure, idempotent repair after a deletion
//! - **Impact analysis**: a consumes graph with cycle detection and
//!   transitive dependents
//!
//! ## Architecture
//!
//! ```text
//! components.json ──▶ store ──▶ Collection (snapshot + fingerprint)
//!                                   │
//!                    ┌──────────────┼────────────────┐
//!                    ▼              ▼                ▼
//!              dependency       integrity          graph
//!              (flatten +       (grouped views,    (cycles,
//!               resolve)         cleanup)           impact)
//! ```
//!
//! The core is synchronous and pure: it reads a snapshot passed in by the
//! caller and returns data. Only `store` and the CLI touch the
//! filesystem.

pub mod collection;
pub mod component;
pub mod config;
pub mod dependency;
pub mod error;
pub mod flatten;
pub mod graph;
pub mod integrity;
pub mod mapping;
pub mod resolve;
pub mod store;

pub use collection::{Collection, Fingerprint, SearchResult};
pub use component::{Component, ComponentId, ComponentType, Mapping};
pub use dependency::{
    all_missing_mappings, check_dependencies, validate_field_dependencies, DependencyReport,
    FieldDependencyOutcome, MissingField, MissingMappingRow,
};
pub use error::{Result, WiremapError};
pub use flatten::{field_paths, flatten, flatten_with_prefix, FieldDescriptor, FieldType};
pub use graph::ConsumesGraph;
pub use integrity::{
    clean_orphaned_mappings, validate_mappings, IntegrityChecker, IntegrityIssue, IntegrityReport,
    IssueCode, Severity,
};
pub use mapping::{
    add_mapping, create_field_mapping, has_mapping, mapping_candidates, remove_mapping,
    FieldUsage, MappingCandidate, MappingSide,
};
pub use resolve::{available_in_consumed, verify_field_presence, FieldPresence};
pub use store::CollectionDocument;
