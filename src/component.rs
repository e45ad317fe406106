//! Component model
//!
//! A component is a governed unit (an API endpoint or a database table)
//! carrying input/output JSON schemas, the ids of other components it
//! consumes at runtime, and user-authored field mappings explaining how
//! required fields of consumed components are satisfied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, WiremapError};

/// Opaque component identifier, unique within a collection
pub type ComponentId = String;

/// Kind of governed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// An API endpoint; the only kind checked for missing dependencies
    #[default]
    Endpoint,
    /// A leaf data source; can be consumed but is never checked itself
    DatabaseTable,
}

/// A user-authored rule stating how one required field of a consumed
/// component's input is supplied.
///
/// When `source_component_id` is absent the source field is looked up in
/// the owning component's own input; when present it is looked up in the
/// named component's output (which need not be in `consumes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub target_component_id: ComponentId,
    /// Path into the target component's input schema.
    /// Defaulted so structurally incomplete persisted records still parse
    /// and can be reported by the integrity validator.
    #[serde(default)]
    pub target_field: String,
    #[serde(default)]
    pub source_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_component_id: Option<ComponentId>,
}

impl Mapping {
    /// Create a same-component mapping (source looked up in the owner's input)
    pub fn new(
        target_component_id: impl Into<ComponentId>,
        target_field: impl Into<String>,
        source_field: impl Into<String>,
    ) -> Self {
        Self {
            target_component_id: target_component_id.into(),
            target_field: target_field.into(),
            source_field: source_field.into(),
            source_component_id: None,
        }
    }

    /// Name a third component whose output supplies the source field
    pub fn with_source(mut self, source_component_id: impl Into<ComponentId>) -> Self {
        self.source_component_id = Some(source_component_id.into());
        self
    }

    /// A mapping is structurally complete when both field paths are set
    pub fn is_complete(&self) -> bool {
        !self.target_field.is_empty() && !self.source_field.is_empty()
    }
}

/// A governed component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub id: ComponentId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ComponentType,
    /// Schema of the fields this component needs to receive
    #[serde(default = "empty_object")]
    pub input: Value,
    /// Schema of the fields this component can supply to others
    #[serde(default = "empty_object")]
    pub output: Value,
    /// Ids of other components this component depends on, in order
    #[serde(default)]
    pub consumes: Vec<ComponentId>,
    /// Field mappings, in order (canonical array shape)
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    /// Display metadata carried opaquely for external renderers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Component {
    /// Create a new component with a generated id and empty schemas
    pub fn new(name: impl Into<String>, kind: ComponentType) -> Self {
        Self {
            id: Self::generate_id(),
            name: name.into(),
            kind,
            input: empty_object(),
            output: empty_object(),
            consumes: Vec::new(),
            mappings: Vec::new(),
            color: None,
        }
    }

    /// Generate a fresh component id
    pub fn generate_id() -> ComponentId {
        Uuid::new_v4().to_string()
    }

    pub fn is_endpoint(&self) -> bool {
        self.kind == ComponentType::Endpoint
    }

    /// Validate the fields external mutation layers are allowed to set.
    ///
    /// The static type system covers most of what the persisted format can
    /// get wrong; what remains is emptiness of the human-facing fields.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.id.is_empty() {
            errors.push("field 'id' must not be empty".to_string());
        }
        if self.name.is_empty() {
            errors.push("field 'name' must be at least 1 character long".to_string());
        }
        if self.consumes.iter().any(String::is_empty) {
            errors.push("field 'consumes' must contain non-empty component ids".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(WiremapError::InvalidComponent(errors.join(", ")))
        }
    }

    /// Apply updates from another component value, keeping this id
    pub fn updated(&self, updates: Component) -> Result<Component> {
        let component = Component {
            id: self.id.clone(),
            ..updates
        };
        component.validate()?;
        Ok(component)
    }

    /// Clone this component under a new id and a prefixed name
    pub fn clone_as_copy(&self, name_prefix: &str) -> Result<Component> {
        let component = Component {
            id: Self::generate_id(),
            name: format!("{}{}", name_prefix, self.name),
            ..self.clone()
        };
        component.validate()?;
        Ok(component)
    }

    /// First mapping matching a (target component, target field) pair
    pub fn mapping_for(&self, target_component_id: &str, target_field: &str) -> Option<&Mapping> {
        self.mappings.iter().find(|m| {
            m.target_component_id == target_component_id && m.target_field == target_field
        })
    }

    /// Group mappings by target component id (derived view; the array is
    /// the only physical shape)
    pub fn mappings_by_target(&self) -> BTreeMap<&str, Vec<&Mapping>> {
        let mut grouped: BTreeMap<&str, Vec<&Mapping>> = BTreeMap::new();
        for mapping in &self.mappings {
            grouped
                .entry(mapping.target_component_id.as_str())
                .or_default()
                .push(mapping);
        }
        grouped
    }
}
