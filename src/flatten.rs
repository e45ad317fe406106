//! Schema path flattening
//!
//! Turns an arbitrary nested JSON schema object into a flat list of
//! addressable leaf fields. Nested objects contribute dot-joined paths;
//! arrays of objects contribute the union of their element fields under a
//! `[:]` wildcard segment; everything else is a leaf.
//!
//! Only leaves are reported: dependency checks care about the terminal
//! positions a value can occupy, never the intermediate object keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strings longer than this are truncated in display values
const MAX_DISPLAY_CHARS: usize = 50;

/// Primitive classification of a leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Covers `null` as well, per the primitive type model
    Object,
    Array,
}

impl FieldType {
    fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Array(_) => Self::Array,
            Value::Null | Value::Object(_) => Self::Object,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        };
        write!(f, "{}", name)
    }
}

/// An addressable leaf field produced by flattening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dot-joined path with `[:]` segments for array element fields
    pub path: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Truncated, display-safe representation of the schema value
    pub value: Value,
}

/// Closed classification of a schema value, computed once per node so the
/// recursion never re-sniffs types at each call site.
enum SchemaValue<'a> {
    /// Primitive or null; flattens to a single leaf
    Leaf(&'a Value),
    /// Array with no object elements; flattens to one `[N items]` leaf
    ArrayLeaf(usize),
    /// Plain object; recursed into, never emitted itself
    Node(&'a Map<String, Value>),
    /// Array with at least one object element; elements are unioned under
    /// a `[:]` wildcard segment
    ObjectArray(Vec<&'a Map<String, Value>>),
}

fn classify(value: &Value) -> SchemaValue<'_> {
    match value {
        Value::Object(map) => SchemaValue::Node(map),
        Value::Array(items) => {
            let objects: Vec<&Map<String, Value>> =
                items.iter().filter_map(Value::as_object).collect();
            if objects.is_empty() {
                SchemaValue::ArrayLeaf(items.len())
            } else {
                SchemaValue::ObjectArray(objects)
            }
        }
        other => SchemaValue::Leaf(other),
    }
}

/// Flatten a schema object into its leaf field descriptors.
///
/// Non-object schemas (null, arrays, primitives) flatten to an empty list.
pub fn flatten(schema: &Value) -> Vec<FieldDescriptor> {
    flatten_with_prefix(schema, "")
}

/// Flatten a schema subtree, prefixing every emitted path
pub fn flatten_with_prefix(schema: &Value, prefix: &str) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    if let Some(map) = schema.as_object() {
        let mut by_path = HashMap::new();
        flatten_into(map, prefix, &mut fields, &mut by_path);
    }
    fields
}

/// Leaf-path projection of [`flatten`], used everywhere a dependency check
/// needs "what fields exist"
pub fn field_paths(schema: &Value) -> Vec<String> {
    flatten(schema).into_iter().map(|f| f.path).collect()
}

fn flatten_into(
    map: &Map<String, Value>,
    prefix: &str,
    fields: &mut Vec<FieldDescriptor>,
    by_path: &mut HashMap<String, usize>,
) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match classify(value) {
            SchemaValue::Node(child) => flatten_into(child, &path, fields, by_path),
            SchemaValue::ObjectArray(elements) => {
                // Union of all element fields; an element missing a field
                // simply does not contribute that path.
                let item_prefix = format!("{}[:]", path);
                for element in elements {
                    flatten_into(element, &item_prefix, fields, by_path);
                }
            }
            SchemaValue::ArrayLeaf(len) => {
                let value = Value::String(format!("[{} items]", len));
                emit(fields, by_path, path, FieldType::Array, value);
            }
            SchemaValue::Leaf(value) => {
                emit(fields, by_path, path, FieldType::of(value), display_value(value));
            }
        }
    }
}

/// Deduplicate by path: first-seen position is kept, last-seen value wins
fn emit(
    fields: &mut Vec<FieldDescriptor>,
    by_path: &mut HashMap<String, usize>,
    path: String,
    ty: FieldType,
    value: Value,
) {
    if let Some(&existing) = by_path.get(&path) {
        fields[existing].ty = ty;
        fields[existing].value = value;
    } else {
        by_path.insert(path.clone(), fields.len());
        fields.push(FieldDescriptor { path, ty, value });
    }
}

/// Display-safe rendering of a schema value
fn display_value(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::String(format!("[{} items]", items.len())),
        Value::String(s) if s.chars().count() > MAX_DISPLAY_CHARS => {
            let truncated: String = s.chars().take(MAX_DISPLAY_CHARS).collect();
            Value::String(format!("{}...", truncated))
        }
        other => other.clone(),
    }
}
