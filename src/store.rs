//! Persisted collection documents
//!
//! The persistence layer owns the document; the core only consumes it.
//! The format is a single JSON object `{ "components": [ ... ] }` with
//! `mappings` in the canonical array shape. Writing exists for the CLI's
//! orphan-cleanup command, which rewrites the document it was given.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::component::Component;
use crate::error::Result;

/// The persisted document shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionDocument {
    #[serde(default)]
    pub components: Vec<Component>,
}

impl CollectionDocument {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn into_collection(self) -> Collection {
        Collection::new(self.components)
    }
}

impl From<Collection> for CollectionDocument {
    fn from(collection: Collection) -> Self {
        Self::new(collection.into_components())
    }
}

/// Load a collection snapshot from a document on disk
pub fn load(path: impl AsRef<Path>) -> Result<Collection> {
    let content = fs::read_to_string(path)?;
    let document: CollectionDocument = serde_json::from_str(&content)?;
    Ok(document.into_collection())
}

/// Write a collection back as a document
pub fn save(path: impl AsRef<Path>, components: &[Component], pretty: bool) -> Result<()> {
    let document = CollectionDocument::new(components.to_vec());
    let content = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    fs::write(path, content)?;
    Ok(())
}
