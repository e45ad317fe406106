//! Collection snapshot
//!
//! An in-memory snapshot of the full component set. The core never
//! mutates it: lookups, search, and a content fingerprint that lets
//! callers tell whether diagnostics were computed against the same
//! snapshot they are now looking at.

use std::fmt;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::component::{Component, ComponentId, ComponentType};
use crate::error::{Result, WiremapError};

/// SHA256 fingerprint of a collection snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a component set (canonical JSON; key
    /// order is deterministic)
    pub fn of(components: &[Component]) -> Self {
        let canonical = serde_json::to_string(components).unwrap_or_default();
        let hash = Sha256::digest(canonical.as_bytes());
        Self(format!("{:x}", hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fuzzy-search hit over component names
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentType,
    pub score: i64,
}

/// Immutable snapshot of the full component set
#[derive(Debug, Clone, Default)]
pub struct Collection {
    components: Vec<Component>,
}

impl Collection {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn into_components(self) -> Vec<Component> {
        self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Look up a component by id; a miss is a hard failure (a stale id
    /// signals a caller bug, not a data-quality issue)
    pub fn get(&self, id: &str) -> Result<&Component> {
        self.find(id)
            .ok_or_else(|| WiremapError::ComponentNotFound(id.to_string()))
    }

    pub fn find(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// First component with the given name. Names are not guaranteed
    /// unique; the integrity validator warns about duplicates.
    pub fn find_by_name(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Resolve a query to a component: by id, then by exact name, then by
    /// case-insensitive name
    pub fn resolve(&self, query: &str) -> Option<&Component> {
        if let Some(component) = self.find(query) {
            return Some(component);
        }
        if let Some(component) = self.find_by_name(query) {
            return Some(component);
        }
        let query_lower = query.to_lowercase();
        self.components
            .iter()
            .find(|c| c.name.to_lowercase() == query_lower)
    }

    /// Fuzzy-search component names
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, &Component)> = self
            .components
            .iter()
            .filter_map(|c| matcher.fuzzy_match(&c.name, query).map(|score| (score, c)))
            .collect();

        results.sort_by(|a, b| b.0.cmp(&a.0));

        results
            .into_iter()
            .take(limit)
            .map(|(score, c)| SearchResult {
                id: c.id.clone(),
                name: c.name.clone(),
                kind: c.kind,
                score,
            })
            .collect()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.components)
    }
}

impl From<Vec<Component>> for Collection {
    fn from(components: Vec<Component>) -> Self {
        Self::new(components)
    }
}
