//! Accumulate per-version collections and fold them into one.

use crate::error::{Error, Result};
use crate::model::collection::ApiCollection;
use tracing::info;

/// Ordered list of collections awaiting a merge.
///
/// The fold is left to right with the first collection as the seed, so the
/// order collections are added in decides which same-named entity is
/// "first" during [`ApiCollection::combine`].
#[derive(Debug, Default)]
pub struct ApiBuilder {
    collections: Vec<ApiCollection>,
}

impl ApiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, collection: ApiCollection) -> &mut Self {
        self.collections.push(collection);
        self
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Combine every added collection. Fails if none were added.
    pub fn merge(&self) -> Result<ApiCollection> {
        let (seed, rest) = self.collections.split_first().ok_or(Error::EmptyBuilder)?;
        let merged = rest.iter().fold(seed.clone(), |acc, next| acc.combine(next));
        info!(
            collections = self.collections.len(),
            functions = merged.functions.len(),
            tables = merged.tables.len(),
            events = merged.events.len(),
            "merged"
        );
        Ok(merged)
    }
}
