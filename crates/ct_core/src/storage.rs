use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// A stored document: a mapping from field name to JSON value, keyed by the
/// opaque `_id` field.
pub type Document = serde_json::Map<String, Value>;

/// An equality filter: every listed field must match exactly.
pub type Filter = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// The document-store seam. The pipeline treats the store purely as an
/// idempotent keyed collection of documents: no joins, no transactions, no
/// query planning. `insert_one` with an `_id` that already exists replaces
/// the stored document wholesale.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents matching the filter, optionally sorted and limited.
    async fn find(
        &self,
        collection: &str,
        filter: Option<&Filter>,
        sort: Option<(&str, SortOrder)>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>>;

    /// Find a single document matching the filter.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Insert a document, using its `_id` field as the document id when
    /// present. Returns the id under which the document was stored.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String>;

    /// Merge the given fields into the first document matching the filter.
    /// Returns the number of modified documents (0 or 1).
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<u64>;

    /// Delete all documents matching the filter (or the whole collection
    /// when no filter is given). Returns the number of deleted documents.
    async fn delete(&self, collection: &str, filter: Option<&Filter>) -> Result<u64>;

    /// Count documents matching the filter.
    async fn count(&self, collection: &str, filter: Option<&Filter>) -> Result<usize> {
        Ok(self.find(collection, filter, None, None).await?.len())
    }
}

/// Filter on the document id.
pub fn id_filter(id: &str) -> Filter {
    field_filter("_id", id)
}

/// Filter on a single field equality.
pub fn field_filter(key: &str, value: &str) -> Filter {
    let mut filter = Filter::new();
    filter.insert(key.to_string(), Value::String(value.to_string()));
    filter
}
