use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use ct_core::storage::SortOrder;
use ct_core::{Document, DocumentStore, Filter, Result};

/// In-memory document store. Collections are id-ordered maps, so `find`
/// without a sort returns documents in stable id order. Inserting under an
/// existing id replaces the stored document wholesale, which is what makes
/// repeated reconciliation writes idempotent.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(doc: &Document, filter: Option<&Filter>) -> bool {
    filter.map_or(true, |filter| {
        filter.iter().all(|(key, value)| doc.get(key) == Some(value))
    })
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Option<&Filter>,
        sort: Option<(&str, SortOrder)>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, order)) = sort {
            docs.sort_by(|a, b| {
                let ordering = compare_field(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| {
            docs.values()
                .find(|doc| matches(doc, Some(filter)))
                .cloned()
        }))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String> {
        let id = match document.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("doc_{}", self.next_id.fetch_add(1, AtomicOrdering::SeqCst));
                document.insert("_id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(doc) = docs.values_mut().find(|doc| matches(doc, Some(filter))) else {
            return Ok(0);
        };
        for (key, value) in fields {
            // the document id is immutable
            if key != "_id" {
                doc.insert(key, value);
            }
        }
        Ok(1)
    }

    async fn delete(&self, collection: &str, filter: Option<&Filter>) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match filter {
            None => {
                let count = docs.len() as u64;
                docs.clear();
                Ok(count)
            }
            Some(filter) => {
                let ids: Vec<String> = docs
                    .iter()
                    .filter(|(_, doc)| matches(doc, Some(filter)))
                    .map(|(id, _)| id.clone())
                    .collect();
                for id in &ids {
                    docs.remove(id);
                }
                Ok(ids.len() as u64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::storage::{field_filter, id_filter};

    fn doc(id: &str, source_type: &str) -> Document {
        let mut doc = Document::new();
        doc.insert("_id".to_string(), Value::String(id.to_string()));
        doc.insert(
            "source_type".to_string(),
            Value::String(source_type.to_string()),
        );
        doc
    }

    #[tokio::test]
    async fn test_insert_overwrites_same_id() {
        let store = MemoryStore::new();
        store.insert_one("news", doc("a", "hackernews")).await.unwrap();
        store.insert_one("news", doc("a", "cybernews")).await.unwrap();

        let docs = store.find("news", None, None, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].get("source_type"),
            Some(&Value::String("cybernews".to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_with_filter_and_limit() {
        let store = MemoryStore::new();
        store.insert_one("news", doc("a", "hackernews")).await.unwrap();
        store.insert_one("news", doc("b", "hackernews")).await.unwrap();
        store.insert_one("news", doc("c", "cybernews")).await.unwrap();

        let filter = field_filter("source_type", "hackernews");
        let docs = store
            .find("news", Some(&filter), None, Some(1))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);

        let count = store.count("news", Some(&filter)).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_find_one_by_id() {
        let store = MemoryStore::new();
        store.insert_one("news", doc("a", "hackernews")).await.unwrap();

        let found = store.find_one("news", &id_filter("a")).await.unwrap();
        assert!(found.is_some());
        let missing = store.find_one("news", &id_filter("zzz")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        store.insert_one("news", doc("a", "hackernews")).await.unwrap();

        let mut fields = Document::new();
        fields.insert("title".to_string(), Value::String("New title".to_string()));
        let modified = store
            .update_one("news", &id_filter("a"), fields)
            .await
            .unwrap();
        assert_eq!(modified, 1);

        let found = store.find_one("news", &id_filter("a")).await.unwrap().unwrap();
        assert_eq!(
            found.get("title"),
            Some(&Value::String("New title".to_string()))
        );
        // untouched fields survive the merge
        assert_eq!(
            found.get("source_type"),
            Some(&Value::String("hackernews".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_with_and_without_filter() {
        let store = MemoryStore::new();
        store.insert_one("news", doc("a", "hackernews")).await.unwrap();
        store.insert_one("news", doc("b", "cybernews")).await.unwrap();

        let filter = field_filter("source_type", "cybernews");
        assert_eq!(store.delete("news", Some(&filter)).await.unwrap(), 1);
        assert_eq!(store.delete("news", None).await.unwrap(), 1);
        assert!(store.find("news", None, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_ids() {
        let store = MemoryStore::new();
        let mut doc = Document::new();
        doc.insert("title".to_string(), Value::String("x".to_string()));
        let id = store.insert_one("news", doc).await.unwrap();
        assert!(id.starts_with("doc_"));
    }
}
