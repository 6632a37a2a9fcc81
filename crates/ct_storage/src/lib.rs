use std::sync::Arc;

use ct_core::{DocumentStore, Error, Result};

pub mod backends;

pub use backends::memory::MemoryStore;

/// Build a document store by backend name. Production deployments plug
/// their own driver in through the `DocumentStore` trait; the in-memory
/// backend covers tests and local runs.
pub async fn create_storage(backend: &str) -> Result<Arc<dyn DocumentStore>> {
    match backend {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(Error::Storage(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::memory::MemoryStore;
    pub use super::create_storage;
    pub use ct_core::{Document, DocumentStore, Filter};
}
