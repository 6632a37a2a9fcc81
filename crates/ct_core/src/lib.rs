pub mod dates;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use models::InferenceModel;
pub use storage::{Document, DocumentStore, Filter};
pub use types::{Article, SummaryRecord, Tips, TipsRecord};

pub mod prelude {
    pub use crate::models::InferenceModel;
    pub use crate::storage::{Document, DocumentStore, Filter};
    pub use crate::types::{Article, SummaryRecord, Tips, TipsRecord};
    pub use crate::{Error, Result};
}
