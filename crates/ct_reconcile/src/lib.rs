pub mod batch;
pub mod buckets;
pub mod placeholder;
pub mod reconciler;

pub use reconciler::{Collections, CoverageReport, Reconciler, RepairReport};

pub mod prelude {
    pub use crate::batch::{generate_summaries, generate_tips};
    pub use crate::buckets::store_tips_by_date;
    pub use crate::reconciler::{Collections, CoverageReport, Reconciler, RepairReport};
    pub use ct_core::{Article, DocumentStore, InferenceModel, Result};
}
