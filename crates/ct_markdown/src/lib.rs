pub mod export;
pub mod metadata;
pub mod records;
pub mod splitter;

pub use metadata::SectionData;
pub use splitter::{MarkdownDocument, Section};

pub mod prelude {
    pub use crate::metadata::SectionData;
    pub use crate::splitter::{MarkdownDocument, Section};
    pub use ct_core::{Article, Result, SummaryRecord, TipsRecord};
}
