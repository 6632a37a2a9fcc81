use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use ct_core::{Error, Result};

lazy_static! {
    static ref ITEM_HEADING: Regex = Regex::new(r"\n## \d+\.").unwrap();
    static ref GENERATION_DATE: Regex =
        Regex::new(r"Generated on: (\d{4}-\d{2}-\d{2})").unwrap();
}

/// One numbered item of a markdown document, as raw text. The index is the
/// 1-based position of the item in the document.
#[derive(Debug, Clone)]
pub struct Section {
    pub index: usize,
    pub text: String,
}

/// A markdown document split into its header block and numbered items.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    pub header: String,
    pub sections: Vec<Section>,
}

impl MarkdownDocument {
    /// The generation date from the header. Its absence is a fatal
    /// input-format error for callers that stamp derived records.
    pub fn generation_date(&self) -> Result<NaiveDate> {
        generation_date(&self.header)
    }
}

/// Split a document on `## <n>.` item headings. Everything before the first
/// heading is the header and is never treated as an item; whitespace-only
/// chunks are dropped.
pub fn split_document(content: &str) -> MarkdownDocument {
    let mut parts = ITEM_HEADING.split(content);
    let header = parts.next().unwrap_or("").to_string();

    let mut sections = Vec::new();
    for part in parts {
        let text = part.trim();
        if text.is_empty() {
            continue;
        }
        sections.push(Section {
            index: sections.len() + 1,
            text: text.to_string(),
        });
    }

    MarkdownDocument { header, sections }
}

pub fn generation_date(header: &str) -> Result<NaiveDate> {
    let caps = GENERATION_DATE
        .captures(header)
        .ok_or_else(|| Error::Parse("could not find generation date in document header".to_string()))?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
        .map_err(|e| Error::Parse(format!("invalid generation date: {}", e)))
}
