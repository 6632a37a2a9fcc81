use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::splitter::Section;
use ct_core::types::source_type_for;

lazy_static! {
    static ref METADATA_LINE: Regex = Regex::new(r"(?m)^\*\*(.+?):\*\*\s*(.*?)\s*$").unwrap();
    static ref BODY_BLOCK: Regex =
        Regex::new(r"(?s)### (?:Content:|Summary:?)\s*\n\n(.*?)(?:\n\n---|\n---|\z)").unwrap();
}

/// The structured form of one section: title, lower-cased metadata mapping
/// and the content block. Extraction is total — missing metadata and a
/// missing body resolve to fixed fallbacks, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionData {
    pub index: usize,
    pub title: String,
    pub metadata: HashMap<String, String>,
    pub content: String,
}

impl SectionData {
    pub fn meta_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.metadata.get(key).map(String::as_str).unwrap_or(fallback)
    }

    /// The article id, falling back to a position-derived id when the
    /// section never carried one.
    pub fn id(&self) -> String {
        self.metadata
            .get("id")
            .cloned()
            .unwrap_or_else(|| format!("article_{}", self.index))
    }

    pub fn source(&self) -> &str {
        self.meta_or("source", "Unknown")
    }

    pub fn source_type(&self) -> String {
        self.metadata
            .get("source_type")
            .cloned()
            .unwrap_or_else(|| source_type_for(self.source()))
    }

    pub fn date(&self) -> &str {
        self.meta_or("date", "Unknown")
    }

    pub fn tags(&self) -> &str {
        self.meta_or("tags", "None")
    }

    pub fn url(&self) -> &str {
        self.meta_or("url", "Unknown")
    }
}

/// Extract title, metadata and content from one raw section.
///
/// The first non-blank line is the title. Metadata lines match
/// `**Key:** value` with keys lower-cased and the last occurrence winning.
/// The body is whatever sits between a `### Content:` / `### Summary`
/// header and a `---` separator (or the end of the section).
pub fn extract(section: &Section) -> SectionData {
    let title = section
        .text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string();

    let mut metadata = HashMap::new();
    for caps in METADATA_LINE.captures_iter(&section.text) {
        metadata.insert(caps[1].to_lowercase(), caps[2].trim().to_string());
    }

    let content = BODY_BLOCK
        .captures(&section.text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default();

    SectionData {
        index: section.index,
        title,
        metadata,
        content,
    }
}
