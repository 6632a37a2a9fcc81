use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::Document;

/// A scraped news article. Articles are created by the scraping side of the
/// system and are read-only here; the pipeline derives summaries and tips
/// from them but never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub source_type: String,
    pub date: String,
    pub tags: String,
    pub url: String,
}

impl Article {
    /// Build an article from a raw store document. Only the document id is
    /// required; every other field falls back to a fixed default so that
    /// partially scraped articles still flow through the pipeline.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let id = doc_str(doc, "_id")?.to_string();
        let source = doc_str(doc, "source").unwrap_or("Unknown").to_string();
        let source_type = doc_str(doc, "source_type")
            .map(|s| s.to_string())
            .unwrap_or_else(|| source_type_for(&source));
        Some(Self {
            id,
            title: doc_str(doc, "title").unwrap_or("Unknown Title").to_string(),
            content: doc_str(doc, "description")
                .or_else(|| doc_str(doc, "content"))
                .unwrap_or("")
                .to_string(),
            source,
            source_type,
            date: doc_str(doc, "date").unwrap_or("Unknown").to_string(),
            tags: doc_str(doc, "tags").unwrap_or("None").to_string(),
            url: doc_str(doc, "url").unwrap_or("Unknown").to_string(),
        })
    }
}

/// Derive the source-type tag from a source label.
pub fn source_type_for(source: &str) -> String {
    match source.to_lowercase().as_str() {
        "the hacker news" => "hackernews".to_string(),
        "cyber news" => "cybernews".to_string(),
        other => other.replace(' ', ""),
    }
}

/// A generated article summary, stored one-to-one with its article. The
/// article id doubles as the storage document id, so re-inserting a summary
/// replaces the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub article_id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub source_type: String,
    pub date: String,
    pub generated_at: String,
}

impl SummaryRecord {
    pub fn to_document(&self) -> Document {
        record_document(self, &self.article_id)
    }

    pub fn from_document(doc: &Document) -> Option<Self> {
        // article_id is authoritative; the document id is only a fallback
        // for legacy documents that never carried the field.
        let article_id = doc_str(doc, "article_id")
            .or_else(|| doc_str(doc, "_id"))?
            .to_string();
        let summary = doc_str(doc, "summary")?.to_string();
        let source = doc_str(doc, "source").unwrap_or("Unknown").to_string();
        let source_type = doc_str(doc, "source_type")
            .map(|s| s.to_string())
            .unwrap_or_else(|| source_type_for(&source));
        Some(Self {
            article_id,
            title: doc_str(doc, "title").unwrap_or("Unknown Title").to_string(),
            summary,
            source,
            source_type,
            date: doc_str(doc, "date").unwrap_or("Unknown").to_string(),
            generated_at: doc_str(doc, "generated_at").unwrap_or("Unknown").to_string(),
        })
    }
}

/// The structured advice payload: always a nested object, never a bare
/// string or top-level fields. A stored tips document violating this shape
/// is malformed and gets rebuilt by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tips {
    pub summary: String,
    pub dos: Vec<String>,
    pub donts: Vec<String>,
}

pub const DEFAULT_SUMMARY: &str = "No summary available.";
pub const DEFAULT_DO: &str = "No specific dos provided.";
pub const DEFAULT_DONT: &str = "No specific don'ts provided.";

impl Tips {
    /// Enforce the construction invariant: a trimmed, non-empty summary and
    /// non-empty do/don't lists. Every path that builds tips ends here.
    pub fn normalized(self) -> Self {
        let clean = |items: Vec<String>, default: &str| {
            let mut kept: Vec<String> = items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            if kept.is_empty() {
                kept.push(default.to_string());
            }
            kept
        };
        let summary = self.summary.trim().to_string();
        Self {
            summary: if summary.is_empty() {
                DEFAULT_SUMMARY.to_string()
            } else {
                summary
            },
            dos: clean(self.dos, DEFAULT_DO),
            donts: clean(self.donts, DEFAULT_DONT),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipsRecord {
    pub article_id: String,
    pub title: String,
    pub tips: Tips,
    pub source: String,
    pub source_type: String,
    pub date: String,
    pub generated_at: String,
}

impl TipsRecord {
    pub fn to_document(&self) -> Document {
        record_document(self, &self.article_id)
    }

    pub fn from_document(doc: &Document) -> Option<Self> {
        let article_id = doc_str(doc, "article_id")
            .or_else(|| doc_str(doc, "_id"))?
            .to_string();
        let tips: Tips = serde_json::from_value(doc.get("tips")?.clone()).ok()?;
        let source = doc_str(doc, "source").unwrap_or("Unknown").to_string();
        let source_type = doc_str(doc, "source_type")
            .map(|s| s.to_string())
            .unwrap_or_else(|| source_type_for(&source));
        Some(Self {
            article_id,
            title: doc_str(doc, "title").unwrap_or("Unknown Title").to_string(),
            tips,
            source,
            source_type,
            date: doc_str(doc, "date").unwrap_or("Unknown").to_string(),
            generated_at: doc_str(doc, "generated_at").unwrap_or("Unknown").to_string(),
        })
    }
}

fn record_document<T: Serialize>(record: &T, id: &str) -> Document {
    let mut doc = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Document::new(),
    };
    doc.insert("_id".to_string(), Value::String(id.to_string()));
    doc
}

pub fn doc_str<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_derivation() {
        assert_eq!(source_type_for("The Hacker News"), "hackernews");
        assert_eq!(source_type_for("Cyber News"), "cybernews");
        assert_eq!(source_type_for("Dark Reading"), "darkreading");
    }

    #[test]
    fn test_tips_record_round_trip() {
        let record = TipsRecord {
            article_id: "abc123".to_string(),
            title: "Ransomware wave".to_string(),
            tips: Tips {
                summary: "Ransomware is spreading.".to_string(),
                dos: vec!["Backup data".to_string()],
                donts: vec!["Don't pay the ransom".to_string()],
            },
            source: "The Hacker News".to_string(),
            source_type: "hackernews".to_string(),
            date: "20 March 2025".to_string(),
            generated_at: "2025-03-20".to_string(),
        };

        let doc = record.to_document();
        assert_eq!(doc_str(&doc, "_id"), Some("abc123"));

        let parsed = TipsRecord::from_document(&doc).unwrap();
        assert_eq!(parsed.article_id, "abc123");
        assert_eq!(parsed.tips, record.tips);
    }

    #[test]
    fn test_tips_record_rejects_string_tips() {
        let mut doc = Document::new();
        doc.insert("_id".to_string(), Value::String("x".to_string()));
        doc.insert("article_id".to_string(), Value::String("x".to_string()));
        doc.insert(
            "tips".to_string(),
            Value::String("not a structured object".to_string()),
        );
        assert!(TipsRecord::from_document(&doc).is_none());
    }

    #[test]
    fn test_article_from_document_defaults() {
        let mut doc = Document::new();
        doc.insert("_id".to_string(), Value::String("a1".to_string()));
        doc.insert(
            "source".to_string(),
            Value::String("Cyber News".to_string()),
        );
        let article = Article::from_document(&doc).unwrap();
        assert_eq!(article.title, "Unknown Title");
        assert_eq!(article.source_type, "cybernews");
        assert_eq!(article.tags, "None");
        assert!(article.content.is_empty());
    }
}
