use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::metadata::{self, SectionData};
use crate::splitter::{self, MarkdownDocument};
use ct_core::{Article, Result, SummaryRecord, Tips, TipsRecord};

lazy_static! {
    static ref KEY_ISSUE_BLOCK: Regex =
        Regex::new(r"(?s)### Key Security Issue\s*\n\n(.*?)(?:\n\n###|\n\n---|\z)").unwrap();
    static ref DOS_BLOCK: Regex =
        Regex::new(r"(?s)### DO's\s*\n\n(.*?)(?:\n\n###|\n\n---|\z)").unwrap();
    static ref DONTS_BLOCK: Regex =
        Regex::new(r"(?s)### DON'Ts\s*\n\n(.*?)(?:\n\n###|\n\n---|\z)").unwrap();
}

/// Parse an article feed document into articles. The feed header is not
/// required to carry a generation date.
pub fn parse_articles(content: &str) -> Vec<Article> {
    let doc = splitter::split_document(content);
    let articles: Vec<Article> = doc
        .sections
        .iter()
        .map(|section| {
            let data = metadata::extract(section);
            article_from(&data)
        })
        .collect();
    debug!("extracted {} articles from markdown", articles.len());
    articles
}

fn article_from(data: &SectionData) -> Article {
    Article {
        id: data.id(),
        title: data.title.clone(),
        content: data.content.clone(),
        source: data.source().to_string(),
        source_type: data.source_type(),
        date: data.date().to_string(),
        tags: data.tags().to_string(),
        url: data.url().to_string(),
    }
}

/// Parse a summaries document into summary records, stamped with the
/// header's generation date. A missing generation date is fatal.
pub fn parse_summaries(content: &str) -> Result<Vec<SummaryRecord>> {
    let doc = splitter::split_document(content);
    let generated_at = doc.generation_date()?.to_string();

    let records = doc
        .sections
        .iter()
        .map(|section| {
            let data = metadata::extract(section);
            SummaryRecord {
                article_id: data.id(),
                title: data.title.clone(),
                summary: if data.content.is_empty() {
                    "No summary available".to_string()
                } else {
                    data.content.clone()
                },
                source: data.source().to_string(),
                source_type: data.source_type(),
                date: data.date().to_string(),
                generated_at: generated_at.clone(),
            }
        })
        .collect();
    Ok(records)
}

/// Parse a tips document (`### Key Security Issue` / `### DO's` /
/// `### DON'Ts` blocks) into tips records. List markers (`✅`, `❌`,
/// bullets) are stripped from the items.
pub fn parse_tips(content: &str) -> Result<Vec<TipsRecord>> {
    let doc = splitter::split_document(content);
    let generated_at = doc.generation_date()?.to_string();
    Ok(tips_from_sections(&doc, &generated_at))
}

fn tips_from_sections(doc: &MarkdownDocument, generated_at: &str) -> Vec<TipsRecord> {
    doc.sections
        .iter()
        .map(|section| {
            let data = metadata::extract(section);
            let summary = KEY_ISSUE_BLOCK
                .captures(&section.text)
                .map(|caps| caps[1].trim().to_string())
                .unwrap_or_default();
            let tips = Tips {
                summary,
                dos: block_items(&DOS_BLOCK, &section.text),
                donts: block_items(&DONTS_BLOCK, &section.text),
            }
            .normalized();

            TipsRecord {
                article_id: data.id(),
                title: data.title.clone(),
                tips,
                source: data.source().to_string(),
                source_type: data.source_type(),
                date: data.date().to_string(),
                generated_at: generated_at.to_string(),
            }
        })
        .collect()
}

fn block_items(block: &Regex, text: &str) -> Vec<String> {
    let Some(caps) = block.captures(text) else {
        return Vec::new();
    };
    caps[1]
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['✅', '❌', '-', '*'])
                .trim()
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIPS_DOC: &str = "# CISO Security Tips for Non-Technical Users\n\n\
Generated on: 2025-03-20 11:22:33\n\n\
Number of articles: 1\n\n\
## 1. Phishing Campaign Hits Banks\n\n\
**Source:** Cyber News\n\
**Date:** 20 March 2025\n\
**ID:** art42\n\n\
### Key Security Issue\n\n\
A phishing campaign is targeting bank customers.\n\n\
### DO's\n\n\
✅ Verify sender addresses\n\n\
✅ Report suspicious emails\n\n\
### DON'Ts\n\n\
❌ Don't click unknown links\n\n\
---\n";

    #[test]
    fn test_parse_tips_document() {
        let records = parse_tips(TIPS_DOC).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.article_id, "art42");
        assert_eq!(record.source_type, "cybernews");
        assert_eq!(record.generated_at, "2025-03-20");
        assert_eq!(
            record.tips.summary,
            "A phishing campaign is targeting bank customers."
        );
        assert_eq!(
            record.tips.dos,
            vec!["Verify sender addresses", "Report suspicious emails"]
        );
        assert_eq!(record.tips.donts, vec!["Don't click unknown links"]);
    }

    #[test]
    fn test_parse_tips_requires_generation_date() {
        assert!(parse_tips("# Tips\n\n## 1. A\n\ncontent").is_err());
    }

    #[test]
    fn test_parse_summaries_document() {
        let doc = "# Article Summaries\n\n\
Generated on: 2025-03-20\n\n\
## 1. Title A\n\n\
**Source:** The Hacker News\n\
**ID:** a1\n\n\
### Summary\n\n\
Summary text here.\n\n\
---\n\n\
## 2. Title B\n\n\
**ID:** b2\n\n\
---\n";
        let records = parse_summaries(doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].article_id, "a1");
        assert_eq!(records[0].summary, "Summary text here.");
        // missing summary block resolves to the fixed fallback
        assert_eq!(records[1].summary, "No summary available");
    }

    #[test]
    fn test_parse_articles_feed() {
        let doc = "# Cybersecurity News Articles\n\n\
Generated on: 2025-03-20\n\n\
## 1. Title A\n\n\
**Source:** The Hacker News\n\
**ID:** a1\n\n\
### Content:\n\n\
Body text.\n\n\
---\n";
        let articles = parse_articles(doc);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "a1");
        assert_eq!(articles[0].content, "Body text.");
    }

    #[test]
    fn test_empty_tip_lists_get_defaults() {
        let doc = "Generated on: 2025-03-20\n\n## 1. Bare\n\n**ID:** x\n";
        let records = parse_tips(doc).unwrap();
        assert_eq!(records[0].tips.dos.len(), 1);
        assert_eq!(records[0].tips.donts.len(), 1);
        assert!(!records[0].tips.summary.is_empty());
    }
}
