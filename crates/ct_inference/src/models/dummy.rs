use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use ct_core::{Article, InferenceModel, Result};

/// Deterministic offline model used in tests and local wiring checks.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

fn leading_sentences(text: &str, count: usize) -> String {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(count)
        .collect();
    if sentences.is_empty() {
        String::new()
    } else {
        sentences.join(". ") + "."
    }
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize_article(&self, article: &Article) -> Result<String> {
        Ok(leading_sentences(&article.content, 3))
    }

    async fn generate_tips(&self, article: &Article) -> Result<String> {
        let summary = leading_sentences(&article.content, 2);
        let payload = json!({
            "summary": summary,
            "dos": [format!("Review the guidance in \"{}\"", article.title)],
            "donts": [format!("Don't ignore the threat described in \"{}\"", article.title)],
        });
        Ok(payload.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::{recover_tips, RecoveryTier};

    fn article() -> Article {
        Article {
            id: "a1".to_string(),
            title: "Test Article".to_string(),
            content: "First sentence. Second sentence. Third sentence. Fourth.".to_string(),
            source: "test".to_string(),
            source_type: "test".to_string(),
            date: "Unknown".to_string(),
            tags: "None".to_string(),
            url: "Unknown".to_string(),
        }
    }

    #[tokio::test]
    async fn test_summary_takes_leading_sentences() {
        let summary = DummyModel.summarize_article(&article()).await.unwrap();
        assert_eq!(
            summary,
            "First sentence. Second sentence. Third sentence."
        );
    }

    #[tokio::test]
    async fn test_tips_output_parses_directly() {
        let raw = DummyModel.generate_tips(&article()).await.unwrap();
        let recovered = recover_tips(&raw);
        assert_eq!(recovered.tier, RecoveryTier::DirectJson);
        assert!(recovered.tips.dos[0].contains("Test Article"));
    }
}
