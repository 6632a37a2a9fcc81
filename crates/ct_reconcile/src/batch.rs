//! Bounded-concurrency batch generation over many articles.
//!
//! The semaphore caps in-flight model calls; each article's generation runs
//! to completion before its result is consumed, and a single article's
//! failure never stops the batch — it is absorbed into a fallback record
//! and counted in the tally.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use ct_core::{Article, InferenceModel, SummaryRecord, TipsRecord};
use ct_inference::classifier;
use ct_inference::recovery::{recover_tips, RecoveryTier};

use crate::placeholder::FALLBACK_SUMMARY;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchTally {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct SummaryBatch {
    pub records: Vec<SummaryRecord>,
    pub tally: BatchTally,
}

#[derive(Debug)]
pub struct TipsBatch {
    pub records: Vec<TipsRecord>,
    pub tally: BatchTally,
}

/// Summarize every article, at most `concurrency` model calls in flight.
/// Output order matches input order.
pub async fn generate_summaries(
    model: Arc<dyn InferenceModel>,
    articles: &[Article],
    concurrency: usize,
    generated_at: &str,
) -> SummaryBatch {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let futures: Vec<_> = articles
        .iter()
        .cloned()
        .map(|article| {
            let model = model.clone();
            let semaphore = semaphore.clone();
            let generated_at = generated_at.to_string();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (summary_record(&article, FALLBACK_SUMMARY.to_string(), &generated_at), false);
                };
                match model.summarize_article(&article).await {
                    Ok(text) if !text.trim().is_empty() => {
                        (summary_record(&article, text, &generated_at), true)
                    }
                    Ok(_) => {
                        warn!(article = %article.id, "model returned an empty summary");
                        (summary_record(&article, FALLBACK_SUMMARY.to_string(), &generated_at), false)
                    }
                    Err(error) => {
                        warn!(article = %article.id, %error, "summary generation failed");
                        (summary_record(&article, FALLBACK_SUMMARY.to_string(), &generated_at), false)
                    }
                }
            }
        })
        .collect();

    let mut records = Vec::with_capacity(articles.len());
    let mut tally = BatchTally::default();
    for (record, ok) in join_all(futures).await {
        if ok {
            tally.succeeded += 1;
        } else {
            tally.failed += 1;
        }
        records.push(record);
    }

    info!(
        succeeded = tally.succeeded,
        failed = tally.failed,
        "summary batch finished"
    );
    SummaryBatch { records, tally }
}

/// Generate tips for every article. A failed or unusable model response
/// falls back to heuristic classification, so every article still yields a
/// record.
pub async fn generate_tips(
    model: Arc<dyn InferenceModel>,
    articles: &[Article],
    concurrency: usize,
    generated_at: &str,
) -> TipsBatch {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let futures: Vec<_> = articles
        .iter()
        .cloned()
        .map(|article| {
            let model = model.clone();
            let semaphore = semaphore.clone();
            let generated_at = generated_at.to_string();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (classified_record(&article, &generated_at), false);
                };
                match model.generate_tips(&article).await {
                    Ok(raw) => {
                        let recovered = recover_tips(&raw);
                        if recovered.tier == RecoveryTier::Defaults {
                            warn!(article = %article.id, "nothing usable in model output, classifying heuristically");
                            (classified_record(&article, &generated_at), false)
                        } else {
                            (tips_record(&article, recovered.tips, &generated_at), true)
                        }
                    }
                    Err(error) => {
                        warn!(article = %article.id, %error, "tips generation failed, classifying heuristically");
                        (classified_record(&article, &generated_at), false)
                    }
                }
            }
        })
        .collect();

    let mut records = Vec::with_capacity(articles.len());
    let mut tally = BatchTally::default();
    for (record, ok) in join_all(futures).await {
        if ok {
            tally.succeeded += 1;
        } else {
            tally.failed += 1;
        }
        records.push(record);
    }

    info!(
        succeeded = tally.succeeded,
        failed = tally.failed,
        "tips batch finished"
    );
    TipsBatch { records, tally }
}

fn summary_record(article: &Article, summary: String, generated_at: &str) -> SummaryRecord {
    SummaryRecord {
        article_id: article.id.clone(),
        title: article.title.clone(),
        summary,
        source: article.source.clone(),
        source_type: article.source_type.clone(),
        date: article.date.clone(),
        generated_at: generated_at.to_string(),
    }
}

fn tips_record(article: &Article, tips: ct_core::Tips, generated_at: &str) -> TipsRecord {
    TipsRecord {
        article_id: article.id.clone(),
        title: article.title.clone(),
        tips,
        source: article.source.clone(),
        source_type: article.source_type.clone(),
        date: article.date.clone(),
        generated_at: generated_at.to_string(),
    }
}

fn classified_record(article: &Article, generated_at: &str) -> TipsRecord {
    let tips = classifier::classify(&article.title, &article.content).tips;
    tips_record(article, tips, generated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ct_core::{Error, Result};
    use ct_inference::models::DummyModel;

    fn articles(count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                id: format!("a{}", i),
                title: format!("Phishing report {}", i),
                content: "Banks are targeted. Verify senders.".to_string(),
                source: "Cyber News".to_string(),
                source_type: "cybernews".to_string(),
                date: "Unknown".to_string(),
                tags: "None".to_string(),
                url: "Unknown".to_string(),
            })
            .collect()
    }

    struct FailingModel;

    #[async_trait]
    impl InferenceModel for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn summarize_article(&self, _article: &Article) -> Result<String> {
            Err(Error::Inference("model unavailable".to_string()))
        }

        async fn generate_tips(&self, _article: &Article) -> Result<String> {
            Err(Error::Inference("model unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_summary_batch_preserves_order() {
        let batch = generate_summaries(Arc::new(DummyModel), &articles(3), 2, "2025-03-20").await;
        assert_eq!(batch.tally.succeeded, 3);
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[0].article_id, "a0");
        assert_eq!(batch.records[2].article_id, "a2");
    }

    #[tokio::test]
    async fn test_failures_fall_back_and_are_tallied() {
        let batch = generate_tips(Arc::new(FailingModel), &articles(2), 1, "2025-03-20").await;
        assert_eq!(batch.tally.failed, 2);
        assert_eq!(batch.records.len(), 2);
        // the heuristic classifier still produced usable records
        for record in &batch.records {
            assert!(!record.tips.dos.is_empty());
            assert!(!record.tips.donts.is_empty());
        }
    }

    #[tokio::test]
    async fn test_tips_batch_with_live_model() {
        let batch = generate_tips(Arc::new(DummyModel), &articles(2), 4, "2025-03-20").await;
        assert_eq!(batch.tally.succeeded, 2);
        assert!(batch.records[0].tips.dos[0].contains("Phishing report 0"));
    }
}
