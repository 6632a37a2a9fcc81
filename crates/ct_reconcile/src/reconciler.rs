//! Consistency maintenance between the article collection and its derived
//! summary/tips collections.
//!
//! The store offers no transactions, so every repair is a full-record
//! overwrite keyed by the article id: re-running a pass is safe, and two
//! racing passes degrade to last-writer-wins on the same id.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use ct_core::storage::{field_filter, id_filter};
use ct_core::types::doc_str;
use ct_core::{
    Article, Document, DocumentStore, InferenceModel, Result, SummaryRecord, Tips, TipsRecord,
};
use ct_inference::classifier;
use ct_inference::recovery::{recover_tips, RecoveryTier};

use crate::placeholder::{
    is_generic_dos, is_placeholder, FALLBACK_SUMMARY, GENERIC_DONTS, GENERIC_DOS,
    REBUILT_TIPS_SUMMARY,
};

/// Collection names, passed explicitly to every store access.
#[derive(Debug, Clone)]
pub struct Collections {
    pub articles: String,
    pub summaries: String,
    pub tips: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            articles: "news".to_string(),
            summaries: "summaries".to_string(),
            tips: "tips".to_string(),
        }
    }
}

/// Read-only coverage counts for the three collections.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub total_articles: usize,
    pub hackernews_articles: usize,
    pub cybernews_articles: usize,
    pub summaries: usize,
    pub tips: usize,
    pub placeholder_summaries: usize,
    pub placeholder_tips: usize,
    pub malformed_tips: usize,
}

impl CoverageReport {
    pub fn log(&self) {
        info!(
            articles = self.total_articles,
            hackernews = self.hackernews_articles,
            cybernews = self.cybernews_articles,
            summaries = self.summaries,
            tips = self.tips,
            "coverage"
        );
        if self.malformed_tips > 0 {
            warn!(
                count = self.malformed_tips,
                "tips documents with broken structure"
            );
        }
        if self.placeholder_summaries > 0 || self.placeholder_tips > 0 {
            warn!(
                summaries = self.placeholder_summaries,
                tips = self.placeholder_tips,
                "placeholder documents awaiting regeneration"
            );
        }
    }
}

/// Tally of one repair pass. Batch semantics: a single article's failure is
/// counted, never propagated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub summaries_written: usize,
    pub tips_written: usize,
    pub salvaged_summaries: usize,
    pub malformed_fixed: usize,
    pub placeholders_remaining: usize,
    pub failures: usize,
    pub skipped: usize,
}

impl RepairReport {
    pub fn total_writes(&self) -> usize {
        self.summaries_written + self.tips_written + self.salvaged_summaries
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SummaryState {
    Missing,
    Placeholder,
    Valid,
}

#[derive(Debug, PartialEq, Eq)]
enum TipsState {
    Missing,
    Malformed,
    Placeholder,
    Generic,
    Valid,
}

fn summary_state(doc: Option<&Document>) -> SummaryState {
    let Some(doc) = doc else {
        return SummaryState::Missing;
    };
    match doc_str(doc, "summary") {
        Some(summary) if !is_placeholder(summary) => SummaryState::Valid,
        // present but marked, or a document with no summary text at all
        _ => SummaryState::Placeholder,
    }
}

fn tips_state(doc: Option<&Document>) -> TipsState {
    let Some(doc) = doc else {
        return TipsState::Missing;
    };
    let Some(tips) = doc.get("tips").and_then(Value::as_object) else {
        return TipsState::Malformed;
    };
    let summary = tips.get("summary").and_then(Value::as_str).unwrap_or("");
    if is_placeholder(summary) {
        return TipsState::Placeholder;
    }
    let dos: Vec<&str> = tips
        .get("dos")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if is_generic_dos(dos) {
        return TipsState::Generic;
    }
    TipsState::Valid
}

pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    model: Option<Arc<dyn InferenceModel>>,
    collections: Collections,
}

impl Reconciler {
    pub fn new(store: Arc<dyn DocumentStore>, collections: Collections) -> Self {
        Self {
            store,
            model: None,
            collections,
        }
    }

    /// Attach a live model; without one, repairs fall back to deterministic
    /// placeholders and heuristic classification.
    pub fn with_model(mut self, model: Arc<dyn InferenceModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Read-only sweep: count coverage and anomalies without writing.
    pub async fn check(&self) -> Result<CoverageReport> {
        let articles = self
            .store
            .find(&self.collections.articles, None, None, None)
            .await?;
        let summaries = self
            .store
            .find(&self.collections.summaries, None, None, None)
            .await?;
        let tips = self
            .store
            .find(&self.collections.tips, None, None, None)
            .await?;

        let mut report = CoverageReport {
            total_articles: articles.len(),
            summaries: summaries.len(),
            tips: tips.len(),
            ..CoverageReport::default()
        };
        for article in &articles {
            match doc_str(article, "source_type") {
                Some("hackernews") => report.hackernews_articles += 1,
                Some("cybernews") => report.cybernews_articles += 1,
                _ => {}
            }
        }
        for doc in &summaries {
            if summary_state(Some(doc)) == SummaryState::Placeholder {
                report.placeholder_summaries += 1;
            }
        }
        for doc in &tips {
            match tips_state(Some(doc)) {
                TipsState::Malformed => report.malformed_tips += 1,
                TipsState::Placeholder => report.placeholder_tips += 1,
                _ => {}
            }
        }

        report.log();
        Ok(report)
    }

    /// One full repair pass over the article set. Per-article work runs
    /// sequentially; every write replaces the whole record under the
    /// article id. Running the pass again with an unchanged article set
    /// performs no further writes.
    pub async fn repair(&self) -> Result<RepairReport> {
        let articles = self
            .store
            .find(&self.collections.articles, None, None, None)
            .await?;
        let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut report = RepairReport::default();
        for doc in &articles {
            let Some(article) = Article::from_document(doc) else {
                warn!("skipping article document without an id");
                report.skipped += 1;
                continue;
            };
            if let Err(error) = self.repair_article(&article, &generated_at, &mut report).await {
                warn!(article = %article.id, %error, "repair failed for article");
                report.failures += 1;
            }
        }

        info!(
            summaries = report.summaries_written,
            tips = report.tips_written,
            salvaged = report.salvaged_summaries,
            placeholders_remaining = report.placeholders_remaining,
            failures = report.failures,
            "repair pass finished"
        );
        Ok(report)
    }

    async fn repair_article(
        &self,
        article: &Article,
        generated_at: &str,
        report: &mut RepairReport,
    ) -> Result<()> {
        // tips first: rebuilding a malformed tips document may salvage a
        // stray summary, which the summary repair should then respect
        self.repair_tips(article, generated_at, report).await?;
        self.repair_summary(article, generated_at, report).await?;
        Ok(())
    }

    async fn repair_summary(
        &self,
        article: &Article,
        generated_at: &str,
        report: &mut RepairReport,
    ) -> Result<()> {
        let existing = self
            .store
            .find_one(
                &self.collections.summaries,
                &field_filter("article_id", &article.id),
            )
            .await?;

        match summary_state(existing.as_ref()) {
            SummaryState::Valid => {}
            SummaryState::Missing => {
                let record = self.build_summary(article, generated_at).await;
                self.store
                    .insert_one(&self.collections.summaries, record.to_document())
                    .await?;
                report.summaries_written += 1;
            }
            SummaryState::Placeholder => {
                if self.model.is_some() && !article.content.trim().is_empty() {
                    let record = self.build_summary(article, generated_at).await;
                    if is_placeholder(&record.summary) {
                        report.placeholders_remaining += 1;
                    } else {
                        self.replace(&self.collections.summaries, existing.as_ref(), record.to_document())
                            .await?;
                        report.summaries_written += 1;
                    }
                } else {
                    warn!(article = %article.id, "placeholder summary left in place: no regeneration available");
                    report.placeholders_remaining += 1;
                }
            }
        }
        Ok(())
    }

    async fn repair_tips(
        &self,
        article: &Article,
        generated_at: &str,
        report: &mut RepairReport,
    ) -> Result<()> {
        let existing = self
            .store
            .find_one(
                &self.collections.tips,
                &field_filter("article_id", &article.id),
            )
            .await?;

        match tips_state(existing.as_ref()) {
            TipsState::Valid => {}
            TipsState::Missing => {
                let record = self.build_tips(article, generated_at).await;
                self.store
                    .insert_one(&self.collections.tips, record.to_document())
                    .await?;
                report.tips_written += 1;
            }
            TipsState::Malformed => {
                let doc = existing.as_ref().ok_or_else(|| {
                    ct_core::Error::Storage("malformed tips document vanished".to_string())
                })?;
                warn!(article = %article.id, "tips document has broken structure, rebuilding");
                self.salvage_summary(article, doc, generated_at, report).await?;

                let record = if self.model.is_some() && !article.content.trim().is_empty() {
                    self.build_tips(article, generated_at).await
                } else {
                    rebuild_tips(article, doc, generated_at)
                };
                self.replace(&self.collections.tips, existing.as_ref(), record.to_document())
                    .await?;
                report.tips_written += 1;
                report.malformed_fixed += 1;
            }
            TipsState::Placeholder | TipsState::Generic => {
                if self.model.is_some() && !article.content.trim().is_empty() {
                    let record = self.build_tips(article, generated_at).await;
                    let improved = !is_placeholder(&record.tips.summary)
                        && !is_generic_dos(record.tips.dos.iter().map(String::as_str));
                    if improved {
                        self.replace(&self.collections.tips, existing.as_ref(), record.to_document())
                            .await?;
                        report.tips_written += 1;
                    } else {
                        report.placeholders_remaining += 1;
                    }
                } else {
                    warn!(article = %article.id, "placeholder tips left in place: no regeneration available");
                    report.placeholders_remaining += 1;
                }
            }
        }
        Ok(())
    }

    /// Move a stray top-level summary out of a malformed tips document into
    /// the summaries collection, when none exists there yet.
    async fn salvage_summary(
        &self,
        article: &Article,
        tips_doc: &Document,
        generated_at: &str,
        report: &mut RepairReport,
    ) -> Result<()> {
        let Some(summary_text) = doc_str(tips_doc, "summary") else {
            return Ok(());
        };
        let existing = self
            .store
            .find_one(
                &self.collections.summaries,
                &field_filter("article_id", &article.id),
            )
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let record = SummaryRecord {
            article_id: article.id.clone(),
            title: article.title.clone(),
            summary: summary_text.to_string(),
            source: article.source.clone(),
            source_type: article.source_type.clone(),
            date: article.date.clone(),
            generated_at: generated_at.to_string(),
        };
        self.store
            .insert_one(&self.collections.summaries, record.to_document())
            .await?;
        report.salvaged_summaries += 1;
        info!(article = %article.id, "moved stray summary into the summaries collection");
        Ok(())
    }

    async fn build_summary(&self, article: &Article, generated_at: &str) -> SummaryRecord {
        let summary = if article.content.trim().is_empty() {
            FALLBACK_SUMMARY.to_string()
        } else if let Some(model) = &self.model {
            match model.summarize_article(article).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => content_preview(&article.content),
                Err(error) => {
                    warn!(article = %article.id, %error, "summary generation failed, using content preview");
                    content_preview(&article.content)
                }
            }
        } else {
            content_preview(&article.content)
        };

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

    async fn build_tips(&self, article: &Article, generated_at: &str) -> TipsRecord {
        let tips = match &self.model {
            Some(model) if !article.content.trim().is_empty() => {
                match model.generate_tips(article).await {
                    Ok(raw) => {
                        let recovered = recover_tips(&raw);
                        if recovered.tier == RecoveryTier::Defaults {
                            classifier::classify(&article.title, &article.content).tips
                        } else {
                            recovered.tips
                        }
                    }
                    Err(error) => {
                        warn!(article = %article.id, %error, "tips generation failed, classifying heuristically");
                        classifier::classify(&article.title, &article.content).tips
                    }
                }
            }
            _ => classifier::classify(&article.title, &article.content).tips,
        };

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

    /// Overwrite a derived document under the article id, removing a
    /// stray-keyed original first.
    async fn replace(
        &self,
        collection: &str,
        old: Option<&Document>,
        doc: Document,
    ) -> Result<()> {
        if let (Some(old_id), Some(new_id)) = (
            old.and_then(|old| doc_str(old, "_id")),
            doc.get("_id").and_then(Value::as_str),
        ) {
            if old_id != new_id {
                self.store
                    .delete(collection, Some(&id_filter(old_id)))
                    .await?;
            }
        }
        self.store.insert_one(collection, doc).await?;
        Ok(())
    }
}

/// Rebuild a structurally broken tips document from whatever top-level
/// fields it still carries, without a model.
fn rebuild_tips(article: &Article, doc: &Document, generated_at: &str) -> TipsRecord {
    let lists = |key: &str, fallback: &[&str]| -> Vec<String> {
        doc.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|items: &Vec<String>| !items.is_empty())
            .unwrap_or_else(|| fallback.iter().map(|s| s.to_string()).collect())
    };

    TipsRecord {
        article_id: article.id.clone(),
        title: article.title.clone(),
        tips: Tips {
            summary: REBUILT_TIPS_SUMMARY.to_string(),
            dos: lists("dos", &GENERIC_DOS),
            donts: lists("donts", &GENERIC_DONTS),
        }
        .normalized(),
        source: article.source.clone(),
        source_type: article.source_type.clone(),
        date: article.date.clone(),
        generated_at: generated_at.to_string(),
    }
}

fn content_preview(content: &str) -> String {
    let paragraph = content.split("\n\n").next().unwrap_or(content).trim();
    paragraph.chars().take(300).collect()
}
