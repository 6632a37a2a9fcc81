use async_trait::async_trait;

use crate::types::Article;
use crate::Result;

/// The generative-model seam. Implementations own transport, timeouts and
/// retries; callers only see raw response text or an `Error::Inference`.
/// The tips response is deliberately returned unparsed — the recovery chain
/// owns turning it into a structured record.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize an article into a few short paragraphs.
    async fn summarize_article(&self, article: &Article) -> Result<String>;

    /// Generate do/don't security tips for an article. Returns the raw
    /// model output, which is expected (but not guaranteed) to contain a
    /// JSON object with `summary`, `dos` and `donts` fields.
    async fn generate_tips(&self, article: &Article) -> Result<String>;
}
