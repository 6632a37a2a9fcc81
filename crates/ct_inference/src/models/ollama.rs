use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ct_core::{Article, InferenceModel, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_VARIANT: &str = "llama3.2:1b";

lazy_static! {
    // models like to prepend their own "Summary" heading; strip it
    static ref SUMMARY_HEADING: Regex = Regex::new(r"(?m)^#+\s*Summary:?\s*$").unwrap();
    static ref BOLD_SUMMARY_HEADING: Regex =
        Regex::new(r"(?m)^\s*\*\*Summary:?\*\*\s*$").unwrap();
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama daemon. Transport failures surface as
/// `Error::Http`; callers treat any failure as input to the fallback
/// chain rather than as fatal.
pub struct OllamaModel {
    client: Arc<Client>,
    base_url: String,
    variant: String,
}

impl OllamaModel {
    pub fn new(base_url: Option<String>, variant: Option<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            variant: variant.unwrap_or_else(|| DEFAULT_VARIANT.to_string()),
        }
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            model: &self.variant,
            prompt,
            stream: false,
            // low temperature for more factual responses
            temperature: 0.1,
            max_tokens: 1024,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        Ok(response.response)
    }
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("base_url", &self.base_url)
            .field("variant", &self.variant)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn summarize_article(&self, article: &Article) -> Result<String> {
        let prompt = format!(
            "You are a professional article summarizer. Summarize the following article in 3-4 concise paragraphs.\n\
Focus on the key points, main insights, and important details.\n\
Keep your summary informative but concise.\n\n\
Title: {}\n\
Date: {}\n\
Source: {}\n\
Tags: {}\n\n\
Content:\n{}\n\n\
Your summary:\n",
            article.title, article.date, article.source, article.tags, article.content
        );

        let raw = self.generate(prompt).await?;
        let cleaned = SUMMARY_HEADING.replace_all(&raw, "");
        let cleaned = BOLD_SUMMARY_HEADING.replace_all(&cleaned, "");
        Ok(cleaned.trim().to_string())
    }

    async fn generate_tips(&self, article: &Article) -> Result<String> {
        let prompt = format!(
            "You are acting as a Chief Information Security Officer (CISO) providing cybersecurity advice based on recent threats.\n\
Based on the following article, create a list of practical \"DO's\" and \"DON'Ts\" for users to follow.\n\
Focus on specific, actionable advice directly related to the article's topic and threat vector.\n\n\
Article Title: {}\n\
Article Content:\n{}\n\n\
Your response must be in the following JSON format:\n\
{{\n\
  \"summary\": \"Brief summary here\",\n\
  \"dos\": [\"Do this\", \"Do that\"],\n\
  \"donts\": [\"Don't do this\", \"Don't do that\"]\n\
}}\n\n\
IMPORTANT: Each \"DO\" and \"DON'T\" must be specific to the exact security threat discussed in the article.\n\
DO NOT provide generic cybersecurity advice. Make all tips directly actionable for the specific issue.\n\
Make sure to follow proper JSON syntax with quotes around all strings.\n",
            article.title, article.content
        );

        self.generate(prompt).await
    }
}
