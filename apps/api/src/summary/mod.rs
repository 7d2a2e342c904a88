//! Narrative Summarizer: recruiter-style free-text commentary from the language model.
//!
//! Kept separate from the keyword scorer: the orchestrator merges the two outputs,
//! and a summarizer failure never blocks scoring. `AppState` holds an
//! `Arc<dyn NarrativeSummarizer>`, chosen at startup from config.

pub mod prompts;

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::{LlmClient, LlmError};
use crate::summary::prompts::{NARRATIVE_PROMPT, NARRATIVE_SYSTEM};

/// Only this many characters of résumé text are sent to the model.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Stored in place of the narrative whenever the summarizer fails.
pub const FALLBACK_SUMMARY: &str =
    "Narrative summary unavailable; scored by keyword analysis only.";

#[async_trait]
pub trait NarrativeSummarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, LlmError>;
}

/// Summarizer backed by the model API.
pub struct LlmSummarizer(pub LlmClient);

#[async_trait]
impl NarrativeSummarizer for LlmSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let prompt = build_prompt(text);
        self.0.call_text(&prompt, NARRATIVE_SYSTEM).await
    }
}

/// Used when no API key is configured. Every résumé gets the fallback narrative.
pub struct UnavailableSummarizer;

#[async_trait]
impl NarrativeSummarizer for UnavailableSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }
}

/// Never fails: any summarizer error becomes `FALLBACK_SUMMARY`.
pub async fn summarize_or_fallback(summarizer: &dyn NarrativeSummarizer, text: &str) -> String {
    match summarizer.summarize(text).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!("Narrative summary failed, using fallback: {e}");
            FALLBACK_SUMMARY.to_string()
        }
    }
}

pub fn build_prompt(text: &str) -> String {
    NARRATIVE_PROMPT.replace("{resume_text}", truncate_chars(text, MAX_PROMPT_CHARS))
}

/// Truncates on a char boundary so multi-byte text never panics.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
