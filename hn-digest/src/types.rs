use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::path::PathBuf;

use crate::traits::Ranking;

/// Canonical discussion page for an item, used for comments and as the
/// fallback link for stories without an external URL.
pub const DISCUSSION_BASE_URL: &str = "https://news.ycombinator.com/item?id=";

/// Hard ceiling on the number of stories a single run may digest.
pub const MAX_STORIES: usize = 10;

/// Kind of item reported by the item API (`"type"` field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Story,
    Other(String),
}

impl From<String> for ItemKind {
    fn from(kind: String) -> Self {
        if kind == "story" {
            ItemKind::Story
        } else {
            ItemKind::Other(kind)
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Story => "story".to_string(),
            ItemKind::Other(other) => other,
        }
    }
}

/// One item as returned by the item API. Missing fields fall back to the
/// API's implicit defaults (score 0, no comments, alive).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: Option<ItemKind>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(rename = "by", default)]
    pub author: Option<String>,
    #[serde(rename = "descendants", default)]
    pub comment_count: u64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl Candidate {
    pub fn is_story(&self) -> bool {
        matches!(self.kind, Some(ItemKind::Story))
    }

    pub fn discussion_url(&self) -> String {
        format!("{}{}", DISCUSSION_BASE_URL, self.id)
    }

    /// External URL if the story has one, otherwise the discussion page.
    pub fn link(&self) -> String {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.discussion_url(),
        }
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or("anonymous")
    }
}

/// Ranked, capped set of accepted stories for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorySet {
    stories: Vec<Candidate>,
    scanned: usize,
}

impl StorySet {
    /// A set with no stories. `scanned` is the number of candidate ids the
    /// ranking source returned.
    pub fn empty(scanned: usize) -> Self {
        Self {
            stories: Vec::new(),
            scanned,
        }
    }

    /// Orders `accepted` by descending score and keeps the first
    /// `max_results`. The sort is stable, so ties keep discovery order.
    pub fn ranked(mut accepted: Vec<Candidate>, max_results: usize, scanned: usize) -> Self {
        accepted.sort_by_key(|story| Reverse(story.score));
        accepted.truncate(max_results);
        Self {
            stories: accepted,
            scanned,
        }
    }

    pub fn stories(&self) -> &[Candidate] {
        &self.stories
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.stories.iter()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn scanned(&self) -> usize {
        self.scanned
    }
}

impl<'a> IntoIterator for &'a StorySet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Text handed to the generation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    text: String,
    story_count: usize,
}

impl RenderedBlock {
    pub fn new(text: String, story_count: usize) -> Self {
        Self { text, story_count }
    }

    /// True when rendered from an empty story set (placeholder text only).
    pub fn is_empty(&self) -> bool {
        self.story_count == 0
    }

    pub fn story_count(&self) -> usize {
        self.story_count
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for RenderedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    CompletedWithWarnings,
    Error,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::CompletedWithWarnings => "completed_with_warnings",
            OutcomeStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Orchestrator states. Only `CollectedEmpty`, `SummarizeFailed`,
/// `TranslateFailed` and `Success` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Collecting,
    CollectedEmpty,
    Summarizing,
    SummarizeFailed,
    Translating,
    TranslateFailed,
    Success,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::CollectedEmpty
                | PipelineState::SummarizeFailed
                | PipelineState::TranslateFailed
                | PipelineState::Success
        )
    }

    /// Outcome tag for a terminal state, `None` while the run is in flight.
    pub fn status(&self) -> Option<OutcomeStatus> {
        match self {
            PipelineState::CollectedEmpty => Some(OutcomeStatus::CompletedWithWarnings),
            PipelineState::SummarizeFailed | PipelineState::TranslateFailed => {
                Some(OutcomeStatus::Error)
            }
            PipelineState::Success => Some(OutcomeStatus::Success),
            _ => None,
        }
    }
}

/// Result of one pipeline run.
///
/// Payload slots are only ever filled in pipeline order: a translation implies
/// a summary, which implies rendered stories. The constructors are the only
/// way to build an outcome, one per terminal state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    status: OutcomeStatus,
    state: PipelineState,
    message: String,
    raw_stories: Option<String>,
    summarized_stories: Option<String>,
    translated_stories: Option<String>,
}

impl PipelineOutcome {
    pub fn collected_empty(message: impl Into<String>) -> Self {
        Self::terminal(PipelineState::CollectedEmpty, message.into(), None, None, None)
    }

    pub fn summarize_failed(raw_stories: String, message: impl Into<String>) -> Self {
        Self::terminal(
            PipelineState::SummarizeFailed,
            message.into(),
            Some(raw_stories),
            None,
            None,
        )
    }

    pub fn translate_failed(
        raw_stories: String,
        summarized_stories: String,
        message: impl Into<String>,
    ) -> Self {
        Self::terminal(
            PipelineState::TranslateFailed,
            message.into(),
            Some(raw_stories),
            Some(summarized_stories),
            None,
        )
    }

    pub fn success(
        raw_stories: String,
        summarized_stories: String,
        translated_stories: String,
        message: impl Into<String>,
    ) -> Self {
        Self::terminal(
            PipelineState::Success,
            message.into(),
            Some(raw_stories),
            Some(summarized_stories),
            Some(translated_stories),
        )
    }

    fn terminal(
        state: PipelineState,
        message: String,
        raw_stories: Option<String>,
        summarized_stories: Option<String>,
        translated_stories: Option<String>,
    ) -> Self {
        Self {
            status: state.status().unwrap_or(OutcomeStatus::Error),
            state,
            message,
            raw_stories,
            summarized_stories,
            translated_stories,
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw_stories(&self) -> Option<&str> {
        self.raw_stories.as_deref()
    }

    pub fn summarized_stories(&self) -> Option<&str> {
        self.summarized_stories.as_deref()
    }

    pub fn translated_stories(&self) -> Option<&str> {
        self.translated_stories.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub api_base: String,
    pub ranking: Ranking,
    pub candidate_pool: usize,
    pub min_score: i64,
    pub pacing_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "HN-Digest/1.0".to_string(),
            timeout_seconds: 10,
            api_base: "https://hacker-news.firebaseio.com/v0/".to_string(),
            ranking: Ranking::Top,
            candidate_pool: 50,
            min_score: 5,
            pacing_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub max_tokens: u32,
    pub api_base: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-7-sonnet-20250219".to_string(),
            max_tokens: 4000,
            api_base: "https://api.anthropic.com".to_string(),
            timeout_seconds: 120,
            max_retries: 3,
            retry_delay_seconds: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub fetch: FetchConfig,
    pub generation: GenerationConfig,
    pub output_dir: PathBuf,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            generation: GenerationConfig::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;
