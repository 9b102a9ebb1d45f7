use crate::llm_adapter::GenerationError;
use crate::types::{Candidate, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering used by the ranking source when listing candidate ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    #[default]
    Top,
    New,
}

impl Ranking {
    /// Path of the id listing relative to the item API base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Ranking::Top => "topstories.json",
            Ranking::New => "newstories.json",
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ranking::Top => f.write_str("top"),
            Ranking::New => f.write_str("new"),
        }
    }
}

/// Read-only access to the discussion board's item API.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// First `limit` story ids in `ranking` order
    async fn story_ids(&self, ranking: Ranking, limit: usize) -> Result<Vec<u64>>;

    /// Full item details. `Ok(None)` when the API has no such item.
    async fn item(&self, id: u64) -> Result<Option<Candidate>>;
}

/// A chat-style language model that turns a system instruction plus user
/// content into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Get the name of this generator (provider and model)
    fn adapter_name(&self) -> String;

    /// Returns the text segments of the reply, in order.
    async fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> std::result::Result<Vec<String>, GenerationError>;
}
