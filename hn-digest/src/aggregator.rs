use crate::traits::{ItemSource, Ranking};
use crate::types::{Candidate, FetchConfig, StorySet};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Acceptance rules for a fetched candidate.
#[derive(Debug, Clone, Copy)]
pub struct StoryFilter {
    pub cutoff: DateTime<Utc>,
    pub min_score: i64,
}

impl StoryFilter {
    pub fn new(now: DateTime<Utc>, hours: u32, min_score: i64) -> Self {
        Self {
            cutoff: now
                .checked_sub_signed(ChronoDuration::hours(i64::from(hours)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            min_score,
        }
    }

    /// A live story with a title, created at or after the cutoff, scoring
    /// strictly above the minimum.
    pub fn accepts(&self, candidate: &Candidate) -> bool {
        candidate.is_story()
            && candidate.time.is_some_and(|time| time >= self.cutoff)
            && candidate.title.is_some()
            && !candidate.dead
            && !candidate.deleted
            && candidate.score > self.min_score
    }
}

/// Pulls candidates from the ranking source and keeps the best recent ones.
pub struct StoryCollector {
    source: Arc<dyn ItemSource>,
    ranking: Ranking,
    candidate_pool: usize,
    min_score: i64,
    pacing: Duration,
}

impl StoryCollector {
    pub fn new(source: Arc<dyn ItemSource>, config: &FetchConfig) -> Self {
        Self {
            source,
            ranking: config.ranking,
            candidate_pool: config.candidate_pool,
            min_score: config.min_score,
            pacing: Duration::from_millis(config.pacing_delay_ms),
        }
    }

    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = ranking;
        self
    }

    pub async fn collect(&self, hours: u32, max_results: usize) -> StorySet {
        self.collect_at(Utc::now(), hours, max_results).await
    }

    /// Same as [`collect`](Self::collect) with an explicit "now".
    pub async fn collect_at(&self, now: DateTime<Utc>, hours: u32, max_results: usize) -> StorySet {
        info!(
            "Collecting {} stories from the last {} hours (max {}) from {}",
            self.ranking,
            hours,
            max_results,
            self.source.source_name()
        );

        let ids = self.candidate_ids().await;
        if ids.is_empty() {
            warn!("No stories found");
            return StorySet::empty(0);
        }

        let filter = StoryFilter::new(now, hours, self.min_score);
        let mut accepted = Vec::new();

        for &id in &ids {
            if accepted.len() >= max_results {
                debug!("Collected {} stories, stopping early", accepted.len());
                break;
            }

            let candidate = self.fetch_candidate(id).await;
            tokio::time::sleep(self.pacing).await;

            if let Some(story) = candidate.filter(|c| filter.accepts(c)) {
                accepted.push(story);
            }
        }

        let stories = StorySet::ranked(accepted, max_results, ids.len());
        info!(
            "Collected {} recent stories out of {} candidates",
            stories.len(),
            ids.len()
        );
        stories
    }

    async fn candidate_ids(&self) -> Vec<u64> {
        match self.source.story_ids(self.ranking, self.candidate_pool).await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to fetch {} story ids: {}", self.ranking, e);
                Vec::new()
            }
        }
    }

    /// Single attempt; failures are logged and the candidate is dropped.
    async fn fetch_candidate(&self, id: u64) -> Option<Candidate> {
        match self.source.item(id).await {
            Ok(Some(candidate)) => Some(candidate),
            Ok(None) => {
                debug!("Item {} not found", id);
                None
            }
            Err(e) => {
                warn!("Failed to fetch item {}: {}", id, e);
                None
            }
        }
    }
}
