#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hn_digest::{
    Candidate, DigestError, GenerationError, ItemKind, ItemSource, Ranking,
    TextGenerator,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Counts events at `level` emitted from the given module target.
#[derive(Clone)]
pub struct EventCounter {
    target: &'static str,
    level: Level,
    count: Arc<AtomicUsize>,
}

impl EventCounter {
    pub fn new(target: &'static str, level: Level) -> Self {
        Self {
            target,
            level,
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Installs the counter as this thread's default subscriber.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }
}

impl<S: Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() == self.target && *metadata.level() == self.level {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A valid story `age_hours` before `now`.
pub fn story_at(now: DateTime<Utc>, id: u64, score: i64, age_hours: i64) -> Candidate {
    Candidate {
        id,
        kind: Some(ItemKind::Story),
        time: Some(now - Duration::hours(age_hours)),
        title: Some(format!("Story {}", id)),
        url: Some(format!("https://example.com/{}", id)),
        score,
        author: Some(format!("user{}", id)),
        comment_count: 3,
        ..Default::default()
    }
}

pub fn story(id: u64, score: i64, age_hours: i64) -> Candidate {
    story_at(Utc::now(), id, score, age_hours)
}

/// In-memory item API that records every item lookup.
#[derive(Default)]
pub struct FakeItemSource {
    ids: Vec<u64>,
    items: HashMap<u64, Candidate>,
    failing_items: HashSet<u64>,
    fail_listing: bool,
    fetched: Mutex<Vec<u64>>,
    listings: Mutex<Vec<(Ranking, usize)>>,
}

impl FakeItemSource {
    /// Lists the given stories in order and serves each by id.
    pub fn with_stories(stories: Vec<Candidate>) -> Self {
        let ids = stories.iter().map(|s| s.id).collect();
        let items = stories.into_iter().map(|s| (s.id, s)).collect();
        Self {
            ids,
            items,
            ..Default::default()
        }
    }

    pub fn failing_listing() -> Self {
        Self {
            fail_listing: true,
            ..Default::default()
        }
    }

    /// Lists `id` without serving it (the API returns null).
    pub fn with_missing(mut self, id: u64) -> Self {
        self.ids.push(id);
        self
    }

    pub fn with_failing_item(mut self, id: u64) -> Self {
        self.ids.insert(0, id);
        self.failing_items.insert(id);
        self
    }

    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn listings(&self) -> Vec<(Ranking, usize)> {
        self.listings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemSource for FakeItemSource {
    fn source_name(&self) -> String {
        "fake items".to_string()
    }

    async fn story_ids(&self, ranking: Ranking, limit: usize) -> hn_digest::Result<Vec<u64>> {
        self.listings.lock().unwrap().push((ranking, limit));
        if self.fail_listing {
            return Err(DigestError::General("listing unavailable".to_string()));
        }
        Ok(self.ids.iter().copied().take(limit).collect())
    }

    async fn item(&self, id: u64) -> hn_digest::Result<Option<Candidate>> {
        self.fetched.lock().unwrap().push(id);
        if self.failing_items.contains(&id) {
            return Err(DigestError::General(format!("item {} timed out", id)));
        }
        Ok(self.items.get(&id).cloned())
    }
}

/// Generator that replays scripted replies and records each call.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<Vec<String>, GenerationError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<Vec<String>, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn adapter_name(&self) -> String {
        "scripted".to_string()
    }

    async fn generate(&self, system: &str, user: &str) -> Result<Vec<String>, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(GenerationError::Api {
                    status: 500,
                    message: "no scripted reply".to_string(),
                })
            })
    }
}

pub fn reply(text: &str) -> Result<Vec<String>, GenerationError> {
    Ok(vec![text.to_string()])
}

pub fn rate_limited() -> Result<Vec<String>, GenerationError> {
    Err(GenerationError::RateLimited {
        message: "rate_limit_error".to_string(),
    })
}

pub fn unauthorized() -> Result<Vec<String>, GenerationError> {
    Err(GenerationError::Api {
        status: 401,
        message: "invalid x-api-key".to_string(),
    })
}
