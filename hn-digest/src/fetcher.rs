use crate::traits::{ItemSource, Ranking};
use crate::types::{Candidate, FetchConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for the public Hacker News item API.
pub struct HackerNewsClient {
    client: Client,
    base: Url,
}

impl HackerNewsClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base: api_base(&config.api_base)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Parses the API base, making sure relative joins land under its path.
fn api_base(raw: &str) -> Result<Url> {
    let mut base = Url::parse(raw)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

#[async_trait]
impl ItemSource for HackerNewsClient {
    fn source_name(&self) -> String {
        match self.base.host_str() {
            Some(host) => format!("Hacker News ({})", host),
            None => "Hacker News".to_string(),
        }
    }

    async fn story_ids(&self, ranking: Ranking, limit: usize) -> Result<Vec<u64>> {
        let url = self.endpoint(ranking.endpoint())?;
        let mut ids: Vec<u64> = self.get_json(url).await?;
        ids.truncate(limit);
        debug!("Received {} {} story ids", ids.len(), ranking);
        Ok(ids)
    }

    async fn item(&self, id: u64) -> Result<Option<Candidate>> {
        let url = self.endpoint(&format!("item/{}.json", id))?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_without_trailing_slash_keeps_version_segment() {
        let base = api_base("https://hacker-news.firebaseio.com/v0").unwrap();
        assert_eq!(
            base.join("item/42.json").unwrap().as_str(),
            "https://hacker-news.firebaseio.com/v0/item/42.json"
        );
    }

    #[test]
    fn endpoints_follow_ranking() {
        let client = HackerNewsClient::new(&FetchConfig::default()).unwrap();
        assert_eq!(
            client.endpoint(Ranking::New.endpoint()).unwrap().as_str(),
            "https://hacker-news.firebaseio.com/v0/newstories.json"
        );
        assert_eq!(client.source_name(), "Hacker News (hacker-news.firebaseio.com)");
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(api_base("not a url").is_err());
    }
}
