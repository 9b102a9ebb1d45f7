//! Persists the translated digest as a dated Markdown document.

use crate::types::Result;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub struct DigestWriter {
    output_dir: PathBuf,
}

impl DigestWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn default_file_name(date: NaiveDate) -> String {
        format!("hackernews_daily_{}.md", date.format("%Y-%m-%d"))
    }

    /// Header line followed by the digest text, verbatim.
    pub fn document(text: &str, date: NaiveDate) -> String {
        format!("# HackerNews Daily - {}\n\n{}", date.format("%d %B %Y"), text)
    }

    /// Writes `text` to `filename`, or to the dated default file inside the
    /// output directory when no name is given.
    pub async fn persist(&self, text: &str, filename: Option<&Path>) -> Result<PathBuf> {
        self.persist_on(Local::now().date_naive(), text, filename)
            .await
    }

    pub async fn persist_on(
        &self,
        date: NaiveDate,
        text: &str,
        filename: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = match filename {
            Some(name) => name.to_path_buf(),
            None => {
                tokio::fs::create_dir_all(&self.output_dir).await?;
                self.output_dir.join(Self::default_file_name(date))
            }
        };

        info!("Saving digest to {}", path.display());

        if let Err(e) = tokio::fs::write(&path, Self::document(text, date)).await {
            error!("Failed to save digest to {}: {}", path.display(), e);
            return Err(e.into());
        }

        info!("Digest saved to {}", path.display());
        Ok(path)
    }
}
