use crate::llm_adapter::GenerationError;
use crate::rate_limit::RateLimitedInvoker;
use crate::traits::TextGenerator;
use crate::types::RenderedBlock;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const NOTHING_TO_SUMMARIZE: &str = "Nothing to summarize.";
pub const NOTHING_TO_TRANSLATE: &str = "Nothing to translate.";

const SUMMARIZE_SYSTEM_PROMPT: &str = "\
You are a technology and computing expert with a background in writing engaging editorial content.
Your task is to write compelling summaries of the top Hacker News stories.

For each article:
1. Write a concise but informative summary (2-4 sentences) that captures the essence of the article
2. Use a lively, engaging tone, like a top-tier technology blogger
3. Include the most important details and why the story matters
4. Avoid generic phrases like \"an interesting article\" - be specific about what makes the story valuable
5. Keep the original article title as the heading
6. Put the URL in parentheses at the end of each summary
7. Do not invent information or details that are not present in the input

Format each story as follows:

## [Original title]

[Engaging 2-4 sentence summary]

([URL])

---

Do not group or categorize the stories - list them in order of relevance.";

const TRANSLATE_SYSTEM_PROMPT: &str = "\
You are an expert English to Italian translator specialized in technology and computing.
Your task is to translate Hacker News story summaries into Italian, keeping their lively and engaging style.

Translate:
1. The article titles
2. The summaries, keeping the lively and engaging tone
3. Do NOT translate the URLs

Keep the same structure:

## [Title translated into Italian]

[Summary translated into Italian]

([Original URL])

---

Use natural, fluent Italian and adapt technical terms to Italian conventions,
but keep proper nouns and the names of companies, products and technologies in their original form where appropriate.";

/// Generation stage, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summarize,
    Translate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Summarize => f.write_str("summarization"),
            Stage::Translate => f.write_str("translation"),
        }
    }
}

/// A generation stage gave up; carries the underlying model failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Error during {stage}: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: GenerationError,
}

/// What a stage produced when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Model output.
    Text(String),
    /// The stage had no input worth sending and did not call the model.
    Skipped(&'static str),
}

impl Generation {
    pub fn as_str(&self) -> &str {
        match self {
            Generation::Text(text) => text,
            Generation::Skipped(note) => note,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Generation::Skipped(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Generation::Text(text) => text,
            Generation::Skipped(note) => note.to_string(),
        }
    }
}

/// Summarize, then translate, each through the rate-limit invoker.
pub struct GenerationPipeline {
    generator: Arc<dyn TextGenerator>,
    invoker: RateLimitedInvoker,
}

impl GenerationPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, invoker: RateLimitedInvoker) -> Self {
        Self { generator, invoker }
    }

    pub async fn summarize(&self, block: &RenderedBlock) -> Result<Generation, StageError> {
        if block.is_empty() {
            warn!("No stories to summarize");
            return Ok(Generation::Skipped(NOTHING_TO_SUMMARIZE));
        }

        info!(
            "Summarizing {} stories with {}",
            block.story_count(),
            self.generator.adapter_name()
        );

        let user = format!("Here are the stories to summarize:\n\n{}", block.as_str());
        let summary = self
            .run_stage(Stage::Summarize, SUMMARIZE_SYSTEM_PROMPT, &user)
            .await?;

        info!("Stories summarized");
        Ok(Generation::Text(summary))
    }

    pub async fn translate(&self, summary: &Generation) -> Result<Generation, StageError> {
        let text = match summary {
            Generation::Text(text) if !text.is_empty() => text,
            _ => {
                warn!("No summary to translate");
                return Ok(Generation::Skipped(NOTHING_TO_TRANSLATE));
            }
        };

        info!("Translating summaries into Italian");

        let user = format!("Translate these summaries into Italian:\n\n{}", text);
        let translation = self
            .run_stage(Stage::Translate, TRANSLATE_SYSTEM_PROMPT, &user)
            .await?;

        info!("Summaries translated");
        Ok(Generation::Text(translation))
    }

    async fn run_stage(&self, stage: Stage, system: &str, user: &str) -> Result<String, StageError> {
        let generator = &self.generator;
        let label = stage.to_string();

        match self
            .invoker
            .invoke(&label, || generator.generate(system, user))
            .await
        {
            Ok(segments) => Ok(segments.concat()),
            Err(source) => {
                error!("Error during {}: {}", stage, source);
                Err(StageError { stage, source })
            }
        }
    }
}
