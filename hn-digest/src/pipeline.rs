use crate::aggregator::StoryCollector;
use crate::digest::PromptRenderer;
use crate::processing::GenerationPipeline;
use crate::types::{PipelineOutcome, PipelineState, StorySet, MAX_STORIES};
use tracing::{debug, error, info, warn};

/// Runs collect → render → summarize → translate, stopping at the first
/// stage that has nothing to pass on.
pub struct PipelineOrchestrator {
    collector: StoryCollector,
    generation: GenerationPipeline,
}

impl PipelineOrchestrator {
    pub fn new(collector: StoryCollector, generation: GenerationPipeline) -> Self {
        Self {
            collector,
            generation,
        }
    }

    /// Clamps a requested story count to [`MAX_STORIES`].
    pub fn effective_limit(requested: usize) -> usize {
        if requested > MAX_STORIES {
            info!(
                "Requested {} stories, limiting to {}",
                requested, MAX_STORIES
            );
            MAX_STORIES
        } else {
            requested
        }
    }

    pub async fn run(&self, hours: u32, limit: usize) -> PipelineOutcome {
        let limit = Self::effective_limit(limit);
        info!(
            "Starting pipeline with a limit of {} stories from the last {} hours",
            limit, hours
        );

        let mut state = PipelineState::Collecting;
        debug!("Pipeline state: {:?}", state);

        let stories = self.collector.collect(hours, limit).await;
        if stories.is_empty() {
            state = PipelineState::CollectedEmpty;
            warn!("Pipeline finished in {:?}: no stories", state);
            return PipelineOutcome::collected_empty(empty_message(&stories, hours, limit));
        }

        let rendered = PromptRenderer::render(&stories);

        state = PipelineState::Summarizing;
        debug!("Pipeline state: {:?}", state);

        let summary = match self.generation.summarize(&rendered).await {
            Ok(summary) => summary,
            Err(e) => {
                state = PipelineState::SummarizeFailed;
                error!("Pipeline finished in {:?}", state);
                return PipelineOutcome::summarize_failed(rendered.into_string(), e.to_string());
            }
        };

        state = PipelineState::Translating;
        debug!("Pipeline state: {:?}", state);

        let translation = match self.generation.translate(&summary).await {
            Ok(translation) => translation,
            Err(e) => {
                state = PipelineState::TranslateFailed;
                error!("Pipeline finished in {:?}", state);
                return PipelineOutcome::translate_failed(
                    rendered.into_string(),
                    summary.into_string(),
                    e.to_string(),
                );
            }
        };

        state = PipelineState::Success;
        let message = if stories.len() < limit {
            warn!(
                "Only {} of {} requested stories were found",
                stories.len(),
                limit
            );
            format!(
                "Pipeline completed successfully with {} of {} requested stories",
                stories.len(),
                limit
            )
        } else {
            "Pipeline completed successfully".to_string()
        };

        info!("Pipeline finished in {:?}", state);
        PipelineOutcome::success(
            rendered.into_string(),
            summary.into_string(),
            translation.into_string(),
            message,
        )
    }
}

fn empty_message(stories: &StorySet, hours: u32, limit: usize) -> String {
    if limit == 0 {
        "No stories requested (limit is 0)".to_string()
    } else if stories.scanned() == 0 {
        "No stories found on Hacker News".to_string()
    } else {
        format!(
            "None of the {} candidate stories from the last {} hours passed the filters",
            stories.scanned(),
            hours
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_ceiling() {
        assert_eq!(PipelineOrchestrator::effective_limit(15), 10);
        assert_eq!(PipelineOrchestrator::effective_limit(10), 10);
        assert_eq!(PipelineOrchestrator::effective_limit(3), 3);
    }

    #[test]
    fn empty_message_depends_on_scan() {
        assert_eq!(
            empty_message(&StorySet::empty(0), 24, 10),
            "No stories found on Hacker News"
        );
        assert!(empty_message(&StorySet::empty(50), 24, 10).contains("50 candidate stories"));
        assert_eq!(
            empty_message(&StorySet::empty(50), 24, 0),
            "No stories requested (limit is 0)"
        );
    }
}
