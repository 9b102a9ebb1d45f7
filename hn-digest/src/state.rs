use crate::aggregator::StoryCollector;
use crate::fetcher::HackerNewsClient;
use crate::llm_adapter::AnthropicGenerator;
use crate::pipeline::PipelineOrchestrator;
use crate::processing::GenerationPipeline;
use crate::rate_limit::RateLimitedInvoker;
use crate::traits::{ItemSource, TextGenerator};
use crate::types::{DigestConfig, DigestError, Result};
use crate::writer::DigestWriter;
use std::sync::Arc;
use tracing::info;

/// Everything a run needs, built once at startup and handed to components.
pub struct AppContext {
    config: DigestConfig,
    source: Arc<dyn ItemSource>,
    generator: Arc<dyn TextGenerator>,
}

impl AppContext {
    pub fn new(
        config: DigestConfig,
        source: Arc<dyn ItemSource>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            source,
            generator,
        }
    }

    /// Wires the HTTP item client and the Anthropic generator.
    pub fn connect(config: DigestConfig, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(DigestError::Config("Anthropic API key is empty".to_string()));
        }

        let source = Arc::new(HackerNewsClient::new(&config.fetch)?);
        let generator = Arc::new(AnthropicGenerator::new(api_key, &config.generation)?);
        info!(
            "Using {} with {}",
            source.source_name(),
            generator.adapter_name()
        );

        Ok(Self::new(config, source, generator))
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> PipelineOrchestrator {
        let collector = StoryCollector::new(self.source.clone(), &self.config.fetch);
        let generation = GenerationPipeline::new(
            self.generator.clone(),
            RateLimitedInvoker::from_config(&self.config.generation),
        );
        PipelineOrchestrator::new(collector, generation)
    }

    pub fn writer(&self) -> DigestWriter {
        DigestWriter::new(self.config.output_dir.clone())
    }
}
