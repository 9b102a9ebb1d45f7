pub mod types;
pub mod traits;
pub mod rate_limit;
pub mod fetcher;
pub mod llm_adapter;
pub mod aggregator;
pub mod digest;
pub mod processing;
pub mod pipeline;
pub mod writer;
pub mod state;

pub use types::*;
pub use traits::{ItemSource, Ranking, TextGenerator};
pub use rate_limit::{RateLimitedInvoker, RetryableError};
pub use fetcher::HackerNewsClient;
pub use llm_adapter::{AnthropicGenerator, GenerationError};
pub use aggregator::{StoryCollector, StoryFilter};
pub use digest::PromptRenderer;
pub use processing::{Generation, GenerationPipeline, Stage, StageError};
pub use pipeline::PipelineOrchestrator;
pub use writer::DigestWriter;
pub use state::AppContext;
