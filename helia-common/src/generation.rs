use futures::stream::{self, BoxStream, StreamExt};
use log::debug;

/// Input for a single draft generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Provider model name, already resolved through the model catalog.
    pub model: String,
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("provider error: {0}")]
    Provider(String),
}

/// Produces draft content as a stream of text deltas.
///
/// Concatenating every `Ok` item yields the final draft. An `Err` item ends
/// the generation.
pub trait DraftGenerator: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> BoxStream<'static, Result<String, GenerationError>>;
}

/// Offline generator that streams the prompt back word by word.
///
/// Stands in for a model provider in development and tests.
#[derive(Debug, Clone, Default)]
pub struct EchoGenerator;

impl DraftGenerator for EchoGenerator {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> BoxStream<'static, Result<String, GenerationError>> {
        debug!(
            "echo generation with model {} ({} prompt bytes)",
            request.model,
            request.prompt.len()
        );
        let deltas: Vec<Result<String, GenerationError>> = request
            .prompt
            .split_inclusive(char::is_whitespace)
            .map(|word| Ok(word.to_string()))
            .collect();
        stream::iter(deltas).boxed()
    }
}
