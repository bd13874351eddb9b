pub mod generation;
pub mod kind;
pub mod models;
pub mod stream;

pub use generation::{DraftGenerator, EchoGenerator, GenerationError, GenerationRequest};
pub use kind::{BlockKind, UnknownKind};
pub use stream::{DataStream, DataStreamReader, StreamError, StreamPart, StreamSink};

/// Builds a request against the model reserved for block content.
pub fn block_request(
    system: impl Into<String>,
    prompt: impl Into<String>,
) -> Result<GenerationRequest, GenerationError> {
    let model = models::language_model(models::BLOCK_MODEL)
        .ok_or_else(|| GenerationError::UnknownModel(models::BLOCK_MODEL.to_string()))?;
    Ok(GenerationRequest {
        model: model.to_string(),
        system: system.into(),
        prompt: prompt.into(),
    })
}
