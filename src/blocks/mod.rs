//! Document blocks: kind-specific draft producers and the registry that
//! dispatches to them and persists the results.

pub mod code;
pub mod server;
pub mod text;

use async_trait::async_trait;
use futures::StreamExt;
use helia_common::{BlockKind, DraftGenerator, GenerationRequest, StreamPart, StreamSink};
use helia_db::model::Document;

use crate::error::BlockError;
use crate::session::Session;

pub use code::CodeDocumentHandler;
pub use server::{BlockHandler, CreateDocumentRequest, DocumentHandlers, UpdateDocumentRequest};
pub use text::TextDocumentHandler;

pub struct CreateDocumentArgs<'a> {
    pub id: String,
    pub title: String,
    pub data_stream: &'a dyn StreamSink,
    pub session: &'a Session,
}

pub struct UpdateDocumentArgs<'a> {
    pub document: Document,
    pub description: String,
    pub data_stream: &'a dyn StreamSink,
    pub session: &'a Session,
}

/// Produces draft content for one block kind.
///
/// Implementations only generate and stream; persistence is added by
/// [`BlockHandler`].
#[async_trait]
pub trait DocumentHandler: Send + Sync {
    fn kind(&self) -> BlockKind;

    async fn on_create_document(&self, args: &CreateDocumentArgs<'_>) -> Result<String, BlockError>;

    async fn on_update_document(&self, args: &UpdateDocumentArgs<'_>) -> Result<String, BlockError>;
}

/// Runs a generation, forwarding each delta to `sink` wrapped by `part`,
/// and returns the full draft.
pub(crate) async fn stream_draft(
    generator: &dyn DraftGenerator,
    request: GenerationRequest,
    sink: &dyn StreamSink,
    part: fn(String) -> StreamPart,
) -> Result<String, BlockError> {
    let mut deltas = generator.generate(request);
    let mut draft = String::new();
    while let Some(delta) = deltas.next().await {
        let delta = delta?;
        draft.push_str(&delta);
        sink.write(part(delta))?;
    }
    Ok(draft)
}
