use async_trait::async_trait;
use helia_common::{BlockKind, DraftGenerator, StreamPart, block_request};
use std::sync::Arc;

use super::{CreateDocumentArgs, DocumentHandler, UpdateDocumentArgs, stream_draft};
use crate::error::BlockError;

const CREATE_PROMPT: &str =
    "Write about the given topic. Markdown is supported. Use headings wherever appropriate.";

pub struct TextDocumentHandler {
    generator: Arc<dyn DraftGenerator>,
}

impl TextDocumentHandler {
    pub fn new(generator: Arc<dyn DraftGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl DocumentHandler for TextDocumentHandler {
    fn kind(&self) -> BlockKind {
        BlockKind::Text
    }

    async fn on_create_document(&self, args: &CreateDocumentArgs<'_>) -> Result<String, BlockError> {
        let request = block_request(CREATE_PROMPT, args.title.as_str())?;
        stream_draft(
            self.generator.as_ref(),
            request,
            args.data_stream,
            StreamPart::TextDelta,
        )
        .await
    }

    async fn on_update_document(&self, args: &UpdateDocumentArgs<'_>) -> Result<String, BlockError> {
        let system = format!(
            "Improve the following contents of the document based on the given prompt.\n\n{}",
            args.document.content
        );
        let request = block_request(system, args.description.as_str())?;
        stream_draft(
            self.generator.as_ref(),
            request,
            args.data_stream,
            StreamPart::TextDelta,
        )
        .await
    }
}
