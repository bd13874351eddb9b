use helia_common::{BlockKind, DraftGenerator, StreamPart, StreamSink};
use helia_db::Store;
use helia_db::model::{Document, Suggestion};
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    CodeDocumentHandler, CreateDocumentArgs, DocumentHandler, TextDocumentHandler,
    UpdateDocumentArgs,
};
use crate::error::BlockError;
use crate::session::Session;

/// Payload of a create request. The kind arrives as a raw tag and is
/// validated against the registered kinds.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentRequest {
    pub id: String,
    pub title: String,
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDocumentRequest {
    pub document: Document,
    pub description: String,
}

/// Wraps a [`DocumentHandler`] so that every draft it produces is saved for
/// the session's user. Anonymous sessions get the draft streamed but nothing
/// stored.
pub struct BlockHandler<H> {
    inner: H,
    store: Store,
}

impl<H: DocumentHandler> BlockHandler<H> {
    pub fn new(inner: H, store: Store) -> Self {
        Self { inner, store }
    }

    pub fn kind(&self) -> BlockKind {
        self.inner.kind()
    }

    pub async fn on_create_document(&self, args: CreateDocumentArgs<'_>) -> Result<(), BlockError> {
        let draft = self.inner.on_create_document(&args).await?;

        let Some(user_id) = args.session.user_id() else {
            debug!("anonymous session, {} document {} not saved", self.kind(), args.id);
            return Ok(());
        };
        let document = Document::new(args.id, args.title, draft, self.kind(), user_id);
        self.store.save_document(document).await?;
        Ok(())
    }

    pub async fn on_update_document(&self, args: UpdateDocumentArgs<'_>) -> Result<(), BlockError> {
        let draft = self.inner.on_update_document(&args).await?;

        let Some(user_id) = args.session.user_id() else {
            debug!(
                "anonymous session, {} document {} not saved",
                self.kind(),
                args.document.id
            );
            return Ok(());
        };
        let mut document = Document::new(
            args.document.id,
            args.document.title,
            draft,
            self.kind(),
            user_id,
        );
        document.visibility = args.document.visibility;
        self.store.save_document(document).await?;
        Ok(())
    }
}

/// One persisting handler per [`BlockKind`].
pub struct DocumentHandlers {
    text: BlockHandler<TextDocumentHandler>,
    code: BlockHandler<CodeDocumentHandler>,
    store: Store,
}

impl DocumentHandlers {
    pub fn new(store: Store, generator: Arc<dyn DraftGenerator>) -> Self {
        Self {
            text: BlockHandler::new(TextDocumentHandler::new(generator.clone()), store.clone()),
            code: BlockHandler::new(CodeDocumentHandler::new(generator), store.clone()),
            store,
        }
    }

    /// Parses a kind tag, failing for kinds without a handler.
    pub fn resolve(tag: &str) -> Result<BlockKind, BlockError> {
        Ok(tag.parse::<BlockKind>()?)
    }

    pub async fn on_create_document(
        &self,
        kind: BlockKind,
        args: CreateDocumentArgs<'_>,
    ) -> Result<(), BlockError> {
        match kind {
            BlockKind::Text => self.text.on_create_document(args).await,
            BlockKind::Code => self.code.on_create_document(args).await,
        }
    }

    /// Dispatches on the kind of the document being revised.
    pub async fn on_update_document(&self, args: UpdateDocumentArgs<'_>) -> Result<(), BlockError> {
        match args.document.kind {
            BlockKind::Text => self.text.on_update_document(args).await,
            BlockKind::Code => self.code.on_update_document(args).await,
        }
    }

    /// Announces the new block on `data_stream`, then generates and saves it.
    /// The stream is left open for the caller to close.
    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
        data_stream: &dyn StreamSink,
        session: &Session,
    ) -> Result<(), BlockError> {
        let kind = Self::resolve(&request.kind)?;
        info!("creating {kind} document {}", request.id);

        data_stream.write(StreamPart::Kind(kind))?;
        data_stream.write(StreamPart::Id(request.id.clone()))?;
        data_stream.write(StreamPart::Title(request.title.clone()))?;
        data_stream.write(StreamPart::Clear)?;

        self.on_create_document(
            kind,
            CreateDocumentArgs {
                id: request.id,
                title: request.title,
                data_stream,
                session,
            },
        )
        .await
    }

    pub async fn update_document(
        &self,
        request: UpdateDocumentRequest,
        data_stream: &dyn StreamSink,
        session: &Session,
    ) -> Result<(), BlockError> {
        info!(
            "updating {} document {}",
            request.document.kind, request.document.id
        );
        data_stream.write(StreamPart::Clear)?;

        self.on_update_document(UpdateDocumentArgs {
            document: request.document,
            description: request.description,
            data_stream,
            session,
        })
        .await
    }

    pub async fn get_suggestions(&self, document_id: &str) -> Result<Vec<Suggestion>, BlockError> {
        Ok(self.store.get_suggestions_by_document_id(document_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures::stream::{self, BoxStream, StreamExt};
    use helia_common::stream::{channel, delta_text};
    use helia_common::{EchoGenerator, GenerationError, GenerationRequest};
    use helia_db::model::Visibility;

    struct FailingGenerator;

    impl DraftGenerator for FailingGenerator {
        fn generate(
            &self,
            _request: GenerationRequest,
        ) -> BoxStream<'static, Result<String, GenerationError>> {
            stream::iter(vec![
                Ok("partial ".to_string()),
                Err(GenerationError::Provider("rate limited".to_string())),
            ])
            .boxed()
        }
    }

    fn handlers(store: &Store) -> DocumentHandlers {
        DocumentHandlers::new(store.clone(), Arc::new(EchoGenerator))
    }

    fn create(id: &str, title: &str, kind: &str) -> CreateDocumentRequest {
        CreateDocumentRequest {
            id: id.to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
        }
    }

    #[tokio::test]
    async fn create_persists_for_signed_in_user() {
        let store = Store::in_memory();
        let (stream, _reader) = channel();
        let session = Session::for_user("u1", "u1@example.com");

        handlers(&store)
            .create_document(create("d1", "T", "text"), &stream, &session)
            .await
            .unwrap();

        let document = store.get_document_by_id("d1").await.unwrap().unwrap();
        assert_eq!(document.id, "d1");
        assert_eq!(document.title, "T");
        assert_eq!(document.user_id, "u1");
        assert_eq!(document.kind, BlockKind::Text);
        assert_eq!(document.content, "T");
    }

    #[tokio::test]
    async fn anonymous_create_streams_but_does_not_persist() {
        let store = Store::in_memory();
        let (stream, reader) = channel();

        handlers(&store)
            .create_document(
                create("d2", "Breathing exercises", "code"),
                &stream,
                &Session::anonymous(),
            )
            .await
            .unwrap();
        stream.close().unwrap();

        assert!(store.get_document_by_id("d2").await.unwrap().is_none());
        let parts = reader.collect().await;
        assert_eq!(parts[0], StreamPart::Kind(BlockKind::Code));
        assert!(parts.contains(&StreamPart::CodeDelta("Breathing ".to_string())));
        assert_eq!(delta_text(&parts), "Breathing exercises");
    }

    #[tokio::test]
    async fn unregistered_kind_is_a_configuration_error() {
        let store = Store::in_memory();
        let registry = handlers(&store);
        let (stream, reader) = channel();
        let err = registry
            .create_document(
                create("d3", "Sunset", "image"),
                &stream,
                &Session::for_user("u1", "u1@example.com"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BlockError::UnsupportedKind(ref tag) if tag == "image"));
        assert!(err.is_configuration());
        assert!(store.get_document_by_id("d3").await.unwrap().is_none());
        drop(stream);
        assert!(reader.collect().await.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_content_under_same_id() {
        let store = Store::in_memory();
        let registry = handlers(&store);
        let session = Session::for_user("u1", "u1@example.com");
        let (stream, _reader) = channel();

        registry
            .create_document(create("d4", "Sleep hygiene", "text"), &stream, &session)
            .await
            .unwrap();
        let mut original = store.get_document_by_id("d4").await.unwrap().unwrap();
        original.visibility = Visibility::Public;

        registry
            .update_document(
                UpdateDocumentRequest {
                    document: original.clone(),
                    description: "add a section on naps".to_string(),
                },
                &stream,
                &session,
            )
            .await
            .unwrap();

        let updated = store.get_document_by_id("d4").await.unwrap().unwrap();
        assert_eq!(updated.content, "add a section on naps");
        assert_eq!(updated.title, original.title);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.visibility, Visibility::Public);
        assert!(updated.updated_at >= original.updated_at);
    }

    #[tokio::test]
    async fn anonymous_update_leaves_stored_document_untouched() {
        let store = Store::in_memory();
        let stored = store
            .save_document(Document::new("d5", "Plan", "original", BlockKind::Code, "u1"))
            .await
            .unwrap();
        let (stream, _reader) = channel();

        handlers(&store)
            .update_document(
                UpdateDocumentRequest {
                    document: stored.clone(),
                    description: "rewrite".to_string(),
                },
                &stream,
                &Session::anonymous(),
            )
            .await
            .unwrap();

        assert_eq!(store.get_document_by_id("d5").await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn signed_in_code_update_streams_code_deltas() {
        let store = Store::in_memory();
        let stored = store
            .save_document(Document::new("d11", "Parser", "fn main() {}", BlockKind::Code, "u1"))
            .await
            .unwrap();
        let (stream, reader) = channel();

        handlers(&store)
            .update_document(
                UpdateDocumentRequest {
                    document: stored.clone(),
                    description: "add error handling".to_string(),
                },
                &stream,
                &Session::for_user("u1", "u1@example.com"),
            )
            .await
            .unwrap();
        stream.close().unwrap();

        let parts = reader.collect().await;
        assert_eq!(parts[0], StreamPart::Clear);
        assert!(parts.contains(&StreamPart::CodeDelta("add ".to_string())));
        assert!(!parts.iter().any(|part| matches!(part, StreamPart::TextDelta(_))));
        assert_eq!(delta_text(&parts), "add error handling");

        let updated = store.get_document_by_id("d11").await.unwrap().unwrap();
        assert_eq!(updated.kind, BlockKind::Code);
        assert_eq!(updated.content, "add error handling");
        assert_eq!(updated.user_id, "u1");
    }

    #[tokio::test]
    async fn empty_user_id_streams_but_does_not_persist() {
        let store = Store::in_memory();
        let (stream, reader) = channel();

        handlers(&store)
            .create_document(
                create("d12", "Morning routine", "text"),
                &stream,
                &Session::for_user("", "nobody@example.com"),
            )
            .await
            .unwrap();
        stream.close().unwrap();

        assert!(store.get_document_by_id("d12").await.unwrap().is_none());
        assert_eq!(delta_text(&reader.collect().await), "Morning routine");
    }

    #[tokio::test]
    async fn generation_failure_skips_persistence() {
        let store = Store::in_memory();
        let registry = DocumentHandlers::new(store.clone(), Arc::new(FailingGenerator));
        let (stream, _reader) = channel();

        let err = registry
            .create_document(
                create("d6", "Budget", "text"),
                &stream,
                &Session::for_user("u1", "u1@example.com"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BlockError::Generation(_)));
        assert_eq!(err.user_message(), "could not generate/save content for this block");
        assert!(store.get_document_by_id("d6").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn closed_stream_fails_the_operation() {
        let store = Store::in_memory();
        let (stream, _reader) = channel();
        stream.close().unwrap();

        let err = handlers(&store)
            .create_document(
                create("d7", "Late", "text"),
                &stream,
                &Session::for_user("u1", "u1@example.com"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BlockError::Stream(_)));
    }

    #[tokio::test]
    async fn suggestions_are_listed_per_document() {
        let store = Store::in_memory();
        store
            .save_suggestions(vec![Suggestion {
                id: "s1".into(),
                document_id: "d8".into(),
                content: "calmer".into(),
                description: "softer tone".into(),
                from: 0,
                to: 5,
                created_at: Utc::now(),
            }])
            .await
            .unwrap();

        let registry = handlers(&store);
        assert_eq!(registry.get_suggestions("d8").await.unwrap().len(), 1);
        assert!(registry.get_suggestions("d9").await.unwrap().is_empty());
    }

    #[test]
    fn create_request_ignores_client_supplied_content() {
        let request: CreateDocumentRequest = serde_json::from_value(serde_json::json!({
            "id": "d10",
            "title": "Gratitude journal",
            "content": "",
            "kind": "text",
            "userId": "u1"
        }))
        .unwrap();
        assert_eq!(request.kind, "text");
        assert_eq!(DocumentHandlers::resolve(&request.kind).unwrap(), BlockKind::Text);
    }
}
