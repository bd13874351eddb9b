use anyhow::{Context, Result};
use helia::blocks::{CreateDocumentRequest, UpdateDocumentRequest};
use helia::{Config, DocumentHandlers, Session};
use helia_common::models::find_chat_model;
use helia_common::stream::{self, StreamSink, delta_text};
use helia_common::EchoGenerator;
use helia_db::{SEED_USER_ID, initialize_store};
use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    if let Some(model) = find_chat_model(&config.chat_model) {
        info!("Starting Helia with chat model {} ({})", model.name, model.id);
    }

    let store = initialize_store(config.seed_mock_data)
        .await
        .context("Failed to initialize store")?;
    let handlers = DocumentHandlers::new(store.clone(), Arc::new(EchoGenerator));
    let session = Session::for_user(SEED_USER_ID, "emma.johnson@example.com");

    let (data_stream, reader) = stream::channel();
    let relay = tokio::spawn(reader.collect());

    let document_id = Uuid::new_v4().to_string();
    let request = CreateDocumentRequest {
        id: document_id.clone(),
        title: "A calm morning routine".to_string(),
        kind: "text".to_string(),
    };
    match handlers.create_document(request, &data_stream, &session).await {
        Ok(()) => info!("Document {document_id} created."),
        Err(e) => error!("{}: {e}", e.user_message()),
    }

    match store.get_document_by_id(&document_id).await? {
        Some(document) => {
            let request = UpdateDocumentRequest {
                document,
                description: "Add a short breathing exercise".to_string(),
            };
            match handlers.update_document(request, &data_stream, &session).await {
                Ok(()) => info!("Document {document_id} updated."),
                Err(e) => error!("{}: {e}", e.user_message()),
            }
        }
        None => info!("Document {document_id} was not persisted, skipping update."),
    }

    data_stream.close()?;
    let parts = relay.await.context("Stream relay task failed")?;
    info!("Streamed {} parts: {:?}", parts.len(), delta_text(&parts));

    if let Some(document) = store.get_document_by_id(&document_id).await? {
        println!("{} [{}]\n{}", document.title, document.kind, document.content);
    }
    Ok(())
}
