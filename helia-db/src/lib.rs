pub mod error;
pub mod model;
pub mod repository;
mod store;

pub use error::{StoreError, StoreResult};
pub use store::{Repositories, Store};

use chrono::Utc;
use log::{info, warn};
use model::{Chat, ChatMessage, Role, Visibility};

pub const SEED_CHAT_ID: &str = "chat-1";
pub const SEED_USER_ID: &str = "user-1";
pub const SEED_MESSAGE_ID: &str = "da31a596-70cc-49bf-bd0d-5c78298c6827";
const SEED_MESSAGE_CHAT_ID: &str = "603f0a97-77a5-43c6-b867-5755bf90ea18";

/// Builds an in-memory store, optionally loaded with development fixtures.
pub async fn initialize_store(seed: bool) -> StoreResult<Store> {
    info!("Creating in-memory store");
    let store = Store::in_memory();
    if !seed {
        warn!("Mock data disabled, store starts empty.");
        return Ok(store);
    }

    let now = Utc::now();
    store
        .save_chat(Chat {
            id: SEED_CHAT_ID.to_string(),
            title: "Mock Chat".to_string(),
            created_at: now,
            visibility: Visibility::Public,
            user_id: SEED_USER_ID.to_string(),
        })
        .await?;
    store
        .save_message(ChatMessage {
            id: SEED_MESSAGE_ID.to_string(),
            chat_id: SEED_MESSAGE_CHAT_ID.to_string(),
            role: Role::User,
            content: "Hello world".to_string(),
            created_at: now,
        })
        .await?;
    info!("Mock data loaded into store.");
    Ok(store)
}
