use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::model::{Chat, ChatMessage, Document, Suggestion, Visibility, Vote};
use crate::repository::{InMemoryRepository, Repository};

/// Backing repositories, one per entity.
#[derive(Clone)]
pub struct Repositories {
    pub chats: Arc<dyn Repository<Chat>>,
    pub messages: Arc<dyn Repository<ChatMessage>>,
    pub documents: Arc<dyn Repository<Document>>,
    pub suggestions: Arc<dyn Repository<Suggestion>>,
    pub votes: Arc<dyn Repository<Vote>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            chats: Arc::new(InMemoryRepository::<Chat>::new()),
            messages: Arc::new(InMemoryRepository::<ChatMessage>::new()),
            documents: Arc::new(InMemoryRepository::<Document>::new()),
            suggestions: Arc::new(InMemoryRepository::<Suggestion>::new()),
            votes: Arc::new(InMemoryRepository::<Vote>::new()),
        }
    }
}

/// Persistence operations used by the chat and block layers.
///
/// Cheap to clone; clones share the same repositories.
#[derive(Clone)]
pub struct Store {
    repos: Repositories,
}

impl Store {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub fn in_memory() -> Self {
        Self::new(Repositories::in_memory())
    }

    pub async fn get_chat_by_id(&self, id: &str) -> StoreResult<Option<Chat>> {
        self.repos.chats.get(id).await
    }

    pub async fn save_chat(&self, chat: Chat) -> StoreResult<Chat> {
        self.repos.chats.upsert(chat).await
    }

    /// Sets the visibility of a chat. Returns `false` if the chat does not exist.
    pub async fn update_chat_visibility_by_id(
        &self,
        chat_id: &str,
        visibility: Visibility,
    ) -> StoreResult<bool> {
        let updated = self
            .repos
            .chats
            .update(chat_id, Box::new(move |chat: &mut Chat| chat.visibility = visibility))
            .await?;
        if !updated {
            debug!("visibility update skipped, no chat {chat_id}");
        }
        Ok(updated)
    }

    pub async fn save_message(&self, message: ChatMessage) -> StoreResult<ChatMessage> {
        self.repos.messages.upsert(message).await
    }

    pub async fn get_message_by_id(&self, id: &str) -> StoreResult<Option<ChatMessage>> {
        self.repos.messages.get(id).await
    }

    pub async fn get_messages_by_chat_id(&self, chat_id: &str) -> StoreResult<Vec<ChatMessage>> {
        self.repos.messages.find_by_parent(chat_id).await
    }

    /// Removes the messages of `chat_id` created strictly after `cutoff`,
    /// along with the votes cast on them. Returns the number of messages removed.
    ///
    /// Votes are removed before their messages, so a failure part way leaves
    /// messages without votes but never votes on a deleted message.
    pub async fn delete_messages_by_chat_id_after_timestamp(
        &self,
        chat_id: &str,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let doomed: HashSet<String> = self
            .repos
            .messages
            .find_by_parent(chat_id)
            .await?
            .into_iter()
            .filter(|message| message.created_at > cutoff)
            .map(|message| message.id)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let votes = self
            .repos
            .votes
            .remove_where(&|vote: &Vote| doomed.contains(&vote.message_id))
            .await?;
        let removed = self
            .repos
            .messages
            .remove_where(&|message: &ChatMessage| doomed.contains(&message.id))
            .await?;
        info!(
            "deleted {} messages and {} votes from chat {chat_id} after {cutoff}",
            removed.len(),
            votes.len()
        );
        Ok(removed.len())
    }

    pub async fn get_document_by_id(&self, id: &str) -> StoreResult<Option<Document>> {
        self.repos.documents.get(id).await
    }

    /// Insert-or-replace. A replacing save keeps the stored owner and
    /// creation time; everything else comes from `document`. Returns the
    /// record as stored.
    pub async fn save_document(&self, document: Document) -> StoreResult<Document> {
        self.repos
            .documents
            .upsert_with(
                document,
                Box::new(|stored: &Document, incoming: &mut Document| {
                    incoming.created_at = stored.created_at;
                    incoming.user_id = stored.user_id.clone();
                }),
            )
            .await
    }

    pub async fn save_suggestions(&self, suggestions: Vec<Suggestion>) -> StoreResult<()> {
        for suggestion in suggestions {
            self.repos.suggestions.upsert(suggestion).await?;
        }
        Ok(())
    }

    pub async fn get_suggestions_by_document_id(
        &self,
        document_id: &str,
    ) -> StoreResult<Vec<Suggestion>> {
        self.repos.suggestions.find_by_parent(document_id).await
    }

    pub async fn save_vote(&self, vote: Vote) -> StoreResult<Vote> {
        self.repos.votes.upsert(vote).await
    }

    pub async fn get_votes_by_message_id(&self, message_id: &str) -> StoreResult<Vec<Vote>> {
        self.repos.votes.find_by_parent(message_id).await
    }
}
