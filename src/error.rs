use helia_common::{GenerationError, StreamError, UnknownKind};
use helia_db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// No handler is registered for the requested kind tag.
    #[error("unsupported block kind: {0}")]
    UnsupportedKind(String),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("stream write failed: {0}")]
    Stream(#[from] StreamError),
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

impl From<UnknownKind> for BlockError {
    fn from(err: UnknownKind) -> Self {
        Self::UnsupportedKind(err.0)
    }
}

impl BlockError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedKind(_))
    }

    /// Message safe to show in the UI.
    pub fn user_message(&self) -> &'static str {
        "could not generate/save content for this block"
    }
}
