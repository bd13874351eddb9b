#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} repository lock poisoned")]
    Poisoned(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;
