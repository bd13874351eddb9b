pub mod blocks;
pub mod config;
pub mod error;
pub mod session;

pub use blocks::DocumentHandlers;
pub use config::Config;
pub use error::BlockError;
pub use session::{Session, SessionUser};
