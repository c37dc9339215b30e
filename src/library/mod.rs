mod manager;
mod models;
mod store;

use thiserror::Error;
use uuid::Uuid;

pub use manager::LibraryManager;
pub use models::{
    flatten, ArtworkKind, Game, Library, Profile, SteamMetadata, CURRENT_FORMAT,
};
pub use store::LibraryStore;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported library format version {0}")]
    UnsupportedFormat(i64),
    #[error("Duplicate game id {0}")]
    DuplicateId(Uuid),
}
