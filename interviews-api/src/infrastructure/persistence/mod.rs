//! Persistence implementations backed by sled.
//!
//! All three repositories can share one sled database; each collection gets
//! its own tree, and uniqueness constraints are kept in separate index
//! trees updated with compare-and-swap.

pub mod sled_comment_repository;
pub mod sled_interview_repository;
pub mod sled_user_repository;

pub use sled_comment_repository::SledCommentRepository;
pub use sled_interview_repository::SledInterviewRepository;
pub use sled_user_repository::SledUserRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::port::persistence::{RepositoryError, RepositoryResult};

fn storage_err(e: sled::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> RepositoryResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> RepositoryResult<T> {
    serde_json::from_slice(bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))
}
