pub mod jwt_authenticator;
pub mod persistence;
pub mod repository;

pub use jwt_authenticator::JwtAuthenticator;
pub use repository::{InMemoryCommentRepository, InMemoryInterviewRepository, InMemoryUserRepository};
