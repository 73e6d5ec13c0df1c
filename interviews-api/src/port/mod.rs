//! Port layer - abstract interfaces for infrastructure dependencies.

pub mod authenticator;
pub mod persistence;

pub use authenticator::{AuthError, Authenticator};
pub use persistence::{
    CommentRepository, InterviewFilter, InterviewRepository, Page, RepositoryError,
    RepositoryResult, UserRepository,
};
