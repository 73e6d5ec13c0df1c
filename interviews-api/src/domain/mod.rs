pub mod comment;
pub mod ids;
pub mod interview;
pub mod slug;
pub mod user;

pub use comment::{Comment, CommentError};
pub use ids::{CommentId, InterviewId, UserId};
pub use interview::{Interview, InterviewChanges, InterviewDraft, InterviewError};
pub use user::{ProfileView, User};
