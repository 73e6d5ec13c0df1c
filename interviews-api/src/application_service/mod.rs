pub mod command;
pub mod interview_service;
pub mod projection;

pub use command::{
    AddCommentCommand, CreateInterviewCommand, ListInterviewsQuery, UpdateInterviewCommand,
};
pub use interview_service::{InterviewService, InterviewServiceError, ServiceResult};
pub use projection::{CommentView, InterviewPage, InterviewView};
