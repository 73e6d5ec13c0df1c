use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CommentId, InterviewId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentError {
    #[error("body can't be blank")]
    BlankBody,
}

/// A comment on one interview. Author and interview never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    body: String,
    author: UserId,
    interview: InterviewId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn create(
        author: UserId,
        interview: InterviewId,
        body: String,
    ) -> Result<Self, CommentError> {
        if body.trim().is_empty() {
            return Err(CommentError::BlankBody);
        }
        let now = Utc::now();
        Ok(Self {
            id: CommentId::generate(),
            body,
            author,
            interview,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn interview(&self) -> InterviewId {
        self.interview
    }

    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author == user
    }

    pub fn belongs_to(&self, interview: InterviewId) -> bool {
        self.interview == interview
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
