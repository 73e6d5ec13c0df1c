//! Viewer-relative JSON shapes returned to clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Comment, CommentId, Interview, ProfileView, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tag_list: Vec<String>,
    pub favorites_count: u64,
    pub favorited: bool,
    /// `None` when the author account no longer resolves.
    pub author: Option<ProfileView>,
    pub comments: Vec<CommentId>,
}

impl InterviewView {
    pub fn new(interview: &Interview, author: Option<&User>, viewer: Option<&User>) -> Self {
        Self {
            slug: interview.slug().to_string(),
            title: interview.title().to_string(),
            description: interview.description().to_string(),
            body: interview.body().to_string(),
            created_at: interview.created_at(),
            updated_at: interview.updated_at(),
            tag_list: interview.tag_list().to_vec(),
            favorites_count: interview.favorites_count(),
            favorited: viewer.is_some_and(|v| v.is_favorite(interview.id())),
            author: author.map(|a| a.profile_for(viewer)),
            comments: interview.comments().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<ProfileView>,
}

impl CommentView {
    pub fn new(comment: &Comment, author: Option<&User>, viewer: Option<&User>) -> Self {
        Self {
            id: comment.id(),
            body: comment.body().to_string(),
            created_at: comment.created_at(),
            updated_at: comment.updated_at(),
            author: author.map(|a| a.profile_for(viewer)),
        }
    }
}

/// One page of a filtered interview listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPage {
    pub interviews: Vec<InterviewView>,
    /// Matches across all pages.
    pub interviews_count: u64,
}
