use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CommentId, InterviewId, UserId};
use super::slug::generate_slug;

/// Invariant violations raised while building or editing an interview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterviewError {
    #[error("{0} can't be blank")]
    Blank(&'static str),
}

impl InterviewError {
    pub fn field(&self) -> &'static str {
        match self {
            InterviewError::Blank(field) => field,
        }
    }
}

/// An interview (article) written by one author.
///
/// `author`, `id` and `slug` are fixed at creation. `favorites_count` is a
/// denormalized aggregate owned by the favorite-count synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    id: InterviewId,
    slug: String,
    title: String,
    description: String,
    body: String,
    tag_list: Vec<String>,
    favorites_count: u64,
    author: UserId,
    comments: Vec<CommentId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Fields accepted when an interview is written.
#[derive(Debug, Clone, Default)]
pub struct InterviewDraft {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

/// Partial edit; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct InterviewChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl InterviewChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.body.is_none()
    }
}

impl Interview {
    pub fn create(author: UserId, draft: InterviewDraft) -> Result<Self, InterviewError> {
        ensure_present("title", &draft.title)?;
        ensure_present("description", &draft.description)?;
        ensure_present("body", &draft.body)?;

        let now = Utc::now();
        Ok(Self {
            id: InterviewId::generate(),
            slug: generate_slug(&draft.title),
            title: draft.title,
            description: draft.description,
            body: draft.body,
            tag_list: normalize_tags(draft.tag_list),
            favorites_count: 0,
            author,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the present fields; the slug is kept even when the title changes.
    pub fn apply(&mut self, changes: InterviewChanges) -> Result<(), InterviewError> {
        if let Some(title) = &changes.title {
            ensure_present("title", title)?;
        }
        if let Some(description) = &changes.description {
            ensure_present("description", description)?;
        }
        if let Some(body) = &changes.body {
            ensure_present("body", body)?;
        }
        if changes.is_empty() {
            return Ok(());
        }

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        self.touch();
        Ok(())
    }

    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author == user
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_list.iter().any(|t| t == tag)
    }

    pub fn set_favorites_count(&mut self, count: u64) {
        self.favorites_count = count;
    }

    pub fn attach_comment(&mut self, comment: CommentId) {
        if !self.comments.contains(&comment) {
            self.comments.push(comment);
        }
    }

    /// Returns false if the comment was not attached.
    pub fn detach_comment(&mut self, comment: CommentId) -> bool {
        let before = self.comments.len();
        self.comments.retain(|id| *id != comment);
        before != self.comments.len()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> InterviewId {
        self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn tag_list(&self) -> &[String] {
        &self.tag_list
    }

    pub fn favorites_count(&self) -> u64 {
        self.favorites_count
    }

    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn comments(&self) -> &[CommentId] {
        &self.comments
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn ensure_present(field: &'static str, value: &str) -> Result<(), InterviewError> {
    if value.trim().is_empty() {
        return Err(InterviewError::Blank(field));
    }
    Ok(())
}

/// Drops blank tags and repeated tags, keeping first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
