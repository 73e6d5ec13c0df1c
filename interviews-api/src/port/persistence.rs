//! Persistence traits - abstract interfaces over the document store.
//!
//! Each collection (users, interviews, comments) gets its own repository so
//! the resource service can be wired with any combination of backends.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, Interview, InterviewId, User, UserId};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A uniqueness constraint on `field` was violated.
    #[error("{0} is already taken")]
    Duplicate(&'static str),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Query over the interview collection. Every set criterion must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewFilter {
    /// Exact membership in the tag list.
    pub tag: Option<String>,
    pub author: Option<UserId>,
    /// Restrict to these ids. `Some(vec![])` matches nothing.
    pub ids: Option<Vec<InterviewId>>,
}

impl InterviewFilter {
    pub fn matches(&self, interview: &Interview) -> bool {
        if let Some(tag) = &self.tag {
            if !interview.has_tag(tag) {
                return false;
            }
        }
        if let Some(author) = self.author {
            if !interview.is_authored_by(author) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&interview.id()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum page size. `0` means unlimited.
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// Newest first; equal timestamps fall back to slug order so pages are stable.
pub fn sort_newest_first(interviews: &mut [Interview]) {
    interviews.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.slug().cmp(b.slug()))
    });
}

/// Applies filter, ordering and pagination to an unordered scan.
pub fn select_page(
    interviews: impl IntoIterator<Item = Interview>,
    filter: &InterviewFilter,
    page: Page,
) -> Vec<Interview> {
    let mut matched: Vec<Interview> = interviews
        .into_iter()
        .filter(|i| filter.matches(i))
        .collect();
    sort_newest_first(&mut matched);
    let limit = match page.limit {
        0 => usize::MAX,
        n => n,
    };
    matched
        .into_iter()
        .skip(page.offset)
        .take(limit)
        .collect()
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Duplicate("username")` if the name is in use.
    async fn insert(&self, user: &User) -> RepositoryResult<()>;

    /// Overwrite an existing user.
    async fn save(&self, user: &User) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Number of users whose favorite set contains `interview`.
    async fn count_favoriters(&self, interview: InterviewId) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Insert a new interview. Fails with `Duplicate("slug")` if the slug is in use.
    async fn insert(&self, interview: &Interview) -> RepositoryResult<()>;

    /// Overwrite an existing interview. The slug must not have changed.
    async fn save(&self, interview: &Interview) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: InterviewId) -> RepositoryResult<Option<Interview>>;

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Interview>>;

    /// Matching interviews, newest first, paginated.
    async fn find(&self, filter: &InterviewFilter, page: Page) -> RepositoryResult<Vec<Interview>>;

    /// Number of matching interviews, ignoring pagination.
    async fn count(&self, filter: &InterviewFilter) -> RepositoryResult<u64>;

    async fn delete(&self, interview: &Interview) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>>;

    /// Comments on `interview`, newest first.
    async fn find_by_interview(&self, interview: InterviewId) -> RepositoryResult<Vec<Comment>>;

    async fn delete(&self, id: CommentId) -> RepositoryResult<()>;

    /// Removes every comment on `interview` and returns how many were removed.
    async fn delete_by_interview(&self, interview: InterviewId) -> RepositoryResult<usize>;
}

// Shared handles delegate to the repository they wrap, so the service can be
// wired with `Arc<dyn ...>` backends chosen at runtime.

#[async_trait]
impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    async fn insert(&self, user: &User) -> RepositoryResult<()> {
        (**self).insert(user).await
    }

    async fn save(&self, user: &User) -> RepositoryResult<()> {
        (**self).save(user).await
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        (**self).find_by_username(username).await
    }

    async fn count_favoriters(&self, interview: InterviewId) -> RepositoryResult<u64> {
        (**self).count_favoriters(interview).await
    }
}

#[async_trait]
impl<T: InterviewRepository + ?Sized> InterviewRepository for Arc<T> {
    async fn insert(&self, interview: &Interview) -> RepositoryResult<()> {
        (**self).insert(interview).await
    }

    async fn save(&self, interview: &Interview) -> RepositoryResult<()> {
        (**self).save(interview).await
    }

    async fn find_by_id(&self, id: InterviewId) -> RepositoryResult<Option<Interview>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Interview>> {
        (**self).find_by_slug(slug).await
    }

    async fn find(&self, filter: &InterviewFilter, page: Page) -> RepositoryResult<Vec<Interview>> {
        (**self).find(filter, page).await
    }

    async fn count(&self, filter: &InterviewFilter) -> RepositoryResult<u64> {
        (**self).count(filter).await
    }

    async fn delete(&self, interview: &Interview) -> RepositoryResult<()> {
        (**self).delete(interview).await
    }
}

#[async_trait]
impl<T: CommentRepository + ?Sized> CommentRepository for Arc<T> {
    async fn insert(&self, comment: &Comment) -> RepositoryResult<()> {
        (**self).insert(comment).await
    }

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_interview(&self, interview: InterviewId) -> RepositoryResult<Vec<Comment>> {
        (**self).find_by_interview(interview).await
    }

    async fn delete(&self, id: CommentId) -> RepositoryResult<()> {
        (**self).delete(id).await
    }

    async fn delete_by_interview(&self, interview: InterviewId) -> RepositoryResult<usize> {
        (**self).delete_by_interview(interview).await
    }
}

/// Newest first.
pub fn sort_comments_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}
