//! Resource service for interviews, favorites and comments.
//!
//! Every operation resolves the path entity first, then checks the
//! requester against the resource author, then performs its store writes in
//! sequence. Writes are not transactional: a failure part way through leaves
//! earlier writes in place.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::domain::{
    Comment, CommentError, CommentId, Interview, InterviewDraft, InterviewError, User, UserId,
};
use crate::port::persistence::{
    CommentRepository, InterviewFilter, InterviewRepository, Page, RepositoryError,
    UserRepository,
};

use super::command::{
    AddCommentCommand, CreateInterviewCommand, ListInterviewsQuery, UpdateInterviewCommand,
};
use super::projection::{CommentView, InterviewPage, InterviewView};

#[derive(Debug, thiserror::Error)]
pub enum InterviewServiceError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("only the author may {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for InterviewServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Duplicate(field) => InterviewServiceError::Validation {
                field,
                message: "is already taken".to_string(),
            },
            other => InterviewServiceError::Repository(other),
        }
    }
}

impl From<InterviewError> for InterviewServiceError {
    fn from(error: InterviewError) -> Self {
        InterviewServiceError::Validation {
            field: error.field(),
            message: "can't be blank".to_string(),
        }
    }
}

impl From<CommentError> for InterviewServiceError {
    fn from(error: CommentError) -> Self {
        match error {
            CommentError::BlankBody => InterviewServiceError::Validation {
                field: "body",
                message: "can't be blank".to_string(),
            },
        }
    }
}

pub type ServiceResult<T> = Result<T, InterviewServiceError>;

/// Operations over interviews and their comments.
///
/// Repositories are injected; the service keeps no state of its own.
pub struct InterviewService<U, I, C> {
    user_repository: U,
    interview_repository: I,
    comment_repository: C,
}

impl<U, I, C> InterviewService<U, I, C>
where
    U: UserRepository,
    I: InterviewRepository,
    C: CommentRepository,
{
    pub fn new(user_repository: U, interview_repository: I, comment_repository: C) -> Self {
        Self {
            user_repository,
            interview_repository,
            comment_repository,
        }
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Loads the requester of an authenticated operation.
    ///
    /// A verified id whose account no longer exists counts as unauthenticated.
    async fn require_user(&self, requester: UserId) -> ServiceResult<User> {
        self.user_repository
            .find_by_id(requester)
            .await?
            .ok_or(InterviewServiceError::Unauthenticated)
    }

    /// Loads the viewer of an optionally authenticated operation.
    async fn load_viewer(&self, viewer: Option<UserId>) -> ServiceResult<Option<User>> {
        match viewer {
            Some(id) => Ok(self.user_repository.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    /// Path resolution for interview-scoped operations.
    pub async fn resolve_interview(&self, slug: &str) -> ServiceResult<Interview> {
        debug!(slug, "resolving interview");
        self.interview_repository
            .find_by_slug(slug)
            .await?
            .ok_or(InterviewServiceError::NotFound("interview"))
    }

    /// Path resolution for comment-scoped operations.
    ///
    /// Malformed ids, unknown ids and comments of another interview are all
    /// reported as not found.
    pub async fn resolve_comment(
        &self,
        interview: &Interview,
        comment_id: &str,
    ) -> ServiceResult<Comment> {
        let id: CommentId = comment_id
            .parse()
            .map_err(|_| InterviewServiceError::NotFound("comment"))?;
        match self.comment_repository.find_by_id(id).await? {
            Some(comment) if comment.belongs_to(interview.id()) => Ok(comment),
            _ => Err(InterviewServiceError::NotFound("comment")),
        }
    }

    async fn interview_view(
        &self,
        interview: &Interview,
        viewer: Option<&User>,
    ) -> ServiceResult<InterviewView> {
        let author = self.author_of(interview.author(), viewer).await?;
        Ok(InterviewView::new(interview, author.as_ref(), viewer))
    }

    /// The author is usually the viewer; skip the lookup then.
    async fn author_of(&self, author: UserId, viewer: Option<&User>) -> ServiceResult<Option<User>> {
        match viewer {
            Some(v) if v.id() == author => Ok(Some(v.clone())),
            _ => Ok(self.user_repository.find_by_id(author).await?),
        }
    }

    async fn authors_of(
        &self,
        ids: impl IntoIterator<Item = UserId>,
    ) -> ServiceResult<HashMap<UserId, User>> {
        let mut authors = HashMap::new();
        for id in ids {
            if authors.contains_key(&id) {
                continue;
            }
            if let Some(user) = self.user_repository.find_by_id(id).await? {
                authors.insert(id, user);
            }
        }
        Ok(authors)
    }

    // ------------------------------------------------------------------
    // Interviews
    // ------------------------------------------------------------------

    pub async fn create(
        &self,
        requester: UserId,
        cmd: CreateInterviewCommand,
    ) -> ServiceResult<InterviewView> {
        let user = self.require_user(requester).await?;

        let interview = Interview::create(user.id(), InterviewDraft::from(cmd))?;
        self.interview_repository.insert(&interview).await?;

        info!(slug = interview.slug(), author = %user.id(), "interview created");
        self.interview_view(&interview, Some(&user)).await
    }

    pub async fn get(&self, viewer: Option<UserId>, slug: &str) -> ServiceResult<InterviewView> {
        let (viewer, interview) =
            futures::try_join!(self.load_viewer(viewer), self.resolve_interview(slug))?;
        self.interview_view(&interview, viewer.as_ref()).await
    }

    pub async fn update(
        &self,
        requester: UserId,
        slug: &str,
        cmd: UpdateInterviewCommand,
    ) -> ServiceResult<InterviewView> {
        let user = self.require_user(requester).await?;
        let mut interview = self.resolve_interview(slug).await?;

        if !interview.is_authored_by(user.id()) {
            warn!(slug, requester = %user.id(), "update rejected: not the author");
            return Err(InterviewServiceError::Forbidden("update this interview"));
        }

        interview.apply(cmd.into())?;
        self.interview_repository.save(&interview).await?;

        info!(slug, "interview updated");
        self.interview_view(&interview, Some(&user)).await
    }

    /// Deletes the interview and every comment attached to it.
    pub async fn delete(&self, requester: UserId, slug: &str) -> ServiceResult<()> {
        let user = self.require_user(requester).await?;
        let interview = self.resolve_interview(slug).await?;

        if !interview.is_authored_by(user.id()) {
            warn!(slug, requester = %user.id(), "delete rejected: not the author");
            return Err(InterviewServiceError::Forbidden("delete this interview"));
        }

        self.interview_repository.delete(&interview).await?;
        let removed = self
            .comment_repository
            .delete_by_interview(interview.id())
            .await?;

        info!(slug, comments_removed = removed, "interview deleted");
        Ok(())
    }

    pub async fn list(
        &self,
        viewer: Option<UserId>,
        query: ListInterviewsQuery,
    ) -> ServiceResult<InterviewPage> {
        let page = Page {
            limit: query.limit.unwrap_or(Page::default().limit),
            offset: query.offset.unwrap_or(Page::default().offset),
        };
        let viewer = self.load_viewer(viewer).await?;

        let Some(filter) = self.build_filter(&query).await? else {
            debug!(?query, "unknown favoriter, returning empty page");
            return Ok(InterviewPage {
                interviews: Vec::new(),
                interviews_count: 0,
            });
        };

        let (interviews, interviews_count) = futures::try_join!(
            self.interview_repository.find(&filter, page),
            self.interview_repository.count(&filter),
        )?;

        let authors = self
            .authors_of(interviews.iter().map(Interview::author))
            .await?;
        let interviews = interviews
            .iter()
            .map(|i| InterviewView::new(i, authors.get(&i.author()), viewer.as_ref()))
            .collect();

        Ok(InterviewPage {
            interviews,
            interviews_count,
        })
    }

    /// Translates usernames in the query into a store filter.
    ///
    /// Empty values count as absent. An unknown author drops the author
    /// criterion; an unknown favoriter returns `None`, in which case nothing
    /// can match.
    async fn build_filter(&self, query: &ListInterviewsQuery) -> ServiceResult<Option<InterviewFilter>> {
        let mut filter = InterviewFilter {
            tag: non_empty(&query.tag).map(str::to_string),
            ..Default::default()
        };

        if let Some(username) = non_empty(&query.author) {
            match self.user_repository.find_by_username(username).await? {
                Some(author) => filter.author = Some(author.id()),
                None => debug!(username, "unknown author, ignoring author filter"),
            }
        }

        if let Some(username) = non_empty(&query.favorited) {
            match self.user_repository.find_by_username(username).await? {
                Some(favoriter) => filter.ids = Some(favoriter.favorites().to_vec()),
                None => return Ok(None),
            }
        }

        Ok(Some(filter))
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    pub async fn favorite(&self, requester: UserId, slug: &str) -> ServiceResult<InterviewView> {
        let mut user = self.require_user(requester).await?;
        let interview = self.resolve_interview(slug).await?;

        if user.favorite(interview.id()) {
            self.user_repository.save(&user).await?;
        }
        let interview = self.sync_favorites_count(interview).await?;

        info!(slug, user = %user.id(), count = interview.favorites_count(), "interview favorited");
        self.interview_view(&interview, Some(&user)).await
    }

    pub async fn unfavorite(&self, requester: UserId, slug: &str) -> ServiceResult<InterviewView> {
        let mut user = self.require_user(requester).await?;
        let interview = self.resolve_interview(slug).await?;

        if user.unfavorite(interview.id()) {
            self.user_repository.save(&user).await?;
        }
        let interview = self.sync_favorites_count(interview).await?;

        info!(slug, user = %user.id(), count = interview.favorites_count(), "interview unfavorited");
        self.interview_view(&interview, Some(&user)).await
    }

    /// Recomputes the denormalized favorites count from the user store.
    ///
    /// Read-then-write with no isolation: concurrent favorites on the same
    /// interview may leave a stale count until the next sync.
    pub async fn sync_favorites_count(&self, mut interview: Interview) -> ServiceResult<Interview> {
        let count = self
            .user_repository
            .count_favoriters(interview.id())
            .await?;
        interview.set_favorites_count(count);
        self.interview_repository.save(&interview).await?;
        Ok(interview)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn add_comment(
        &self,
        requester: UserId,
        slug: &str,
        cmd: AddCommentCommand,
    ) -> ServiceResult<CommentView> {
        let user = self.require_user(requester).await?;
        let mut interview = self.resolve_interview(slug).await?;

        let comment = Comment::create(user.id(), interview.id(), cmd.body)?;
        self.comment_repository.insert(&comment).await?;

        interview.attach_comment(comment.id());
        self.interview_repository.save(&interview).await?;

        info!(slug, comment = %comment.id(), author = %user.id(), "comment added");
        Ok(CommentView::new(&comment, Some(&user), Some(&user)))
    }

    /// Comments of the interview, newest first.
    pub async fn list_comments(
        &self,
        viewer: Option<UserId>,
        slug: &str,
    ) -> ServiceResult<Vec<CommentView>> {
        let (viewer, interview) =
            futures::try_join!(self.load_viewer(viewer), self.resolve_interview(slug))?;

        let comments = self
            .comment_repository
            .find_by_interview(interview.id())
            .await?;
        let authors = self.authors_of(comments.iter().map(Comment::author)).await?;

        Ok(comments
            .iter()
            .map(|c| CommentView::new(c, authors.get(&c.author()), viewer.as_ref()))
            .collect())
    }

    pub async fn remove_comment(
        &self,
        requester: UserId,
        slug: &str,
        comment_id: &str,
    ) -> ServiceResult<()> {
        let user = self.require_user(requester).await?;
        let mut interview = self.resolve_interview(slug).await?;
        let comment = self.resolve_comment(&interview, comment_id).await?;

        if !comment.is_authored_by(user.id()) {
            warn!(slug, comment = %comment.id(), requester = %user.id(), "comment removal rejected: not the author");
            return Err(InterviewServiceError::Forbidden("remove this comment"));
        }

        interview.detach_comment(comment.id());
        self.interview_repository.save(&interview).await?;
        self.comment_repository.delete(comment.id()).await?;

        info!(slug, comment = %comment.id(), "comment removed");
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
