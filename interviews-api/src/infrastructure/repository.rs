//! In-memory repositories.
//!
//! Data lives in process-local maps and is lost on exit. Used by tests and
//! by `--store memory` runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Comment, CommentId, Interview, InterviewId, User, UserId};
use crate::port::persistence::{
    select_page, sort_comments_newest_first, CommentRepository, InterviewFilter,
    InterviewRepository, Page, RepositoryError, RepositoryResult, UserRepository,
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> RepositoryResult<()> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.username() == user.username()) {
            return Err(RepositoryError::Duplicate("username"));
        }
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> RepositoryResult<()> {
        let mut users = self.users.lock().await;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.username() == username).cloned())
    }

    async fn count_favoriters(&self, interview: InterviewId) -> RepositoryResult<u64> {
        let users = self.users.lock().await;
        Ok(users.values().filter(|u| u.is_favorite(interview)).count() as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryInterviewRepository {
    interviews: Arc<Mutex<HashMap<InterviewId, Interview>>>,
}

impl InMemoryInterviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewRepository for InMemoryInterviewRepository {
    async fn insert(&self, interview: &Interview) -> RepositoryResult<()> {
        let mut interviews = self.interviews.lock().await;
        if interviews.values().any(|i| i.slug() == interview.slug()) {
            return Err(RepositoryError::Duplicate("slug"));
        }
        interviews.insert(interview.id(), interview.clone());
        Ok(())
    }

    async fn save(&self, interview: &Interview) -> RepositoryResult<()> {
        let mut interviews = self.interviews.lock().await;
        interviews.insert(interview.id(), interview.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: InterviewId) -> RepositoryResult<Option<Interview>> {
        let interviews = self.interviews.lock().await;
        Ok(interviews.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Interview>> {
        let interviews = self.interviews.lock().await;
        Ok(interviews.values().find(|i| i.slug() == slug).cloned())
    }

    async fn find(&self, filter: &InterviewFilter, page: Page) -> RepositoryResult<Vec<Interview>> {
        let interviews = self.interviews.lock().await;
        Ok(select_page(interviews.values().cloned(), filter, page))
    }

    async fn count(&self, filter: &InterviewFilter) -> RepositoryResult<u64> {
        let interviews = self.interviews.lock().await;
        Ok(interviews.values().filter(|i| filter.matches(i)).count() as u64)
    }

    async fn delete(&self, interview: &Interview) -> RepositoryResult<()> {
        let mut interviews = self.interviews.lock().await;
        interviews.remove(&interview.id());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCommentRepository {
    comments: Arc<Mutex<HashMap<CommentId, Comment>>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, comment: &Comment) -> RepositoryResult<()> {
        let mut comments = self.comments.lock().await;
        comments.insert(comment.id(), comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        let comments = self.comments.lock().await;
        Ok(comments.get(&id).cloned())
    }

    async fn find_by_interview(&self, interview: InterviewId) -> RepositoryResult<Vec<Comment>> {
        let comments = self.comments.lock().await;
        let mut found: Vec<Comment> = comments
            .values()
            .filter(|c| c.belongs_to(interview))
            .cloned()
            .collect();
        sort_comments_newest_first(&mut found);
        Ok(found)
    }

    async fn delete(&self, id: CommentId) -> RepositoryResult<()> {
        let mut comments = self.comments.lock().await;
        comments.remove(&id);
        Ok(())
    }

    async fn delete_by_interview(&self, interview: InterviewId) -> RepositoryResult<usize> {
        let mut comments = self.comments.lock().await;
        let before = comments.len();
        comments.retain(|_, c| !c.belongs_to(interview));
        Ok(before - comments.len())
    }
}
