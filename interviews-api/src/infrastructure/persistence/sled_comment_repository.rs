//! Sled-based comment repository.

use std::path::Path;

use async_trait::async_trait;
use sled::Db;

use super::{decode, encode, storage_err};
use crate::domain::{Comment, CommentId, InterviewId};
use crate::port::persistence::{
    sort_comments_newest_first, CommentRepository, RepositoryResult,
};

const COMMENT_TREE_NAME: &str = "comments";
const INTERVIEW_INDEX_TREE_NAME: &str = "comments_by_interview";

/// Stores comments as JSON keyed by id. A second tree indexes them under
/// `<interview id><comment id>` keys so the comments of one interview form a
/// contiguous prefix range.
pub struct SledCommentRepository {
    db: Db,
}

impl SledCommentRepository {
    /// Open or create a sled database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let db = sled::open(path.as_ref()).map_err(storage_err)?;
        Ok(Self { db })
    }

    /// Open with an existing sled database instance.
    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    fn comments_tree(&self) -> RepositoryResult<sled::Tree> {
        self.db.open_tree(COMMENT_TREE_NAME).map_err(storage_err)
    }

    fn index_tree(&self) -> RepositoryResult<sled::Tree> {
        self.db
            .open_tree(INTERVIEW_INDEX_TREE_NAME)
            .map_err(storage_err)
    }

    fn index_key(interview: InterviewId, comment: CommentId) -> [u8; 32] {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(interview.as_bytes());
        key[16..].copy_from_slice(comment.as_bytes());
        key
    }
}

#[async_trait]
impl CommentRepository for SledCommentRepository {
    async fn insert(&self, comment: &Comment) -> RepositoryResult<()> {
        self.comments_tree()?
            .insert(comment.id().as_bytes(), encode(comment)?)
            .map_err(storage_err)?;
        self.index_tree()?
            .insert(
                Self::index_key(comment.interview(), comment.id()),
                &[] as &[u8],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        match self.comments_tree()?.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_interview(&self, interview: InterviewId) -> RepositoryResult<Vec<Comment>> {
        let comments_tree = self.comments_tree()?;
        let mut comments = Vec::new();
        for entry in self.index_tree()?.scan_prefix(interview.as_bytes()) {
            let (key, _) = entry.map_err(storage_err)?;
            // index entries can outlive a half-finished delete
            if let Some(bytes) = comments_tree.get(&key[16..]).map_err(storage_err)? {
                comments.push(decode(&bytes)?);
            }
        }
        sort_comments_newest_first(&mut comments);
        Ok(comments)
    }

    async fn delete(&self, id: CommentId) -> RepositoryResult<()> {
        let Some(bytes) = self
            .comments_tree()?
            .remove(id.as_bytes())
            .map_err(storage_err)?
        else {
            return Ok(());
        };
        let comment: Comment = decode(&bytes)?;
        self.index_tree()?
            .remove(Self::index_key(comment.interview(), id))
            .map_err(storage_err)?;
        Ok(())
    }

    async fn delete_by_interview(&self, interview: InterviewId) -> RepositoryResult<usize> {
        let comments_tree = self.comments_tree()?;
        let index = self.index_tree()?;
        let mut removed = 0;
        for entry in index.scan_prefix(interview.as_bytes()) {
            let (key, _) = entry.map_err(storage_err)?;
            if comments_tree.remove(&key[16..]).map_err(storage_err)?.is_some() {
                removed += 1;
            }
            index.remove(key).map_err(storage_err)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_find_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledCommentRepository::open(temp_dir.path()).unwrap();

        let comment =
            Comment::create(UserId::generate(), InterviewId::generate(), "hello".into()).unwrap();
        repo.insert(&comment).await.unwrap();
        assert_eq!(
            repo.find_by_id(comment.id()).await.unwrap(),
            Some(comment.clone())
        );

        repo.delete(comment.id()).await.unwrap();
        assert!(repo.find_by_id(comment.id()).await.unwrap().is_none());
        // deleting again is a no-op
        repo.delete(comment.id()).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_interview_is_scoped_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SledCommentRepository::open(temp_dir.path()).unwrap();
        let interview = InterviewId::generate();
        let author = UserId::generate();

        let first = Comment::create(author, interview, "first".into()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = Comment::create(author, interview, "second".into()).unwrap();
        let elsewhere = Comment::create(author, InterviewId::generate(), "other".into()).unwrap();

        for c in [&first, &second, &elsewhere] {
            repo.insert(c).await.unwrap();
        }

        let found = repo.find_by_interview(interview).await.unwrap();
        assert_eq!(found, vec![second, first]);

        assert_eq!(repo.delete_by_interview(interview).await.unwrap(), 2);
        assert!(repo.find_by_interview(interview).await.unwrap().is_empty());
        assert!(repo.find_by_id(elsewhere.id()).await.unwrap().is_some());
    }
}
