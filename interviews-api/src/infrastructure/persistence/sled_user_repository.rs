//! Sled-based user repository.

use std::path::Path;

use async_trait::async_trait;
use sled::Db;

use super::{decode, encode, storage_err};
use crate::domain::{InterviewId, User, UserId};
use crate::port::persistence::{RepositoryError, RepositoryResult, UserRepository};

const USER_TREE_NAME: &str = "users";
const USERNAME_TREE_NAME: &str = "usernames";

/// Stores users as JSON keyed by id, with a username → id index tree.
pub struct SledUserRepository {
    db: Db,
}

impl SledUserRepository {
    /// Open or create a sled database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let db = sled::open(path.as_ref()).map_err(storage_err)?;
        Ok(Self { db })
    }

    /// Open with an existing sled database instance.
    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    fn users_tree(&self) -> RepositoryResult<sled::Tree> {
        self.db.open_tree(USER_TREE_NAME).map_err(storage_err)
    }

    fn usernames_tree(&self) -> RepositoryResult<sled::Tree> {
        self.db.open_tree(USERNAME_TREE_NAME).map_err(storage_err)
    }
}

#[async_trait]
impl UserRepository for SledUserRepository {
    async fn insert(&self, user: &User) -> RepositoryResult<()> {
        let usernames = self.usernames_tree()?;
        let claimed = usernames
            .compare_and_swap(
                user.username().as_bytes(),
                None as Option<&[u8]>,
                Some(&user.id().as_bytes()[..]),
            )
            .map_err(storage_err)?;
        if claimed.is_err() {
            return Err(RepositoryError::Duplicate("username"));
        }

        self.users_tree()?
            .insert(user.id().as_bytes(), encode(user)?)
            .map_err(storage_err)?;
        Ok(())
    }

    async fn save(&self, user: &User) -> RepositoryResult<()> {
        self.users_tree()?
            .insert(user.id().as_bytes(), encode(user)?)
            .map_err(storage_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        match self.users_tree()?.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let Some(id_bytes) = self
            .usernames_tree()?
            .get(username.as_bytes())
            .map_err(storage_err)?
        else {
            return Ok(None);
        };

        match self.users_tree()?.get(id_bytes).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn count_favoriters(&self, interview: InterviewId) -> RepositoryResult<u64> {
        let mut count = 0;
        for entry in self.users_tree()?.iter() {
            let (_, bytes) = entry.map_err(storage_err)?;
            let user: User = decode(&bytes)?;
            if user.is_favorite(interview) {
                count += 1;
            }
        }
        Ok(count)
    }
}
