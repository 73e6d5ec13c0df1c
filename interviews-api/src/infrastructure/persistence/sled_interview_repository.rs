//! Sled-based interview repository.

use std::path::Path;

use async_trait::async_trait;
use sled::Db;

use super::{decode, encode, storage_err};
use crate::domain::{Interview, InterviewId};
use crate::port::persistence::{
    select_page, InterviewFilter, InterviewRepository, Page, RepositoryError, RepositoryResult,
};

const INTERVIEW_TREE_NAME: &str = "interviews";
const SLUG_TREE_NAME: &str = "interview_slugs";

/// Stores interviews as JSON keyed by id, with a slug → id index tree that
/// enforces slug uniqueness.
pub struct SledInterviewRepository {
    db: Db,
}

impl SledInterviewRepository {
    /// Open or create a sled database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let db = sled::open(path.as_ref()).map_err(storage_err)?;
        Ok(Self { db })
    }

    /// Open with an existing sled database instance.
    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    fn interviews_tree(&self) -> RepositoryResult<sled::Tree> {
        self.db.open_tree(INTERVIEW_TREE_NAME).map_err(storage_err)
    }

    fn slugs_tree(&self) -> RepositoryResult<sled::Tree> {
        self.db.open_tree(SLUG_TREE_NAME).map_err(storage_err)
    }

    /// Claims `slug` for `id`, then runs `write`. The claim is released if
    /// `write` fails so the slug stays available.
    fn claim_slug_then<F>(&self, slug: &str, id: InterviewId, write: F) -> RepositoryResult<()>
    where
        F: FnOnce() -> RepositoryResult<()>,
    {
        let slugs = self.slugs_tree()?;
        let claimed = slugs
            .compare_and_swap(slug.as_bytes(), None as Option<&[u8]>, Some(&id.as_bytes()[..]))
            .map_err(storage_err)?;
        if claimed.is_err() {
            return Err(RepositoryError::Duplicate("slug"));
        }

        write().inspect_err(|_| {
            // only release the claim if it is still ours
            if let Err(e) = slugs.compare_and_swap(
                slug.as_bytes(),
                Some(&id.as_bytes()[..]),
                None as Option<&[u8]>,
            ) {
                tracing::error!(slug, error = %e, "failed to release slug claim");
            }
        })
    }

    fn scan(&self) -> RepositoryResult<Vec<Interview>> {
        let mut interviews = Vec::new();
        for entry in self.interviews_tree()?.iter() {
            let (_, bytes) = entry.map_err(storage_err)?;
            interviews.push(decode(&bytes)?);
        }
        Ok(interviews)
    }
}

#[async_trait]
impl InterviewRepository for SledInterviewRepository {
    async fn insert(&self, interview: &Interview) -> RepositoryResult<()> {
        self.claim_slug_then(interview.slug(), interview.id(), || {
            self.interviews_tree()?
                .insert(interview.id().as_bytes(), encode(interview)?)
                .map_err(storage_err)?;
            Ok(())
        })
    }

    async fn save(&self, interview: &Interview) -> RepositoryResult<()> {
        self.interviews_tree()?
            .insert(interview.id().as_bytes(), encode(interview)?)
            .map_err(storage_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: InterviewId) -> RepositoryResult<Option<Interview>> {
        match self
            .interviews_tree()?
            .get(id.as_bytes())
            .map_err(storage_err)?
        {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Interview>> {
        let Some(id_bytes) = self.slugs_tree()?.get(slug.as_bytes()).map_err(storage_err)? else {
            return Ok(None);
        };

        match self.interviews_tree()?.get(id_bytes).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &InterviewFilter, page: Page) -> RepositoryResult<Vec<Interview>> {
        Ok(select_page(self.scan()?, filter, page))
    }

    async fn count(&self, filter: &InterviewFilter) -> RepositoryResult<u64> {
        Ok(self.scan()?.iter().filter(|i| filter.matches(i)).count() as u64)
    }

    async fn delete(&self, interview: &Interview) -> RepositoryResult<()> {
        self.interviews_tree()?
            .remove(interview.id().as_bytes())
            .map_err(storage_err)?;
        self.slugs_tree()?
            .remove(interview.slug().as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }
}
