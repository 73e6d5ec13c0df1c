use serde::{Deserialize, Serialize};

use super::ids::{InterviewId, UserId};

/// The slice of a user account this service needs.
///
/// Accounts are owned by the external account system; here a user is only
/// resolved (author, viewer, favoriter) and its favorite set is mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    bio: Option<String>,
    image: Option<String>,
    #[serde(default)]
    favorites: Vec<InterviewId>,
    #[serde(default)]
    following: Vec<UserId>,
}

/// Public profile of a user as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            bio: None,
            image: None,
            favorites: Vec::new(),
            following: Vec::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn favorites(&self) -> &[InterviewId] {
        &self.favorites
    }

    pub fn is_favorite(&self, interview: InterviewId) -> bool {
        self.favorites.contains(&interview)
    }

    /// Adds `interview` to the favorite set. Returns false if it was already there.
    pub fn favorite(&mut self, interview: InterviewId) -> bool {
        if self.is_favorite(interview) {
            return false;
        }
        self.favorites.push(interview);
        true
    }

    /// Removes `interview` from the favorite set. Returns false if it was absent.
    pub fn unfavorite(&mut self, interview: InterviewId) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|id| *id != interview);
        before != self.favorites.len()
    }

    pub fn is_following(&self, other: UserId) -> bool {
        self.following.contains(&other)
    }

    pub fn follow(&mut self, other: UserId) {
        if other != self.id && !self.is_following(other) {
            self.following.push(other);
        }
    }

    pub fn profile_for(&self, viewer: Option<&User>) -> ProfileView {
        ProfileView {
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
            following: viewer.is_some_and(|v| v.is_following(self.id)),
        }
    }
}
