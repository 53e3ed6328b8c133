//! Follow/unfollow actions over the follow graph.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{FollowsRepo, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("unknown author")]
    UnknownAuthor,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Resolves author usernames and drives the follow-graph primitives.
///
/// The underlying edge operations are idempotent; repeating them is never an
/// error. Self-follow is not rejected here; callers that do not want self
/// edges skip the call when the viewer targets themselves.
#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UsersRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UsersRepo>, follows: Arc<dyn FollowsRepo>) -> Self {
        Self { users, follows }
    }

    /// Insert a follow edge from `user` to the named author. Re-following is
    /// a no-op.
    pub async fn follow(&self, user: &UserRecord, author_username: &str) -> Result<(), FollowError> {
        let author = self.resolve_author(author_username).await?;
        self.follows.follow(user.id, author.id).await?;
        debug!(
            target = "brusio::follows",
            user = %user.username,
            author = %author.username,
            "follow edge ensured"
        );
        Ok(())
    }

    /// Remove the follow edge if present; an absent edge is a silent no-op.
    pub async fn unfollow(
        &self,
        user: &UserRecord,
        author_username: &str,
    ) -> Result<(), FollowError> {
        let author = self.resolve_author(author_username).await?;
        self.follows.unfollow(user.id, author.id).await?;
        debug!(
            target = "brusio::follows",
            user = %user.username,
            author = %author.username,
            "follow edge removed if it existed"
        );
        Ok(())
    }

    /// Whether `viewer` currently follows `author_id`. Anonymous viewers
    /// follow nobody.
    pub async fn is_following(
        &self,
        viewer: Option<&UserRecord>,
        author_id: Uuid,
    ) -> Result<bool, FollowError> {
        match viewer {
            Some(user) => Ok(self.follows.is_following(user.id, author_id).await?),
            None => Ok(false),
        }
    }

    async fn resolve_author(&self, username: &str) -> Result<UserRecord, FollowError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or(FollowError::UnknownAuthor)
    }
}
