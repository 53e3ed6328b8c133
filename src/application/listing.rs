//! Feed assembly for the four listing views.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::repos::{FollowsRepo, GroupsRepo, PostsRepo, RepoError, UsersRepo};
use crate::cache::FeedCache;
use crate::domain::entities::PostRecord;
use uuid::Uuid;

/// Which ordered post collection a request wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView {
    /// Every post across all authors and groups.
    All,
    /// Posts in the group with this slug.
    Group(String),
    /// Posts by the author with this username.
    Author(String),
    /// Posts by every author the given user follows.
    Following(Uuid),
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("unknown group")]
    UnknownGroup,
    #[error("unknown author")]
    UnknownAuthor,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Builds ordered post sequences, newest first with insertion-order ties.
///
/// Only the [`FeedView::All`] case goes through the feed cache; the other
/// views are recomputed from the store on every call.
#[derive(Clone)]
pub struct ListingService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
    follows: Arc<dyn FollowsRepo>,
    feed_cache: Arc<FeedCache>,
}

impl ListingService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
        follows: Arc<dyn FollowsRepo>,
        feed_cache: Arc<FeedCache>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            follows,
            feed_cache,
        }
    }

    /// Produce the ordered post sequence for `view`.
    ///
    /// Read-only apart from repopulating the feed cache on an `All` miss.
    /// Unresolvable group slugs and usernames fail instead of yielding an
    /// empty feed; a user who follows nobody gets an empty feed.
    pub async fn feed(&self, view: FeedView) -> Result<Arc<[PostRecord]>, ListingError> {
        match view {
            FeedView::All => self.global_feed().await,
            FeedView::Group(slug) => {
                let group = self
                    .groups
                    .find_by_slug(&slug)
                    .await?
                    .ok_or(ListingError::UnknownGroup)?;
                let posts = self.posts.list_by_group(group.id).await?;
                Ok(posts.into())
            }
            FeedView::Author(username) => {
                let author = self
                    .users
                    .find_by_username(&username)
                    .await?
                    .ok_or(ListingError::UnknownAuthor)?;
                let posts = self.posts.list_by_author(author.id).await?;
                Ok(posts.into())
            }
            FeedView::Following(user_id) => {
                let authors = self.follows.following_of(user_id).await?;
                if authors.is_empty() {
                    return Ok(Arc::from(Vec::new()));
                }
                let posts = self.posts.list_by_authors(&authors).await?;
                Ok(posts.into())
            }
        }
    }

    async fn global_feed(&self) -> Result<Arc<[PostRecord]>, ListingError> {
        if let Some(cached) = self.feed_cache.get() {
            return Ok(cached);
        }

        let posts: Arc<[PostRecord]> = self.posts.list_all().await?.into();
        self.feed_cache.set(Arc::clone(&posts));
        debug!(
            target = "brusio::listing",
            posts = posts.len(),
            "repopulated global feed cache"
        );
        Ok(posts)
    }
}
