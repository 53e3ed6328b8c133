//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateGroupParams {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub body: String,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: i64,
    pub body: String,
    pub group_id: Option<Uuid>,
    pub image_path: Option<String>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Every post, newest first, ties kept in insertion order.
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;

    /// Posts by any of the given authors, in global feed order. An empty
    /// author set yields an empty feed.
    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    /// Update text, group, and image. `created_at` and authorship never
    /// change after creation.
    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Hard delete; comments cascade at the store layer.
    async fn delete_post(&self, id: i64) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: i64,
    pub author_id: Uuid,
    pub body: String,
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Comments for a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams) -> Result<CommentRecord, RepoError>;
}

/// The follow graph: directed user→author edges.
///
/// `follow` and `unfollow` are idempotent at this layer; re-following is a
/// no-op, as is unfollowing an absent edge. The primitive does not reject
/// `user == author` (the request layer decides whether to offer that).
#[async_trait]
pub trait FollowsRepo: Send + Sync {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<(), RepoError>;

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<(), RepoError>;

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn followers_of(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;
}
