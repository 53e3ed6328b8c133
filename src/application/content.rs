//! Post, comment, and group writes plus post detail assembly.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CommentsRepo, CreateCommentParams, CreateGroupParams, CreatePostParams, GroupsRepo, PostsRepo,
    PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};
use crate::domain::slug::{SlugAsyncError, generate_unique_slug};
use crate::domain::validation::{
    FieldError, FieldErrors, check_comment_body, check_image_filename, check_post_body,
};
use crate::infra::uploads::{UploadStorage, UploadStorageError};

/// An image attached to a post submission, already decoded from the wire.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Fields of a post submission. Used for both create and edit; on edit a
/// `None` image keeps the existing one.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub body: String,
    pub group_slug: Option<String>,
    pub image: Option<ImageUpload>,
}

/// A post together with everything its detail view shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostRecord,
    pub comments: Vec<CommentRecord>,
    pub author_post_count: u64,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("post not found")]
    PostNotFound,
    #[error("actor is not the post author")]
    NotAuthor,
    #[error(transparent)]
    Validation(#[from] FieldErrors),
    #[error("image storage failed: {0}")]
    Upload(#[from] UploadStorageError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct ContentService {
    posts: Arc<dyn PostsRepo>,
    posts_write: Arc<dyn PostsWriteRepo>,
    comments: Arc<dyn CommentsRepo>,
    groups: Arc<dyn GroupsRepo>,
    uploads: Arc<UploadStorage>,
}

impl ContentService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        posts_write: Arc<dyn PostsWriteRepo>,
        comments: Arc<dyn CommentsRepo>,
        groups: Arc<dyn GroupsRepo>,
        uploads: Arc<UploadStorage>,
    ) -> Self {
        Self {
            posts,
            posts_write,
            comments,
            groups,
            uploads,
        }
    }

    /// Create a post for `author`. Validation failures persist nothing,
    /// including the image payload.
    pub async fn create_post(
        &self,
        author: &UserRecord,
        input: PostInput,
    ) -> Result<PostRecord, ContentError> {
        let (group_id, image) = self.validate_submission(&input).await?;

        let image_path = match image {
            Some(upload) => Some(self.uploads.store(&upload.filename, &upload.bytes).await?),
            None => None,
        };

        let post = self
            .posts_write
            .create_post(CreatePostParams {
                body: input.body,
                author_id: author.id,
                group_id,
                image_path,
            })
            .await?;

        info!(
            target = "brusio::content",
            post_id = post.id,
            author = %author.username,
            "post created"
        );
        Ok(post)
    }

    /// Edit a post addressed as `{username}/{post_id}`.
    ///
    /// The post must exist under that username; only its author may edit.
    /// Text, group, and image are mutable; `created_at` never changes.
    pub async fn edit_post(
        &self,
        actor: &UserRecord,
        username: &str,
        post_id: i64,
        input: PostInput,
    ) -> Result<PostRecord, ContentError> {
        let existing = self.authored_post(username, post_id).await?;
        if existing.author_id != actor.id {
            return Err(ContentError::NotAuthor);
        }

        let (group_id, image) = self.validate_submission(&input).await?;

        let image_path = match image {
            Some(upload) => Some(self.uploads.store(&upload.filename, &upload.bytes).await?),
            None => existing.image_path,
        };

        let post = self
            .posts_write
            .update_post(UpdatePostParams {
                id: existing.id,
                body: input.body,
                group_id,
                image_path,
            })
            .await?;
        Ok(post)
    }

    /// Hard-delete a post; its comments cascade at the store layer.
    pub async fn delete_post(
        &self,
        actor: &UserRecord,
        username: &str,
        post_id: i64,
    ) -> Result<(), ContentError> {
        let existing = self.authored_post(username, post_id).await?;
        if existing.author_id != actor.id {
            return Err(ContentError::NotAuthor);
        }

        self.posts_write.delete_post(existing.id).await?;
        info!(
            target = "brusio::content",
            post_id,
            author = %actor.username,
            "post deleted"
        );
        Ok(())
    }

    /// Add a comment to the post with this id.
    ///
    /// Comments resolve the post by id alone; the username in the request
    /// path is presentational.
    pub async fn add_comment(
        &self,
        author: &UserRecord,
        post_id: i64,
        body: String,
    ) -> Result<CommentRecord, ContentError> {
        let mut errors = FieldErrors::default();
        check_comment_body(&body, &mut errors);
        errors.into_result()?;

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(ContentError::PostNotFound)?;

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id: post.id,
                author_id: author.id,
                body,
            })
            .await?;
        Ok(comment)
    }

    /// The post addressed as `{username}/{post_id}` with its comments
    /// (oldest first) and the author's total post count.
    pub async fn post_detail(
        &self,
        username: &str,
        post_id: i64,
    ) -> Result<PostDetail, ContentError> {
        let post = self.authored_post(username, post_id).await?;
        let comments = self.comments.list_for_post(post.id).await?;
        let author_post_count = self.posts.count_by_author(post.author_id).await?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }

    /// Create a group with a slug derived from its title.
    pub async fn create_group(
        &self,
        title: &str,
        description: &str,
    ) -> Result<GroupRecord, ContentError> {
        let slug = generate_unique_slug(title, |candidate| {
            let groups = Arc::clone(&self.groups);
            async move { groups.slug_exists(&candidate).await.map(|taken| !taken) }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(slug_err) => {
                let mut errors = FieldErrors::default();
                errors.push(FieldError::new("title", slug_err.to_string()));
                ContentError::Validation(errors)
            }
            SlugAsyncError::Predicate(repo_err) => ContentError::Repo(repo_err),
        })?;

        let group = self
            .groups
            .create_group(CreateGroupParams {
                title: title.to_string(),
                slug,
                description: description.to_string(),
            })
            .await?;

        info!(
            target = "brusio::content",
            group = %group.slug,
            "group created"
        );
        Ok(group)
    }

    async fn authored_post(&self, username: &str, post_id: i64) -> Result<PostRecord, ContentError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(ContentError::PostNotFound)?;

        if post.author_username != username {
            return Err(ContentError::PostNotFound);
        }
        Ok(post)
    }

    /// Run field validation and resolve the optional group reference.
    ///
    /// Returns the resolved group id and the image payload to store, or the
    /// accumulated field errors.
    async fn validate_submission<'a>(
        &self,
        input: &'a PostInput,
    ) -> Result<(Option<Uuid>, Option<&'a ImageUpload>), ContentError> {
        let mut errors = FieldErrors::default();
        check_post_body(&input.body, &mut errors);

        if let Some(upload) = input.image.as_ref() {
            check_image_filename(&upload.filename, &mut errors);
        }

        let group_id = match input.group_slug.as_deref() {
            Some(slug) => match self.groups.find_by_slug(slug).await? {
                Some(group) => Some(group.id),
                None => {
                    errors.push(FieldError::new("group", format!("unknown group `{slug}`")));
                    None
                }
            },
            None => None,
        };

        errors.into_result()?;
        Ok((group_id, input.image.as_ref()))
    }
}
