//! In-memory repository fakes and fixtures shared by the integration suites.
#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;
use uuid::Uuid;

use brusio::application::content::ContentService;
use brusio::application::follows::FollowService;
use brusio::application::listing::ListingService;
use brusio::application::repos::{
    CommentsRepo, CreateCommentParams, CreateGroupParams, CreatePostParams, FollowsRepo,
    GroupsRepo, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams, UsersRepo,
};
use brusio::cache::{FeedCache, ManualClock};
use brusio::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};
use brusio::infra::http::AppState;
use brusio::infra::uploads::UploadStorage;

pub const BASE_TIME: OffsetDateTime = datetime!(2026-01-10 12:00:00 UTC);

/// Single shared store backing every repository trait, mirroring the relational
/// schema closely enough for feed ordering and cascade semantics.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserRecord>>,
    groups: Mutex<Vec<GroupRecord>>,
    posts: Mutex<Vec<PostRecord>>,
    comments: Mutex<Vec<CommentRecord>>,
    follows: Mutex<Vec<(Uuid, Uuid)>>,
    next_post_id: AtomicI64,
    next_comment_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_post_id: AtomicI64::new(1),
            next_comment_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    pub fn seed_user(&self, username: &str) -> UserRecord {
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: username.to_string(),
            joined_at: BASE_TIME,
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn seed_group(&self, title: &str, slug: &str) -> GroupRecord {
        let group = GroupRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            created_at: BASE_TIME,
        };
        self.groups.lock().unwrap().push(group.clone());
        group
    }

    /// Insert a post directly with an explicit timestamp, bypassing the write
    /// service, for ordering and cache scenarios.
    pub fn seed_post_at(
        &self,
        author: &UserRecord,
        group: Option<&GroupRecord>,
        body: &str,
        created_at: OffsetDateTime,
    ) -> PostRecord {
        let post = PostRecord {
            id: self.next_post_id.fetch_add(1, Ordering::SeqCst),
            body: body.to_string(),
            author_id: author.id,
            author_username: author.username.clone(),
            group_id: group.map(|g| g.id),
            group_slug: group.map(|g| g.slug.clone()),
            image_path: None,
            created_at,
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    pub fn seed_post(&self, author: &UserRecord, body: &str) -> PostRecord {
        self.seed_post_at(author, None, body, BASE_TIME)
    }

    pub fn follow_edges(&self) -> Vec<(Uuid, Uuid)> {
        self.follows.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.lock().unwrap().len()
    }

    fn feed_sorted(mut posts: Vec<PostRecord>) -> Vec<PostRecord> {
        // Newest first, equal timestamps in insertion (id) order.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        posts
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }
}

#[async_trait]
impl GroupsRepo for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .find(|group| group.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .any(|group| group.slug == slug))
    }

    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError> {
        let mut groups = self.groups.lock().unwrap();
        if groups.iter().any(|group| group.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "groups_slug_key".to_string(),
            });
        }
        let group = GroupRecord {
            id: Uuid::new_v4(),
            title: params.title,
            slug: params.slug,
            description: params.description,
            created_at: BASE_TIME,
        };
        groups.push(group.clone());
        Ok(group)
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(Self::feed_sorted(self.posts.lock().unwrap().clone()))
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.group_id == Some(group_id))
            .cloned()
            .collect();
        Ok(Self::feed_sorted(posts))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect();
        Ok(Self::feed_sorted(posts))
    }

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| author_ids.contains(&post.author_id))
            .cloned()
            .collect();
        Ok(Self::feed_sorted(posts))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.author_id == author_id)
            .count() as u64)
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let author = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == params.author_id)
            .cloned()
            .ok_or(RepoError::InvalidInput {
                message: "unknown author".to_string(),
            })?;
        let group_slug = match params.group_id {
            Some(group_id) => Some(
                self.groups
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|group| group.id == group_id)
                    .map(|group| group.slug.clone())
                    .ok_or(RepoError::InvalidInput {
                        message: "unknown group".to_string(),
                    })?,
            ),
            None => None,
        };

        let post = PostRecord {
            id: self.next_post_id.fetch_add(1, Ordering::SeqCst),
            body: params.body,
            author_id: author.id,
            author_username: author.username,
            group_id: params.group_id,
            group_slug,
            image_path: params.image_path,
            created_at: BASE_TIME,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let group_slug = match params.group_id {
            Some(group_id) => self
                .groups
                .lock()
                .unwrap()
                .iter()
                .find(|group| group.id == group_id)
                .map(|group| group.slug.clone()),
            None => None,
        };

        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.body = params.body;
        post.group_id = params.group_id;
        post.group_slug = group_slug;
        post.image_path = params.image_path;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        // Comments cascade, as the schema's foreign key would.
        self.comments
            .lock()
            .unwrap()
            .retain(|comment| comment.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for MemoryStore {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<CommentRecord> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn create_comment(&self, params: CreateCommentParams) -> Result<CommentRecord, RepoError> {
        let author = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == params.author_id)
            .cloned()
            .ok_or(RepoError::InvalidInput {
                message: "unknown author".to_string(),
            })?;

        let comment = CommentRecord {
            id: self.next_comment_id.fetch_add(1, Ordering::SeqCst),
            post_id: params.post_id,
            author_id: author.id,
            author_username: author.username,
            body: params.body,
            created_at: BASE_TIME,
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl FollowsRepo for MemoryStore {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<(), RepoError> {
        let mut follows = self.follows.lock().unwrap();
        if !follows.contains(&(user_id, author_id)) {
            follows.push((user_id, author_id));
        }
        Ok(())
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<(), RepoError> {
        self.follows
            .lock()
            .unwrap()
            .retain(|edge| *edge != (user_id, author_id));
        Ok(())
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .follows
            .lock()
            .unwrap()
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, author)| *author)
            .collect())
    }

    async fn followers_of(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .follows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, author)| *author == author_id)
            .map(|(follower, _)| *follower)
            .collect())
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .follows
            .lock()
            .unwrap()
            .contains(&(user_id, author_id)))
    }
}

/// Everything a scenario needs: the store, a hand-cranked clock, and the
/// services wired the same way `main` wires them.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<FeedCache>,
    pub listing: ListingService,
    pub follows: FollowService,
    pub content: ContentService,
    upload_dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(20))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(FeedCache::new(ttl, clock.clone()));

        let upload_dir = tempfile::tempdir().expect("upload dir");
        let uploads =
            Arc::new(UploadStorage::new(upload_dir.path().to_path_buf()).expect("upload storage"));

        let listing = ListingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            cache.clone(),
        );
        let follows = FollowService::new(store.clone(), store.clone());
        let content = ContentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            uploads,
        );

        Self {
            store,
            clock,
            cache,
            listing,
            follows,
            content,
            upload_dir,
        }
    }

    pub fn advance(&self, seconds: u64) {
        self.clock.advance(Duration::from_secs(seconds));
    }

    /// The public router wired over this harness's fakes.
    pub fn router(&self, page_size: u32) -> axum::Router {
        brusio::infra::http::build_router(self.app_state(page_size))
    }

    pub fn app_state(&self, page_size: u32) -> AppState {
        AppState {
            listing: Arc::new(self.listing.clone()),
            content: Arc::new(self.content.clone()),
            follows: Arc::new(self.follows.clone()),
            users: self.store.clone(),
            groups: self.store.clone(),
            page_size,
        }
    }
}
