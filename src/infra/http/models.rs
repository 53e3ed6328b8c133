//! Wire models for the JSON API.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::application::content::PostDetail;
use crate::application::pagination::Page;
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord};

fn rfc3339(when: OffsetDateTime) -> String {
    when.format(&Rfc3339).expect("UTC timestamp formats as RFC 3339")
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
}

impl PostView {
    pub fn from_record(record: &PostRecord) -> Self {
        Self {
            id: record.id,
            text: record.body.clone(),
            author: record.author_username.clone(),
            group: record.group_slug.clone(),
            image: record.image_path.clone(),
            created_at: rfc3339(record.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created_at: String,
}

impl CommentView {
    pub fn from_record(record: &CommentRecord) -> Self {
        Self {
            id: record.id,
            author: record.author_username.clone(),
            text: record.body.clone(),
            created_at: rfc3339(record.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: String,
}

impl GroupView {
    pub fn from_record(record: &GroupRecord) -> Self {
        Self {
            title: record.title.clone(),
            slug: record.slug.clone(),
            description: record.description.clone(),
            created_at: rfc3339(record.created_at),
        }
    }
}

/// One page of a feed plus the pagination chrome every feed view renders.
#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_posts: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub posts: Vec<PostView>,
}

impl FeedPage {
    pub fn from_page(page: Page<PostRecord>) -> Self {
        Self {
            page: page.number,
            total_pages: page.total_pages,
            total_posts: page.total_items,
            has_previous: page.has_previous,
            has_next: page.has_next,
            posts: page.items.iter().map(PostView::from_record).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupFeedResponse {
    pub group: GroupView,
    #[serde(flatten)]
    pub feed: FeedPage,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub display_name: String,
    pub following: bool,
    #[serde(flatten)]
    pub feed: FeedPage,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub author_post_count: u64,
}

impl PostDetailResponse {
    pub fn from_detail(detail: &PostDetail) -> Self {
        Self {
            post: PostView::from_record(&detail.post),
            comments: detail
                .comments
                .iter()
                .map(CommentView::from_record)
                .collect(),
            author_post_count: detail.author_post_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Raw `page` value; anything non-numeric falls back to page 1.
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageUploadRequest {
    pub filename: String,
    pub content_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<ImageUploadRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
