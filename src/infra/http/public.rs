//! Read-side handlers: feeds, profiles, post detail.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::listing::FeedView;
use crate::application::pagination::{paginate, parse_page_param};
use crate::domain::entities::PostRecord;

use super::AppState;
use super::error::ApiError;
use super::models::{
    FeedPage, FeedQuery, GroupFeedResponse, GroupView, PostDetailResponse, ProfileResponse,
};
use super::session::Viewer;

pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET /` — the global feed, served through the feed cache.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.listing.feed(FeedView::All).await?;
    Ok(Json(feed_page(&posts, &query, &state)))
}

/// `GET /group/{slug}` — one group's feed.
pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("group not found"))?;

    let posts = state.listing.feed(FeedView::Group(slug)).await?;
    Ok(Json(GroupFeedResponse {
        group: GroupView::from_record(&group),
        feed: feed_page(&posts, &query, &state),
    }))
}

/// `GET /follow` — the viewer's following feed.
pub async fn follow_index(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let posts = state.listing.feed(FeedView::Following(user.id)).await?;
    Ok(Json(feed_page(&posts, &query, &state)).into_response())
}

/// `GET /{username}` — an author's profile feed with the viewer's follow
/// state.
pub async fn profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("author not found"))?;

    let posts = state.listing.feed(FeedView::Author(username)).await?;
    let following = state
        .follows
        .is_following(viewer.0.as_ref(), author.id)
        .await?;

    Ok(Json(ProfileResponse {
        username: author.username,
        display_name: author.display_name,
        following,
        feed: feed_page(&posts, &query, &state),
    }))
}

/// `GET /{username}/{post_id}` — a single post with its comments.
pub async fn post_view(
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&post_id)?;
    let detail = state.content.post_detail(&username, post_id).await?;
    Ok(Json(PostDetailResponse::from_detail(&detail)))
}

/// A post id that does not parse can never resolve, so it is a 404 rather
/// than a 400.
pub(super) fn parse_post_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::not_found("post not found"))
}

pub(super) fn feed_page(posts: &[PostRecord], query: &FeedQuery, state: &AppState) -> FeedPage {
    let requested = parse_page_param(query.page.as_deref());
    FeedPage::from_page(paginate(posts, requested, state.page_size))
}
