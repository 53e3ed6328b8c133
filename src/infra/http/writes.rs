//! Write-side handlers: posts, comments, groups, follow toggles.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::application::content::{ContentError, ImageUpload, PostInput};
use crate::domain::validation::{FieldError, FieldErrors};

use super::AppState;
use super::error::ApiError;
use super::models::{CommentRequest, CommentView, GroupRequest, GroupView, PostRequest, PostView};
use super::public::parse_post_id;
use super::session::Viewer;

/// `POST /new` — create a post.
pub async fn new_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<PostRequest>,
) -> Result<Response, ApiError> {
    let author = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let input = decode_post_input(payload)?;
    let post = state.content.create_post(&author, input).await?;
    Ok((StatusCode::CREATED, Json(PostView::from_record(&post))).into_response())
}

/// `POST /{username}/{post_id}/edit` — author-only edit.
///
/// A non-author is sent back to the post view rather than refused; this is a
/// navigation choice, not a security boundary.
pub async fn post_edit(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((username, post_id)): Path<(String, String)>,
    Json(payload): Json<PostRequest>,
) -> Result<Response, ApiError> {
    let actor = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    if actor.username != username {
        return Ok(post_redirect(&username, &post_id).into_response());
    }

    let post_id = parse_post_id(&post_id)?;
    let input = decode_post_input(payload)?;
    match state.content.edit_post(&actor, &username, post_id, input).await {
        Ok(post) => Ok(Json(PostView::from_record(&post)).into_response()),
        Err(ContentError::NotAuthor) => {
            Ok(post_redirect(&username, &post_id.to_string()).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /{username}/{post_id}/delete` — author-only hard delete.
pub async fn post_delete(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let actor = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    if actor.username != username {
        return Ok(post_redirect(&username, &post_id).into_response());
    }

    let post_id = parse_post_id(&post_id)?;
    match state.content.delete_post(&actor, &username, post_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(ContentError::NotAuthor) => {
            Ok(post_redirect(&username, &post_id.to_string()).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /{username}/{post_id}/comment` — add a comment.
///
/// The post resolves by id alone; the username segment is presentational.
pub async fn add_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((_username, post_id)): Path<(String, String)>,
    Json(payload): Json<CommentRequest>,
) -> Result<Response, ApiError> {
    let author = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let post_id = parse_post_id(&post_id)?;
    let comment = state
        .content
        .add_comment(&author, post_id, payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentView::from_record(&comment))).into_response())
}

/// `POST /group/new` — create a group.
pub async fn new_group(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<GroupRequest>,
) -> Result<Response, ApiError> {
    if viewer.require().is_err() {
        return Ok(Redirect::to(super::session::LOGIN_PATH).into_response());
    }

    let group = state
        .content
        .create_group(&payload.title, payload.description.as_deref().unwrap_or(""))
        .await?;
    Ok((StatusCode::CREATED, Json(GroupView::from_record(&group))).into_response())
}

/// `GET|POST /{username}/follow` — ensure a follow edge, then return to the
/// profile.
///
/// Following yourself is skipped before the graph is touched; the graph
/// primitive itself stays permissive.
pub async fn profile_follow(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let user = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    if user.username != username {
        state.follows.follow(&user, &username).await?;
    }
    Ok(profile_redirect(&username).into_response())
}

/// `GET|POST /{username}/unfollow` — drop the follow edge if present, then
/// return to the profile.
pub async fn profile_unfollow(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let user = match viewer.require() {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    state.follows.unfollow(&user, &username).await?;
    Ok(profile_redirect(&username).into_response())
}

fn profile_redirect(username: &str) -> Redirect {
    Redirect::to(&format!("/{username}"))
}

fn post_redirect(username: &str, post_id: &str) -> Redirect {
    Redirect::to(&format!("/{username}/{post_id}"))
}

/// Turn the wire payload into a [`PostInput`], decoding the optional image.
///
/// A payload that is not valid base64 is a field error like any other bad
/// submission value.
fn decode_post_input(payload: PostRequest) -> Result<PostInput, ApiError> {
    let image = match payload.image {
        Some(image) => match BASE64.decode(image.content_base64.as_bytes()) {
            Ok(bytes) => Some(ImageUpload {
                filename: image.filename,
                bytes,
            }),
            Err(_) => {
                let mut errors = FieldErrors::default();
                errors.push(FieldError::new("image", "image payload is not valid base64"));
                return Err(ApiError::validation(errors.fields()));
            }
        },
        None => None,
    };

    Ok(PostInput {
        body: payload.text,
        group_slug: payload.group,
        image,
    })
}
