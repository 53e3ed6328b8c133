//! HTTP surface: state, router, and handlers.

pub mod error;
pub mod middleware;
pub mod models;
pub mod public;
pub mod session;
pub mod writes;

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::content::ContentService;
use crate::application::follows::FollowService;
use crate::application::listing::ListingService;
use crate::application::repos::{GroupsRepo, UsersRepo};

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<ListingService>,
    pub content: Arc<ContentService>,
    pub follows: Arc<FollowService>,
    pub users: Arc<dyn UsersRepo>,
    pub groups: Arc<dyn GroupsRepo>,
    pub page_size: u32,
}

/// Assemble the public router.
///
/// Static segments (`/new`, `/follow`, `/group/…`) take precedence over the
/// `/{username}` captures.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::index))
        .route("/healthz", get(public::healthz))
        .route("/follow", get(public::follow_index))
        .route("/new", post(writes::new_post))
        .route("/group/new", post(writes::new_group))
        .route("/group/{slug}", get(public::group_posts))
        .route("/{username}", get(public::profile))
        .route(
            "/{username}/follow",
            get(writes::profile_follow).post(writes::profile_follow),
        )
        .route(
            "/{username}/unfollow",
            get(writes::profile_unfollow).post(writes::profile_unfollow),
        )
        .route("/{username}/{post_id}", get(public::post_view))
        .route("/{username}/{post_id}/edit", post(writes::post_edit))
        .route("/{username}/{post_id}/delete", post(writes::post_delete))
        .route("/{username}/{post_id}/comment", post(writes::add_comment))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
