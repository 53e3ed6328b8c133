//! Session resolution.
//!
//! Session issuance lives in the fronting auth service; by the time a request
//! reaches this process the `brusio_session` cookie carries an established
//! username. This module only resolves that username to a [`UserRecord`]. An
//! unknown username (a session outliving its account) degrades to anonymous;
//! a store failure during resolution is a request failure, not anonymity.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::response::Redirect;

use crate::domain::entities::UserRecord;

use super::AppState;
use super::error::ApiError;

pub const SESSION_COOKIE: &str = "brusio_session";
pub const LOGIN_PATH: &str = "/auth/login";

/// The requesting user, when a session resolves to one.
pub struct Viewer(pub Option<UserRecord>);

impl Viewer {
    /// The signed-in user, or the login redirect served to anonymous write
    /// attempts.
    pub fn require(self) -> Result<UserRecord, Redirect> {
        self.0.ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(username) = session_username(parts) else {
            return Ok(Viewer(None));
        };

        let user = state.users.find_by_username(&username).await?;
        Ok(Viewer(user))
    }
}

fn session_username(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
