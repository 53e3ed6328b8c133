use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::content::ContentError;
use crate::application::error::ErrorReport;
use crate::application::follows::FollowError;
use crate::application::listing::ListingError;
use crate::application::repos::RepoError;
use crate::domain::validation::FieldError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const VALIDATION: &str = "validation_failed";
    pub const DUPLICATE: &str = "duplicate";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const INTERNAL: &str = "internal_error";
    pub const FORBIDDEN: &str = "forbidden";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
    fields: Vec<FieldError>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            hint,
            fields: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, codes::FORBIDDEN, message, None)
    }

    pub fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "Service temporarily unavailable",
            None,
        )
    }

    pub fn internal(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Unexpected error occurred",
            Some(hint.into()),
        )
    }

    /// A failed submission: field-level errors, nothing persisted.
    pub fn validation(fields: &[FieldError]) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: codes::VALIDATION,
            message: "Submission failed validation".to_string(),
            hint: None,
            fields: fields.to_vec(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self
            .hint
            .clone()
            .unwrap_or_else(|| self.message.clone());
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
                fields: self.fields,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so the logging middleware can emit rich
        // diagnostics without them reaching the client.
        ErrorReport::from_message(
            "infra::http",
            self.status,
            format!("{}: {detail}", self.code),
        )
        .attach(&mut response);
        response
    }
}

impl From<RepoError> for ApiError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound => ApiError::not_found("resource not found"),
            RepoError::Duplicate { constraint } => ApiError::new(
                StatusCode::CONFLICT,
                codes::DUPLICATE,
                "Duplicate record",
                Some(format!("unique constraint `{constraint}`")),
            ),
            RepoError::InvalidInput { message } => {
                ApiError::bad_request("Request could not be processed", Some(message))
            }
            RepoError::Integrity { message } => ApiError::internal(message),
            RepoError::Persistence(_) | RepoError::Timeout => ApiError::unavailable(),
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(error: ListingError) -> Self {
        match error {
            ListingError::UnknownGroup => ApiError::not_found("group not found"),
            ListingError::UnknownAuthor => ApiError::not_found("author not found"),
            ListingError::Repo(err) => err.into(),
        }
    }
}

impl From<FollowError> for ApiError {
    fn from(error: FollowError) -> Self {
        match error {
            FollowError::UnknownAuthor => ApiError::not_found("author not found"),
            FollowError::Repo(err) => err.into(),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(error: ContentError) -> Self {
        match error {
            ContentError::PostNotFound => ApiError::not_found("post not found"),
            // Author-only routes redirect before this conversion can run;
            // anything left is a direct API caller.
            ContentError::NotAuthor => ApiError::forbidden("only the author may modify a post"),
            ContentError::Validation(errors) => ApiError::validation(errors.fields()),
            ContentError::Upload(err) => ApiError::internal(err.to_string()),
            ContentError::Repo(err) => err.into(),
        }
    }
}
