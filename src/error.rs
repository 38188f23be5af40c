use std::io;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::resource::ValidationErrors;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("The given data was invalid.")]
    Validation(ValidationErrors),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
            Error::BadRequest(s) => (StatusCode::BAD_REQUEST, s.to_string()).into_response(),
            Error::Validation(errors) => {
                let body = json!({
                    "message": "The given data was invalid.",
                    "errors": errors,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            Error::Multipart(e) => (StatusCode::BAD_REQUEST, e.body_text()).into_response(),
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
            Error::MissingConfig(_) | Error::Config(_) => {
                tracing::error!(error = %self, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let resp = Error::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_status() {
        let mut errors = ValidationErrors::default();
        errors.add("title", "The title field is required.");
        let resp = Error::from(errors).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_bad_request_status() {
        let resp = Error::BadRequest("unknown sort column").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
