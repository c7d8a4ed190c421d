//! Error handling for the API.
//!
//! In development, feel free to add a variant to the ClubError enum
//! to better format errors. This is always better than just forcing it
//! into a `BadRequest`. Make sure when doing so to add adequate documentation.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_xlsxwriter::XlsxError;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

/// The error enum for all error handling across the API.
///
/// See each variant for its corresponding error status code
/// and JSON error bodies.
#[derive(Debug, Error)]
pub enum ClubError {
    /// \[404\] No record exists with the requested id.
    ///
    /// ```json
    /// {
    ///     "message": "resource not found",
    ///     "statusCode": 404
    /// }
    /// ```
    #[error("resource not found")]
    NotFound,
    /// \[404\] An export matched no community submissions.
    ///
    /// ```json
    /// {
    ///     "message": "no data found for the specified date range",
    ///     "statusCode": 404
    /// }
    /// ```
    #[error("no data found for the specified date range")]
    NoData,
    /// \[400\] The request to the API was malformed.
    ///
    /// ```json
    /// {
    ///     "message": "bad request",
    ///     "statusCode": 400,
    ///     "reason": <reason>
    /// }
    /// ```
    #[error("bad request")]
    BadRequest(String),
    /// \[400\] An uploaded file was not an image.
    ///
    /// ```json
    /// {
    ///     "message": "only image files are allowed",
    ///     "statusCode": 400,
    ///     "reason": <content type>
    /// }
    /// ```
    #[error("only image files are allowed")]
    UnsupportedImage(String),
    /// \[413\] An uploaded file was larger than the configured ceiling.
    #[error("file too large")]
    PayloadTooLarge(String),
    /// \[500\] An error occured while interacting with the database.
    ///
    /// The body carries no detail; the error itself is logged.
    #[error("database error")]
    Database(#[from] sqlx::Error),
    /// \[500\] Reading or writing an uploaded file failed.
    #[error("file storage error")]
    Io(#[from] std::io::Error),
    /// \[500\] The spreadsheet writer failed.
    #[error("export error")]
    Export(#[from] XlsxError),
}

/// The return type for all endpoints.
pub type ClubResult<T> = Result<T, ClubError>;

impl ClubError {
    pub fn status(&self) -> StatusCode {
        match self {
            ClubError::NotFound | ClubError::NoData => StatusCode::NOT_FOUND,
            ClubError::BadRequest(_) | ClubError::UnsupportedImage(_) => StatusCode::BAD_REQUEST,
            ClubError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ClubError::Database(_) | ClubError::Io(_) | ClubError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn as_json(&self) -> Value {
        let mut json_val = match self {
            ClubError::BadRequest(reason)
            | ClubError::UnsupportedImage(reason)
            | ClubError::PayloadTooLarge(reason) => json!({ "reason": reason }),
            _ => json!({}),
        };

        json_val["statusCode"] = json!(self.status().as_u16());
        json_val["message"] = json!(self.to_string());

        json_val
    }
}

impl IntoResponse for ClubError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        (status, Json(self.as_json())).into_response()
    }
}

impl From<JsonRejection> for ClubError {
    fn from(rejection: JsonRejection) -> Self {
        ClubError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ClubError {
    fn from(rejection: QueryRejection) -> Self {
        ClubError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ClubError {
    fn from(rejection: PathRejection) -> Self {
        ClubError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ClubError {
    fn from(rejection: MultipartRejection) -> Self {
        ClubError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ClubError {
    fn from(error: MultipartError) -> Self {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ClubError::PayloadTooLarge(error.body_text())
        } else {
            ClubError::BadRequest(error.body_text())
        }
    }
}
