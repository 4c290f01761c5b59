use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error body returned by the Appwrite REST API.
///
/// All fields are defaulted: a proxy or load balancer in front of the
/// endpoint may answer with a non-JSON body, and the status code alone still
/// has to produce a usable error.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u16,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum AppwriteError {
    /// The addressed document does not exist. This is the one recoverable
    /// store signal: `upsert` falls back from update to create on it.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other API-level failure, surfaced verbatim to the caller.
    #[error("Appwrite error: {message} (code: {code}, type: {kind})")]
    Api { code: u16, kind: String, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AppwriteError {
    pub(crate) fn from_response(status: StatusCode, body: ApiErrorBody) -> Self {
        if status == StatusCode::NOT_FOUND {
            AppwriteError::NotFound { message: body.message }
        } else {
            AppwriteError::Api {
                code: if body.code != 0 { body.code } else { status.as_u16() },
                kind: body.kind,
                message: body.message,
            }
        }
    }

    /// True for HTTP 409, which the schema commands treat as "attribute
    /// already exists".
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppwriteError::Api { code: 409, .. })
    }
}
