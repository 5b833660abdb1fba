use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

/// Everything a handler can fail with. Rendered as a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid JSON body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("could not render template: {0}")]
    Render(#[from] tera::Error),

    #[error("could not encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. } | StoreError::TodoNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::Validation(_)) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_) | Self::Render(_) | Self::Encode(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Paths and I/O details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Store(err) => match err {
                StoreError::NotFound { .. } => "todo file does not exist".into(),
                StoreError::Read { .. } => "could not read from file".into(),
                StoreError::Write { .. } => "could not write to JSON file".into(),
                StoreError::Parse { .. } => "could not parse JSON".into(),
                StoreError::Encode(_) => "could not marshal JSON".into(),
                StoreError::Validation(reason) => reason.clone(),
                StoreError::TodoNotFound(_) => "Todo not found".into(),
            },
            Self::InvalidBody(_) => "invalid JSON body".into(),
            Self::Render(_) => "template rendering error".into(),
            Self::Encode(_) => "could not encode JSON".into(),
            Self::Task(_) => "internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }
        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::PathBuf};

    use super::*;
    use crate::entities::TodoId;

    #[test]
    fn maps_store_errors_to_status_codes() {
        let path = PathBuf::from("todos.json");
        let cases = [
            (
                ApiError::from(StoreError::NotFound { path: path.clone() }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(StoreError::TodoNotFound(TodoId::new())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(StoreError::Validation("bad id".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(StoreError::Read {
                    path: path.clone(),
                    source: io::Error::other("disk gone"),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(StoreError::Write {
                    path,
                    source: io::Error::other("read-only"),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[test]
    fn hides_paths_from_clients() {
        let err = ApiError::from(StoreError::NotFound {
            path: PathBuf::from("/srv/secret/todos.json"),
        });
        assert!(err.to_string().contains("/srv/secret"));
        assert_eq!(err.public_message(), "todo file does not exist");
    }
}
