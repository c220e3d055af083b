use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use snicket_client::ClientError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    /// A contract or metadata call failed while serving the request.
    #[error("{0}")]
    Upstream(String),

    /// Check-in could not be verified because the contract call failed.
    #[error("{0}")]
    CheckinFailed(String),
}

impl From<ClientError> for ServerError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::InvalidRecipient(_)
            | ClientError::EventUnavailable(_)
            | ClientError::InvalidEvent(_) => ServerError::BadRequest(e.to_string()),
            ClientError::Chain(chain) => ServerError::Upstream(chain.reason()),
            ClientError::Metadata(_) => ServerError::Upstream(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            ServerError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": message }),
            ),
            ServerError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": message }),
            ),
            ServerError::CheckinFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "valid": false, "error": message }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
