use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::TodoError;

#[cfg(feature = "tracing")]
use tracing::{error, warn};

/// The route a failure happened on; decides the message clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn known_failure(self) -> &'static str {
        match self {
            Operation::GetAll => "failed to get all todo",
            Operation::GetById => "failed to get todo by id",
            Operation::Create => "failed to create new todo",
            Operation::Update => "failed to update todo by id",
            Operation::Delete => "failed to delete todo by id",
        }
    }

    fn unexpected_failure(self) -> &'static str {
        match self {
            Operation::GetAll => "failed to get todo",
            other => other.known_failure(),
        }
    }

    /// Message for a request rejected before the service was called.
    pub fn rejected(self) -> &'static str {
        self.known_failure()
    }
}

pub const NOT_FOUND_MESSAGE: &str = "not found";
pub const INVALID_ID_MESSAGE: &str = "invalid todo id";

/// Maps a failed operation to the status code and message sent to the client.
pub fn classify(operation: Operation, err: &TodoError) -> (StatusCode, &'static str) {
    match err {
        TodoError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        TodoError::Storage(_) => (StatusCode::BAD_REQUEST, operation.known_failure()),
        TodoError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            operation.unexpected_failure(),
        ),
    }
}

/// `{ "message": ..., "data": ... }`, the body of every todo response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: &'static str,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self { status: StatusCode::OK, message, data: Some(data) }
    }

    pub fn created(message: &'static str, data: T) -> Self {
        Self { status: StatusCode::CREATED, message, data: Some(data) }
    }

    pub fn empty(message: &'static str) -> Self {
        Self { status: StatusCode::OK, message, data: None }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope { message: self.message.to_string(), data: self.data };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub fn bad_request(message: &'static str) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message }
    }

    pub fn from_todo_error(operation: Operation, err: TodoError) -> Self {
        let (status, message) = classify(operation, &err);
        #[cfg(feature = "tracing")]
        {
            if status.is_server_error() {
                error!(?operation, error = %err, "Todo operation failed");
            } else {
                warn!(?operation, error = %err, "Todo operation rejected");
            }
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope { message: self.message.to_string(), data: None };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Operation; 5] = [
        Operation::GetAll,
        Operation::GetById,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    #[test]
    fn not_found_is_404_for_every_operation() {
        for op in ALL {
            assert_eq!(
                classify(op, &TodoError::NotFound),
                (StatusCode::NOT_FOUND, "not found")
            );
        }
    }

    #[test]
    fn known_storage_errors_are_400() {
        let err = TodoError::Storage("UNIQUE constraint failed".into());
        assert_eq!(
            classify(Operation::GetAll, &err),
            (StatusCode::BAD_REQUEST, "failed to get all todo")
        );
        assert_eq!(
            classify(Operation::GetById, &err),
            (StatusCode::BAD_REQUEST, "failed to get todo by id")
        );
        assert_eq!(
            classify(Operation::Update, &err),
            (StatusCode::BAD_REQUEST, "failed to update todo by id")
        );
        assert_eq!(
            classify(Operation::Delete, &err),
            (StatusCode::BAD_REQUEST, "failed to delete todo by id")
        );
        assert_eq!(
            classify(Operation::Create, &err),
            (StatusCode::BAD_REQUEST, "failed to create new todo")
        );
    }

    #[test]
    fn unexpected_errors_are_500() {
        let err = TodoError::Unexpected("connection refused".into());
        assert_eq!(
            classify(Operation::GetAll, &err),
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to get todo")
        );
        assert_eq!(
            classify(Operation::Delete, &err),
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to delete todo by id")
        );
        for op in ALL {
            assert_eq!(classify(op, &err).0, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn empty_envelope_serializes_null_data() {
        let body: Envelope<()> = Envelope { message: "delete todo by id".into(), data: None };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "delete todo by id", "data": null }));
    }
}
