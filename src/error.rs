use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::validation::Violation;

/// The operation that failed, as it appears in client-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add => write!(f, "add"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to {action} book. {violation}")]
    Validation { action: Action, violation: Violation },

    #[error("Invalid request payload: {0}")]
    MalformedPayload(String),

    #[error("Book not found")]
    BookNotFound,

    #[error("Failed to {0} book. Id not found")]
    IdNotFound(Action),

    #[error("Failed to add book")]
    InsertNotVisible,

    #[error("Internal server error")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Store(Box::new(err))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::BookNotFound | ApiError::IdNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InsertNotVisible | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

/// `status` is "fail" for client errors and "error" for server faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

/// The JSON body every endpoint responds with
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Envelope {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Envelope {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let status = if status_code.is_server_error() {
            match &self {
                ApiError::Store(e) => error!("Book store failure: {e}"),
                other => error!("{other}"),
            }
            Status::Error
        } else {
            Status::Fail
        };

        let body = Envelope::<()> {
            status,
            message: Some(self.to_string()),
            data: None,
        };

        (status_code, Json(body)).into_response()
    }
}
