//! Shared response envelope types for API handlers.
//!
//! Successful outcomes are expressed as a [`Reply`], which picks the status
//! code; only [`Reply::Data`] carries a body, wrapped in [`Envelope`].
//! Failures go through [`crate::error::AppError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard `{ "status", "message", "data" }` response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    pub message: &'static str,
    pub data: T,
}

/// Outcome of a successful operation.
#[derive(Debug)]
pub enum Reply<T> {
    /// 200 with the payload in the envelope.
    Data(T),
    /// 204: the query succeeded but matched nothing.
    NoContent,
    /// 304: the write had no effect.
    NotModified,
}

impl<T> Reply<T> {
    /// `Data` for a write that took effect, `NotModified` otherwise.
    pub fn modified(outcome: Option<T>) -> Self {
        match outcome {
            Some(data) => Reply::Data(data),
            None => Reply::NotModified,
        }
    }

    /// `Data` when something was found, `NoContent` otherwise.
    pub fn found(outcome: Option<T>) -> Self {
        match outcome {
            Some(data) => Reply::Data(data),
            None => Reply::NoContent,
        }
    }

    /// HTTP status this reply is sent with.
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Data(_) => StatusCode::OK,
            Reply::NoContent => StatusCode::NO_CONTENT,
            Reply::NotModified => StatusCode::NOT_MODIFIED,
        }
    }
}

impl<T> Reply<Vec<T>> {
    /// `Data` for a non-empty collection, `NoContent` for an empty one.
    pub fn collection(items: Vec<T>) -> Self {
        if items.is_empty() {
            Reply::NoContent
        } else {
            Reply::Data(items)
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Reply::Data(data) => (
                status,
                Json(Envelope {
                    status: status.as_u16(),
                    message: "Success",
                    data,
                }),
            )
                .into_response(),
            Reply::NoContent | Reply::NotModified => status.into_response(),
        }
    }
}
