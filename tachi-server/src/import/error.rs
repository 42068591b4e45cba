//! Import pipeline errors
//!
//! Every import failure is fatal to the whole batch: nothing from a failed
//! import is handed downstream.

use serde::Serialize;
use thiserror::Error;

/// HTTP-style classification of an import failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusClass {
    /// The payload or request metadata is wrong; the user can fix and resubmit
    BadRequest,
    /// The server broke an invariant it should have guaranteed
    Internal,
}

impl StatusClass {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusClass::BadRequest => 400,
            StatusClass::Internal => 500,
        }
    }
}

/// Fatal import error carrying a message meant for the uploader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ImportError {
    pub status: StatusClass,
    pub message: String,
}

impl ImportError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusClass::BadRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusClass::Internal,
            message: message.into(),
        }
    }
}

pub type ImportResult<T> = std::result::Result<T, ImportError>;
