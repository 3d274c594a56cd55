use hotel_core::ExecutorError;
use thiserror::Error;

use crate::{AuthError, HotelId};

pub type DeskResult<T> = Result<T, DeskError>;

/// Anything that can stop a workflow. Each one is reported to the user and
/// control goes back to the menu.
#[derive(Debug, Error)]
pub enum DeskError {
    /// The user typed something unusable
    #[error("{0}")]
    Validation(String),
    /// The user does not manage the hotel they are acting on
    #[error("You do not manage hotel {hotel_id}.")]
    Unauthorized { hotel_id: HotelId },
    #[error("{resource} {identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: String,
    },
    /// Input was closed while a workflow was waiting on it
    #[error("Input closed")]
    InputClosed,
    #[error(transparent)]
    Db(#[from] ExecutorError),
    #[error("Could not read input: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DeskError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            resource,
            identifier: identifier.to_string(),
        }
    }
}
