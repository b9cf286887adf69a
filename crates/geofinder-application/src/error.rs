//! Errors surfaced by the use cases.

use geofinder_core::api::ApiError;
use geofinder_core::duel::GuessRejection;
use geofinder_core::session::LifecycleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Another guess is still being processed.
    #[error("A guess is already being submitted")]
    Busy,

    #[error("Guess not sent: {0:?}")]
    Rejected(GuessRejection),
}

pub type PlayResult<T> = std::result::Result<T, PlayError>;
