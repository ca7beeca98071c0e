use std::io;

use thiserror::Error;

use crate::{codec::EncodingError, session::ConnectionState};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The transport could not be registered with the event loop.
    #[error("failed to open transport: {0}")]
    Transport(#[source] io::Error),

    #[error("session cannot be opened from state {0:?}")]
    NotIdle(ConnectionState),

    #[error("session is not connected")]
    NotConnected,

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("failed to write frame: {0}")]
    WriteFailed(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
