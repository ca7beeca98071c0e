//! One chat connection: the stream halves, the connection state, and the
//! username we joined with.
//!
//! The read path lives in [`crate::watcher`]; this module covers the
//! lifecycle and the write path.

use std::{io, rc::Weak};

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::{
    codec::{self, MAX_READ_LENGTH},
    error::{Result, SessionError},
    observer::Observer,
    transport::{OutputStream, Transport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Open,
    Closed,
}

pub struct Session<T: Transport> {
    pub(crate) input: Option<T::Input>,
    output: Option<T::Output>,
    pub(crate) state: ConnectionState,
    pub(crate) username: String,
    pub(crate) observer: Weak<dyn Observer>,
    pub(crate) read_buf: Vec<u8>,
}

impl<T: Transport> Session<T> {
    pub fn new(observer: Weak<dyn Observer>) -> Self {
        Self::with_read_capacity(observer, MAX_READ_LENGTH)
    }

    pub fn with_read_capacity(observer: Weak<dyn Observer>, capacity: usize) -> Self {
        Self {
            input: None,
            output: None,
            state: ConnectionState::Idle,
            username: String::new(),
            observer,
            // A zero-length read would be indistinguishable from end of stream.
            read_buf: vec![0; capacity.max(1)],
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Registers both halves of `transport` with `event_loop` and moves the
    /// session from `Idle` to `Open`. On failure the session stays `Idle`.
    pub fn open(&mut self, transport: T, event_loop: &Handle) -> Result<()> {
        if self.state != ConnectionState::Idle {
            return Err(SessionError::NotIdle(self.state));
        }

        let (input, output) = transport.open(event_loop).map_err(SessionError::Transport)?;
        self.input = Some(input);
        self.output = Some(output);
        self.state = ConnectionState::Open;
        info!("session opened");
        Ok(())
    }

    /// Sends the join frame and records `username` once it is written.
    pub async fn join(&mut self, username: &str) -> Result<usize> {
        self.ensure_open()?;
        let frame = codec::encode_join(username)?;

        let written = self.write_frame(&frame).await?;
        self.username = username.to_string();
        info!(username, "joined chat");
        Ok(written)
    }

    /// Sends one chat frame and returns the number of bytes written.
    ///
    /// The frame goes out in a single write. A short write is logged and
    /// reported through the returned count but never retried.
    pub async fn send(&mut self, text: &str) -> Result<usize> {
        self.ensure_open()?;
        let frame = codec::encode_chat(text)?;
        self.write_frame(&frame).await
    }

    /// Closes both halves. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }

        self.input = None;
        self.output = None;
        self.state = ConnectionState::Closed;
        info!(username = %self.username, "session closed");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    async fn write_frame(&self, frame: &[u8]) -> Result<usize> {
        let output = match (&self.output, self.state) {
            (Some(output), ConnectionState::Open) => output,
            _ => return Err(SessionError::NotConnected),
        };

        loop {
            output.writable().await.map_err(SessionError::WriteFailed)?;
            match output.try_write(frame) {
                Ok(written) => {
                    if written < frame.len() {
                        warn!(written, expected = frame.len(), "short write; frame truncated");
                    }
                    return Ok(written);
                }
                // Readiness can be spurious; nothing was written yet.
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => continue,
                Err(err) => return Err(SessionError::WriteFailed(err)),
            }
        }
    }
}
