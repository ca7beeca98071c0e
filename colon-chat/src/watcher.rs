//! Readiness events for a [`Session`] and the read path they drive.
//!
//! [`Session::next_event`] waits on the input half and yields a
//! [`StreamEvent`]; [`Session::handle_event`] is the single dispatch point.
//! Keeping the two apart lets a caller multiplex the session with other
//! sources (stdin, signals) inside one `tokio::select!` on one task.
//!
//! Every successful read is decoded as exactly one frame. Two frames that
//! land in the same read come out as one message whose text holds the rest
//! of the chunk.

use std::io;

use tracing::{debug, trace, warn};

use crate::{
    codec,
    observer::Observer,
    session::{ConnectionState, Session},
    transport::{InputStream, Transport},
};

#[derive(Debug)]
pub enum StreamEvent {
    Readable,
    Writable,
    EndOfStream,
    Error(io::Error),
}

impl<T: Transport> Session<T> {
    /// Waits for the next readiness event on the input half.
    ///
    /// Never resolves unless the session is open, so it is safe to use as a
    /// `select!` branch across the whole session lifetime.
    pub async fn next_event(&self) -> StreamEvent {
        let input = match (&self.input, self.state) {
            (Some(input), ConnectionState::Open) => input,
            _ => return std::future::pending().await,
        };

        match input.readable().await {
            Ok(()) => StreamEvent::Readable,
            Err(error) => StreamEvent::Error(error),
        }
    }

    pub fn handle_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Readable => {
                if self.is_open() {
                    self.read_available_bytes();
                }
            }
            StreamEvent::EndOfStream => {
                debug!("end of stream encountered");
                self.close();
            }
            StreamEvent::Error(error) => self.report_fault(&error),
            StreamEvent::Writable => trace!("output has space available"),
        }
    }

    fn read_available_bytes(&mut self) {
        loop {
            let read = match (&self.input, self.state) {
                (Some(input), ConnectionState::Open) => input.try_read(&mut self.read_buf),
                _ => return,
            };

            match read {
                Ok(0) => return self.handle_event(StreamEvent::EndOfStream),
                Ok(count) => self.process_chunk(count),
                Err(error) => match error.kind() {
                    io::ErrorKind::WouldBlock => return,
                    io::ErrorKind::Interrupted => continue,
                    io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                        debug!(?error, "peer dropped the connection");
                        return self.handle_event(StreamEvent::EndOfStream);
                    }
                    _ => return self.handle_event(StreamEvent::Error(error)),
                },
            }
        }
    }

    fn process_chunk(&mut self, count: usize) {
        let Some(message) = codec::decode(&self.read_buf[..count], &self.username) else {
            debug!(bytes = count, "dropping malformed frame");
            return;
        };

        debug!(username = %message.username, "new message received");
        self.notify(|observer| observer.message_received(message));
    }

    fn report_fault(&self, error: &io::Error) {
        warn!(?error, "stream error occurred");
        self.notify(|observer| observer.stream_fault(error));
    }

    fn notify(&self, callback: impl FnOnce(&dyn Observer)) {
        match self.observer.upgrade() {
            Some(observer) => callback(&*observer),
            None => trace!("observer dropped; skipping callback"),
        }
    }
}

/// Dispatches readiness events until the session closes.
///
/// Error events never close the session, so a stream whose readiness keeps
/// failing makes this loop repeat without yielding for long. Callers that
/// need to give up on repeated faults should drive [`Session::next_event`]
/// and [`Session::handle_event`] themselves, as the terminal client does.
pub async fn watch<T: Transport>(session: &mut Session<T>) {
    while session.is_open() {
        let event = session.next_event().await;
        session.handle_event(event);
    }
}
