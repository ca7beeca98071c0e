use std::io;

use crate::codec::Message;

/// Receives what a [`Session`](crate::session::Session) reads off the wire.
///
/// The session only holds a `Weak` reference to its observer. Once the owner
/// drops the observer, callbacks are skipped.
pub trait Observer {
    fn message_received(&self, message: Message);

    /// A read failed without ending the stream. The session stays open.
    fn stream_fault(&self, _error: &io::Error) {}
}
