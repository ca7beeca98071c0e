//! Client core for a colon-delimited chat protocol over one duplex stream.
//!
//! Frames are plain ASCII: `iam:<username>` to join, `msg:<text>` to chat.
//! Each module covers one concern:
//!
//! - [`codec`] encodes outgoing frames and decodes incoming bytes into a
//!   [`Message`]. Decoding reads whatever precedes the first `:` as the
//!   sender's username, tags included.
//! - [`session`] owns the stream halves and the connection state, and
//!   implements `open`, `join`, `send`, and `close`.
//! - [`watcher`] turns input readiness into [`StreamEvent`]s and drains the
//!   stream into the [`Observer`].
//! - [`transport`] is the seam to an already-connected socket and the event
//!   loop it gets registered with.
//! - [`cli`] and [`client`] make up the terminal front end shipped as the
//!   `colon-chat` binary.
//!
//! Everything runs on one task: the observer is held through an
//! `std::rc::Weak`, so sessions are not `Send`.

pub mod cli;
pub mod client;
pub mod codec;
pub mod error;
pub mod observer;
pub mod session;
pub mod transport;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use codec::{Message, Sender};
pub use error::SessionError;
pub use observer::Observer;
pub use session::{ConnectionState, Session};
pub use watcher::{StreamEvent, watch};
