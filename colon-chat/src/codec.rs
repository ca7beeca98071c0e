//! Wire codec for the colon-delimited chat protocol.
//!
//! Outgoing frames are `iam:<username>` and `msg:<text>`, ASCII only, with no
//! length prefix and no terminator. Incoming bytes are split on the first `:`
//! and the head is always read as a username, so the tag of a frame is never
//! interpreted on receive. A peer echoing `msg:hello` therefore decodes as a
//! message from a user named `msg`.

use thiserror::Error;

pub const JOIN_TAG: &str = "iam";
pub const CHAT_TAG: &str = "msg";
pub const DELIMITER: u8 = b':';

/// Upper bound for a single read from the input half.
pub const MAX_READ_LENGTH: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Ourself,
    SomeoneElse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("character {character:?} at index {index} cannot be encoded as ASCII")]
    NonAscii { character: char, index: usize },

    /// A username with `:` would be split differently on receive.
    #[error("username contains the frame delimiter at index {index}")]
    DelimiterInUsername { index: usize },
}

pub fn encode_join(username: &str) -> Result<Vec<u8>, EncodingError> {
    if let Some(index) = username.bytes().position(|byte| byte == DELIMITER) {
        return Err(EncodingError::DelimiterInUsername { index });
    }
    encode_frame(JOIN_TAG, username)
}

pub fn encode_chat(text: &str) -> Result<Vec<u8>, EncodingError> {
    encode_frame(CHAT_TAG, text)
}

fn encode_frame(tag: &str, body: &str) -> Result<Vec<u8>, EncodingError> {
    if let Some((index, character)) = body.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(EncodingError::NonAscii { character, index });
    }

    let mut frame = Vec::with_capacity(tag.len() + 1 + body.len());
    frame.extend_from_slice(tag.as_bytes());
    frame.push(DELIMITER);
    frame.extend_from_slice(body.as_bytes());
    Ok(frame)
}

/// Parses one chunk of raw bytes into a [`Message`].
///
/// Returns `None` for a chunk without a delimiter, with an empty head, or
/// containing non-ASCII bytes. The body keeps any further delimiters, and may
/// be empty. The whole chunk is treated as one frame: two frames that arrive
/// in the same read come out as a single message.
pub fn decode(raw: &[u8], current_username: &str) -> Option<Message> {
    if !raw.is_ascii() {
        return None;
    }

    let split = raw.iter().position(|byte| *byte == DELIMITER)?;
    let (head, tail) = (&raw[..split], &raw[split + 1..]);
    if head.is_empty() {
        return None;
    }

    let username = std::str::from_utf8(head).ok()?.to_string();
    let text = std::str::from_utf8(tail).ok()?.to_string();
    let sender = if username == current_username {
        Sender::Ourself
    } else {
        Sender::SomeoneElse
    };

    Some(Message {
        text,
        sender,
        username,
    })
}
