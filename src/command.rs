//! Text commands received over the link.
//!
//! ```text
//! UP 14    raise blind 14
//! DO 14    lower
//! ST 14    stop
//! PR 14    enter or leave programming mode
//! NO 14    only select the channel
//! SY...    forget the position and synchronize again
//! ```
//!
//! Prefixes are case-insensitive. Channel commands need a space after the
//! two letters; `SY` ignores whatever follows it.

use crate::tracker::Channel;

/// Inbound payloads are read into a buffer of this size; the rest is dropped.
pub const MESSAGE_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Raise,
    Lower,
    Stop,
    Program,
    Nop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PerChannel { action: Action, channel: Channel },
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no command prefix matches {0:?}")]
    UnknownPrefix(String),
    #[error("{action:?} needs a channel in 1..={max}, got {value}")]
    InvalidChannel { action: Action, value: i64, max: Channel },
}

const CHANNEL_PREFIXES: [(&[u8; 3], Action); 5] = [
    (b"UP ", Action::Raise),
    (b"DO ", Action::Lower),
    (b"ST ", Action::Stop),
    (b"PR ", Action::Program),
    (b"NO ", Action::Nop),
];

const RESYNC_PREFIX: &[u8; 2] = b"SY";

impl Command {
    pub fn parse(payload: &[u8], max_channel: Channel) -> Result<Command, CommandError> {
        let message = message_text(payload);

        for (prefix, action) in CHANNEL_PREFIXES {
            if starts_with_ignore_case(message, prefix) {
                let value = leading_integer(&message[prefix.len()..]);
                if value < 1 || value > max_channel as i64 {
                    return Err(CommandError::InvalidChannel { action, value, max: max_channel });
                }
                return Ok(Command::PerChannel { action, channel: value as Channel });
            }
        }

        if starts_with_ignore_case(message, RESYNC_PREFIX) {
            return Ok(Command::Resync);
        }

        Err(CommandError::UnknownPrefix(String::from_utf8_lossy(message).into_owned()))
    }
}

/// The part of the payload that fits the receive buffer, up to the first NUL.
fn message_text(payload: &[u8]) -> &[u8] {
    let truncated = &payload[..payload.len().min(MESSAGE_LEN)];
    match truncated.iter().position(|&b| b == 0) {
        Some(end) => &truncated[..end],
        None => truncated,
    }
}

fn starts_with_ignore_case(message: &[u8], prefix: &[u8]) -> bool {
    message.len() >= prefix.len() && message[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Same set as C's `isspace`, which unlike `u8::is_ascii_whitespace`
/// includes vertical tab.
fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

/// Reads a number the way C's `atoi` does: leading whitespace, an optional
/// sign, then digits up to the first non-digit. No digits reads as 0.
fn leading_integer(text: &[u8]) -> i64 {
    let start = text.iter().position(|&b| !is_c_space(b)).unwrap_or(text.len());
    let mut rest = &text[start..];

    let negative = rest.first() == Some(&b'-');
    if let Some(b'-' | b'+') = rest.first() {
        rest = &rest[1..];
    }

    let mut value: i64 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative { -value } else { value }
}
