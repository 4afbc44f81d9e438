#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
//! `mcquery` queries the live status of a Minecraft server. It collects the
//! MOTD, version, player counts and latency of either edition:
//!
//! - Bedrock servers answer a `RakNet` unconnected ping over UDP.
//! - Java servers answer the Server List Ping over TCP.
//!
//! Every query opens its own socket, performs one exchange, and releases the
//! socket before returning. Nothing is cached and nothing is retried; callers
//! that want "try Bedrock, then Java" use [`crate::tokio::probe()`].
//!
//! The main API surface is [`crate::tokio::get_status`].

pub mod tokio;
pub mod varint;

mod bedrock;
mod java;

use std::{io, time::Duration};

pub use bedrock::{Bedrock, BedrockEdition, BedrockStatus, DEFAULT_PORT as BEDROCK_PORT};
pub use java::{
    Chat, DEFAULT_PORT as JAVA_PORT, Java, JavaResponse, JavaStatus, Player, Players, Version,
};

/// The timeout used by [`Bedrock::default`] and [`Java::default`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when querying a server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the server did not respond in time")]
    Timeout,
    #[error("the server refused the connection")]
    ConnectionRefused,
    #[error("the server closed the connection mid-exchange")]
    ConnectionClosed,
    #[error("the server sent a malformed response: {0}")]
    MalformedResponse(#[from] Malformed),
    #[error("a VarInt ended before its final byte")]
    TruncatedInput,
    #[error("VarInt length was negative or too large")]
    InvalidVarInt(#[from] std::num::TryFromIntError),
    #[error("an I/O error occurred: {0}")]
    IoError(io::Error),
    #[error("an invalid address was provided")]
    InvalidAddress,
    #[error("DNS lookup for the host provided failed")]
    DnsLookupFailed,
}

impl Error {
    /// Whether a failed query says nothing about the other edition, so that
    /// trying the other protocol is worthwhile.
    #[must_use]
    pub const fn warrants_fallback(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionRefused | Self::MalformedResponse(_)
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::ConnectionClosed,
            _ => Self::IoError(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(Malformed::Json(err))
    }
}

/// What exactly was wrong with a server's response.
#[derive(Debug, thiserror::Error)]
pub enum Malformed {
    #[error("expected at least {expected} `;`-separated fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
    #[error("field `{field}` is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    #[error("VarInt is longer than 5 bytes")]
    VarIntTooLong,
    #[error("packet of {len} bytes exceeds the {max} byte limit")]
    PacketTooLong { len: u32, max: u32 },
    #[error("packet length {len} cannot hold its own id")]
    PacketTooShort { len: u32 },
    #[error("unexpected packet id {0:#04x}")]
    UnexpectedPacket(u8),
    #[error("pong carried {0} bytes instead of an 8 byte timestamp")]
    BadPong(usize),
    #[error("invalid status JSON: {0}")]
    Json(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_kinds() {
        let err = Error::from(io::Error::from(io::ErrorKind::TimedOut));
        assert!(matches!(err, Error::Timeout));
        let err = Error::from(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(err, Error::ConnectionRefused));
        let err = Error::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, Error::ConnectionClosed));
        let err = Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn fallback_kinds() {
        assert!(Error::Timeout.warrants_fallback());
        assert!(Error::ConnectionRefused.warrants_fallback());
        assert!(Error::from(Malformed::VarIntTooLong).warrants_fallback());
        assert!(!Error::InvalidAddress.warrants_fallback());
        assert!(!Error::DnsLookupFailed.warrants_fallback());
        assert!(!Error::ConnectionClosed.warrants_fallback());
    }
}
