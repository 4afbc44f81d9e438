//! Find out which edition a server speaks: Bedrock first, then Java.

use std::time::Duration;

use tracing::debug;

use super::{query_bedrock, query_java};
use crate::{BedrockStatus, Error, JavaStatus};

/// Whichever edition answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerStatus {
    Bedrock(BedrockStatus),
    Java(JavaStatus),
}

impl ServerStatus {
    #[must_use]
    pub const fn delay_ms(&self) -> u64 {
        match self {
            Self::Bedrock(status) => status.delay_ms,
            Self::Java(status) => status.delay_ms,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The Bedrock query failed in a way Java cannot fix, such as a bad host.
    #[error("bedrock query failed: {0}")]
    Bedrock(#[source] Error),
    #[error("no server answered (bedrock: {bedrock}; java: {java})")]
    Unreachable { bedrock: Error, java: Error },
}

/// Query `host:port` as a Bedrock server and, if that fails for a reason
/// that says nothing about Java, as a Java server.
///
/// Both queries use the same port and the same per-step `timeout`.
///
/// # Errors
/// [`ProbeError::Unreachable`] when both queries fail.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> Result<ServerStatus, ProbeError> {
    let bedrock = match query_bedrock(host, port, timeout).await {
        Ok(status) => return Ok(ServerStatus::Bedrock(status)),
        Err(err) if err.warrants_fallback() => err,
        Err(err) => return Err(ProbeError::Bedrock(err)),
    };
    debug!(host, port, error = %bedrock, "bedrock query failed, trying java");

    match query_java(host, port, timeout).await {
        Ok(status) => Ok(ServerStatus::Java(status)),
        Err(java) => Err(ProbeError::Unreachable { bedrock, java }),
    }
}
