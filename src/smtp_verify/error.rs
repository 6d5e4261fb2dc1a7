use std::io;
use std::time::Duration;

use thiserror::Error;

use super::types::SmtpReply;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{host} did not finish the handshake within {after:?}")]
    Timeout { host: String, after: Duration },
    #[error("{host} answered with transient failure {}", .reply.code)]
    Transient { host: String, reply: SmtpReply },
    #[error("{host} refused the probe on policy grounds: {} {}", .reply.code, .reply.message)]
    PolicyBlocked { host: String, reply: SmtpReply },
    #[error("{host}: giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        host: String,
        attempts: u32,
        #[source]
        last: Box<ProbeError>,
    },
    #[error("probe concurrency limiter closed")]
    LimiterClosed,
}

impl ProbeError {
    pub(crate) fn connect(host: impl Into<String>, source: io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            source,
        }
    }

    pub(crate) fn io(source: io::Error) -> Self {
        Self::Io { source }
    }

    /// Transient replies, the attempt deadline, and refused or timed-out
    /// connects are worth another attempt against the same host.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transient { .. } | Self::Timeout { .. } => true,
            Self::Connect { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
