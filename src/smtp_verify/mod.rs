//! SMTP mailbox probing.
//!
//! A [`Prober`] opens one connection per attempt, walks the
//! greeting/`EHLO`/`MAIL FROM`/`RCPT TO` handshake, and classifies the final
//! reply into a [`ProbeOutcome`]. Transient failures are retried with
//! exponential backoff. [`first_verdict`] races probes across all exchangers
//! of a domain and keeps the first classified answer.

mod error;
mod fanout;
mod handshake;
mod options;
mod policy;
mod probe;
mod session;
mod transport;
mod types;

pub use error::ProbeError;
pub use fanout::first_verdict;
pub use handshake::Step;
pub use options::RetryPolicy;
pub use policy::{DEFAULT_POLICY_PATTERNS, PolicyMatcher};
pub use probe::{ProbeJob, Prober};
pub use transport::{Connector, TcpConnector};
pub use types::{HostVerdict, ProbeOutcome, SmtpReply};
