#![forbid(unsafe_code)]
//! mailprobe_lib: SMTP mailbox existence probing without sending mail.
//!
//! Resolves a domain's mail exchangers, walks `EHLO`/`MAIL FROM`/`RCPT TO`
//! against each of them, and reads the replies as valid, invalid or
//! undetermined. Many servers accept everything or answer ambiguously on
//! purpose; such cases come back as [`ProbeOutcome::Undetermined`] rather
//! than as a guess.
//!
//! ```no_run
//! # async fn run() -> Result<(), mailprobe_lib::VerifierError> {
//! use mailprobe_lib::{Verifier, VerifierOptions};
//!
//! let verifier = Verifier::from_system_conf(VerifierOptions::default())?;
//! let result = verifier
//!     .check_email_existence("someone@example.com", None, None)
//!     .await;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod mx;
pub mod smtp_verify;
pub mod validator;
pub mod verifier;

pub use mx::{LookupMx, MxCache, MxError, MxRecord};
pub use smtp_verify::{
    Connector, HostVerdict, PolicyMatcher, ProbeError, ProbeOutcome, RetryPolicy, SmtpReply,
    TcpConnector,
};
pub use validator::{AddressError, AddressValidator, EmailAddress, MAX_EMAIL_LEN};
pub use verifier::{Reason, VerificationResult, Verifier, VerifierError, VerifierOptions};
