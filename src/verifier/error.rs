use thiserror::Error;

use crate::mx::MxError;

/// Errors raised while building a [`Verifier`](super::Verifier). Checks
/// themselves never fail; see [`VerificationResult`](super::VerificationResult).
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error(transparent)]
    Mx(#[from] MxError),
    #[error("invalid policy pattern: {source}")]
    PolicyPattern {
        #[source]
        source: regex::Error,
    },
}
