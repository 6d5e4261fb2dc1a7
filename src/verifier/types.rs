use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::smtp_verify::{HostVerdict, ProbeOutcome};

/// Why a [`VerificationResult`] has the outcome it has.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Failed the length/shape filter; nothing was sent.
    MalformedAddress,
    /// The domain has no usable mail exchanger.
    NoMailExchanger,
    /// Final reply of the host that won the race.
    Answered {
        host: String,
        code: u16,
        message: String,
        /// Connections made to that host, the winning one included.
        attempts: u32,
    },
    /// Every host failed without a classified reply.
    NoConclusiveProbe,
    /// The pipeline for this address died unexpectedly.
    PipelineFailed,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedAddress => f.write_str("malformed address"),
            Self::NoMailExchanger => f.write_str("no mail exchanger"),
            Self::Answered {
                host,
                code,
                message,
                ..
            } => write!(f, "{host} answered {code} {message}"),
            Self::NoConclusiveProbe => f.write_str("no host gave a usable answer"),
            Self::PipelineFailed => f.write_str("internal failure"),
        }
    }
}

/// One entry per checked address.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub outcome: ProbeOutcome,
    pub reason: Reason,
}

impl VerificationResult {
    pub fn new(email: impl Into<String>, outcome: ProbeOutcome, reason: Reason) -> Self {
        Self {
            email: email.into(),
            outcome,
            reason,
        }
    }

    pub(crate) fn malformed(email: impl Into<String>) -> Self {
        Self::new(email, ProbeOutcome::Invalid, Reason::MalformedAddress)
    }

    pub(crate) fn no_mail_exchanger(email: impl Into<String>) -> Self {
        Self::new(email, ProbeOutcome::Invalid, Reason::NoMailExchanger)
    }

    pub(crate) fn inconclusive(email: impl Into<String>) -> Self {
        Self::new(email, ProbeOutcome::Undetermined, Reason::NoConclusiveProbe)
    }

    pub(crate) fn pipeline_failed(email: impl Into<String>) -> Self {
        Self::new(email, ProbeOutcome::Undetermined, Reason::PipelineFailed)
    }

    pub(crate) fn from_verdict(email: impl Into<String>, verdict: HostVerdict) -> Self {
        Self::new(
            email,
            verdict.outcome,
            Reason::Answered {
                host: verdict.host,
                code: verdict.reply.code,
                message: verdict.reply.message,
                attempts: verdict.attempts,
            },
        )
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == ProbeOutcome::Valid
    }

    pub fn is_undetermined(&self) -> bool {
        self.outcome == ProbeOutcome::Undetermined
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.email, self.outcome, self.reason)
    }
}
