use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::smtp_verify::{DEFAULT_POLICY_PATTERNS, RetryPolicy};
use crate::validator::MAX_EMAIL_LEN;

/// Configuration knobs for [`Verifier`](super::Verifier).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierOptions {
    pub max_email_len: usize,
    pub timeout_ms: u64,
    pub port: u16,
    pub helo_domain: Option<String>,
    pub mail_from: Option<String>,
    pub retry: RetryPolicy,
    pub probe_concurrency: usize,
    pub batch_concurrency: usize,
    pub max_mx: Option<usize>,
    pub policy_patterns: Vec<String>,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            max_email_len: MAX_EMAIL_LEN,
            timeout_ms: 5_000,
            port: 25,
            helo_domain: None,
            mail_from: None,
            retry: RetryPolicy::default(),
            probe_concurrency: 10,
            batch_concurrency: 10,
            max_mx: None,
            policy_patterns: DEFAULT_POLICY_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

impl VerifierOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Envelope sender: per-call value, then configured, then the candidate.
    pub fn envelope_sender<'a>(&'a self, per_call: Option<&'a str>, candidate: &'a str) -> &'a str {
        per_call
            .filter(|value| !value.is_empty())
            .or_else(|| self.mail_from.as_deref().filter(|value| !value.is_empty()))
            .unwrap_or(candidate)
    }

    /// `EHLO` name: configured, then the sender's domain, then `localhost`.
    pub fn helo_name<'a>(&'a self, sender: &'a str) -> &'a str {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                sender
                    .rsplit_once('@')
                    .map(|(_, domain)| domain)
                    .filter(|domain| !domain.is_empty())
            })
            .unwrap_or("localhost")
    }
}
