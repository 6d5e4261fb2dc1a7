use std::fmt;

use thiserror::Error;

/// Default upper bound on the candidate length, in characters.
pub const MAX_EMAIL_LEN: usize = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("too long: {len} > {max}")]
    TooLong { len: usize, max: usize },
    #[error("invalid format: expected non-whitespace '@' non-whitespace")]
    InvalidShape,
}

/// A candidate that passed the shape check. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    raw: String,
    at: usize,
}

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn local(&self) -> &str {
        &self.raw[..self.at]
    }

    /// Everything after the last `@`.
    pub fn domain(&self) -> &str {
        &self.raw[self.at + 1..]
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Fast reject filter run before any network activity.
///
/// Intentionally permissive: the only rules are a maximum length and the
/// shape `\S+@\S+`. Full RFC 5322 parsing is not attempted.
#[derive(Debug, Clone, Copy)]
pub struct AddressValidator {
    max_len: usize,
}

impl Default for AddressValidator {
    fn default() -> Self {
        Self::new(MAX_EMAIL_LEN)
    }
}

impl AddressValidator {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn validate(&self, candidate: &str) -> Result<EmailAddress, AddressError> {
        let len = candidate.chars().count();
        if len > self.max_len {
            return Err(AddressError::TooLong {
                len,
                max: self.max_len,
            });
        }
        if !has_email_shape(candidate) {
            return Err(AddressError::InvalidShape);
        }
        // has_email_shape guarantees an '@' that is neither first nor last
        let at = candidate.rfind('@').ok_or(AddressError::InvalidShape)?;
        Ok(EmailAddress {
            raw: candidate.to_string(),
            at,
        })
    }

    pub fn is_valid(&self, candidate: &str) -> bool {
        self.validate(candidate).is_ok()
    }
}

/// `^\S+@\S+$`: no whitespace anywhere, and an `@` with at least one
/// character on each side.
fn has_email_shape(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let last = s.len() - s.chars().next_back().map_or(0, char::len_utf8);
    s.char_indices()
        .any(|(idx, c)| c == '@' && idx > 0 && idx < last)
}
