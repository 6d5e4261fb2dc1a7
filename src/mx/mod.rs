//! DNS MX resolution with a process-lifetime cache.
//!
//! [`MxCache::resolve`] returns the exchangers of a domain sorted by
//! ascending priority. Successes and failures are both memoised per
//! normalised domain, so a persistently broken domain costs one lookup.

mod cache;
mod error;
mod resolver;
mod types;

pub use cache::MxCache;
pub use error::MxError;
pub use resolver::{LookupMx, normalize_domain};
pub use types::MxRecord;
