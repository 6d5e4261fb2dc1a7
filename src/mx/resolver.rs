use std::future::Future;

use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveErrorKind;

use super::{MxError, MxRecord};

/// Async MX lookup capability consumed by [`MxCache`](super::MxCache).
///
/// An empty answer must be reported as an error; callers never see an
/// empty record list.
pub trait LookupMx: Send + Sync + 'static {
    fn lookup_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxRecord>, MxError>> + Send;
}

impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        let lookup = match self.mx_lookup(domain).await {
            Ok(lookup) => lookup,
            Err(err) => {
                if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
                    return Err(MxError::no_records(domain));
                }
                return Err(MxError::lookup(domain, err));
            }
        };
        let records: Vec<MxRecord> = lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .filter(|record| !record.host.is_empty())
            .collect();
        if records.is_empty() {
            return Err(MxError::no_records(domain));
        }
        Ok(records)
    }
}

/// Normalise a domain into the form used for lookups and cache keys.
///
/// The domain is IDNA-converted to ASCII and lowercased, and a trailing
/// root dot is dropped.
pub fn normalize_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    let ascii = idna::domain_to_ascii(trimmed).map_err(MxError::idna)?;
    if ascii.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    Ok(ascii.to_ascii_lowercase())
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// Sort by ascending priority, keeping DNS order among equal priorities,
/// and drop exact duplicates.
pub(crate) fn order_records(mut records: Vec<MxRecord>) -> Vec<MxRecord> {
    records.sort_by_key(|record| record.priority);
    let mut seen = Vec::with_capacity(records.len());
    records.retain(|record| {
        if seen.contains(record) {
            false
        } else {
            seen.push(record.clone());
            true
        }
    });
    records
}
