use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::resolver::{normalize_domain, order_records};
use super::{LookupMx, MxError, MxRecord};

#[derive(Debug, Clone)]
enum CachedMx {
    Resolved(Arc<[MxRecord]>),
    Failed,
}

/// Resolver plus per-domain memo of the outcome.
///
/// Entries live as long as the cache: no TTL, no invalidation. Every failure
/// cause collapses into a single negative entry, so the reason is only
/// reported on the first lookup. Two tasks racing on the same uncached
/// domain may both query DNS; the last write wins.
pub struct MxCache<R> {
    resolver: R,
    entries: RwLock<HashMap<String, CachedMx>>,
}

impl<R: LookupMx> MxCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Exchangers for `domain`, sorted by ascending priority.
    pub async fn resolve(&self, domain: &str) -> Result<Arc<[MxRecord]>, MxError> {
        let key = normalize_domain(domain)?;

        if let Some(entry) = self.cached(&key) {
            debug!(domain = %key, "MX cache hit");
            return match entry {
                CachedMx::Resolved(records) => Ok(records),
                CachedMx::Failed => Err(MxError::CachedFailure { domain: key }),
            };
        }

        match self.resolver.lookup_mx(&key).await {
            Ok(records) => {
                let records: Arc<[MxRecord]> = order_records(records).into();
                if records.is_empty() {
                    self.store(key.clone(), CachedMx::Failed);
                    return Err(MxError::no_records(key));
                }
                debug!(domain = %key, count = records.len(), "MX records resolved");
                self.store(key, CachedMx::Resolved(Arc::clone(&records)));
                Ok(records)
            }
            Err(err) => {
                debug!(domain = %key, error = %err, "MX resolution failed; caching failure");
                self.store(key, CachedMx::Failed);
                Err(err)
            }
        }
    }

    /// Whether `domain` already has an entry, positive or negative.
    pub fn is_cached(&self, domain: &str) -> bool {
        normalize_domain(domain)
            .map(|key| self.cached(&key).is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, key: &str) -> Option<CachedMx> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: String, entry: CachedMx) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }
}
