//! Address-level pipeline: validate, resolve MX, race probes.
//!
//! [`Verifier`] is built once per process and cloned by handle. It owns the
//! MX cache and both concurrency pools, so every clone shares them.

mod batch;
mod error;
mod options;
mod types;

pub use error::VerifierError;
pub use options::VerifierOptions;
pub use types::{Reason, VerificationResult};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;

use crate::mx::{LookupMx, MxCache, MxError};
use crate::smtp_verify::{Connector, PolicyMatcher, ProbeJob, Prober, TcpConnector, first_verdict};
use crate::validator::AddressValidator;

pub struct Verifier<R = TokioAsyncResolver, C = TcpConnector> {
    inner: Arc<Inner<R, C>>,
}

struct Inner<R, C> {
    options: VerifierOptions,
    validator: AddressValidator,
    mx: MxCache<R>,
    prober: Arc<Prober<C>>,
    batch_permits: Semaphore,
}

impl<R, C> Clone for Verifier<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Verifier {
    /// System DNS configuration and plain TCP on the configured port.
    pub fn from_system_conf(options: VerifierOptions) -> Result<Self, VerifierError> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().map_err(MxError::resolver_init)?;
        Self::with_parts(options, resolver, TcpConnector)
    }
}

impl<R: LookupMx, C: Connector> Verifier<R, C> {
    pub fn with_parts(
        options: VerifierOptions,
        resolver: R,
        connector: C,
    ) -> Result<Self, VerifierError> {
        let policy = PolicyMatcher::new(&options.policy_patterns)
            .map_err(|source| VerifierError::PolicyPattern { source })?;
        let prober = Prober::new(
            connector,
            options.probe_concurrency,
            policy,
            options.retry.clone(),
            options.port,
        );
        let inner = Inner {
            validator: AddressValidator::new(options.max_email_len),
            mx: MxCache::new(resolver),
            prober: Arc::new(prober),
            batch_permits: Semaphore::new(
                options.batch_concurrency.clamp(1, Semaphore::MAX_PERMITS),
            ),
            options,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.inner.options
    }

    pub fn mx_cache(&self) -> &MxCache<R> {
        &self.inner.mx
    }

    /// Check one address. `timeout` defaults to the configured timeout and
    /// `sender` to the configured sender, then to `email` itself.
    ///
    /// Never fails: every outcome is expressed in the result.
    pub async fn check_email_existence(
        &self,
        email: &str,
        timeout: Option<Duration>,
        sender: Option<&str>,
    ) -> VerificationResult {
        let inner = &self.inner;

        let address = match inner.validator.validate(email) {
            Ok(address) => address,
            Err(err) => {
                debug!(email, error = %err, "rejected before lookup");
                return VerificationResult::malformed(email);
            }
        };

        let records = match inner.mx.resolve(address.domain()).await {
            Ok(records) => records,
            Err(err) => {
                debug!(email, error = %err, "no mail exchanger");
                return VerificationResult::no_mail_exchanger(email);
            }
        };
        let hosts = match inner.options.max_mx {
            Some(max) => &records[..records.len().min(max.max(1))],
            None => &records[..],
        };

        let sender = inner.options.envelope_sender(sender, address.as_str());
        let job = Arc::new(ProbeJob {
            recipient: address.as_str().to_string(),
            sender: sender.to_string(),
            helo: inner.options.helo_name(sender).to_string(),
            timeout: timeout.unwrap_or_else(|| inner.options.timeout()),
        });

        match first_verdict(&inner.prober, hosts, job).await {
            Some(verdict) => VerificationResult::from_verdict(email, verdict),
            None => {
                debug!(email, hosts = hosts.len(), "no host produced a verdict");
                VerificationResult::inconclusive(email)
            }
        }
    }
}
