use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::error::ProbeError;
use super::handshake::{Action, Handshake};
use super::options::RetryPolicy;
use super::policy::PolicyMatcher;
use super::session::SmtpStream;
use super::transport::Connector;
use super::types::HostVerdict;

/// Everything a probe needs to know about one address check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeJob {
    pub recipient: String,
    pub sender: String,
    pub helo: String,
    /// Connection-lifetime deadline of a single attempt.
    pub timeout: Duration,
}

/// Runs SMTP probes against individual hosts.
///
/// Holds the process-wide probe limiter: every attempt, from any address
/// and any host, needs one of its permits while its connection is open.
pub struct Prober<C> {
    connector: C,
    permits: Semaphore,
    policy: PolicyMatcher,
    retry: RetryPolicy,
    port: u16,
}

impl<C: Connector> Prober<C> {
    pub fn new(
        connector: C,
        max_concurrent: usize,
        policy: PolicyMatcher,
        retry: RetryPolicy,
        port: u16,
    ) -> Self {
        Self {
            connector,
            permits: Semaphore::new(max_concurrent.clamp(1, Semaphore::MAX_PERMITS)),
            policy,
            retry,
            port,
        }
    }

    /// Probe `host`, retrying transient failures with backoff.
    ///
    /// `Ok` carries a classified verdict. `Err` means the host produced no
    /// usable answer: transport failure, policy block, or an exhausted
    /// retry budget.
    pub async fn probe(&self, host: &str, job: &ProbeJob) -> Result<HostVerdict, ProbeError> {
        let max_attempts = self.retry.attempts();
        let mut attempt = 0;
        loop {
            let permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ProbeError::LimiterClosed)?;
            let result = self.attempt(host, job).await;
            drop(permit);

            match result {
                Ok(mut verdict) => {
                    verdict.attempts = attempt + 1;
                    info!(
                        host,
                        recipient = %job.recipient,
                        outcome = %verdict.outcome,
                        code = verdict.reply.code,
                        "probe concluded"
                    );
                    return Ok(verdict);
                }
                Err(err) if err.is_retryable() => {
                    if attempt + 1 >= max_attempts {
                        warn!(host, attempts = max_attempts, error = %err, "retry budget exhausted");
                        return Err(ProbeError::RetriesExhausted {
                            host: host.to_string(),
                            attempts: max_attempts,
                            last: Box::new(err),
                        });
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(host, attempt = attempt + 1, ?delay, error = %err, "transient failure, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(host, error = %err, "probe failed");
                    return Err(err);
                }
            }
        }
    }

    /// One connection under one deadline. The stream is dropped on every
    /// path out of here, including the deadline firing mid-read.
    async fn attempt(&self, host: &str, job: &ProbeJob) -> Result<HostVerdict, ProbeError> {
        match tokio::time::timeout(job.timeout, self.drive(host, job)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                host: host.to_string(),
                after: job.timeout,
            }),
        }
    }

    async fn drive(&self, host: &str, job: &ProbeJob) -> Result<HostVerdict, ProbeError> {
        let mut handshake = Handshake::new(&job.helo, &job.sender, &job.recipient, &self.policy);
        debug!(host, port = self.port, "connecting");
        let stream = self
            .connector
            .connect(host, self.port)
            .await
            .map_err(|err| ProbeError::connect(host, err))?;
        let mut stream = SmtpStream::new(stream);
        handshake.connected();

        loop {
            let reply = match stream.read_reply().await {
                Ok(reply) => reply,
                Err(err) => {
                    debug!(host, step = ?handshake.step(), error = %err, "read failed");
                    return Err(err);
                }
            };
            debug!(host, step = ?handshake.step(), code = reply.code, "reply");

            match handshake.on_reply(&reply) {
                Action::Send(command) => {
                    debug!(host, %command, "sending");
                    stream.send_command(&command).await?;
                }
                Action::Conclude(outcome) => {
                    stream.close().await;
                    handshake.finish();
                    return Ok(HostVerdict {
                        host: host.to_string(),
                        outcome,
                        reply,
                        attempts: 1,
                    });
                }
                Action::Retry => {
                    stream.close().await;
                    handshake.finish();
                    return Err(ProbeError::Transient {
                        host: host.to_string(),
                        reply,
                    });
                }
                Action::Blocked => {
                    stream.close().await;
                    handshake.finish();
                    warn!(host, code = reply.code, message = %reply.message, "policy block");
                    return Err(ProbeError::PolicyBlocked {
                        host: host.to_string(),
                        reply,
                    });
                }
            }
        }
    }
}
