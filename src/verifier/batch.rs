use std::time::Duration;

use tracing::{debug, error};

use super::{Verifier, VerificationResult};
use crate::mx::LookupMx;
use crate::smtp_verify::Connector;

impl<R: LookupMx, C: Connector> Verifier<R, C> {
    /// Check many addresses, at most `batch_concurrency` at a time.
    ///
    /// Returns exactly one result per input, in input order. A pipeline that
    /// dies is reported as undetermined instead of failing the batch.
    pub async fn check_multiple_emails<I, S>(
        &self,
        emails: I,
        timeout: Option<Duration>,
        sender: Option<&str>,
    ) -> Vec<VerificationResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sender = sender.map(str::to_owned);
        let handles: Vec<_> = emails
            .into_iter()
            .map(|email| {
                let email: String = email.into();
                let this = self.clone();
                let sender = sender.clone();
                let task_email = email.clone();
                let handle = tokio::spawn(async move {
                    let Ok(_permit) = this.inner.batch_permits.acquire().await else {
                        return VerificationResult::pipeline_failed(task_email);
                    };
                    this.check_email_existence(&task_email, timeout, sender.as_deref())
                        .await
                });
                (email, handle)
            })
            .collect();

        debug!(count = handles.len(), "batch scheduled");
        let mut results = Vec::with_capacity(handles.len());
        for (email, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => {
                    error!(email = %email, error = %err, "verification task failed");
                    VerificationResult::pipeline_failed(email)
                }
            };
            results.push(result);
        }
        results
    }
}
