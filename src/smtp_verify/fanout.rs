use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use super::probe::{ProbeJob, Prober};
use super::transport::Connector;
use super::types::HostVerdict;
use crate::mx::MxRecord;

/// Probe every host concurrently and return the first classified verdict,
/// whichever host produced it.
///
/// Hosts that fail without a verdict send nothing. `None` means no host
/// produced one. Probes still running when a winner arrives keep running
/// detached; their results are dropped with the closed channel.
pub async fn first_verdict<C: Connector>(
    prober: &Arc<Prober<C>>,
    hosts: &[MxRecord],
    job: Arc<ProbeJob>,
) -> Option<HostVerdict> {
    let (tx, mut rx) = mpsc::channel::<HostVerdict>(1);

    for record in hosts {
        let tx = tx.clone();
        let prober = Arc::clone(prober);
        let job = Arc::clone(&job);
        let host = record.host.clone();
        tokio::spawn(async move {
            match prober.probe(&host, &job).await {
                Ok(verdict) => {
                    if tx.send(verdict).await.is_err() {
                        debug!(host = %host, "verdict arrived after the race was decided");
                    }
                }
                Err(err) => debug!(host = %host, error = %err, "host produced no verdict"),
            }
        });
    }
    drop(tx);

    rx.recv().await
}
