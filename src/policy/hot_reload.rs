use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::domain::ResponsePolicy;
use crate::observability::MetricsRegistry;

use super::loader::{merge_ignore, PolicyError, PolicyLoader};

/// Watch the policy file and publish new snapshots.
pub struct PolicyWatcher {
    loader: PolicyLoader,
    check_interval: Duration,
    last_version: Option<String>,
    last_ignore: Vec<String>,
    metrics: Arc<MetricsRegistry>,
}

impl PolicyWatcher {
    /// Create a new policy watcher.
    pub fn new(loader: PolicyLoader, check_interval: Duration, metrics: Arc<MetricsRegistry>) -> Self {
        PolicyWatcher {
            loader,
            check_interval,
            last_version: None,
            last_ignore: Vec::new(),
            metrics,
        }
    }

    /// Start watching for policy changes.
    ///
    /// A policy that fails to load at startup is replaced by an empty one
    /// with both response channels disabled.
    pub fn start(mut self) -> (watch::Receiver<Arc<ResponsePolicy>>, tokio::task::JoinHandle<()>) {
        let initial = match self.loader.load_parts() {
            Ok((policy, extra)) => {
                self.last_version = Some(policy.version.clone());
                let policy = merge_ignore(policy, &extra);
                self.last_ignore = extra;
                info!(
                    version = %policy.version,
                    responses = policy.responses.len(),
                    ignored = policy.ignore.len(),
                    "Loaded initial response policy"
                );
                Arc::new(policy)
            }
            Err(e) => {
                error!(error = %e, "Failed to load initial response policy");
                Arc::new(ResponsePolicy::empty())
            }
        };

        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);

            loop {
                interval.tick().await;

                match self.check_for_updates(&tx) {
                    Ok(true) => info!("Response policy reloaded"),
                    Ok(false) => {}
                    Err(e) => {
                        self.metrics.record_policy_reload(false);
                        warn!(error = %e, "Error checking for policy updates");
                    }
                }
            }
        });

        (rx, handle)
    }

    /// Publish the policy if its version or the ignore file changed.
    fn check_for_updates(
        &mut self,
        tx: &watch::Sender<Arc<ResponsePolicy>>,
    ) -> Result<bool, PolicyError> {
        let (policy, extra) = self.loader.load_parts()?;

        let version_changed = self.last_version.as_ref() != Some(&policy.version);
        let ignore_changed = extra != self.last_ignore;
        if !version_changed && !ignore_changed {
            return Ok(false);
        }

        info!(
            previous = ?self.last_version,
            version = %policy.version,
            ignore_changed,
            "Response policy changed"
        );

        self.last_version = Some(policy.version.clone());
        let policy = merge_ignore(policy, &extra);
        self.last_ignore = extra;
        self.metrics.record_policy_reload(true);
        let _ = tx.send(Arc::new(policy));

        Ok(true)
    }
}
