use std::sync::atomic::{AtomicU64, Ordering};

use crate::dispatch::DispatchError;
use crate::domain::{Disposition, SuppressReason};

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total dispatch calls
    pub dispatches_total: AtomicU64,

    /// Messages delivered by queue
    pub sent_local: AtomicU64,
    pub sent_forward: AtomicU64,

    /// Suppressed responses by reason
    pub suppressed_ignored: AtomicU64,
    pub suppressed_local_disabled: AtomicU64,
    pub suppressed_remote_disabled: AtomicU64,

    /// Transport failures by queue
    pub local_queue_errors: AtomicU64,
    pub forward_queue_errors: AtomicU64,

    /// Messages cut to the record size
    pub truncations_total: AtomicU64,

    /// Policy reloads
    pub policy_reloads_total: AtomicU64,
    pub policy_reload_errors: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record the outcome of one dispatch.
    pub fn record_dispatch(&self, result: &Result<Disposition, DispatchError>) {
        self.dispatches_total.fetch_add(1, Ordering::Relaxed);

        let counter = match result {
            Ok(Disposition::SentLocal) => &self.sent_local,
            Ok(Disposition::SentForward) => &self.sent_forward,
            Ok(Disposition::Suppressed(SuppressReason::Ignored)) => &self.suppressed_ignored,
            Ok(Disposition::Suppressed(SuppressReason::LocalDisabled)) => {
                &self.suppressed_local_disabled
            }
            Ok(Disposition::Suppressed(SuppressReason::RemoteDisabled)) => {
                &self.suppressed_remote_disabled
            }
            Err(DispatchError::LocalQueueFailure(_)) => &self.local_queue_errors,
            Err(DispatchError::ForwardQueueFailure(_)) => &self.forward_queue_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a truncated message.
    pub fn record_truncation(&self) {
        self.truncations_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a policy reload.
    pub fn record_policy_reload(&self, success: bool) {
        self.policy_reloads_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.policy_reload_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP ardispatch_dispatches_total Total number of dispatch calls
# TYPE ardispatch_dispatches_total counter
ardispatch_dispatches_total {}

# HELP ardispatch_sent_total Active responses written to a queue
# TYPE ardispatch_sent_total counter
ardispatch_sent_total{{queue="local"}} {}
ardispatch_sent_total{{queue="forward"}} {}

# HELP ardispatch_suppressed_total Active responses not sent
# TYPE ardispatch_suppressed_total counter
ardispatch_suppressed_total{{reason="ignored"}} {}
ardispatch_suppressed_total{{reason="local_disabled"}} {}
ardispatch_suppressed_total{{reason="remote_disabled"}} {}

# HELP ardispatch_queue_errors_total Queue transport failures
# TYPE ardispatch_queue_errors_total counter
ardispatch_queue_errors_total{{queue="local"}} {}
ardispatch_queue_errors_total{{queue="forward"}} {}

# HELP ardispatch_truncations_total Messages truncated to the record size
# TYPE ardispatch_truncations_total counter
ardispatch_truncations_total {}

# HELP ardispatch_policy_reloads_total Policy reload operations
# TYPE ardispatch_policy_reloads_total counter
ardispatch_policy_reloads_total {}

# HELP ardispatch_policy_reload_errors_total Policy reload errors
# TYPE ardispatch_policy_reload_errors_total counter
ardispatch_policy_reload_errors_total {}
"#,
            self.dispatches_total.load(Ordering::Relaxed),
            self.sent_local.load(Ordering::Relaxed),
            self.sent_forward.load(Ordering::Relaxed),
            self.suppressed_ignored.load(Ordering::Relaxed),
            self.suppressed_local_disabled.load(Ordering::Relaxed),
            self.suppressed_remote_disabled.load(Ordering::Relaxed),
            self.local_queue_errors.load(Ordering::Relaxed),
            self.forward_queue_errors.load(Ordering::Relaxed),
            self.truncations_total.load(Ordering::Relaxed),
            self.policy_reloads_total.load(Ordering::Relaxed),
            self.policy_reload_errors.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::TransportError;

    #[test]
    fn test_record_dispatch() {
        let metrics = MetricsRegistry::new();

        metrics.record_dispatch(&Ok(Disposition::SentLocal));
        metrics.record_dispatch(&Ok(Disposition::SentForward));
        metrics.record_dispatch(&Ok(Disposition::Suppressed(SuppressReason::RemoteDisabled)));
        metrics.record_dispatch(&Err(DispatchError::ForwardQueueFailure(
            TransportError::Unavailable("arq".to_string()),
        )));

        assert_eq!(metrics.dispatches_total.load(Ordering::Relaxed), 4);
        assert_eq!(metrics.sent_local.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.sent_forward.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.suppressed_remote_disabled.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.forward_queue_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_policy_reload() {
        let metrics = MetricsRegistry::new();

        metrics.record_policy_reload(true);
        metrics.record_policy_reload(false);

        assert_eq!(metrics.policy_reloads_total.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.policy_reload_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = MetricsRegistry::new();
        metrics.record_dispatch(&Ok(Disposition::Suppressed(SuppressReason::Ignored)));

        let output = metrics.to_prometheus();

        assert!(output.contains("ardispatch_dispatches_total 1"));
        assert!(output.contains("ardispatch_suppressed_total{reason=\"ignored\"} 1"));
    }
}
