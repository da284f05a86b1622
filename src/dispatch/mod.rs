pub mod message;

pub use message::{CommandMessage, MAX_MESSAGE_LEN, OS_MAXSTR};

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{ActiveResponse, AlertEvent, Disposition, Locality, ResponsePolicy, SuppressReason};
use crate::observability::MetricsRegistry;
use crate::queue::{ExecutionQueue, TransportError};

/// Errors that can occur while delivering a response.
///
/// Neither is fatal: the caller logs and moves on to the next alert.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("error communicating with local execution queue: {0}")]
    LocalQueueFailure(#[source] TransportError),

    #[error("error communicating with forward queue: {0}")]
    ForwardQueueFailure(#[source] TransportError),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::LocalQueueFailure(_) => "LOCAL_QUEUE_FAILURE",
            DispatchError::ForwardQueueFailure(_) => "FORWARD_QUEUE_FAILURE",
        }
    }
}

/// Returns true if the response must run on this node.
///
/// A remote-agent response still runs here when the event was not relayed.
#[inline]
pub fn is_local_execution(response: &ActiveResponse, event: &AlertEvent) -> bool {
    match response.locality {
        Locality::ServerOnly => true,
        Locality::RemoteAgent => !event.is_relayed(),
        Locality::SpecificAgent | Locality::AllAgents => false,
    }
}

/// Decide what to do with one alert and perform at most one queue write.
pub fn dispatch(
    event: &AlertEvent,
    response: &ActiveResponse,
    policy: &ResponsePolicy,
    local: &dyn ExecutionQueue,
    forward: &dyn ExecutionQueue,
) -> Result<Disposition, DispatchError> {
    run(event, response, policy, local, forward, None)
}

fn run(
    event: &AlertEvent,
    response: &ActiveResponse,
    policy: &ResponsePolicy,
    local: &dyn ExecutionQueue,
    forward: &dyn ExecutionQueue,
    metrics: Option<&MetricsRegistry>,
) -> Result<Disposition, DispatchError> {
    let ip = event.source_ip();

    // Ignore list matches the raw address, port included
    if let Some(entry) = policy.ignored_entry(&event.source_address) {
        debug!(
            response = %response.name,
            srcip = %event.source_address,
            entry = entry,
            "Source address ignored"
        );
        return Ok(Disposition::Suppressed(SuppressReason::Ignored));
    }

    if is_local_execution(response, event) {
        if !policy.local_ar {
            debug!(response = %response.name, "Local active response disabled");
            return Ok(Disposition::Suppressed(SuppressReason::LocalDisabled));
        }

        let msg = message::local_message(response, event, ip);
        note_truncation(&msg, local, metrics);

        if let Err(e) = local.send(msg.as_str()) {
            error!(queue = local.name(), error = %e, "Error communicating with execd");
            return Err(DispatchError::LocalQueueFailure(e));
        }

        info!(
            event_id = %event.event_id.0,
            response = %response.name,
            ip = ip,
            "Active response sent to local executor"
        );
        Ok(Disposition::SentLocal)
    } else {
        if !policy.remote_ar {
            debug!(response = %response.name, "Remote active response disabled");
            return Ok(Disposition::Suppressed(SuppressReason::RemoteDisabled));
        }

        let msg = message::forward_message(response, event, ip);
        note_truncation(&msg, forward, metrics);

        if let Err(e) = forward.send(msg.as_str()) {
            error!(queue = forward.name(), error = %e, "Error communicating with arq");
            return Err(DispatchError::ForwardQueueFailure(e));
        }

        info!(
            event_id = %event.event_id.0,
            response = %response.name,
            location = %event.source_location,
            agent_id = %response.agent_id,
            ip = ip,
            "Active response forwarded"
        );
        Ok(Disposition::SentForward)
    }
}

fn note_truncation(msg: &CommandMessage, queue: &dyn ExecutionQueue, metrics: Option<&MetricsRegistry>) {
    if !msg.is_truncated() {
        return;
    }

    warn!(
        queue = queue.name(),
        max_len = MAX_MESSAGE_LEN,
        "Active response message truncated"
    );
    if let Some(metrics) = metrics {
        metrics.record_truncation();
    }
}

/// Dispatcher bound to the daemon's queues, recording every outcome.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    local: Arc<dyn ExecutionQueue>,
    forward: Arc<dyn ExecutionQueue>,
    metrics: Arc<MetricsRegistry>,
}

impl Dispatcher {
    pub fn new(
        local: Arc<dyn ExecutionQueue>,
        forward: Arc<dyn ExecutionQueue>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Dispatcher {
            local,
            forward,
            metrics,
        }
    }

    /// Dispatch against the given policy snapshot.
    pub fn dispatch(
        &self,
        event: &AlertEvent,
        response: &ActiveResponse,
        policy: &ResponsePolicy,
    ) -> Result<Disposition, DispatchError> {
        let result = run(
            event,
            response,
            policy,
            self.local.as_ref(),
            self.forward.as_ref(),
            Some(&self.metrics),
        );
        self.metrics.record_dispatch(&result);
        result
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }
}
