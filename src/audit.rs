//! Audit event capture and handoff
//!
//! One immutable [`AuditEvent`] is produced per request by the audit
//! middleware and handed to the [`AuditSink`]. The handoff is fire-and-forget:
//! a full queue or an unreachable sink drops the event with a local
//! diagnostic and never delays or fails the request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

const AUDIT_QUEUE_DEPTH: usize = 1024;

/// Write-once record spanning request start to response completion.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub method: String,
    pub path: String,
    pub client_ip: String,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Authenticated identity, when authentication succeeded.
    pub user_id: Option<Uuid>,
    pub request_id: Option<String>,
    pub status: u16,
    pub latency_ms: u64,
    /// Declared response size, when the response carries a Content-Length.
    pub response_bytes: Option<u64>,
}

/// Non-blocking handle for recording audit events.
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditSink {
    /// Hand an event to the background worker. Never blocks; a saturated
    /// queue drops the event with a diagnostic.
    pub fn record(&self, event: AuditEvent) {
        if let Err(err) = self.tx.try_send(event) {
            tracing::debug!(error = %err, "audit event dropped");
        }
    }
}

/// Spawn the background worker that drains the audit queue.
///
/// Events are always emitted as structured records on the `audit` target;
/// when `sink_url` is configured they are additionally forwarded to the
/// external audit service. Delivery failures are swallowed.
pub fn spawn_audit_worker(sink_url: Option<String>) -> AuditSink {
    let (tx, mut rx) = mpsc::channel::<AuditEvent>(AUDIT_QUEUE_DEPTH);

    tokio::spawn(async move {
        let client = sink_url.as_ref().map(|_| reqwest::Client::new());

        while let Some(event) = rx.recv().await {
            tracing::info!(
                target: "audit",
                method = %event.method,
                path = %event.path,
                client_ip = %event.client_ip,
                user_id = ?event.user_id,
                request_id = ?event.request_id,
                status = event.status,
                latency_ms = event.latency_ms,
                response_bytes = ?event.response_bytes,
                "request audited"
            );

            if let (Some(client), Some(url)) = (client.as_ref(), sink_url.as_ref()) {
                if let Err(err) = client.post(url).json(&event).send().await {
                    tracing::warn!(error = %err, "audit sink delivery failed");
                }
            }
        }
    });

    AuditSink { tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> AuditEvent {
        AuditEvent {
            method: "GET".to_string(),
            path: "/health".to_string(),
            client_ip: "127.0.0.1".to_string(),
            user_agent: None,
            timestamp: Utc::now(),
            user_id: None,
            request_id: Some("req-1".to_string()),
            status: 200,
            latency_ms: 3,
            response_bytes: Some(17),
        }
    }

    #[tokio::test]
    async fn test_record_is_non_blocking_when_queue_full() {
        // A sink whose worker never drains: fill the queue past capacity and
        // confirm record() returns instead of blocking the caller.
        let (tx, _rx) = mpsc::channel::<AuditEvent>(1);
        let sink = AuditSink { tx };

        sink.record(sample_event());
        sink.record(sample_event());
        sink.record(sample_event());
    }

    #[tokio::test]
    async fn test_worker_drains_events() {
        let sink = spawn_audit_worker(None);
        sink.record(sample_event());
        // Yield so the worker task gets a chance to drain.
        tokio::task::yield_now().await;
    }
}
