//! Audit event bus
//!
//! In-process fan-out of audit records over a tokio broadcast channel. The
//! bus is the production `AuditSink`; `spawn_audit_logger` turns the stream
//! into structured log lines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::audit::{AuditEntry, AuditSink};
use crate::shared::ShutdownSignal;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 1024;

/// Broadcasts audit records to every subscriber
#[derive(Clone)]
pub struct AuditEventBus {
    sender: broadcast::Sender<AuditEntry>,
    subscriber_count: Arc<AtomicUsize>,
}

impl AuditEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn publish(&self, entry: AuditEntry) {
        let action = entry.action.clone();
        match self.sender.send(entry) {
            Ok(count) => debug!(action = %action, subscribers = count, "Audit entry published"),
            // nobody listening: the record is dropped
            Err(_) => debug!(action = %action, "Audit entry published (no subscribers)"),
        }
    }

    pub fn subscribe(&self) -> AuditSubscriber {
        let receiver = self.sender.subscribe();
        let count = self.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("New audit subscriber, total: {}", count);

        AuditSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for AuditEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for AuditEventBus {
    fn record(&self, entry: AuditEntry) {
        self.publish(entry);
    }
}

pub struct AuditSubscriber {
    receiver: broadcast::Receiver<AuditEntry>,
    subscriber_count: Arc<AtomicUsize>,
}

impl AuditSubscriber {
    /// Next record; `None` once every bus handle is gone
    pub async fn recv(&mut self) -> Option<AuditEntry> {
        loop {
            match self.receiver.recv().await {
                Ok(entry) => return Some(entry),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("Audit subscriber lagged, {} entries missed", count);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for AuditSubscriber {
    fn drop(&mut self) {
        self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Log every audit record until shutdown.
pub fn spawn_audit_logger(bus: &AuditEventBus, shutdown: ShutdownSignal) -> JoinHandle<()> {
    let mut subscriber = bus.subscribe();

    tokio::spawn(async move {
        info!("Audit logger started");
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                entry = subscriber.recv() => match entry {
                    Some(entry) => info!(
                        target: "audit",
                        actor_id = %entry.actor_id,
                        actor_role = %entry.actor_role,
                        action = %entry.action,
                        entity = %entry.entity_kind,
                        entity_id = %entry.entity_id,
                        recorded_at = %entry.recorded_at,
                        "{}",
                        entry.detail
                    ),
                    None => break,
                },
            }
        }
        info!("Audit logger stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(action: &str) -> AuditEntry {
        AuditEntry::new("acc-1", "USER", action, "Reservation", 7, "test")
    }

    #[tokio::test]
    async fn subscribers_receive_recorded_entries() {
        let bus = AuditEventBus::new();
        let mut subscriber = bus.subscribe();

        bus.record(entry("CREATE_RENTAL"));

        let received = tokio::time::timeout(Duration::from_millis(100), subscriber.recv())
            .await
            .expect("Timeout")
            .expect("No entry");
        assert_eq!(received.action, "CREATE_RENTAL");
        assert_eq!(received.entity_id, "7");
    }

    #[test]
    fn recording_without_subscribers_is_harmless() {
        let bus = AuditEventBus::with_capacity(4);
        bus.record(entry("CANCEL_RENTAL"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn subscriber_count_tracks_drops() {
        let bus = AuditEventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
        drop(first);
        drop(second);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn logger_stops_on_shutdown() {
        let bus = AuditEventBus::new();
        let shutdown = ShutdownSignal::new();
        let handle = spawn_audit_logger(&bus, shutdown.clone());

        bus.record(entry("APPROVE_RENTAL"));
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("logger did not stop")
            .unwrap();
        assert_eq!(bus.subscriber_count(), 0);
    }
}
