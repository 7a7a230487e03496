// Discovery listener - bridges transport found/lost callbacks into the core

use crate::transport::{RoleSignal, SignalSender};
use crate::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Callback sink the transport invokes when a nearby message appears or
/// vanishes. Callbacks never touch shared state on the transport's call
/// stack; they enqueue a signal for the subscribe dispatch loop and return.
#[derive(Debug)]
pub struct DiscoveryListener {
    generation: u64,
    revoked: AtomicBool,
    tx: SignalSender,
}

impl DiscoveryListener {
    pub(crate) fn new(generation: u64, tx: SignalSender) -> Self {
        Self {
            generation,
            revoked: AtomicBool::new(false),
            tx,
        }
    }

    /// Called when a new message is found nearby
    pub fn on_found(&self, message: Message) {
        if self.is_revoked() {
            debug!("Ignoring found callback on revoked listener");
            return;
        }
        let _ = self.tx.send(RoleSignal::Found {
            generation: self.generation,
            message,
        });
    }

    /// Called when a previously found message is no longer detectable nearby
    pub fn on_lost(&self, message: Message) {
        if self.is_revoked() {
            debug!("Ignoring lost callback on revoked listener");
            return;
        }
        let _ = self.tx.send(RoleSignal::Lost {
            generation: self.generation,
            message,
        });
    }

    /// Flag the listener stale. Set before the transport stop call so late
    /// callbacks from that session are discarded.
    pub(crate) fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_found_and_lost_are_handed_off() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = DiscoveryListener::new(7, tx);

        listener.on_found(Message::new(b"alpha".to_vec()));
        listener.on_lost(Message::new(b"alpha".to_vec()));

        match rx.recv().await.unwrap() {
            RoleSignal::Found {
                generation,
                message,
            } => {
                assert_eq!(generation, 7);
                assert_eq!(message.content(), b"alpha");
            }
            other => panic!("unexpected signal: {:?}", other),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            RoleSignal::Lost { generation: 7, .. }
        ));
    }

    #[tokio::test]
    async fn test_revoked_listener_drops_callbacks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = DiscoveryListener::new(1, tx);

        listener.revoke();
        assert!(listener.is_revoked());

        listener.on_found(Message::new(b"late".to_vec()));
        listener.on_lost(Message::new(b"late".to_vec()));

        assert!(rx.try_recv().is_err());
    }
}
