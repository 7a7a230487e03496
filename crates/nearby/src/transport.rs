// Transport contract - the proximity discovery collaborator consumed by the core

use crate::{DiscoveryListener, Message, Role, Strategy, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Opaque token identifying an active registration with the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportHandle(Uuid);

impl TransportHandle {
    /// Mint a fresh handle. Called by transport implementations on start.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransportHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Signals delivered from the transport boundary to a role's dispatch loop.
/// Each carries the session generation it belongs to; the dispatch loop
/// discards signals whose generation no longer matches the live session.
#[derive(Debug)]
pub(crate) enum RoleSignal {
    Found { generation: u64, message: Message },
    Lost { generation: u64, message: Message },
    Expired { generation: u64 },
    StartFailed { generation: u64, error: TransportError },
}

pub(crate) type SignalSender = mpsc::UnboundedSender<RoleSignal>;
pub(crate) type SignalReceiver = mpsc::UnboundedReceiver<RoleSignal>;

/// Per-session callback object handed to the transport on start. The
/// transport invokes it to report TTL expiry or a deferred start failure;
/// both hand off to the owning role's dispatch loop without blocking.
#[derive(Debug, Clone)]
pub struct SessionCallback {
    role: Role,
    generation: u64,
    tx: SignalSender,
}

impl SessionCallback {
    pub(crate) fn new(role: Role, generation: u64, tx: SignalSender) -> Self {
        Self {
            role,
            generation,
            tx,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The session's TTL elapsed and the transport deactivated it
    pub fn on_expired(&self) {
        debug!("{} session expiry reported by transport", self.role);
        let _ = self.tx.send(RoleSignal::Expired {
            generation: self.generation,
        });
    }

    /// A start request the transport initially accepted was later rejected
    pub fn on_start_failed(&self, error: TransportError) {
        debug!(
            "{} start failure reported by transport: {}",
            self.role, error
        );
        let _ = self.tx.send(RoleSignal::StartFailed {
            generation: self.generation,
            error,
        });
    }
}

/// Minimal contract the session core requires from the discovery engine.
/// Start calls return a handle on synchronous acceptance; later outcomes
/// arrive through the callback and listener objects.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Begin announcing a message to nearby peers under the given strategy
    async fn start_publish(
        &self,
        message: Message,
        strategy: Strategy,
        callback: SessionCallback,
    ) -> std::result::Result<TransportHandle, TransportError>;

    /// Begin listening for messages announced by nearby peers
    async fn start_subscribe(
        &self,
        listener: Arc<DiscoveryListener>,
        strategy: Strategy,
        callback: SessionCallback,
    ) -> std::result::Result<TransportHandle, TransportError>;

    /// Tear down an active registration. Best effort, never fails.
    async fn stop(&self, handle: TransportHandle);
}
