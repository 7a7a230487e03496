// Session controller - drives the publish and subscribe state machines

use crate::codec::MessageCodec;
use crate::transport::{
    MessageTransport, RoleSignal, SessionCallback, SignalReceiver, SignalSender, TransportHandle,
};
use crate::{
    DiscoveryConfig, DiscoveryListener, Message, NearbyError, Payload, PeerRegistry, Result, Role,
    SessionSnapshot, SessionStatus, Strategy, TransportError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Notify, RwLock};
use tracing::{debug, info, warn};

/// Default number of events buffered for observers before the oldest are
/// dropped for lagging receivers
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Notifications pushed to observers of the session manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A nearby peer's payload appeared
    PeerAppeared { payload: Payload },
    /// A previously discovered payload is no longer nearby
    PeerVanished { payload: Payload },
    /// A session reached its TTL and was deactivated by the transport
    Expired { role: Role },
    /// A start request was rejected by the transport
    StartFailed { role: Role, error: TransportError },
}

/// Mutable state for one role. Each role has its own lock; no state is
/// shared across role boundaries.
#[derive(Debug)]
struct RoleSession {
    status: SessionStatus,
    started_at: Option<DateTime<Utc>>,
    /// Incremented on every start attempt. Transport signals carrying an
    /// older generation are stale and discarded.
    generation: u64,
    handle: Option<TransportHandle>,
    message: Option<Message>,
    listener: Option<Arc<DiscoveryListener>>,
}

impl RoleSession {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            started_at: None,
            generation: 0,
            handle: None,
            message: None,
            listener: None,
        }
    }

    /// Drop all per-session state, leaving the role idle
    fn reset(&mut self) {
        self.status = SessionStatus::Idle;
        self.started_at = None;
        self.handle = None;
        self.message = None;
        self.listener = None;
    }
}

/// Owns the publish and subscribe sessions and drives each through its
/// state machine: Idle -> Starting -> Active -> (Expiring | Stopping) -> Idle.
/// Expiry is transport-driven; the controller runs no timer of its own.
pub struct SessionController {
    transport: Arc<dyn MessageTransport>,
    strategy: Strategy,
    registry: Arc<PeerRegistry>,
    publish: Arc<RwLock<RoleSession>>,
    subscribe: Arc<RwLock<RoleSession>>,
    publish_tx: SignalSender,
    subscribe_tx: SignalSender,
    events: broadcast::Sender<SessionEvent>,
    shutdown_notify: Arc<Notify>,
    dispatch_handles: Vec<tokio::task::JoinHandle<()>>,
}

impl SessionController {
    /// Create a controller and start its per-role dispatch loops
    pub fn new(transport: Arc<dyn MessageTransport>, strategy: Strategy) -> Self {
        Self::build(transport, strategy, EVENT_CHANNEL_CAPACITY)
    }

    /// Create a controller from a discovery configuration
    pub fn with_config(
        transport: Arc<dyn MessageTransport>,
        config: &DiscoveryConfig,
    ) -> Result<Self> {
        Ok(Self::build(
            transport,
            config.strategy()?,
            config.event_capacity,
        ))
    }

    fn build(
        transport: Arc<dyn MessageTransport>,
        strategy: Strategy,
        event_capacity: usize,
    ) -> Self {
        let (events, _rx) = broadcast::channel(event_capacity);
        let registry = Arc::new(PeerRegistry::new());
        let publish = Arc::new(RwLock::new(RoleSession::new()));
        let subscribe = Arc::new(RwLock::new(RoleSession::new()));
        let shutdown_notify = Arc::new(Notify::new());

        let (publish_tx, publish_rx) = mpsc::unbounded_channel();
        let (subscribe_tx, subscribe_rx) = mpsc::unbounded_channel();

        let dispatch_handles = vec![
            spawn_dispatch_loop(
                Role::Publish,
                publish_rx,
                Arc::clone(&publish),
                Arc::clone(&registry),
                events.clone(),
                Arc::clone(&shutdown_notify),
            ),
            spawn_dispatch_loop(
                Role::Subscribe,
                subscribe_rx,
                Arc::clone(&subscribe),
                Arc::clone(&registry),
                events.clone(),
                Arc::clone(&shutdown_notify),
            ),
        ];

        Self {
            transport,
            strategy,
            registry,
            publish,
            subscribe,
            publish_tx,
            subscribe_tx,
            events,
            shutdown_notify,
            dispatch_handles,
        }
    }

    /// Begin announcing the given payload to nearby peers
    pub async fn start_publish(&self, payload: &[u8]) -> Result<()> {
        let message = MessageCodec::encode(payload)?;

        let mut session = self.publish.write().await;
        if matches!(
            session.status,
            SessionStatus::Starting | SessionStatus::Active
        ) {
            return Err(NearbyError::AlreadyActive(Role::Publish));
        }

        info!("Publishing");
        session.generation += 1;
        session.status = SessionStatus::Starting;
        session.started_at = Some(Utc::now());
        let callback =
            SessionCallback::new(Role::Publish, session.generation, self.publish_tx.clone());

        match self
            .transport
            .start_publish(message.clone(), self.strategy, callback)
            .await
        {
            Ok(handle) => {
                session.status = SessionStatus::Active;
                session.handle = Some(handle);
                session.message = Some(message);
                Ok(())
            }
            Err(error) => {
                warn!(
                    error = %error,
                    guidance = error.guidance(),
                    "Publish start rejected by transport"
                );
                session.reset();
                emit(
                    &self.events,
                    SessionEvent::StartFailed {
                        role: Role::Publish,
                        error: error.clone(),
                    },
                );
                Err(NearbyError::Transport(error))
            }
        }
    }

    /// Stop announcing. Safe to call from any state; stopping an idle role
    /// is a no-op.
    pub async fn stop_publish(&self) {
        let mut session = self.publish.write().await;
        if session.status == SessionStatus::Idle {
            debug!("No active publish session to stop");
            return;
        }

        info!("Unpublishing");
        session.status = SessionStatus::Stopping;
        if let Some(handle) = session.handle.take() {
            self.transport.stop(handle).await;
        }
        session.reset();
    }

    /// Begin listening for messages announced by nearby peers. Restarting a
    /// subscription clears any previously discovered payloads.
    pub async fn start_subscribe(&self) -> Result<()> {
        let mut session = self.subscribe.write().await;
        if matches!(
            session.status,
            SessionStatus::Starting | SessionStatus::Active
        ) {
            return Err(NearbyError::AlreadyActive(Role::Subscribe));
        }

        info!("Subscribing");
        self.registry.clear().await;
        session.generation += 1;
        session.status = SessionStatus::Starting;
        session.started_at = Some(Utc::now());
        let listener = Arc::new(DiscoveryListener::new(
            session.generation,
            self.subscribe_tx.clone(),
        ));
        let callback =
            SessionCallback::new(Role::Subscribe, session.generation, self.subscribe_tx.clone());

        match self
            .transport
            .start_subscribe(Arc::clone(&listener), self.strategy, callback)
            .await
        {
            Ok(handle) => {
                session.status = SessionStatus::Active;
                session.handle = Some(handle);
                session.listener = Some(listener);
                Ok(())
            }
            Err(error) => {
                warn!(
                    error = %error,
                    guidance = error.guidance(),
                    "Subscribe start rejected by transport"
                );
                session.reset();
                emit(
                    &self.events,
                    SessionEvent::StartFailed {
                        role: Role::Subscribe,
                        error: error.clone(),
                    },
                );
                Err(NearbyError::Transport(error))
            }
        }
    }

    /// Stop listening. Safe to call from any state; stopping an idle role
    /// is a no-op. Discovered payloads are kept until the next subscribe.
    pub async fn stop_subscribe(&self) {
        let mut session = self.subscribe.write().await;
        if session.status == SessionStatus::Idle {
            debug!("No active subscribe session to stop");
            return;
        }

        info!("Unsubscribing");
        session.status = SessionStatus::Stopping;
        // Revoke before the transport stop call so late found/lost callbacks
        // are recognized as stale.
        if let Some(listener) = session.listener.as_ref() {
            listener.revoke();
        }
        if let Some(handle) = session.handle.take() {
            self.transport.stop(handle).await;
        }
        session.reset();
    }

    /// Subscribe to session notifications. Each call returns a fresh
    /// receiver starting at the current position of the stream.
    pub fn observe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Snapshot of currently discovered payloads, in discovery order
    pub async fn current_peers(&self) -> Vec<Payload> {
        self.registry.snapshot().await
    }

    /// Current status of a role's state machine
    pub async fn status(&self, role: Role) -> SessionStatus {
        self.role_session(role).read().await.status
    }

    /// Clone-out view of a role session
    pub async fn session(&self, role: Role) -> SessionSnapshot {
        let session = self.role_session(role).read().await;
        SessionSnapshot {
            role,
            status: session.status,
            started_at: session.started_at,
        }
    }

    /// The message currently being announced, if the publish role is active
    pub async fn published_message(&self) -> Option<Message> {
        self.publish.read().await.message.clone()
    }

    /// Stop the background dispatch loops
    pub fn shutdown(&mut self) {
        self.shutdown_notify.notify_waiters();
        for handle in self.dispatch_handles.drain(..) {
            handle.abort();
        }
    }

    fn role_session(&self, role: Role) -> &Arc<RwLock<RoleSession>> {
        match role {
            Role::Publish => &self.publish,
            Role::Subscribe => &self.subscribe,
        }
    }
}

fn spawn_dispatch_loop(
    role: Role,
    mut rx: SignalReceiver,
    session: Arc<RwLock<RoleSession>>,
    registry: Arc<PeerRegistry>,
    events: broadcast::Sender<SessionEvent>,
    shutdown: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                signal = rx.recv() => {
                    match signal {
                        Some(signal) => {
                            dispatch_signal(role, signal, &session, &registry, &events).await;
                        }
                        None => break,
                    }
                }
                _ = shutdown.notified() => {
                    debug!("{} dispatch loop received shutdown signal", role);
                    break;
                }
            }
        }
        debug!("{} dispatch loop terminated", role);
    })
}

async fn dispatch_signal(
    role: Role,
    signal: RoleSignal,
    session: &RwLock<RoleSession>,
    registry: &PeerRegistry,
    events: &broadcast::Sender<SessionEvent>,
) {
    match signal {
        RoleSignal::Found {
            generation,
            message,
        } => {
            // The read guard is held across the registry update so a
            // concurrent stop is ordered strictly after it.
            let guard = session.read().await;
            if guard.generation != generation || guard.status != SessionStatus::Active {
                debug!("Discarding stale found callback for {} session", role);
                return;
            }
            let payload = MessageCodec::decode(&message);
            if registry.add(payload.clone()).await {
                info!("Discovered nearby payload ({} bytes)", payload.len());
                emit(events, SessionEvent::PeerAppeared { payload });
            }
        }
        RoleSignal::Lost {
            generation,
            message,
        } => {
            let guard = session.read().await;
            if guard.generation != generation || guard.status != SessionStatus::Active {
                debug!("Discarding stale lost callback for {} session", role);
                return;
            }
            let payload = MessageCodec::decode(&message);
            if registry.remove(&payload).await {
                info!("Nearby payload no longer detectable ({} bytes)", payload.len());
                emit(events, SessionEvent::PeerVanished { payload });
            }
        }
        RoleSignal::Expired { generation } => {
            let mut guard = session.write().await;
            if guard.generation != generation || guard.status != SessionStatus::Active {
                debug!("Discarding stale expiry signal for {} session", role);
                return;
            }
            guard.status = SessionStatus::Expiring;
            info!("{} session expired after TTL", role);
            if role == Role::Subscribe {
                registry.clear().await;
            }
            guard.reset();
            emit(events, SessionEvent::Expired { role });
        }
        RoleSignal::StartFailed { generation, error } => {
            let mut guard = session.write().await;
            if guard.generation != generation
                || !matches!(
                    guard.status,
                    SessionStatus::Starting | SessionStatus::Active
                )
            {
                debug!("Discarding stale start failure for {} session", role);
                return;
            }
            warn!(
                error = %error,
                guidance = error.guidance(),
                "{} start failed",
                role
            );
            guard.reset();
            emit(
                events,
                SessionEvent::StartFailed { role, error },
            );
        }
    }
}

fn emit(events: &broadcast::Sender<SessionEvent>, event: SessionEvent) {
    if events.send(event).is_err() {
        debug!("No observers registered, dropping event");
    }
}
