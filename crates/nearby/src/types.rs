use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque byte content carried inside a message envelope, the unit of
/// identity for peer discovery
pub type Payload = Vec<u8>;

/// A message announced to (or discovered from) nearby peers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    content: Vec<u8>,
}

impl Message {
    /// Create a message wrapping the given content
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// The raw content bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Session role for publish/subscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Publish,
    Subscribe,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Publish => write!(f, "Publish"),
            Role::Subscribe => write!(f, "Subscribe"),
        }
    }
}

/// Status of a role's session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Starting,
    Active,
    Expiring,
    Stopping,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Idle"),
            SessionStatus::Starting => write!(f, "Starting"),
            SessionStatus::Active => write!(f, "Active"),
            SessionStatus::Expiring => write!(f, "Expiring"),
            SessionStatus::Stopping => write!(f, "Stopping"),
        }
    }
}

/// Clone-out view of a role session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub role: Role,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
}
