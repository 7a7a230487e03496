pub mod types;
pub mod strategy;
pub mod codec;
pub mod registry;
pub mod listener;
pub mod transport;
pub mod session;
pub mod error;
pub mod config;

pub use types::{Message, Payload, Role, SessionSnapshot, SessionStatus};
pub use strategy::{Strategy, DEFAULT_TTL_SECONDS};
pub use codec::{MessageCodec, MAX_PAYLOAD_BYTES};
pub use registry::PeerRegistry;
pub use listener::DiscoveryListener;
pub use transport::{MessageTransport, SessionCallback, TransportHandle};
pub use session::{SessionController, SessionEvent};
pub use error::{NearbyError, Result, TransportError};
pub use config::{DiscoveryConfig, DEFAULT_EVENT_CAPACITY};
