//! DrishyaScan engine: REST client, live update channel and effect execution.
mod api;
mod config;
mod engine;
mod live;
mod session;
mod subscribers;
mod transport;
mod types;

pub use api::{ApiClient, LoginResponse, RecordSource, User};
pub use config::{ConfigError, EngineConfig, DEFAULT_API_URL, DEFAULT_WS_URL};
pub use engine::{EngineError, EngineHandle};
pub use live::LiveUpdateChannel;
pub use session::{InMemorySession, SessionProvider};
pub use subscribers::Subscription;
pub use transport::{Transport, TransportConnection, WebSocketTransport};
pub use types::{ApiError, EngineEvent, TransportError};
