//! Client-side session gateway for the Burger Mafia back office.
//!
//! The gateway owns the admin session token, attaches it to every
//! authenticated call, refreshes it once on a 401, and exposes typed
//! operations for products, blog posts, the homepage banner, contact leads,
//! franchise interests, and the public submission forms.

pub mod config;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod models;
pub mod resources;
pub mod session;
pub mod transport;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ErrorCode, FieldError, GatewayError};
pub use gateway::SessionGateway;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
