//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → relay::Relay (lookup + forward)
//!     → response.rs (verbatim body or error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use response::{ErrorEnvelope, GENERIC_ERROR};
pub use server::{RelayServer, RELAY_PATH};
