//! Network layer subsystem.
//!
//! Plain TCP listeners are bound directly by `main`; this module holds the
//! optional TLS termination for the listener.

pub mod tls;
