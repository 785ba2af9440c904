//! Connection lifecycle management.
//!
//! The pool is generic over these two traits so that its acquisition,
//! replacement, and shutdown behavior can be exercised without a live
//! directory server. The production implementations live in [`crate::conn`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Establishes new connections for the pool.
///
/// The connector encodes the whole construction recipe: dial, optional
/// transport-security upgrade, optional operation time limit, optional
/// authenticated bind. The pool invokes it eagerly at construction and
/// lazily whenever a checked-out slot needs a replacement connection.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Conn: ConnectionLifecycle;

    /// Establish one ready-to-use connection.
    async fn connect(&self) -> Result<Self::Conn>;
}

/// Operations the pool needs from a pooled connection.
#[async_trait]
pub trait ConnectionLifecycle: Send {
    /// Liveness probe, checked when the connection is handed out.
    ///
    /// A connection reporting `true` is never returned to a caller; the
    /// pool replaces it in place.
    fn is_closing(&mut self) -> bool;

    /// Apply a time limit to operations issued through this handle.
    fn set_op_timeout(&mut self, timeout: Duration);

    /// Close the connection. Best-effort: errors are swallowed.
    async fn close(&mut self);
}
