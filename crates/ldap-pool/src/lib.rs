//! # ldap-pool
//!
//! Bounded pool of long-lived LDAP connections, reused across sequential and
//! concurrent directory operations.
//!
//! Establishing an LDAP session is expensive: a network dial, optionally a
//! TLS handshake, optionally an authenticated bind. This crate pays that cost
//! once per pool slot and then hands the established sessions out under
//! concurrent demand with a bounded wait.
//!
//! ## Features
//!
//! - Fixed pool size, established eagerly at construction
//! - Blocking handoff with a configurable acquisition timeout
//! - Lazy liveness check on checkout; dead connections are replaced in place
//! - RAII leases: a checked-out connection returns to the pool on drop, on
//!   every exit path
//! - Directory operations forwarded through a single scoped-acquisition
//!   helper, with `ldap3` errors passed through unchanged
//!
//! ## Example
//!
//! ```rust,ignore
//! use ldap_pool::{LdapPool, PoolConfig};
//! use ldap3::Scope;
//!
//! let config = PoolConfig::new("ldap://localhost:389")
//!     .max_connections(5)
//!     .bind_credentials("cn=admin,dc=example,dc=org", "secret");
//!
//! let pool = LdapPool::connect(config).await?;
//!
//! let result = pool
//!     .search("dc=example,dc=org", Scope::Subtree, "(objectClass=person)", vec!["cn", "mail"])
//!     .await?;
//!
//! // All connections are drained and closed on shutdown.
//! pool.close().await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod conn;
pub mod error;
pub mod lifecycle;
pub mod pool;
pub mod stream;

mod ops;

// Re-export commonly used types
pub use config::{
    DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS, PoolConfig,
};
pub use conn::LdapConnector;
pub use error::{PoolError, Result};
pub use lifecycle::{ConnectionLifecycle, Connector};
pub use pool::{LdapPool, Pool, PoolStatus, PooledConnection};
pub use stream::EntryStream;

// The protocol collaborator; re-exported so callers can name request types
// (`Scope`, `Mod`, exops, controls) without a separate dependency.
pub use ldap3;
