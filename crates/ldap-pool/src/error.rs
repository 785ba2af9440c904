//! Pool error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to acquire a connection within the timeout.
    #[error("connection acquisition timeout after {0:?}")]
    AcquisitionTimeout(Duration),

    /// Pool is closed.
    #[error("pool is closed")]
    PoolClosed,

    /// Connection creation failed while dialing, upgrading, or binding.
    #[error("failed to create connection: {0}")]
    ConnectionCreation(String),

    /// Pool configuration error.
    #[error("pool configuration error: {0}")]
    Configuration(String),

    /// Error reported by a forwarded directory operation, unchanged.
    #[error(transparent)]
    Ldap(#[from] ldap3::LdapError),
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
