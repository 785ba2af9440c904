//! Pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Default maximum number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default time to wait for an idle connection before giving up.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time limit for dialing the directory server.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the connection pool.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future minor versions without breaking changes. Construct it with
/// [`PoolConfig::new`] and the builder methods.
#[derive(Clone)]
#[non_exhaustive]
pub struct PoolConfig {
    /// URL of the directory server (`ldap://`, `ldaps://`, or `ldapi://`).
    pub url: String,

    /// Maximum number of connections held by the pool.
    ///
    /// Zero is normalized to [`DEFAULT_MAX_CONNECTIONS`] at construction.
    pub max_connections: u32,

    /// Time to wait for an idle connection before timing out.
    ///
    /// Zero is normalized to [`DEFAULT_ACQUIRE_TIMEOUT`] at construction.
    /// An explicit unbounded wait is available through
    /// [`Pool::get_timeout`](crate::pool::Pool::get_timeout) with
    /// `Duration::ZERO`.
    pub acquire_timeout: Duration,

    /// Time limit for dialing the directory server.
    pub connect_timeout: Duration,

    /// Optional time limit applied to directory operations issued through
    /// the pool's forwarding helpers.
    pub op_timeout: Option<Duration>,

    /// Upgrade plain connections with STARTTLS after dialing.
    pub starttls: bool,

    /// Skip certificate verification on TLS connections.
    pub no_tls_verify: bool,

    /// Distinguished name used for the authenticated bind after dialing.
    /// When absent, connections are established unauthenticated.
    pub bind_dn: Option<String>,

    /// Password for the authenticated bind.
    pub bind_password: Option<String>,
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("url", &self.url)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("op_timeout", &self.op_timeout)
            .field("starttls", &self.starttls)
            .field("no_tls_verify", &self.no_tls_verify)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .finish()
    }
}

impl PoolConfig {
    /// Create a configuration for the given server URL with default values.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            op_timeout: None,
            starttls: false,
            no_tls_verify: false,
            bind_dn: None,
            bind_password: None,
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub fn max_connections(mut self, count: u32) -> Self {
        self.max_connections = count;
        self
    }

    /// Set the connection acquisition timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the dial timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-operation time limit.
    #[must_use]
    pub fn op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    /// Enable or disable the STARTTLS upgrade after dialing.
    #[must_use]
    pub fn starttls(mut self, enabled: bool) -> Self {
        self.starttls = enabled;
        self
    }

    /// Enable or disable certificate verification on TLS connections.
    #[must_use]
    pub fn no_tls_verify(mut self, skip: bool) -> Self {
        self.no_tls_verify = skip;
        self
    }

    /// Set the bind DN and password used to authenticate each connection.
    #[must_use]
    pub fn bind_credentials(mut self, dn: impl Into<String>, password: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self.bind_password = Some(password.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.url.is_empty() {
            return Err(PoolError::Configuration(
                "server URL must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Replace zero capacity/timeout values with the documented defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_connections == 0 {
            self.max_connections = DEFAULT_MAX_CONNECTIONS;
        }
        if self.acquire_timeout.is_zero() {
            self.acquire_timeout = DEFAULT_ACQUIRE_TIMEOUT;
        }
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PoolConfig::new("ldap://localhost:389");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(config.op_timeout.is_none());
        assert!(!config.starttls);
        assert!(config.bind_dn.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = PoolConfig::new("ldaps://directory.example.org:636")
            .max_connections(25)
            .acquire_timeout(Duration::from_secs(3))
            .connect_timeout(Duration::from_secs(5))
            .op_timeout(Duration::from_secs(30))
            .starttls(false)
            .no_tls_verify(true)
            .bind_credentials("cn=admin,dc=example,dc=org", "hunter2");

        assert_eq!(config.max_connections, 25);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.op_timeout, Some(Duration::from_secs(30)));
        assert!(config.no_tls_verify);
        assert_eq!(config.bind_dn.as_deref(), Some("cn=admin,dc=example,dc=org"));
        assert_eq!(config.bind_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_zero_values_normalized() {
        let config = PoolConfig::new("ldap://localhost")
            .max_connections(0)
            .acquire_timeout(Duration::ZERO)
            .normalized();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[test]
    fn test_normalized_keeps_explicit_values() {
        let config = PoolConfig::new("ldap://localhost")
            .max_connections(3)
            .acquire_timeout(Duration::from_millis(250))
            .normalized();

        assert_eq!(config.max_connections, 3);
        assert_eq!(config.acquire_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_validation_rejects_empty_url() {
        let config = PoolConfig::new("");
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server URL must not be empty")
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config =
            PoolConfig::new("ldap://localhost").bind_credentials("cn=admin", "s3cret");
        let debug = format!("{config:?}");
        assert!(debug.contains("***REDACTED***"));
        assert!(!debug.contains("s3cret"));
    }
}
