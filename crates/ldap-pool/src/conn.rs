//! Production connector backed by `ldap3`.

use std::time::Duration;

use async_trait::async_trait;
use ldap3::result::LdapResult;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use tracing::{debug, warn};

use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::lifecycle::{ConnectionLifecycle, Connector};

/// Establishes LDAP connections according to a [`PoolConfig`].
///
/// Each connection is dialed by URL (with the configured dial timeout and
/// TLS settings), its driver task is spawned, the per-operation time limit
/// is applied when configured, and an authenticated simple bind is performed
/// when credentials are configured.
pub struct LdapConnector {
    config: PoolConfig,
}

impl LdapConnector {
    /// Create a connector for the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for LdapConnector {
    type Conn = Ldap;

    async fn connect(&self) -> Result<Ldap> {
        let config = &self.config;

        let mut settings = LdapConnSettings::new()
            .set_conn_timeout(config.connect_timeout)
            .set_starttls(config.starttls);
        if config.no_tls_verify {
            settings = settings.set_no_tls_verify(true);
        }

        debug!(url = %config.url, "dialing directory server");
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &config.url)
            .await
            .map_err(|e| PoolError::ConnectionCreation(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "connection driver terminated with error");
            }
        });

        if let Some(timeout) = config.op_timeout {
            ldap.with_timeout(timeout);
        }

        if let Some(bind_dn) = config.bind_dn.as_deref() {
            let password = config.bind_password.as_deref().unwrap_or("");
            match ldap
                .simple_bind(bind_dn, password)
                .await
                .and_then(LdapResult::success)
            {
                Ok(_) => debug!(bind_dn, "bind succeeded"),
                Err(e) => {
                    let _ = ldap.unbind().await;
                    return Err(PoolError::ConnectionCreation(e.to_string()));
                }
            }
        }

        Ok(ldap)
    }
}

#[async_trait]
impl ConnectionLifecycle for Ldap {
    fn is_closing(&mut self) -> bool {
        self.is_closed()
    }

    fn set_op_timeout(&mut self, timeout: Duration) {
        self.with_timeout(timeout);
    }

    async fn close(&mut self) {
        if let Err(e) = self.unbind().await {
            debug!(error = %e, "unbind failed while closing pooled connection");
        }
    }
}
