//! Connection pool implementation.
//!
//! The pool owns a fixed number of connection slots. A slot is either idle
//! (its connection sits in the idle queue) or checked out (its connection is
//! held by exactly one caller through a [`PooledConnection`] lease). The
//! semaphore carries one permit per free slot and is the only blocking
//! handoff point; releasing a lease never blocks.

use std::collections::VecDeque;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::conn::LdapConnector;
use crate::error::{PoolError, Result};
use crate::lifecycle::{ConnectionLifecycle, Connector};

/// A bounded pool of directory connections.
///
/// The pool establishes exactly `max_connections` connections at
/// construction and keeps that slot count for its whole lifetime:
/// connections found dead at checkout are replaced in place, never added or
/// removed from the count.
pub struct Pool<C: Connector> {
    inner: Arc<PoolInner<C>>,
}

/// Pool backed by the [`ldap3`] connector.
pub type LdapPool = Pool<LdapConnector>;

struct PoolInner<C: Connector> {
    config: PoolConfig,
    connector: C,

    /// Idle connections. A slot whose replacement dial failed leaves no
    /// entry here; the next checkout of that slot dials a fresh connection.
    idle: Mutex<VecDeque<C::Conn>>,

    /// One permit per free slot.
    slots: Semaphore,

    /// Whether the pool has been closed.
    closed: AtomicBool,
}

impl LdapPool {
    /// Create a pool of LDAP connections for the given configuration.
    ///
    /// Establishes `max_connections` connections eagerly; if any dial,
    /// TLS upgrade, or bind fails, the connections opened so far are closed
    /// and the error is returned.
    pub async fn connect(config: PoolConfig) -> Result<Self> {
        let connector = LdapConnector::new(config.clone());
        Self::with_connector(config, connector).await
    }
}

impl<C: Connector> Pool<C> {
    /// Create a pool that establishes connections through `connector`.
    ///
    /// A zero `max_connections` or `acquire_timeout` in the configuration is
    /// replaced by the documented default before any connection is dialed.
    pub async fn with_connector(config: PoolConfig, connector: C) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        let capacity = config.max_connections;

        let mut conns = VecDeque::with_capacity(capacity as usize);
        for slot in 0..capacity {
            match connector.connect().await {
                Ok(conn) => conns.push_back(conn),
                Err(e) => {
                    warn!(slot, error = %e, "closing partially built pool");
                    for mut conn in conns {
                        conn.close().await;
                    }
                    return Err(e);
                }
            }
        }

        info!(capacity, url = %config.url, "connection pool created");

        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                connector,
                idle: Mutex::new(conns),
                slots: Semaphore::new(capacity as usize),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Get a connection from the pool, waiting up to the configured
    /// acquisition timeout.
    ///
    /// The returned lease gives exclusive use of one connection and returns
    /// it to the pool when dropped, on every exit path.
    pub async fn get(&self) -> Result<PooledConnection<C>> {
        self.get_timeout(self.inner.config.acquire_timeout).await
    }

    /// Get a connection from the pool, waiting up to `timeout`.
    ///
    /// `Duration::ZERO` means no pool-applied deadline: the wait runs until
    /// a connection frees up or the caller drops the future.
    pub async fn get_timeout(&self, timeout: Duration) -> Result<PooledConnection<C>> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::PoolClosed);
        }

        let permit = if timeout.is_zero() {
            self.inner.slots.acquire().await
        } else {
            match tokio::time::timeout(timeout, self.inner.slots.acquire()).await {
                Ok(acquired) => acquired,
                Err(_) => {
                    debug!(?timeout, "connection acquisition timed out");
                    return Err(PoolError::AcquisitionTimeout(timeout));
                }
            }
        }
        .map_err(|_| PoolError::PoolClosed)?;

        // Health is checked lazily, only at checkout. A connection found
        // closing is closed and replaced in place with the same recipe used
        // at construction. The pop happens before any await so the queue
        // lock is never held across one.
        let popped = self.inner.idle.lock().pop_front();
        let reusable = match popped {
            Some(mut conn) => {
                if conn.is_closing() {
                    debug!("pooled connection is closing, replacing");
                    conn.close().await;
                    None
                } else {
                    Some(conn)
                }
            }
            None => None,
        };

        let conn = match reusable {
            Some(conn) => conn,
            None => match self.inner.connector.connect().await {
                Ok(fresh) => fresh,
                Err(e) => {
                    // The slot stays vacant; the permit goes back so the
                    // next checkout of the slot retries the dial.
                    drop(permit);
                    return Err(e);
                }
            },
        };

        permit.forget();
        Ok(PooledConnection {
            conn: Some(conn),
            inner: Arc::clone(&self.inner),
        })
    }

    /// Close the pool, draining and closing every connection.
    ///
    /// Blocks until all checked-out connections have been returned, then
    /// closes each connection best-effort: individual close errors do not
    /// prevent the remaining connections from being closed. A second call
    /// returns immediately. Must be awaited to completion.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("pool already closed");
            return;
        }

        let capacity = self.inner.config.max_connections;
        if let Ok(permit) = self.inner.slots.acquire_many(capacity).await {
            permit.forget();
        }

        let drained: Vec<C::Conn> = {
            let mut idle = self.inner.idle.lock();
            idle.drain(..).collect()
        };
        for mut conn in drained {
            conn.close().await;
        }

        info!("connection pool closed");
    }

    /// Check if the pool is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Get the pool configuration, as normalized at construction.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Get a point-in-time snapshot of the pool.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let capacity = self.inner.config.max_connections;
        let free = self.inner.slots.available_permits() as u32;
        PoolStatus {
            idle: self.inner.idle.lock().len() as u32,
            in_use: capacity.saturating_sub(free),
            capacity,
        }
    }
}

impl<C: Connector> Pool<C>
where
    C::Conn: Clone,
{
    /// Borrow a connection, run `op` on it, and release the connection on
    /// every exit path.
    ///
    /// This is the scoped-acquisition helper behind every forwarded
    /// directory operation, public so callers can run operations the pool
    /// does not forward (control-bearing searches, custom extended
    /// operations) under the same lease discipline:
    ///
    /// ```rust,ignore
    /// let entries = pool
    ///     .with_conn(|mut ldap| async move {
    ///         ldap.search(base, Scope::Subtree, filter, vec!["*"]).await
    ///     })
    ///     .await?;
    /// ```
    ///
    /// Errors produced by `op` are propagated unchanged; an acquisition
    /// failure surfaces as the acquisition error.
    pub async fn with_conn<T, E, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(C::Conn) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        PoolError: From<E>,
    {
        let lease = self.get().await?;
        let mut conn = (*lease).clone();
        if let Some(timeout) = self.inner.config.op_timeout {
            conn.set_op_timeout(timeout);
        }
        let out = op(conn).await;
        drop(lease);
        out.map_err(PoolError::from)
    }
}

/// A connection checked out from the pool.
///
/// Dereferences to the underlying connection. When dropped, the connection
/// is returned to the pool unconditionally; validation happens lazily at
/// the next checkout.
pub struct PooledConnection<C: Connector> {
    conn: Option<C::Conn>,
    inner: Arc<PoolInner<C>>,
}

impl<C: Connector> Deref for PooledConnection<C> {
    type Target = C::Conn;

    fn deref(&self) -> &C::Conn {
        match &self.conn {
            Some(conn) => conn,
            // Invariant: `conn` is Some from checkout until drop.
            None => unreachable!("pooled connection already released"),
        }
    }
}

impl<C: Connector> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C::Conn {
        match &mut self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection already released"),
        }
    }
}

impl<C: Connector> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.inner.idle.lock().push_back(conn);
            self.inner.slots.add_permits(1);
        }
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolStatus {
    /// Number of idle connections available.
    pub idle: u32,
    /// Number of connections currently checked out.
    pub in_use: u32,
    /// Fixed slot count of the pool.
    pub capacity: u32,
}

impl PoolStatus {
    /// Calculate the utilization percentage.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.in_use as f64 / self.capacity as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_utilization() {
        let status = PoolStatus {
            idle: 5,
            in_use: 5,
            capacity: 20,
        };
        assert!((status.utilization() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_utilization_empty_pool() {
        let status = PoolStatus {
            idle: 0,
            in_use: 0,
            capacity: 0,
        };
        assert!((status.utilization() - 0.0).abs() < f64::EPSILON);
    }
}
