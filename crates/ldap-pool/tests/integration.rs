//! Live-server integration tests.
//!
//! These tests require a running LDAP server. They are ignored by default
//! and can be run with:
//!
//! ```bash
//! # Set connection details via environment variables
//! export LDAP_URL=ldap://localhost:389
//! export LDAP_BIND_DN="cn=admin,dc=example,dc=org"
//! export LDAP_BIND_PASSWORD=admin
//! export LDAP_BASE_DN="dc=example,dc=org"
//!
//! # Run integration tests
//! cargo test -p ldap-pool --test integration -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use ldap3::Scope;
use ldap_pool::{LdapPool, PoolConfig, PoolError};

/// Helper to get test configuration from environment variables.
fn get_test_config() -> Option<PoolConfig> {
    let url = std::env::var("LDAP_URL").ok()?;
    let mut config = PoolConfig::new(url);
    if let (Ok(dn), Ok(password)) = (
        std::env::var("LDAP_BIND_DN"),
        std::env::var("LDAP_BIND_PASSWORD"),
    ) {
        config = config.bind_credentials(dn, password);
    }
    Some(config)
}

fn base_dn() -> String {
    std::env::var("LDAP_BASE_DN").unwrap_or_else(|_| "dc=example,dc=org".into())
}

#[tokio::test]
#[ignore = "Requires an LDAP server"]
async fn test_pool_create_and_close() {
    let config = get_test_config().expect("LDAP server config required");

    let pool = LdapPool::connect(config.max_connections(4))
        .await
        .expect("Failed to create pool");

    assert!(!pool.is_closed());
    let status = pool.status();
    assert_eq!(status.capacity, 4);
    assert_eq!(status.idle, 4);
    assert_eq!(status.in_use, 0);

    pool.close().await;
    assert!(pool.is_closed());
}

#[tokio::test]
#[ignore = "Requires an LDAP server"]
async fn test_pool_search_root_dse() {
    let config = get_test_config().expect("LDAP server config required");

    let pool = LdapPool::connect(config.max_connections(2))
        .await
        .expect("Failed to create pool");

    let result = pool
        .search("", Scope::Base, "(objectClass=*)", vec!["namingContexts"])
        .await
        .expect("Search failed");

    let (entries, res) = result.success().expect("Root DSE search should succeed");
    assert_eq!(res.rc, 0);
    assert!(!entries.is_empty(), "Root DSE should be returned");

    pool.close().await;
}

#[tokio::test]
#[ignore = "Requires an LDAP server"]
async fn test_pool_concurrent_searches() {
    let config = get_test_config().expect("LDAP server config required");

    let pool = Arc::new(
        LdapPool::connect(config.max_connections(4))
            .await
            .expect("Failed to create pool"),
    );

    let success_count = Arc::new(AtomicU32::new(0));
    let mut handles = Vec::new();

    for _ in 0..16 {
        let pool = Arc::clone(&pool);
        let success_count = Arc::clone(&success_count);

        handles.push(tokio::spawn(async move {
            let result = pool
                .search("", Scope::Base, "(objectClass=*)", vec!["supportedLDAPVersion"])
                .await
                .expect("Search failed");

            if result.success().is_ok() {
                success_count.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    assert_eq!(success_count.load(Ordering::Relaxed), 16);
    assert_eq!(pool.status().idle, 4, "all connections should be back");

    pool.close().await;
}

#[tokio::test]
#[ignore = "Requires an LDAP server"]
async fn test_pool_streaming_search() {
    let config = get_test_config().expect("LDAP server config required");

    let pool = LdapPool::connect(config.max_connections(2))
        .await
        .expect("Failed to create pool");

    let mut stream = pool
        .streaming_search(&base_dn(), Scope::Subtree, "(objectClass=*)", vec!["cn".into()])
        .await;

    let mut count = 0usize;
    while let Some(_entry) = stream.next().await.expect("Stream entry failed") {
        count += 1;
    }
    let res = stream.finish().await.expect("Stream should conclude");
    assert_eq!(res.rc, 0);
    assert!(count > 0, "Subtree search should yield entries");

    assert_eq!(pool.status().idle, 2, "stream must release its connection");
    pool.close().await;
}

#[tokio::test]
#[ignore = "Requires an LDAP server"]
async fn test_pool_compare() {
    let config = get_test_config().expect("LDAP server config required");
    let bind_dn = std::env::var("LDAP_BIND_DN").expect("LDAP_BIND_DN required");

    let pool = LdapPool::connect(config.max_connections(1))
        .await
        .expect("Failed to create pool");

    // An entry is always equal to its own objectClass=top.
    let result = pool
        .compare(&bind_dn, "objectClass", "top")
        .await
        .expect("Compare failed");
    assert!(result.equal().expect("Compare should not error"));

    pool.close().await;
}

#[tokio::test]
#[ignore = "Requires an LDAP server"]
async fn test_pool_acquisition_timeout_under_exhaustion() {
    let config = get_test_config().expect("LDAP server config required");

    let pool = LdapPool::connect(
        config
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(100)),
    )
    .await
    .expect("Failed to create pool");

    let _held = pool.get().await.expect("Failed to get connection");

    let result = pool.search("", Scope::Base, "(objectClass=*)", vec!["*"]).await;
    assert!(
        matches!(result, Err(PoolError::AcquisitionTimeout(_))),
        "exhausted pool should surface the acquisition error"
    );
}
