//! Connection pooling example.
//!
//! This example creates a small pool against a directory server, runs
//! concurrent searches through it, and shuts it down.
//!
//! # Running
//!
//! ```bash
//! export LDAP_URL=ldap://localhost:389
//! export LDAP_BIND_DN="cn=admin,dc=example,dc=org"
//! export LDAP_BIND_PASSWORD=admin
//! export LDAP_BASE_DN="dc=example,dc=org"
//!
//! cargo run --example connection_pool
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use ldap3::{Scope, SearchEntry};
use ldap_pool::{LdapPool, PoolConfig, PoolError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let url = std::env::var("LDAP_URL").unwrap_or_else(|_| "ldap://localhost:389".into());
    let base_dn = std::env::var("LDAP_BASE_DN").unwrap_or_else(|_| "dc=example,dc=org".into());

    let mut config = PoolConfig::new(&url)
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .op_timeout(Duration::from_secs(30));

    if let (Ok(dn), Ok(password)) = (
        std::env::var("LDAP_BIND_DN"),
        std::env::var("LDAP_BIND_PASSWORD"),
    ) {
        config = config.bind_credentials(dn, password);
    }

    println!("=== Connection Pool Example ===\n");
    println!("Connecting to {} with {} connections", url, config.max_connections);

    let pool = Arc::new(LdapPool::connect(config).await?);
    print_status(&pool);

    // Example 1: a single pooled search
    println!("\n1. Root DSE lookup:");
    let (entries, _res) = pool
        .search("", Scope::Base, "(objectClass=*)", vec!["namingContexts"])
        .await?
        .success()?;
    for entry in entries {
        let entry = SearchEntry::construct(entry);
        println!("  namingContexts: {:?}", entry.attrs.get("namingContexts"));
    }

    // Example 2: concurrent searches over the shared pool
    println!("\n2. Concurrent searches (16 tasks over 4 connections):");
    let start = Instant::now();
    let mut handles = Vec::new();

    for i in 0..16 {
        let pool = Arc::clone(&pool);
        let base_dn = base_dn.clone();
        handles.push(tokio::spawn(async move {
            let result = pool
                .search(&base_dn, Scope::Subtree, "(objectClass=*)", vec!["cn"])
                .await?;
            Ok::<_, PoolError>((i, result.0.len()))
        }));
    }

    let mut completed = 0;
    let mut total_entries = 0;
    for handle in handles {
        if let Ok(Ok((_task, count))) = handle.await {
            completed += 1;
            total_entries += count;
        }
    }
    println!(
        "  Completed {} searches ({} entries) in {:?}",
        completed,
        total_entries,
        start.elapsed()
    );
    print_status(&pool);

    // Example 3: streaming a larger result set
    println!("\n3. Streaming search:");
    let mut stream = pool
        .streaming_search(&base_dn, Scope::Subtree, "(objectClass=*)", vec!["cn".into()])
        .await;
    let mut streamed = 0usize;
    while let Some(_entry) = stream.next().await? {
        streamed += 1;
    }
    stream.finish().await?;
    println!("  Streamed {} entries", streamed);

    // Graceful shutdown
    println!("\n4. Graceful shutdown:");
    pool.close().await;
    println!("  Pool closed.");

    Ok(())
}

fn print_status(pool: &LdapPool) {
    let status = pool.status();
    println!(
        "  Status: {}/{} connections in use ({:.1}% utilization)",
        status.in_use,
        status.capacity,
        status.utilization()
    );
}
