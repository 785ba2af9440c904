//! Directory operations forwarded through the pool.
//!
//! Each operation borrows a connection, forwards the call to `ldap3`
//! unchanged, and releases the connection on every exit path. Request and
//! result types are `ldap3`'s own.

use std::collections::HashSet;
use std::hash::Hash;

use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::exop::PasswordModify;
use ldap3::result::{CompareResult, ExopResult, LdapResult, SearchResult};
use ldap3::{Mod, Scope};

use crate::error::Result;
use crate::pool::LdapPool;
use crate::stream::EntryStream;

impl LdapPool {
    /// Perform a simple bind on a pooled connection.
    ///
    /// The bind outcome sticks to one physical connection; later operations
    /// may run on a differently-bound connection. Pools that need a uniform
    /// identity should configure
    /// [`bind_credentials`](crate::PoolConfig::bind_credentials) instead, so
    /// every connection is bound the same way at establishment.
    pub async fn simple_bind(&self, bind_dn: &str, bind_pw: &str) -> Result<LdapResult> {
        self.with_conn(|mut ldap| async move { ldap.simple_bind(bind_dn, bind_pw).await })
            .await
    }

    /// Perform a SASL EXTERNAL bind on a pooled connection.
    pub async fn sasl_external_bind(&self) -> Result<LdapResult> {
        self.with_conn(|mut ldap| async move { ldap.sasl_external_bind().await })
            .await
    }

    /// Perform a synchronous search, returning all matching entries.
    pub async fn search<S: AsRef<str> + Send + Sync>(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attrs: Vec<S>,
    ) -> Result<SearchResult> {
        self.with_conn(|mut ldap| async move { ldap.search(base, scope, filter, attrs).await })
            .await
    }

    /// Perform a search with the Paged Results control, concatenating all
    /// pages into a single result.
    pub async fn search_with_paging(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attrs: Vec<String>,
        page_size: i32,
    ) -> Result<SearchResult> {
        self.with_conn(|mut ldap| async move {
            let adapters: Vec<Box<dyn Adapter<'static, String, Vec<String>>>> = vec![
                Box::new(EntriesOnly::new()),
                Box::new(PagedResults::new(page_size)),
            ];
            let mut stream = ldap
                .streaming_search_with(adapters, base, scope, filter, attrs)
                .await?;
            let mut entries = Vec::new();
            while let Some(entry) = stream.next().await? {
                entries.push(entry);
            }
            let res = stream.finish().await;
            Ok::<SearchResult, ldap3::LdapError>(SearchResult(entries, res))
        })
        .await
    }

    /// Start a streaming search, yielding entries lazily.
    ///
    /// The returned stream owns its pooled connection until it is finished
    /// or dropped. When no connection can be acquired, the stream yields no
    /// entries and [`EntryStream::finish`] reports the acquisition error, so
    /// streaming callers need no separate error-checking path.
    pub async fn streaming_search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attrs: Vec<String>,
    ) -> EntryStream {
        let lease = match self.get().await {
            Ok(lease) => lease,
            Err(e) => return EntryStream::failed(e),
        };

        let mut ldap = (*lease).clone();
        if let Some(timeout) = self.config().op_timeout {
            ldap.with_timeout(timeout);
        }
        let adapters: Vec<Box<dyn Adapter<'static, String, Vec<String>>>> = vec![Box::new(EntriesOnly::new())];
        match ldap
            .streaming_search_with(adapters, base, scope, filter, attrs)
            .await
        {
            Ok(stream) => EntryStream::live(lease, stream),
            Err(e) => EntryStream::failed(e.into()),
        }
    }

    /// Add an entry.
    pub async fn add<S: AsRef<[u8]> + Eq + Hash + Send + Sync>(
        &self,
        dn: &str,
        attrs: Vec<(S, HashSet<S>)>,
    ) -> Result<LdapResult> {
        self.with_conn(|mut ldap| async move { ldap.add(dn, attrs).await })
            .await
    }

    /// Delete an entry.
    pub async fn delete(&self, dn: &str) -> Result<LdapResult> {
        self.with_conn(|mut ldap| async move { ldap.delete(dn).await })
            .await
    }

    /// Modify an entry.
    pub async fn modify<S: AsRef<[u8]> + Eq + Hash + Send + Sync>(
        &self,
        dn: &str,
        mods: Vec<Mod<S>>,
    ) -> Result<LdapResult> {
        self.with_conn(|mut ldap| async move { ldap.modify(dn, mods).await })
            .await
    }

    /// Rename and/or move an entry.
    pub async fn modifydn(
        &self,
        dn: &str,
        rdn: &str,
        delete_old: bool,
        new_superior: Option<&str>,
    ) -> Result<LdapResult> {
        self.with_conn(|mut ldap| async move {
            ldap.modifydn(dn, rdn, delete_old, new_superior).await
        })
        .await
    }

    /// Compare an attribute value against an entry.
    pub async fn compare<B: AsRef<[u8]> + Send + Sync>(
        &self,
        dn: &str,
        attr: &str,
        val: B,
    ) -> Result<CompareResult> {
        self.with_conn(|mut ldap| async move { ldap.compare(dn, attr, val).await })
            .await
    }

    /// Perform the Password Modify extended operation.
    pub async fn password_modify(
        &self,
        user_id: Option<&str>,
        old_pass: Option<&str>,
        new_pass: Option<&str>,
    ) -> Result<ExopResult> {
        self.with_conn(|mut ldap| async move {
            ldap.extended(PasswordModify {
                user_id,
                old_pass,
                new_pass,
            })
            .await
        })
        .await
    }

    /// Perform an arbitrary extended operation.
    pub async fn extended<E>(&self, exop: E) -> Result<ExopResult>
    where
        E: Into<ldap3::exop::Exop> + Send,
    {
        self.with_conn(|mut ldap| async move { ldap.extended(exop).await })
            .await
    }
}
