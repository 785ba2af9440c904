//! Lazily produced search entries backed by a pooled connection.

use ldap3::result::LdapResult;
use ldap3::{SearchEntry, SearchStream};

use crate::conn::LdapConnector;
use crate::error::{PoolError, Result};
use crate::pool::PooledConnection;

/// A streaming search running on a pooled connection.
///
/// Produced by [`LdapPool::streaming_search`](crate::pool::LdapPool). The
/// stream owns its connection lease for the duration of the iteration and
/// returns the connection to the pool when finished or dropped.
///
/// A stream created from a failed acquisition is a sentinel: [`next`] yields
/// no entries and [`finish`] reports the stored error, so streaming callers
/// handle acquisition failures the same way as any other failed search.
///
/// [`next`]: EntryStream::next
/// [`finish`]: EntryStream::finish
pub struct EntryStream {
    // Held only to pin the connection slot while the search runs; dropped
    // (returning the connection) when the stream is finished or dropped.
    _lease: Option<PooledConnection<LdapConnector>>,
    state: StreamState,
}

enum StreamState {
    Live(SearchStream<'static, String, Vec<String>>),
    Failed(PoolError),
}

impl EntryStream {
    pub(crate) fn live(
        lease: PooledConnection<LdapConnector>,
        stream: SearchStream<'static, String, Vec<String>>,
    ) -> Self {
        Self {
            _lease: Some(lease),
            state: StreamState::Live(stream),
        }
    }

    pub(crate) fn failed(error: PoolError) -> Self {
        Self {
            _lease: None,
            state: StreamState::Failed(error),
        }
    }

    /// Fetch the next entry, or `Ok(None)` when the stream is exhausted.
    ///
    /// On a failure sentinel this returns `Ok(None)` immediately; the error
    /// is reported by [`finish`](EntryStream::finish).
    pub async fn next(&mut self) -> Result<Option<SearchEntry>> {
        match &mut self.state {
            StreamState::Live(stream) => match stream.next().await? {
                Some(entry) => Ok(Some(SearchEntry::construct(entry))),
                None => Ok(None),
            },
            StreamState::Failed(_) => Ok(None),
        }
    }

    /// Conclude the search, release the connection, and return the final
    /// result of the operation.
    ///
    /// For a failure sentinel this returns the error the stream was created
    /// with.
    pub async fn finish(self) -> Result<LdapResult> {
        // The lease stays alive in the partially moved `self` until the
        // protocol exchange concludes, then drops, releasing the connection.
        match self.state {
            StreamState::Live(mut stream) => Ok(stream.finish().await),
            StreamState::Failed(error) => Err(error),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_failed_stream_yields_no_entries() {
        let mut stream =
            EntryStream::failed(PoolError::AcquisitionTimeout(Duration::from_secs(1)));

        assert!(matches!(stream.next().await, Ok(None)));
        assert!(matches!(stream.next().await, Ok(None)));
    }

    #[tokio::test]
    async fn test_failed_stream_reports_error_on_finish() {
        let stream =
            EntryStream::failed(PoolError::AcquisitionTimeout(Duration::from_millis(250)));

        match stream.finish().await {
            Err(PoolError::AcquisitionTimeout(waited)) => {
                assert_eq!(waited, Duration::from_millis(250));
            }
            other => panic!("expected acquisition timeout, got {other:?}"),
        }
    }
}
