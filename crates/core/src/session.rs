//! Per-user flow state with time-based expiry.
//!
//! Only users inside a flow have a session; menu routing is stateless and a
//! missing or expired key is the normal "no active flow" case, never an
//! error.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Default session lifetime. Every `put` resets the clock to this window.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStep {
    Name,
    Service,
    Email,
    Details,
}

/// Partial quote-request answers collected so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSession {
    pub step: QuoteStep,
    pub name: Option<String>,
    pub service: Option<String>,
    pub email: Option<String>,
    pub details: Option<String>,
}

impl QuoteSession {
    pub fn start() -> Self {
        Self { step: QuoteStep::Name, name: None, service: None, email: None, details: None }
    }
}

/// The stored per-user state. A session always belongs to exactly one active
/// flow; a step without a flow is unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum Session {
    Quote(QuoteSession),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value contract the engine's processor runs against. `get` on an
/// expired or absent key returns `None`; absence is a valid state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Session>, SessionStoreError>;
    /// Stores the session and refreshes its TTL to the full default window.
    async fn put(&self, user_id: &str, session: Session) -> Result<(), SessionStoreError>;
    async fn delete(&self, user_id: &str) -> Result<(), SessionStoreError>;
}

struct StoredSession {
    session: Session,
    expires_at: Instant,
}

/// In-memory store with lazy expiry, keyed by the user identifier.
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, StoredSession>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> Result<Option<Session>, SessionStoreError> {
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                None => return Ok(None),
                Some(stored) if stored.expires_at > Instant::now() => {
                    return Ok(Some(stored.session.clone()));
                }
                Some(_) => {}
            }
        }

        // Lazy eviction of the expired entry.
        self.entries.write().await.remove(user_id);
        Ok(None)
    }

    async fn put(&self, user_id: &str, session: Session) -> Result<(), SessionStoreError> {
        let stored = StoredSession { session, expires_at: Instant::now() + self.ttl };
        self.entries.write().await.insert(user_id.to_string(), stored);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), SessionStoreError> {
        self.entries.write().await.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_session() -> Session {
        Session::Quote(QuoteSession::start())
    }

    #[tokio::test]
    async fn put_then_get_roundtrips_within_ttl() {
        let store = InMemorySessionStore::default();
        store.put("+491770000001", quote_session()).await.expect("put");

        let session = store.get("+491770000001").await.expect("get");
        assert_eq!(session, Some(quote_session()));
    }

    #[tokio::test]
    async fn absent_key_reads_as_none_without_error() {
        let store = InMemorySessionStore::default();
        assert_eq!(store.get("+491770000002").await.expect("get"), None);
    }

    #[tokio::test]
    async fn expired_session_is_treated_as_absent() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.put("+491770000003", quote_session()).await.expect("put");

        assert_eq!(store.get("+491770000003").await.expect("get"), None);
    }

    #[tokio::test]
    async fn every_put_refreshes_the_ttl_to_the_full_window() {
        let store = InMemorySessionStore::new(Duration::from_millis(500));
        store.put("+491770000004", quote_session()).await.expect("first put");

        tokio::time::sleep(Duration::from_millis(350)).await;
        store.put("+491770000004", quote_session()).await.expect("refreshing put");

        // Past the first deadline but within the refreshed one.
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(store.get("+491770000004").await.expect("get"), Some(quote_session()));
    }

    #[test]
    fn session_serializes_with_a_flow_tag_and_snake_case_step() {
        let session = Session::Quote(QuoteSession {
            step: QuoteStep::Service,
            name: Some("Jane".to_string()),
            service: None,
            email: None,
            details: None,
        });

        assert_eq!(
            serde_json::to_value(&session).expect("serialize"),
            serde_json::json!({
                "flow": "quote",
                "step": "service",
                "name": "Jane",
                "service": null,
                "email": null,
                "details": null
            })
        );
    }

    #[tokio::test]
    async fn delete_removes_the_session() {
        let store = InMemorySessionStore::default();
        store.put("+491770000005", quote_session()).await.expect("put");
        store.delete("+491770000005").await.expect("delete");

        assert_eq!(store.get("+491770000005").await.expect("get"), None);
    }
}
