use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session
///
/// A signed-in actor. The session id travels inside the token as `sid`, so revoking the
/// session invalidates every token issued for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// SessionStore
///
/// Process-lifetime registry of live sessions. Constructed once in `main` and shared
/// through `AppState`; there is no global instance.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

pub type SessionState = Arc<SessionStore>;

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session lasting `ttl_secs`. Lifetimes past the representable range end at
    /// `DateTime::MAX_UTC`. Expired entries are purged on every call.
    pub async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Session {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.id, session.clone());
        session
    }

    /// Returns the session if it exists and has not expired. Expired entries are dropped on
    /// access.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().await.remove(&id);
        None
    }

    /// Ends a session. Returns false if it was not live.
    pub async fn revoke(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn active_count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_expired(now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_purges_expired_sessions() {
        let store = SessionStore::new();
        for _ in 0..1000 {
            store.create(Uuid::new_v4(), 0).await;
        }

        let live = store.create(Uuid::new_v4(), 3600).await;

        let sessions = store.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&live.id));
    }

    #[tokio::test]
    async fn test_create_saturates_oversized_lifetime() {
        let store = SessionStore::new();

        let huge = store.create(Uuid::new_v4(), 10_000_000_000_000).await;
        let max = store.create(Uuid::new_v4(), i64::MAX).await;

        assert_eq!(huge.expires_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(max.expires_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(store.active_count().await, 2);
    }
}
