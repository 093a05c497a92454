use crate::battle::state::BattleSession;
use crate::errors::BattleResult;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};

/// Opaque per-visitor storage for encoded battle sessions.
///
/// The engine never sees the store. Hosts check a session out, run one engine operation on it
/// and commit it back; the store lock is held in between, so operations on the store never
/// interleave.
#[derive(Debug, Default)]
pub struct SessionStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

/// Exclusive access to one decoded session until it is committed or dropped.
pub struct SessionLease<'a> {
    id: String,
    blobs: MutexGuard<'a, HashMap<String, Vec<u8>>>,
    pub session: BattleSession,
}

impl SessionLease<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Encode the session and write it back. Dropping a lease without committing discards
    /// every change made through it.
    pub fn commit(mut self) -> BattleResult<()> {
        let bytes = self.session.to_bytes()?;
        tracing::debug!(id = %self.id, bytes = bytes.len(), "session committed");
        self.blobs.insert(self.id.clone(), bytes);
        Ok(())
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the store and decode `id`, starting a fresh session if none is stored.
    pub async fn checkout(&self, id: &str) -> BattleResult<SessionLease<'_>> {
        let blobs = self.blobs.lock().await;
        let session = match blobs.get(id) {
            Some(bytes) => BattleSession::from_bytes(bytes)?,
            None => BattleSession::default(),
        };
        Ok(SessionLease {
            id: id.to_string(),
            blobs,
            session,
        })
    }

    /// A decoded copy of `id` without holding the lock.
    pub async fn snapshot(&self, id: &str) -> BattleResult<BattleSession> {
        let lease = self.checkout(id).await?;
        Ok(lease.session)
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.blobs.lock().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }

    /// Store raw bytes for `id`, as a host restoring a persisted blob would.
    pub async fn insert_raw(&self, id: &str, bytes: Vec<u8>) {
        self.blobs.lock().await.insert(id.to_string(), bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestCombatantBuilder;
    use crate::errors::{BattleEngineError, SessionError};
    use crate::player::Roster;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_commit_persists_changes() {
        let store = SessionStore::new();

        let mut lease = store.checkout("visitor").await.unwrap();
        assert_eq!(lease.session, BattleSession::default());
        lease.session.player_roster = Roster::new(vec![TestCombatantBuilder::new(25, "pikachu").build()]);
        lease.commit().unwrap();

        let stored = store.snapshot("visitor").await.unwrap();
        assert_eq!(stored.player_roster.members()[0].name, "pikachu");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_dropped_lease_discards_changes() {
        let store = SessionStore::new();
        {
            let mut lease = store.checkout("visitor").await.unwrap();
            lease.session.last_log = Some("never saved".into());
        }
        assert!(store.is_empty().await);
        assert_eq!(store.snapshot("visitor").await.unwrap().last_log, None);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let mut lease = store.checkout("a").await.unwrap();
        lease.session.last_log = Some("a".into());
        lease.commit().unwrap();

        assert_eq!(store.snapshot("b").await.unwrap().last_log, None);
        assert!(store.remove("a").await);
        assert!(!store.remove("a").await);
    }

    #[tokio::test]
    async fn test_garbage_blob_is_rejected() {
        let store = SessionStore::new();
        store.insert_raw("visitor", vec![0xff, 0xff, 0xff]).await;
        assert!(matches!(
            store.checkout("visitor").await,
            Err(BattleEngineError::Session(SessionError::Decode(_)))
        ));
    }
}
