//! The session store: the single owner of the current [`Session`].
//!
//! It is shared through an `Arc` with everything that needs the session (the
//! HTTP client, the auth gateway, the route resolver) instead of living in a
//! global. Reads are synchronous and never touch storage; writes go to durable
//! storage under the `token` and `user` keys.
//!
//! `commit` and `clear` are serialized, so memory and storage always end up
//! describing the same session whichever of the two lands last.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::Session;
use crate::error::StorageError;
use crate::models::{mask_identity, User};
use crate::storage::{Storage, TOKEN_KEY, USER_KEY};

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    session: RwLock<Session>,
    // Held across the storage writes and the in-memory install.
    writes: Mutex<()>,
}

impl SessionStore {
    /// A store starting with an empty session, ignoring whatever storage holds.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        SessionStore {
            storage,
            session: RwLock::new(Session::empty()),
            writes: Mutex::new(()),
        }
    }

    /// Rebuilds the session persisted by a previous run.
    ///
    /// Only a complete pair is restored. A lone key or an unreadable user is
    /// treated as no session at all, and both keys are removed so the next
    /// start does not trip over them again.
    pub async fn restore(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY).await?;
        let user = storage.get(USER_KEY).await?;

        let session = match (token, user) {
            (Some(token), Some(raw_user)) if !token.is_empty() => {
                match serde_json::from_str::<User>(&raw_user) {
                    Ok(user) => {
                        info!(
                            event_name = "session.restored",
                            event_domain = "session",
                            role = %user.role_name(),
                            aadhar = %mask_identity(&user.aadhar),
                            "restored persisted session"
                        );
                        Session::authenticated(token, user)
                    }
                    Err(e) => {
                        warn!("Persisted user is unreadable, discarding session: {}", e);
                        discard(storage.as_ref()).await;
                        Session::empty()
                    }
                }
            }
            (None, None) => {
                debug!("No persisted session found");
                Session::empty()
            }
            _ => {
                warn!("Persisted session is incomplete, discarding it");
                discard(storage.as_ref()).await;
                Session::empty()
            }
        };

        Ok(SessionStore {
            storage,
            session: RwLock::new(session),
            writes: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Persists and installs a freshly verified session.
    ///
    /// If either key fails to persist, both are removed again and the in-memory
    /// session is emptied to match: the previous pair is no longer on disk.
    pub async fn commit(&self, token: String, user: User) -> Result<(), StorageError> {
        let serialized =
            serde_json::to_string(&user).map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let _writes = self.writes.lock().await;

        let persisted = async {
            self.storage.set(TOKEN_KEY, &token).await?;
            self.storage.set(USER_KEY, &serialized).await
        }
        .await;

        if let Err(e) = persisted {
            warn!("Failed to persist session, rolling back: {}", e);
            *self.write() = Session::empty();
            discard(self.storage.as_ref()).await;
            return Err(e);
        }

        info!(
            event_name = "session.committed",
            event_domain = "session",
            role = %user.role_name(),
            aadhar = %mask_identity(&user.aadhar),
            "session committed"
        );
        *self.write() = Session::authenticated(token, user);
        Ok(())
    }

    /// Empties the session and removes both keys.
    ///
    /// Waits for an in-flight `commit` to finish, then clears memory
    /// unconditionally before touching storage. Both removals are attempted even
    /// if the first one fails, and the first failure is returned. Clearing an
    /// empty session is a no-op that still succeeds.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _writes = self.writes.lock().await;
        let was_authenticated = {
            let mut session = self.write();
            let was = session.is_authenticated();
            *session = Session::empty();
            was
        };

        let token_removed = self.storage.remove(TOKEN_KEY).await;
        let user_removed = self.storage.remove(USER_KEY).await;

        if was_authenticated {
            info!(
                event_name = "session.cleared",
                event_domain = "session",
                "session cleared"
            );
        }
        token_removed.and(user_removed)
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        // The guarded value is replaced wholesale on every write, so a poisoned
        // lock still holds a consistent session.
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn discard(storage: &dyn Storage) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(e) = storage.remove(key).await {
            warn!("Failed to remove '{}' from storage: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleName;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::time::Duration;

    fn citizen() -> User {
        User::new(1, "123456789012", RoleName::Citizen)
    }

    /// Storage whose writes to one key always fail.
    struct FailingStorage {
        inner: MemoryStorage,
        failing_key: &'static str,
    }

    #[async_trait]
    impl Storage for FailingStorage {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.failing_key {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_commit_persists_both_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        store.commit("tok".into(), citizen()).await.unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap().as_deref(), Some("tok"));
        let raw_user = storage.get(USER_KEY).await.unwrap().unwrap();
        let stored: User = serde_json::from_str(&raw_user).unwrap();
        assert_eq!(Some(stored), store.user());
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let storage = Arc::new(FailingStorage {
            inner: MemoryStorage::new(),
            failing_key: USER_KEY,
        });
        let store = SessionStore::new(storage.clone());

        assert!(store.commit("tok".into(), citizen()).await.is_err());

        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(storage.get(USER_KEY).await.unwrap(), None);
    }

    /// Storage whose user writes take a while, leaving room for a concurrent clear.
    struct SlowStorage {
        inner: MemoryStorage,
    }

    #[async_trait]
    impl Storage for SlowStorage {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_clear_during_commit_wins_in_memory_and_storage() {
        let storage = Arc::new(SlowStorage {
            inner: MemoryStorage::new(),
        });
        let store = SessionStore::new(storage.clone());

        let (committed, cleared) = tokio::join!(store.commit("tok".into(), citizen()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.clear().await
        });
        committed.unwrap();
        cleared.unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(storage.get(USER_KEY).await.unwrap(), None);

        let restarted = SessionStore::restore(storage).await.unwrap();
        assert_eq!(restarted.is_authenticated(), store.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_relogin_empties_the_previous_session() {
        let storage = Arc::new(FailingStorage {
            inner: MemoryStorage::new(),
            failing_key: USER_KEY,
        });
        storage.inner.set(TOKEN_KEY, "old").await.unwrap();
        storage
            .inner
            .set(USER_KEY, &serde_json::to_string(&citizen()).unwrap())
            .await
            .unwrap();
        let store = SessionStore::restore(storage.clone()).await.unwrap();
        assert!(store.is_authenticated());

        assert!(store.commit("new".into(), citizen()).await.is_err());

        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(storage.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.commit("tok".into(), citizen()).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(store.snapshot(), Session::empty());
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(storage.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_stray_keys_from_an_empty_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "orphan").await.unwrap();
        let store = SessionStore::new(storage.clone());

        store.clear().await.unwrap();
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_complete_pair() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tok").await.unwrap();
        storage
            .set(USER_KEY, &serde_json::to_string(&citizen()).unwrap())
            .await
            .unwrap();

        let store = SessionStore::restore(storage).await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().role_name(), RoleName::Citizen);
    }

    #[tokio::test]
    async fn test_restore_discards_half_a_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tok").await.unwrap();

        let store = SessionStore::restore(storage.clone()).await.unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_discards_unreadable_user() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tok").await.unwrap();
        storage.set(USER_KEY, "{not json").await.unwrap();

        let store = SessionStore::restore(storage.clone()).await.unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(storage.get(USER_KEY).await.unwrap(), None);
    }
}
