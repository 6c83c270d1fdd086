//! In-memory registry of live page instances.
//!
//! Each instance is owned by the session user that created it and is never
//! shared with other users. Nothing is persisted; a restart drops every draft.
//! Instances idle for longer than the store's TTL are swept on the next insert.
//! Closures passed to `with` run under the lock and must not await.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

struct Owned<T> {
    owner: String,
    page: T,
    last_touched: Instant,
}

pub struct PageStore<T> {
    label: &'static str,
    idle_ttl: Duration,
    entries: Mutex<HashMap<Uuid, Owned<T>>>,
}

impl<T> PageStore<T> {
    pub fn new(label: &'static str, idle_ttl: Duration) -> Self {
        Self {
            label,
            idle_ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, owner: &str, page: T) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut entries = self.lock()?;

        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_touched) <= self.idle_ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("evicted {evicted} idle {} instance(s)", self.label);
        }

        entries.insert(
            id,
            Owned {
                owner: owner.to_string(),
                page,
                last_touched: now,
            },
        );
        Ok(id)
    }

    pub fn with<R>(
        &self,
        id: Uuid,
        user_id: &str,
        f: impl FnOnce(&mut T) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut entries = self.lock()?;
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", self.label)))?;
        if entry.owner != user_id {
            return Err(AppError::Unauthorized);
        }
        entry.last_touched = Instant::now();
        f(&mut entry.page)
    }

    pub fn remove(&self, id: Uuid, user_id: &str) -> Result<T, AppError> {
        let mut entries = self.lock()?;
        match entries.get(&id) {
            None => Err(AppError::NotFound(format!("{} {id} not found", self.label))),
            Some(entry) if entry.owner != user_id => Err(AppError::Unauthorized),
            Some(_) => entries
                .remove(&id)
                .map(|e| e.page)
                .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", self.label))),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Owned<T>>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("{} store lock poisoned", self.label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_owner_can_mutate() {
        let store = PageStore::new("counter", TTL);
        let id = store.insert("u1", 0u32).unwrap();
        store
            .with(id, "u1", |n| {
                *n += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.with(id, "u1", |n| Ok(*n)).unwrap(), 1);
    }

    #[test]
    fn test_other_user_is_unauthorized() {
        let store = PageStore::new("counter", TTL);
        let id = store.insert("u1", 0u32).unwrap();
        assert!(matches!(
            store.with(id, "u2", |n| Ok(*n)),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(store.remove(id, "u2"), Err(AppError::Unauthorized)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store: PageStore<u32> = PageStore::new("counter", TTL);
        assert!(matches!(
            store.with(Uuid::new_v4(), "u1", |n| Ok(*n)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_discards_page() {
        let store = PageStore::new("counter", TTL);
        let id = store.insert("u1", 7u32).unwrap();
        assert_eq!(store.remove(id, "u1").unwrap(), 7);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_idle_instances() {
        let store = PageStore::new("counter", TTL);
        for _ in 0..50 {
            store.insert("u1", 0u32).unwrap();
        }
        assert_eq!(store.len(), 50);

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        let fresh = store.insert("u2", 1u32).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.with(fresh, "u2", |n| Ok(*n)).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touching_an_instance_keeps_it_alive() {
        let store = PageStore::new("counter", TTL);
        let kept = store.insert("u1", 0u32).unwrap();
        let idle = store.insert("u1", 0u32).unwrap();

        tokio::time::advance(Duration::from_secs(40)).await;
        store.with(kept, "u1", |n| Ok(*n)).unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;
        store.insert("u2", 0u32).unwrap();

        assert!(store.with(kept, "u1", |n| Ok(*n)).is_ok());
        assert!(matches!(
            store.with(idle, "u1", |n| Ok(*n)),
            Err(AppError::NotFound(_))
        ));
    }
}
