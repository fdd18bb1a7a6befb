//! Per-key write serialization
//!
//! At most one mutation per progress key is in flight. Mutations of
//! different keys never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::achievements::ProgressKey;

#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<ProgressKey, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mutation of `key` is running
    pub async fn acquire(&self, key: &ProgressKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_waits() {
        let locks = KeyLocks::new();
        let key = ProgressKey::new("schulte", "5x5");

        let guard = locks.acquire(&key).await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&key)).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&key)).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_keys_are_independent() {
        let locks = KeyLocks::new();
        let _a = locks.acquire(&ProgressKey::new("schulte", "5x5")).await;
        let other = tokio::time::timeout(
            Duration::from_millis(20),
            locks.acquire(&ProgressKey::new("schulte", "4x4")),
        )
        .await;
        assert!(other.is_ok());
    }
}
