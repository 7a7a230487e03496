// Peer registry - the current set of payloads discovered nearby

use crate::Payload;
use tokio::sync::RwLock;
use tracing::debug;

/// Insertion-ordered, deduplicated set of discovered peer payloads.
/// Invariant: no payload appears twice; cardinality equals the number of
/// distinct payloads currently considered nearby.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    entries: RwLock<Vec<Payload>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Insert a payload if absent. Returns whether the set changed.
    pub async fn add(&self, payload: Payload) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains(&payload) {
            debug!("Payload already registered, ignoring");
            return false;
        }
        entries.push(payload);
        true
    }

    /// Remove a payload if present. Removing an absent payload is a no-op.
    pub async fn remove(&self, payload: &Payload) -> bool {
        let mut entries = self.entries.write().await;
        match entries.iter().position(|p| p == payload) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Current entries in insertion order. Returns an owned copy, so callers
    /// never observe the registry mutating underneath them.
    pub async fn snapshot(&self) -> Vec<Payload> {
        self.entries.read().await.clone()
    }

    /// Drop all entries
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        if !entries.is_empty() {
            debug!("Clearing {} discovered peer(s)", entries.len());
        }
        entries.clear();
    }

    /// Number of distinct payloads currently registered
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let registry = PeerRegistry::new();

        assert!(registry.add(b"alpha".to_vec()).await);
        assert!(!registry.add(b"alpha".to_vec()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_absent_payload_is_noop() {
        let registry = PeerRegistry::new();

        assert!(!registry.remove(&b"missing".to_vec()).await);

        registry.add(b"alpha".to_vec()).await;
        assert!(registry.remove(&b"alpha".to_vec()).await);
        assert!(!registry.remove(&b"alpha".to_vec()).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_preserves_insertion_order() {
        let registry = PeerRegistry::new();

        registry.add(b"first".to_vec()).await;
        registry.add(b"second".to_vec()).await;
        registry.add(b"third".to_vec()).await;
        registry.remove(&b"second".to_vec()).await;
        registry.add(b"fourth".to_vec()).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(
            snapshot,
            vec![b"first".to_vec(), b"third".to_vec(), b"fourth".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_later_mutation() {
        let registry = PeerRegistry::new();

        registry.add(b"alpha".to_vec()).await;
        let snapshot = registry.snapshot().await;

        registry.add(b"beta".to_vec()).await;
        registry.clear().await;

        assert_eq!(snapshot, vec![b"alpha".to_vec()]);
    }

    #[tokio::test]
    async fn test_clear_empties_the_set() {
        let registry = PeerRegistry::new();

        registry.add(b"alpha".to_vec()).await;
        registry.add(b"beta".to_vec()).await;
        registry.clear().await;

        assert!(registry.is_empty().await);
        assert_eq!(registry.snapshot().await, Vec::<Payload>::new());
    }
}
