use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted: Instant,
}

/// A single cached value with an optional time-to-live.
///
/// With no TTL the value stays until [`TimedSlot::clear`] is called.
#[derive(Debug)]
pub struct TimedSlot<V> {
    ttl: Option<Duration>,
    slot: RwLock<Option<CacheEntry<V>>>,
}

impl<V> TimedSlot<V>
where
    V: Clone,
{
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// The cached value, unless it is absent or older than the TTL.
    pub async fn get(&self) -> Option<V> {
        let slot = self.slot.read().await;
        slot.as_ref().and_then(|entry| match self.ttl {
            Some(ttl) if entry.inserted.elapsed() > ttl => None,
            _ => Some(entry.value.clone()),
        })
    }

    pub async fn set(&self, value: V) {
        *self.slot.write().await = Some(CacheEntry {
            value,
            inserted: Instant::now(),
        });
    }

    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}
