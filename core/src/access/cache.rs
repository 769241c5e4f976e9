use std::{any::Any, collections::HashMap, sync::Arc};

use tokio::sync::{broadcast, RwLock};
use tracing::trace;

use crate::models::ComplexId;

/// Memoization key: which accessor, for which complex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
	pub entity: &'static str,
	pub complex_id: ComplexId,
}

type Rows = Arc<dyn Any + Send + Sync>;

/// Version of a key's rows, taken before a read so the result can be dropped if the key
/// was invalidated meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
	epoch: u64,
	invalidations: u64,
}

#[derive(Default)]
struct Entries {
	rows: HashMap<QueryKey, Rows>,
	invalidations: HashMap<QueryKey, u64>,
	// bumped by `clear`
	epoch: u64,
}

impl Entries {
	fn generation(&self, key: &QueryKey) -> Generation {
		Generation {
			epoch: self.epoch,
			invalidations: self.invalidations.get(key).copied().unwrap_or_default(),
		}
	}
}

/// Read-through cache of fetched collections.
///
/// Invalidating a key drops it and announces it to every follower, which refetches.
/// Rows read before an invalidation are never stored after it.
pub struct QueryCache {
	entries: RwLock<Entries>,
	invalidated: broadcast::Sender<QueryKey>,
}

impl Default for QueryCache {
	fn default() -> Self {
		let (invalidated, _) = broadcast::channel(64);
		Self {
			entries: RwLock::default(),
			invalidated,
		}
	}
}

impl QueryCache {
	pub async fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<Vec<T>>> {
		let rows = self.entries.read().await.rows.get(key).cloned()?;
		rows.downcast::<Vec<T>>().ok()
	}

	pub async fn generation(&self, key: &QueryKey) -> Generation {
		self.entries.read().await.generation(key)
	}

	/// Stores `rows` unless `key` was invalidated or the cache cleared since
	/// `generation` was taken. Returns whether the rows were stored.
	pub async fn insert<T: Send + Sync + 'static>(
		&self,
		key: QueryKey,
		generation: Generation,
		rows: Arc<Vec<T>>,
	) -> bool {
		let mut entries = self.entries.write().await;
		if entries.generation(&key) != generation {
			trace!(entity = key.entity, complex_id = %key.complex_id, "stale rows not cached");
			return false;
		}
		entries.rows.insert(key, rows);
		true
	}

	pub async fn invalidate(&self, key: QueryKey) {
		{
			let mut entries = self.entries.write().await;
			entries.rows.remove(&key);
			*entries.invalidations.entry(key.clone()).or_default() += 1;
		}
		trace!(entity = key.entity, complex_id = %key.complex_id, "query invalidated");
		// no followers is fine
		let _ = self.invalidated.send(key);
	}

	pub async fn clear(&self) {
		let mut entries = self.entries.write().await;
		entries.rows.clear();
		entries.invalidations.clear();
		entries.epoch += 1;
	}

	pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
		self.invalidated.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(entity: &'static str, complex: &str) -> QueryKey {
		QueryKey {
			entity,
			complex_id: ComplexId::new(complex),
		}
	}

	#[tokio::test]
	async fn keys_are_per_entity_and_complex() {
		let cache = QueryCache::default();
		let generation = cache.generation(&key("gates", "c1")).await;
		assert!(cache.insert(key("gates", "c1"), generation, Arc::new(vec![1_u32, 2])).await);

		assert_eq!(
			cache.get::<u32>(&key("gates", "c1")).await.as_deref(),
			Some(&vec![1, 2])
		);
		assert!(cache.get::<u32>(&key("gates", "c2")).await.is_none());
		assert!(cache.get::<u32>(&key("apartments", "c1")).await.is_none());
		// wrong row type never aliases
		assert!(cache.get::<String>(&key("gates", "c1")).await.is_none());
	}

	#[tokio::test]
	async fn invalidation_drops_and_announces() {
		let cache = QueryCache::default();
		let mut invalidations = cache.subscribe();
		let generation = cache.generation(&key("gates", "c1")).await;
		cache.insert(key("gates", "c1"), generation, Arc::new(vec![1_u32])).await;

		cache.invalidate(key("gates", "c1")).await;

		assert!(cache.get::<u32>(&key("gates", "c1")).await.is_none());
		assert_eq!(invalidations.recv().await.unwrap(), key("gates", "c1"));
	}

	#[tokio::test]
	async fn rows_read_before_invalidation_are_not_stored() {
		let cache = QueryCache::default();
		let before = cache.generation(&key("gates", "c1")).await;
		let other = cache.generation(&key("gates", "c2")).await;

		cache.invalidate(key("gates", "c1")).await;

		assert!(!cache.insert(key("gates", "c1"), before, Arc::new(vec![1_u32])).await);
		assert!(cache.get::<u32>(&key("gates", "c1")).await.is_none());
		// other keys are unaffected
		assert!(cache.insert(key("gates", "c2"), other, Arc::new(vec![2_u32])).await);

		let current = cache.generation(&key("gates", "c1")).await;
		assert!(cache.insert(key("gates", "c1"), current, Arc::new(vec![3_u32])).await);
	}

	#[tokio::test]
	async fn clear_outdates_every_read_in_flight() {
		let cache = QueryCache::default();
		let before = cache.generation(&key("apartments", "c1")).await;

		cache.clear().await;

		assert!(!cache.insert(key("apartments", "c1"), before, Arc::new(vec![1_u32])).await);
		assert!(cache.get::<u32>(&key("apartments", "c1")).await.is_none());
	}
}
