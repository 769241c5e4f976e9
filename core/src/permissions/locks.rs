use std::{collections::HashMap, hash::Hash, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async lock per key, created on first use.
///
/// Entries nobody holds or waits on are pruned on the next acquisition.
pub struct KeyedLocks<K> {
	locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
	fn default() -> Self {
		Self {
			locks: Mutex::new(HashMap::new()),
		}
	}
}

impl<K: Eq + Hash> KeyedLocks<K> {
	pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
		let lock = {
			let mut locks = self.locks.lock().await;
			locks.retain(|_, lock| Arc::strong_count(lock) > 1);
			Arc::clone(locks.entry(key).or_default())
		};

		lock.lock_owned().await
	}

	#[cfg(test)]
	async fn len(&self) -> usize {
		self.locks.lock().await.len()
	}
}
