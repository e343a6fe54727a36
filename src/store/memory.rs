//! Thread-safe in-memory [`KeyValueStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{Entries, KeyValueStore, StoreFuture},
};

type StoreMap = Arc<RwLock<Entries>>;

/// Thread-safe storage backend that keeps entries in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store pre-populated with the provided key/value pairs.
	pub fn seeded<I, K, V>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

		Self(Arc::new(RwLock::new(map)))
	}

	/// Reads a single key synchronously; intended for assertions.
	pub fn peek(&self, key: &str) -> Option<String> {
		self.0.read().get(key).cloned()
	}

	/// Returns a copy of every stored entry.
	pub fn snapshot(&self) -> Entries {
		self.0.read().clone()
	}

	fn get_now(map: &StoreMap, keys: &[&str]) -> Entries {
		let guard = map.read();

		keys.iter()
			.filter_map(|key| guard.get(*key).map(|value| ((*key).to_owned(), value.clone())))
			.collect()
	}

	fn set_now(map: &StoreMap, entries: Entries) {
		map.write().extend(entries);
	}

	fn remove_now(map: &StoreMap, keys: &[&str]) {
		let mut guard = map.write();

		for key in keys {
			guard.remove(*key);
		}
	}
}
impl KeyValueStore for MemoryStore {
	fn get_many<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Entries> {
		Box::pin(async move { Ok(Self::get_now(&self.0, keys)) })
	}

	fn set_many(&self, entries: Entries) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::set_now(&map, entries);

			Ok(())
		})
	}

	fn remove<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			Self::remove_now(&self.0, keys);

			Ok(())
		})
	}
}
