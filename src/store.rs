//! Local object stores fed by externally driven watch streams.
//!
//! The `kube-rs` reflector only works with its own store, which makes
//! getting an object by name awkward. This store keeps the cache behind a
//! plain interface the generators can consume without knowing how it is
//! maintained.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use futures::{Stream, TryStreamExt};
use kube::runtime::watcher;
use parking_lot::RwLock;

use crate::Result;
use crate::resource::Resource;

/// Read side of an object cache.
///
/// Lookups are local and synchronous; they never reach the API server. A
/// lookup error is possible for exotic backing implementations, and callers
/// are expected to treat it the same as a miss.
pub trait Store: Send + Sync {
    fn get_by_key(&self, key: &str) -> Result<Option<Arc<dyn Resource>>>;
}

/// Shared in-memory cache, keyed by object name.
///
/// Values are stored type erased so one store type serves every watched
/// kind, with the consumers downcasting to the kind they expect.
#[derive(Clone, Default)]
pub struct CacheStore {
    cache: Arc<RwLock<HashMap<String, Arc<dyn Resource>>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<Arc<dyn Resource>> {
        self.cache.read().get(key).cloned()
    }

    #[inline]
    pub fn state(&self) -> Vec<Arc<dyn Resource>> {
        self.cache.read().values().cloned().collect()
    }

    pub fn insert<K: Resource>(&self, obj: K) {
        if let Some(name) = &obj.metadata().name {
            let key = name.clone();
            self.cache.write().insert(key, Arc::new(obj));
        }
    }

    pub fn remove(&self, key: &str) {
        self.cache.write().remove(key);
    }
}

impl Store for CacheStore {
    fn get_by_key(&self, key: &str) -> Result<Option<Arc<dyn Resource>>> {
        Ok(self.get(key))
    }
}

pub trait Applier<K> {
    fn apply(&mut self, event: &watcher::Event<K>);
}

/// Maintains a [`CacheStore`] from `watcher::Event`s.
///
/// Objects seen during a watch re-initialization are buffered and swapped
/// in as one snapshot on completion, so readers never observe a partially
/// rebuilt cache.
pub struct CacheWriter {
    store: CacheStore,
    init: HashMap<String, Arc<dyn Resource>>,
}

impl CacheWriter {
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            init: HashMap::new(),
        }
    }
}

impl<K> Applier<K> for CacheWriter
where
    K: Resource + Clone,
{
    fn apply(&mut self, event: &watcher::Event<K>) {
        match event {
            watcher::Event::Apply(obj) => {
                self.store.insert(obj.clone());
            }

            watcher::Event::Delete(obj) => {
                if let Some(name) = &obj.metadata().name {
                    self.store.remove(name);
                }
            }

            watcher::Event::Init => self.init.clear(),

            watcher::Event::InitApply(obj) => {
                if let Some(name) = &obj.metadata().name {
                    self.init.insert(name.clone(), Arc::new(obj.clone()));
                }
            }

            watcher::Event::InitDone => {
                *self.store.cache.write() = mem::take(&mut self.init);
            }
        }
    }
}

/// Caches objects from `watcher::Event`s into a local store.
///
/// Keep in mind that the store is just a cache, and may be out of date.
///
/// Note: it is a bad idea to feed a single store from multiple watchers,
/// since the whole cache is replaced whenever any of them completes a
/// re-initialization.
pub fn reflector<K, W, S>(mut applier: S, stream: W) -> impl Stream<Item = W::Item>
where
    K: Resource + Clone,
    W: Stream<Item = watcher::Result<watcher::Event<K>>>,
    S: Applier<K>,
{
    stream.inspect_ok(move |event| applier.apply(event))
}
