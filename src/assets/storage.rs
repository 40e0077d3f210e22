use parking_lot::{RwLock, RwLockReadGuard};
use slotmap::{Key, SlotMap};
use std::sync::Arc;

/// Thread-safe slotmap of shared assets. `add` and `get` take `&self`;
/// the renderer grabs one `read_lock` per frame instead of locking per
/// asset.
pub struct AssetStorage<H: Key, T> {
    inner: RwLock<SlotMap<H, Arc<T>>>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SlotMap::default()),
        }
    }

    /// [Write] Adds an asset and returns its handle.
    pub fn add(&self, asset: impl Into<T>) -> H {
        let mut guard = self.inner.write();
        guard.insert(Arc::new(asset.into()))
    }

    /// [Read] Gets a single asset.
    pub fn get(&self, handle: H) -> Option<Arc<T>> {
        let guard = self.inner.read();
        guard.get(handle).cloned()
    }

    /// [Read] Acquires the read lock for batch access.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, SlotMap<H, Arc<T>>> {
        self.inner.read()
    }
}
