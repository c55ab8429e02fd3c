//! Shared, optional map origin.

use percview_env::OriginResolver;
use std::sync::{Arc, PoisonError, RwLock};

/// Host-owned handle to the current map origin, which may be absent.
///
/// The host sets or clears it whenever its scene changes; the visualizer reads
/// it once per frame. Clones share the same slot.
#[derive(Clone, Default)]
pub struct OriginSlot {
    inner: Arc<RwLock<Option<Arc<dyn OriginResolver>>>>,
}

impl OriginSlot {
    /// Creates an empty slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a slot already holding `origin`.
    pub fn with_origin(origin: impl OriginResolver + 'static) -> Self {
        let slot = Self::empty();
        slot.set(Arc::new(origin));
        slot
    }

    pub fn set(&self, origin: Arc<dyn OriginResolver>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(origin);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn get(&self) -> Option<Arc<dyn OriginResolver>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl std::fmt::Debug for OriginSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginSlot").field("set", &self.is_set()).finish()
    }
}
