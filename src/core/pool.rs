//! Reusable object pool.
//!
//! Hot view objects (line buffers, row scratch space) are recycled through an
//! [`ObjectPool`] instead of being allocated per use. Types that carry state
//! between uses opt into cleanup by implementing [`Resettable`].

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Capability for pooled values that must be cleared before reuse.
pub trait Resettable {
    /// Return the value to its freshly constructed state.
    fn reset(&mut self);
}

impl Resettable for String {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Resettable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;
type ResetHook<T> = Box<dyn Fn(&mut T) + Send + Sync>;

struct PoolState<T> {
    free: Vec<T>,
    outstanding: usize,
    high_water_mark: usize,
}

/// Thread-safe pool of reusable instances.
///
/// The free list is guarded by one coarse lock. `borrow` never fails: an empty
/// pool builds a new value through the factory.
pub struct ObjectPool<T> {
    factory: Factory<T>,
    reset: Option<ResetHook<T>>,
    max_idle: Option<usize>,
    state: Mutex<PoolState<T>>,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool that builds values with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            reset: None,
            max_idle: None,
            state: Mutex::new(PoolState {
                free: Vec::new(),
                outstanding: 0,
                high_water_mark: 0,
            }),
        }
    }

    /// Create a pool pre-filled with `prefill` instances.
    pub fn with_capacity<F>(factory: F, prefill: usize) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(factory).prefill(prefill)
    }

    /// Build `count` additional idle instances.
    #[must_use]
    pub fn prefill(self, count: usize) -> Self {
        {
            let mut state = self.state.lock();
            state.free.reserve(count);
            for _ in 0..count {
                state.free.push((self.factory)());
            }
        }
        self
    }

    /// Run `hook` on every value handed back before it is reused.
    #[must_use]
    pub fn with_reset_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&mut T) + Send + Sync + 'static,
    {
        self.reset = Some(Box::new(hook));
        self
    }

    /// Keep at most `limit` idle instances; extra returns are dropped.
    #[must_use]
    pub fn max_idle(mut self, limit: usize) -> Self {
        self.max_idle = Some(limit);
        self
    }

    /// Take an idle instance, or build one if none is available.
    pub fn borrow(&self) -> T {
        let recycled = {
            let mut state = self.state.lock();
            state.outstanding += 1;
            state.high_water_mark = state.high_water_mark.max(state.outstanding);
            state.free.pop()
        };

        recycled.unwrap_or_else(|| (self.factory)())
    }

    /// Return an instance to the pool, resetting it first.
    pub fn give_back(&self, mut item: T) {
        if let Some(reset) = &self.reset {
            reset(&mut item);
        }

        let mut state = self.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        if self.max_idle.is_some_and(|limit| state.free.len() >= limit) {
            drop(state);
            drop(item);
            return;
        }
        state.free.push(item);
    }

    /// Borrow an instance that is given back automatically when dropped.
    pub fn lease(&self) -> Pooled<'_, T> {
        Pooled {
            pool: self,
            value: Some(self.borrow()),
        }
    }

    /// Number of idle instances waiting for reuse.
    pub fn idle(&self) -> usize {
        self.state.lock().free.len()
    }

    /// Number of instances currently borrowed.
    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }

    /// Peak number of simultaneously borrowed instances.
    pub fn high_water_mark(&self) -> usize {
        self.state.lock().high_water_mark
    }
}

impl<T: Resettable + 'static> ObjectPool<T> {
    /// Create a pool whose values are reset through [`Resettable`] on return.
    pub fn resettable<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(factory).with_reset_hook(T::reset)
    }
}

impl<T: Default + Resettable + 'static> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::resettable(T::default)
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ObjectPool")
            .field("idle", &state.free.len())
            .field("outstanding", &state.outstanding)
            .field("high_water_mark", &state.high_water_mark)
            .field("max_idle", &self.max_idle)
            .field("resets", &self.reset.is_some())
            .finish()
    }
}

/// A borrowed value that returns to its pool on drop.
pub struct Pooled<'a, T> {
    pool: &'a ObjectPool<T>,
    value: Option<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `Drop` takes the value out.
        self.value.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.give_back(value);
        }
    }
}
