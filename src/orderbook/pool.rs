use tracing::trace;

/// A value that can be recycled through an [`ObjectPool`].
pub trait Poolable: Default {
    /// Returns the value to its released state.
    fn reset(&mut self);
}

/// Free list of reusable values, used to keep allocations off the update path.
///
/// `borrow` hands out a spare value or creates a new one when the free list is empty;
/// `release` resets a value and stores it for the next `borrow`. The pool never shrinks
/// and grows its free list by doubling. Values are moved in and out, so a released
/// value can no longer be reached by the caller.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    created: usize,
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates a pool pre-filled with `initial_size` spare values.
    pub fn new(initial_size: usize) -> Self {
        let mut free = Vec::with_capacity(initial_size.max(1));
        free.resize_with(initial_size, T::default);
        ObjectPool {
            free,
            created: initial_size,
        }
    }

    /// Takes a value from the pool, creating one if none is spare.
    #[inline]
    pub fn borrow(&mut self) -> T {
        self.free.pop().unwrap_or_else(|| {
            self.created += 1;
            T::default()
        })
    }

    /// Resets `value` and returns it to the pool.
    #[inline]
    pub fn release(&mut self, mut value: T) {
        value.reset();
        if self.free.len() == self.free.capacity() {
            let additional = self.free.capacity().max(1);
            trace!(
                "Object pool: growing free list from {} to {}",
                self.free.capacity(),
                self.free.capacity() + additional
            );
            self.free.reserve_exact(additional);
        }
        self.free.push(value);
    }

    /// Returns every value yielded by `values` to the pool.
    pub fn release_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.release(value);
        }
    }

    /// Number of spare values.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of values this pool has ever created.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Number of values currently handed out.
    pub fn borrowed(&self) -> usize {
        self.created.saturating_sub(self.free.len())
    }
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new(0)
    }
}
