//! Index-addressed entity pool with a free list
//!
//! Slots are never deallocated. A retired entity's slot index goes onto the
//! free list and the next spawn overwrites it in place, so the hot per-tick
//! path stops allocating once the pool has warmed up.

/// Arena of `T` split into an ordered active list and a free list
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
    /// Active slot indices in spawn order
    active: Vec<usize>,
    /// Retired slot indices, most recently retired last
    free: Vec<usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Activate `entity`, reusing a retired slot if one is available.
    /// Returns the slot index.
    pub fn spawn(&mut self, entity: T) -> usize {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = entity;
                index
            }
            None => {
                self.slots.push(entity);
                self.slots.len() - 1
            }
        };
        self.active.push(index);
        index
    }

    /// Run `keep` on every active entity in spawn order; entities for which it
    /// returns `false` are retired to the free list.
    pub fn retain_active(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        let Self {
            slots,
            active,
            free,
        } = self;
        active.retain(|&index| {
            if keep(&mut slots[index]) {
                true
            } else {
                free.push(index);
                false
            }
        });
    }

    /// Retire every active entity
    pub fn recycle_all(&mut self) {
        self.free.extend(self.active.drain(..));
    }

    /// Active entities with their slot indices, in spawn order
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.active.iter().map(|&index| (index, &self.slots[index]))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
