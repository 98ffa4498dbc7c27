//! Intrusive doubly-linked-list access order, used by the node cache to
//! pick an eviction victim in O(1).

use std::collections::HashMap;

/// Tracks access order over a set of block ids (by raw `u64` value) without
/// owning the cached values themselves.
pub struct LruOrder {
    positions: HashMap<u64, usize>,
    slots: Vec<LruSlot>,
    head: Option<usize>,
    tail: Option<usize>,
    free_slots: Vec<usize>,
}

#[derive(Clone, Copy)]
struct LruSlot {
    id: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

impl LruOrder {
    /// Create a new, empty access-order tracker with room for `capacity`
    /// entries before it needs to grow its backing storage.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_slots: Vec::new(),
        }
    }

    /// Record an access to `id`, making it the most recently used entry.
    pub fn touch(&mut self, id: u64) {
        if let Some(&pos) = self.positions.get(&id) {
            self.move_to_front(pos);
        } else {
            self.insert(id);
        }
    }

    /// Remove `id` from the access order, if present.
    pub fn remove(&mut self, id: u64) {
        if let Some(pos) = self.positions.remove(&id) {
            self.unlink(pos);
            self.free_slots.push(pos);
        }
    }

    /// The least recently used id, if any.
    pub fn least_recently_used(&self) -> Option<u64> {
        self.tail.map(|pos| self.slots[pos].id)
    }

    /// All ids currently tracked, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.positions.keys().copied()
    }

    fn insert(&mut self, id: u64) {
        let pos = if let Some(pos) = self.free_slots.pop() {
            self.slots[pos] = LruSlot {
                id,
                prev: None,
                next: self.head,
            };
            pos
        } else {
            let pos = self.slots.len();
            self.slots.push(LruSlot {
                id,
                prev: None,
                next: self.head,
            });
            pos
        };

        if let Some(old_head) = self.head {
            self.slots[old_head].prev = Some(pos);
        }
        self.head = Some(pos);
        if self.tail.is_none() {
            self.tail = Some(pos);
        }
        self.positions.insert(id, pos);
    }

    fn move_to_front(&mut self, pos: usize) {
        if self.head == Some(pos) {
            return;
        }
        self.unlink(pos);
        self.slots[pos].prev = None;
        self.slots[pos].next = self.head;
        if let Some(old_head) = self.head {
            self.slots[old_head].prev = Some(pos);
        }
        self.head = Some(pos);
        if self.tail.is_none() {
            self.tail = Some(pos);
        }
    }

    fn unlink(&mut self, pos: usize) {
        let slot = self.slots[pos];
        match slot.prev {
            Some(prev) => self.slots[prev].next = slot.next,
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next) => self.slots[next].prev = slot.prev,
            None => self.tail = slot.prev,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.positions.len()
    }
}
