//! Insertion-ordered registry with O(1) keyed access.
//!
//! Entries live in an arena of slots addressed by stable indices. A hash index
//! maps each key to its slot, and every occupied slot carries the indices of
//! its neighbours in insertion order, so the order chain is an intrusive
//! doubly linked list without pointer ownership:
//!
//! ```text
//!  index: "a" -> 0, "c" -> 2, "d" -> 1
//!
//!  slots: [0] a  prev=-  next=2
//!         [1] d  prev=2  next=-     head=0  tail=1
//!         [2] c  prev=0  next=1
//!         [3] (vacant)              free=3
//! ```
//!
//! - `set` on a known key replaces the value in place (position unchanged)
//! - `set` on a new key appends at the tail, reusing a vacant slot if any
//! - `remove` unlinks the slot and pushes it on the free list
//!
//! Windowed iteration walks the chain from the head, so reaching the window
//! costs O(start) and visiting it costs O(size).

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;

/// An occupied slot: the entry plus its links in the order chain.
struct Entry<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

enum Slot<K, V> {
    Occupied(Entry<K, V>),
    /// Vacated slot, linked into the free list.
    Vacant { next_free: Option<usize> },
}

/// Keyed container that preserves insertion order.
///
/// At most one entry exists per key. Updating a key keeps its position;
/// removing it drops the position for good, and a later `set` of the same key
/// appends at the tail.
pub struct OrderedRegistry<K, V> {
    slots: Vec<Slot<K, V>>,
    index: AHashMap<K, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Option<usize>,
    len: usize,
}

impl<K, V> OrderedRegistry<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: AHashMap::new(),
            head: None,
            tail: None,
            free: None,
            len: 0,
        }
    }

    /// Insert or update the value for `key`.
    ///
    /// Returns the previous value when the key was already present, in which
    /// case the entry keeps its position.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entry_mut(idx).value, value));
        }

        let idx = self.alloc(Entry {
            key: key.clone(),
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.entry_mut(tail).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.index.insert(key, idx);
        self.len += 1;
        None
    }

    /// Remove the entry for `key`, returning its value. Unknown keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        Some(self.detach(idx).value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        Some(&self.entry(idx).value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        Some(&mut self.entry_mut(idx).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Iterate over at most `size` entries, starting at the `start`-th live
    /// entry in insertion order. Empty if fewer than `start` entries exist.
    pub fn window(&self, start: usize, size: usize) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.iter().skip(start).take(size)
    }

    /// Invoke `visit` for each entry of the window described by `start` and
    /// `size`. See [`OrderedRegistry::window`].
    pub fn iterate<F>(&self, start: usize, size: usize, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.window(start, size) {
            visit(key, value);
        }
    }

    /// Keep only the entries for which `keep` returns true.
    ///
    /// Survivors keep their relative order. Returns the number of entries
    /// removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut removed = 0;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let retained = {
                let entry = self.entry_mut(idx);
                cursor = entry.next;
                keep(&entry.key, &mut entry.value)
            };
            if !retained {
                let entry = self.detach(idx);
                self.index.remove(&entry.key);
                removed += 1;
            }
        }
        removed
    }

    fn alloc(&mut self, entry: Entry<K, V>) -> usize {
        match self.free {
            Some(idx) => {
                self.free = match self.slots[idx] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.slots[idx] = Slot::Occupied(entry);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(entry));
                self.slots.len() - 1
            }
        }
    }

    /// Unlink the entry at `idx` from the order chain and vacate its slot.
    /// The caller is responsible for the hash index.
    fn detach(&mut self, idx: usize) -> Entry<K, V> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        let entry = match std::mem::replace(&mut self.slots[idx], vacant) {
            Slot::Occupied(entry) => entry,
            Slot::Vacant { .. } => unreachable!("index points at a vacant slot"),
        };

        match entry.prev {
            Some(prev) => self.entry_mut(prev).next = entry.next,
            None => self.head = entry.next,
        }
        match entry.next {
            Some(next) => self.entry_mut(next).prev = entry.prev,
            None => self.tail = entry.prev,
        }

        self.free = Some(idx);
        self.len -= 1;
        entry
    }

    #[inline]
    fn entry(&self, idx: usize) -> &Entry<K, V> {
        match &self.slots[idx] {
            Slot::Occupied(entry) => entry,
            Slot::Vacant { .. } => unreachable!("index points at a vacant slot"),
        }
    }

    #[inline]
    fn entry_mut(&mut self, idx: usize) -> &mut Entry<K, V> {
        match &mut self.slots[idx] {
            Slot::Occupied(entry) => entry,
            Slot::Vacant { .. } => unreachable!("index points at a vacant slot"),
        }
    }
}

impl<K, V> Default for OrderedRegistry<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OrderedRegistry<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// In-order iterator over an [`OrderedRegistry`].
pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        match &self.slots[idx] {
            Slot::Occupied(entry) => {
                self.cursor = entry.next;
                self.remaining -= 1;
                Some((&entry.key, &entry.value))
            }
            Slot::Vacant { .. } => unreachable!("order chain points at a vacant slot"),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
