use super::{Key, Vertex};

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::trace;

// Heap entry. Ordering is reversed so `BinaryHeap` pops the smallest key.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    key: Key,
    vertex: Vertex,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .order(&self.key)
            // Same key: lower coordinate first, keeps expansion order reproducible.
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

// Heap never shrinks on its own; once stale entries outnumber live ones by
// this factor it is rebuilt from the validity index.
const REBUILD_FACTOR: usize = 4;
const REBUILD_MIN_HEAP: usize = 1024;

/// Min-priority open list with lazy deletion.
///
/// Re-inserting a vertex pushes a new heap entry and overwrites the vertex's
/// slot in the validity index; the older entry becomes stale and is dropped
/// when it reaches the top. Removal only touches the index.
#[derive(Debug, Default)]
pub struct OpenList {
    heap: BinaryHeap<OpenEntry>,
    // Packed coordinate -> key used at the latest insertion.
    valid: HashMap<u64, Key>,
}

impl OpenList {
    pub fn new() -> Self {
        OpenList {
            heap: BinaryHeap::new(),
            valid: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        OpenList {
            heap: BinaryHeap::with_capacity(capacity),
            valid: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, vertex: Vertex, key: Key) {
        self.valid.insert(vertex.id(), key);
        self.heap.push(OpenEntry { key, vertex });
        self.maybe_rebuild();
    }

    /// Logically removes `vertex`. Returns whether it was open.
    pub fn remove(&mut self, vertex: Vertex) -> bool {
        self.valid.remove(&vertex.id()).is_some()
    }

    pub fn contains(&self, vertex: Vertex) -> bool {
        self.valid.contains_key(&vertex.id())
    }

    pub fn is_valid(&self, vertex: Vertex, key: &Key) -> bool {
        self.valid
            .get(&vertex.id())
            .is_some_and(|indexed| indexed.same(key))
    }

    /// Raw heap minimum, possibly stale.
    pub fn peek(&self) -> Option<(Vertex, Key)> {
        self.heap.peek().map(|entry| (entry.vertex, entry.key))
    }

    /// Raw heap extraction, possibly stale.
    pub fn poll(&mut self) -> Option<(Vertex, Key)> {
        self.heap.pop().map(|entry| (entry.vertex, entry.key))
    }

    /// Extracts the minimum entry that is still valid, discarding stale ones.
    /// The vertex stays in the validity index until `remove` is called.
    pub fn poll_valid(&mut self) -> Option<(Vertex, Key)> {
        while let Some((vertex, key)) = self.poll() {
            if self.is_valid(vertex, &key) {
                return Some((vertex, key));
            }
            trace!("discard stale entry {vertex} {key}");
        }
        None
    }

    /// Smallest valid key, pruning stale entries off the top of the heap.
    pub fn top_key(&mut self) -> Option<Key> {
        while let Some(entry) = self.heap.peek() {
            if self.is_valid(entry.vertex, &entry.key) {
                return Some(entry.key);
            }
            self.heap.pop();
        }
        None
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.valid.clear();
    }

    /// Number of logically open vertices.
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Physical heap size, stale entries included.
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    fn maybe_rebuild(&mut self) {
        if self.heap.len() < REBUILD_MIN_HEAP
            || self.heap.len() <= self.valid.len() * REBUILD_FACTOR
        {
            return;
        }
        trace!(
            "rebuild open list: {} entries, {} live",
            self.heap.len(),
            self.valid.len()
        );
        let entries: Vec<_> = self
            .valid
            .iter()
            .map(|(id, key)| OpenEntry {
                key: *key,
                vertex: Vertex::from_id(*id),
            })
            .collect();
        self.heap = BinaryHeap::from(entries);
    }
}
