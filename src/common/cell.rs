use super::{close, Vertex};

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellInfo {
    pub g: f64,
    pub rhs: f64,
    // Negative marks an obstacle.
    pub cost: f64,
}

impl CellInfo {
    pub fn seeded(estimate: f64, cost: f64) -> Self {
        CellInfo {
            g: estimate,
            rhs: estimate,
            cost,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        self.cost < 0.0
    }

    pub fn is_consistent(&self) -> bool {
        close(self.g, self.rhs)
    }
}

// Sparse per-cell search state, keyed by the packed coordinate id. Records
// are created lazily and mutated in place.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    cells: HashMap<u64, CellInfo>,
}

impl CellStore {
    pub fn new() -> Self {
        CellStore {
            cells: HashMap::new(),
        }
    }

    pub fn get(&self, v: Vertex) -> Option<&CellInfo> {
        self.cells.get(&v.id())
    }

    pub fn get_mut(&mut self, v: Vertex) -> Option<&mut CellInfo> {
        self.cells.get_mut(&v.id())
    }

    pub fn insert(&mut self, v: Vertex, info: CellInfo) {
        self.cells.insert(v.id(), info);
    }

    /// Returns the record for `v`, creating it with `seed` if absent.
    pub fn get_or_insert_with<F>(&mut self, v: Vertex, seed: F) -> &mut CellInfo
    where
        F: FnOnce() -> CellInfo,
    {
        self.cells.entry(v.id()).or_insert_with(seed)
    }

    pub fn is_obstacle(&self, v: Vertex) -> bool {
        self.get(v).is_some_and(CellInfo::is_obstacle)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Vertex, &CellInfo)> {
        self.cells.iter().map(|(id, info)| (Vertex::from_id(*id), info))
    }

    /// Cells whose traversal cost differs from `default_cost`, sorted by
    /// coordinate so replays are deterministic.
    pub fn edited_costs(&self, default_cost: f64) -> Vec<(Vertex, f64)> {
        let mut edited: Vec<_> = self
            .iter()
            .filter(|(_, info)| !close(info.cost, default_cost))
            .map(|(v, info)| (v, info.cost))
            .collect();
        edited.sort_by_key(|(v, _)| *v);
        edited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation_keeps_existing_record() {
        let mut store = CellStore::new();
        let v = Vertex::new(-3, 4);
        store.get_or_insert_with(v, || CellInfo::seeded(5.0, 1.0)).cost = 7.0;
        let info = store.get_or_insert_with(v, || CellInfo::seeded(0.0, 1.0));
        assert_eq!(info.cost, 7.0);
        assert_eq!(info.g, 5.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_in_place_mutation_persists() {
        let mut store = CellStore::new();
        let v = Vertex::new(1, 1);
        store.insert(v, CellInfo::seeded(2.0, 1.0));
        if let Some(info) = store.get_mut(v) {
            info.rhs = 9.0;
        }
        assert_eq!(store.get(v).map(|info| info.rhs), Some(9.0));
        assert!(!store.get(v).unwrap().is_consistent());
    }

    #[test]
    fn test_edited_costs() {
        let mut store = CellStore::new();
        store.insert(Vertex::new(3, 3), CellInfo::seeded(0.0, -1.0));
        store.insert(Vertex::new(0, 0), CellInfo::seeded(0.0, 1.0));
        store.insert(Vertex::new(2, 2), CellInfo::seeded(0.0, 42.432));
        let edited = store.edited_costs(1.0);
        assert_eq!(
            edited,
            vec![(Vertex::new(2, 2), 42.432), (Vertex::new(3, 3), -1.0)]
        );
        assert!(store.is_obstacle(Vertex::new(3, 3)));
        assert!(!store.is_obstacle(Vertex::new(2, 2)));
        assert!(!store.is_obstacle(Vertex::new(9, 9)));
    }
}
