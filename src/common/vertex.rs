use super::approx_cmp;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// A grid cell. Identity is the coordinate pair only; ordering keys live in
// the open list entries, never on the vertex itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub const fn new(x: i32, y: i32) -> Self {
        Vertex { x, y }
    }

    /// Collision-free 64-bit id: `x` in the high half, `y` in the low half.
    pub fn id(&self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    pub fn from_id(id: u64) -> Self {
        Vertex {
            x: (id >> 32) as u32 as i32,
            y: id as u32 as i32,
        }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Vertex {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    pub fn is_diagonal_to(&self, other: &Vertex) -> bool {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dy = (self.y as i64 - other.y as i64).abs();
        dx + dy > 1
    }
}

impl From<(i32, i32)> for Vertex {
    fn from((x, y): (i32, i32)) -> Self {
        Vertex { x, y }
    }
}

impl From<[i32; 2]> for Vertex {
    fn from([x, y]: [i32; 2]) -> Self {
        Vertex { x, y }
    }
}

impl From<Vertex> for (i32, i32) {
    fn from(v: Vertex) -> Self {
        (v.x, v.y)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// Queue priority. `k1` is compared with the shared tolerance, `k2` exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub k1: f64,
    pub k2: f64,
}

impl Key {
    pub const fn new(k1: f64, k2: f64) -> Self {
        Key { k1, k2 }
    }

    pub fn lt(&self, other: &Key) -> bool {
        self.order(other) == Ordering::Less
    }

    pub fn gt(&self, other: &Key) -> bool {
        self.order(other) == Ordering::Greater
    }

    pub fn order(&self, other: &Key) -> Ordering {
        approx_cmp(self.k1, other.k1).then_with(|| self.k2.total_cmp(&other.k2))
    }

    /// True when both components match under the planner tolerance.
    pub fn same(&self, other: &Key) -> bool {
        approx_cmp(self.k1, other.k1) == Ordering::Equal
            && approx_cmp(self.k2, other.k2) == Ordering::Equal
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5}, {:.5}]", self.k1, self.k2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id_round_trips_signed_coordinates() {
        for (x, y) in [(0, 0), (-1, 0), (0, -1), (i32::MIN, i32::MAX), (34245, -7)] {
            let v = Vertex::new(x, y);
            assert_eq!(Vertex::from_id(v.id()), v);
        }
    }

    #[test]
    fn test_vertex_id_has_no_linear_collisions() {
        // x + 34245 * y collides for these two; packed ids must not.
        let a = Vertex::new(34245, 0);
        let b = Vertex::new(0, 1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_diagonal() {
        let v = Vertex::new(2, 2);
        assert!(v.is_diagonal_to(&Vertex::new(3, 3)));
        assert!(v.is_diagonal_to(&Vertex::new(1, 3)));
        assert!(!v.is_diagonal_to(&Vertex::new(2, 3)));
        assert!(!v.is_diagonal_to(&Vertex::new(1, 2)));
    }

    #[test]
    fn test_key_order_uses_tolerance_on_first_component() {
        let a = Key::new(10.0, 5.0);
        let b = Key::new(10.0 + 1e-7, 4.0);
        // k1 ties, so k2 decides.
        assert!(b.lt(&a));
        assert!(a.gt(&b));

        let c = Key::new(10.1, 0.0);
        assert!(a.lt(&c));
        assert!(!c.lt(&a));
    }

    #[test]
    fn test_key_same() {
        let a = Key::new(3.0, 1.0);
        assert!(a.same(&Key::new(3.0 + 1e-7, 1.0 - 1e-7)));
        assert!(!a.same(&Key::new(3.0, 2.0)));
        let inf = Key::new(f64::INFINITY, f64::INFINITY);
        assert!(inf.same(&inf));
    }
}
