mod cell;
mod open_list;
mod vertex;

pub use cell::{CellInfo, CellStore};
pub use open_list::OpenList;
pub use vertex::{Key, Vertex};

use std::cmp::Ordering;
use std::f64::consts::SQRT_2;

// Every float comparison in the planner goes through `close` / `approx_cmp`.
// Ordering, consistency and validity checks must agree on this tolerance or
// the search loop may never terminate.
pub const EPSILON: f64 = 0.00001;

/// Tolerant equality. Two positive infinities are equal.
pub fn close(a: f64, b: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a.signum() == b.signum();
    }
    (a - b).abs() < EPSILON
}

/// Tolerant three-way comparison, `Equal` whenever `close(a, b)` holds.
pub fn approx_cmp(a: f64, b: f64) -> Ordering {
    if close(a, b) {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Octile distance on the 8-connected lattice, assuming unit orthogonal and
/// `sqrt(2)` diagonal steps.
pub fn octile_distance(a: Vertex, b: Vertex) -> f64 {
    let dx = (a.x as f64 - b.x as f64).abs();
    let dy = (a.y as f64 - b.y as f64).abs();
    let (min, max) = if dx < dy { (dx, dy) } else { (dy, dx) };
    (SQRT_2 - 1.0) * min + max
}

pub fn euclidean_distance(a: Vertex, b: Vertex) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    (dx * dx + dy * dy).sqrt()
}

// Counter-clockwise starting east.
pub(crate) const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
