//! Axial hex-coordinate helpers: canonical ring traversal and neighbor lookup.
//!
//! Coordinates are [`hexx::Hex`] values read as axial `(q, r)` = `(x, y)`.
//! The traversal order defined here fixes the sequential cell ids, so it must
//! never change once a planet has been persisted.

use hexx::Hex;

use crate::math;

/// Axial direction vectors in canonical ring-walk order.
///
/// A ring of radius `n` starts at `RING_DIRECTIONS[4] * n` and walks each of
/// these directions `n` steps in turn.
pub const RING_DIRECTIONS: [Hex; 6] = [
    Hex::new(1, 0),
    Hex::new(1, -1),
    Hex::new(0, -1),
    Hex::new(-1, 0),
    Hex::new(-1, 1),
    Hex::new(0, 1),
];

/// Index into [`RING_DIRECTIONS`] of the ring's starting corner.
const RING_START_DIRECTION: usize = 4;

fn scale(dir: Hex, factor: i32) -> Hex {
    Hex::new(dir.x * factor, dir.y * factor)
}

/// Coordinates at exactly `radius` steps from the origin, in canonical order.
///
/// Radius 0 is the single origin cell; any other radius yields `6 * radius`
/// coordinates.
pub fn ring(radius: u32) -> Vec<Hex> {
    if radius == 0 {
        return vec![Hex::ZERO];
    }
    let steps = radius as i32;
    let mut out = Vec::with_capacity(math::cells_in_ring(radius) as usize);
    let mut hex = scale(RING_DIRECTIONS[RING_START_DIRECTION], steps);
    for dir in RING_DIRECTIONS {
        for _ in 0..radius {
            out.push(hex);
            hex += dir;
        }
    }
    out
}

/// All coordinates of a disk of `max_radius`, ring 0 first.
///
/// The n-th item (1-based) is the coordinate of cell id n.
pub fn spiral(max_radius: u32) -> impl Iterator<Item = Hex> {
    (0..=max_radius).flat_map(ring)
}

/// The six axial neighbors of `hex`, in [`RING_DIRECTIONS`] order.
pub fn neighbors(hex: Hex) -> [Hex; 6] {
    RING_DIRECTIONS.map(|dir| hex + dir)
}

/// Ring index (hex distance from the origin) of `hex`.
pub fn ring_of(hex: Hex) -> u32 {
    hex.ulength()
}

/// Coordinate that the 1-based cell `id` takes in the canonical spiral.
///
/// Only meaningful for maps that were generated without gaps. Returns `None`
/// for id 0.
pub fn canonical_coordinate(id: u32) -> Option<Hex> {
    if id == 0 {
        return None;
    }
    let radius = math::radius_containing_cell(id);
    let before = if radius == 0 {
        0
    } else {
        math::cells_in_radius(radius - 1)
    };
    let index = (u64::from(id) - before - 1) as usize;
    ring(radius).get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // ── ring ────────────────────────────────────────────────────────

    #[test]
    fn ring_zero_is_origin() {
        assert_eq!(ring(0), vec![Hex::ZERO]);
    }

    #[test]
    fn ring_one_follows_canonical_walk() {
        let expected = vec![
            Hex::new(-1, 1),
            Hex::new(0, 1),
            Hex::new(1, 0),
            Hex::new(1, -1),
            Hex::new(0, -1),
            Hex::new(-1, 0),
        ];
        assert_eq!(ring(1), expected);
    }

    #[test]
    fn ring_lengths_and_distances() {
        for radius in 1..8 {
            let cells = ring(radius);
            assert_eq!(cells.len(), 6 * radius as usize);
            assert!(cells.iter().all(|h| ring_of(*h) == radius));
            let unique: HashSet<Hex> = cells.iter().copied().collect();
            assert_eq!(unique.len(), cells.len(), "ring {radius} repeats a cell");
        }
    }

    #[test]
    fn ring_starts_at_direction_four_corner() {
        assert_eq!(ring(3)[0], Hex::new(-3, 3));
    }

    // ── spiral ──────────────────────────────────────────────────────

    #[test]
    fn spiral_covers_hexagon_shape() {
        let ours: HashSet<Hex> = spiral(5).collect();
        let theirs: HashSet<Hex> = hexx::shapes::hexagon(Hex::ZERO, 5).collect();
        assert_eq!(ours, theirs);
    }

    // ── neighbors ───────────────────────────────────────────────────

    #[test]
    fn neighbors_are_one_step_away() {
        let hex = Hex::new(2, -1);
        for n in neighbors(hex) {
            assert_eq!(hex.unsigned_distance_to(n), 1);
        }
    }

    // ── canonical_coordinate ────────────────────────────────────────

    #[test]
    fn canonical_coordinate_matches_spiral_order() {
        for (i, hex) in spiral(4).enumerate() {
            assert_eq!(canonical_coordinate(i as u32 + 1), Some(hex));
        }
    }

    #[test]
    fn canonical_coordinate_of_largest_id() {
        let hex = canonical_coordinate(u32::MAX).unwrap();
        assert_eq!(ring_of(hex), math::radius_containing_cell(u32::MAX));
    }

    #[test]
    fn canonical_coordinate_rejects_zero() {
        assert!(canonical_coordinate(0).is_none());
    }
}
