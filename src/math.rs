//! Pure computation helpers extracted for testability.
//!
//! Closed forms for hex-disk sizes and the ring count warranted by a roster.
//! Nothing here touches coordinates or randomness.

/// Number of cells on ring `radius` (the origin counts as a ring of one).
///
/// # Examples
/// ```
/// # use crusade_map::math::cells_in_ring;
/// assert_eq!(cells_in_ring(0), 1);
/// assert_eq!(cells_in_ring(3), 18);
/// ```
pub fn cells_in_ring(radius: u32) -> u64 {
    if radius == 0 { 1 } else { 6 * u64::from(radius) }
}

/// Number of cells in a full disk of `radius` rings: `1 + 3R(R+1)`.
///
/// Computed in `u64`, saturating for radii far beyond any `u32` cell id.
///
/// # Examples
/// ```
/// # use crusade_map::math::cells_in_radius;
/// assert_eq!(cells_in_radius(0), 1);
/// assert_eq!(cells_in_radius(1), 7);
/// assert_eq!(cells_in_radius(2), 19);
/// assert_eq!(cells_in_radius(3), 37);
/// ```
pub fn cells_in_radius(radius: u32) -> u64 {
    let radius = u64::from(radius);
    (3 * radius).saturating_mul(radius + 1).saturating_add(1)
}

/// Radius of a complete disk holding exactly `count` cells.
///
/// Returns `None` when `count` is zero or falls between two closed-form sizes.
pub fn radius_for_cell_count(count: u32) -> Option<u32> {
    if count == 0 {
        return None;
    }
    let radius = radius_containing_cell(count);
    (cells_in_radius(radius) == u64::from(count)).then_some(radius)
}

/// Ring on which the 1-based cell `id` lands in the canonical spiral.
///
/// This is the first radius whose disk covers `id`; for `u32::MAX` that is
/// radius 37837.
pub fn radius_containing_cell(id: u32) -> u32 {
    let id = u64::from(id);
    let mut radius = 0;
    while cells_in_radius(radius) < id {
        radius += 1;
    }
    radius
}

/// Smallest ring count whose disk offers `hexes_per_player` cells per player.
///
/// An empty roster still warrants the single center cell (radius 0). Demand
/// beyond `u32::MAX` cells is capped there.
pub fn rings_for_players(players: u32, hexes_per_player: u32) -> u32 {
    radius_containing_cell(players.saturating_mul(hexes_per_player))
}
