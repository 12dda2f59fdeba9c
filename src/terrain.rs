//! Terrain states and the per-cell assignment policy.
//!
//! The policy gives the map spatial correlation: a ring cell usually copies
//! the dominant terrain of the neighbors generated before it, otherwise it
//! draws uniformly from [`TerrainState::ALL`].

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AllianceId;
use crate::generator::MapError;

/// Terrain label of a hex cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainState {
    /// Forest.
    Forest,
    /// Tundra.
    Tundra,
    /// Desert.
    Desert,
    /// Poisoned lands.
    PoisonedLands,
    /// Factory district.
    Factory,
    /// Intact city.
    City,
    /// Ruined city.
    RuinedCity,
    /// Underground systems.
    UndergroundSystems,
    /// Ship wreckage.
    ShipWreckage,
    /// Junkyard.
    Junkyard,
    /// Temple quarter.
    TempleQuarter,
    /// Warp-altered space.
    WarpAlteredSpace,
}

impl TerrainState {
    /// Every terrain state, in a fixed order used for uniform draws.
    pub const ALL: [TerrainState; 12] = [
        Self::Forest,
        Self::Tundra,
        Self::Desert,
        Self::PoisonedLands,
        Self::Factory,
        Self::City,
        Self::RuinedCity,
        Self::UndergroundSystems,
        Self::ShipWreckage,
        Self::Junkyard,
        Self::TempleQuarter,
        Self::WarpAlteredSpace,
    ];

    /// Stable storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forest => "forest",
            Self::Tundra => "tundra",
            Self::Desert => "desert",
            Self::PoisonedLands => "poisoned_lands",
            Self::Factory => "factory",
            Self::City => "city",
            Self::RuinedCity => "ruined_city",
            Self::UndergroundSystems => "underground_systems",
            Self::ShipWreckage => "ship_wreckage",
            Self::Junkyard => "junkyard",
            Self::TempleQuarter => "temple_quarter",
            Self::WarpAlteredSpace => "warp_altered_space",
        }
    }

    /// Uniform draw over [`TerrainState::ALL`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for TerrainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored terrain name is not one of [`TerrainState::ALL`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown terrain state {0:?}")]
pub struct UnknownTerrain(pub String);

impl FromStr for TerrainState {
    type Err = UnknownTerrain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTerrain(s.to_string()))
    }
}

/// Most common state, first-encountered winning ties.
pub fn majority(states: impl IntoIterator<Item = TerrainState>) -> Option<TerrainState> {
    let mut counts: Vec<(TerrainState, usize)> = Vec::new();
    for state in states {
        match counts.iter_mut().find(|(t, _)| *t == state) {
            Some((_, n)) => *n += 1,
            None => counts.push((state, 1)),
        }
    }
    counts
        .into_iter()
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
        .map(|(state, _)| state)
}

/// Assignment rules for terrain, warehouse and patron of a new cell.
///
/// Random draws happen in a fixed order per cell (terrain, warehouse, patron)
/// so that a seeded generator reproduces the same map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainPolicy {
    copy_neighbor_probability: f64,
    warehouse_probability: f64,
}

impl TerrainPolicy {
    /// Builds a policy, rejecting probabilities outside `[0, 1]`.
    pub fn new(
        copy_neighbor_probability: f64,
        warehouse_probability: f64,
    ) -> Result<Self, MapError> {
        for (name, value) in [
            ("copy_neighbor_probability", copy_neighbor_probability),
            ("warehouse_probability", warehouse_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MapError::InvalidProbability { name, value });
            }
        }
        Ok(Self {
            copy_neighbor_probability,
            warehouse_probability,
        })
    }

    /// Chance that a ring cell copies its neighbors' majority terrain.
    pub fn copy_neighbor_probability(&self) -> f64 {
        self.copy_neighbor_probability
    }

    /// Chance that a cell holds a warehouse.
    pub fn warehouse_probability(&self) -> f64 {
        self.warehouse_probability
    }

    /// Terrain for a cell on ring `radius` given its already-generated neighbors.
    pub fn pick_terrain<R: Rng + ?Sized>(
        &self,
        radius: u32,
        neighbors: &[TerrainState],
        rng: &mut R,
    ) -> TerrainState {
        let copy = radius > 0 && rng.gen_bool(self.copy_neighbor_probability);
        match majority(neighbors.iter().copied()) {
            Some(state) if copy => state,
            _ => TerrainState::random(rng),
        }
    }

    /// Independent warehouse roll.
    pub fn roll_warehouse<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen_bool(self.warehouse_probability)
    }

    /// Uniform patron from the roster; `None` only for an empty roster.
    pub fn pick_patron<R: Rng + ?Sized>(
        &self,
        alliance_ids: &[AllianceId],
        rng: &mut R,
    ) -> Option<AllianceId> {
        alliance_ids.choose(rng).copied()
    }
}

impl Default for TerrainPolicy {
    fn default() -> Self {
        Self {
            copy_neighbor_probability: 0.5,
            warehouse_probability: 0.1,
        }
    }
}
