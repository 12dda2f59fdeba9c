//! Hex planet generation: initial disk and ring-by-ring expansion.
//!
//! Both passes walk the canonical spiral from [`crate::hex`], so a seeded
//! generator yields identical ids, coordinates and edges on every run. The
//! generator never touches storage; callers persist the returned
//! [`MapBatch`] atomically.

use rand::Rng;
use thiserror::Error;

use crate::AllianceId;
use crate::config::GeneratorSettings;
use crate::hex;
use crate::map::{HexCell, HexEdge, HexMap, MapBatch, derive_edges};
use crate::terrain::{TerrainPolicy, TerrainState};

/// Failures of a generation or expansion pass.
#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    /// The alliance roster is empty, so no patron can be assigned.
    #[error("invalid input: no alliances to draw patrons from")]
    NoAlliances,
    /// A policy probability lies outside `[0, 1]`.
    #[error("invalid input: {name} = {value} is not a probability")]
    InvalidProbability {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Existing cells or edges break the map invariants.
    #[error("inconsistent map: {0}")]
    InconsistentMap(String),
}

/// Builds and grows planet maps under a [`TerrainPolicy`].
#[derive(Debug, Clone, Default)]
pub struct HexPlanetGenerator {
    policy: TerrainPolicy,
}

impl HexPlanetGenerator {
    /// Generator using `policy`.
    pub fn new(policy: TerrainPolicy) -> Self {
        Self { policy }
    }

    /// Generator configured from settings, validating the probabilities.
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, MapError> {
        let policy = TerrainPolicy::new(
            settings.copy_neighbor_probability,
            settings.warehouse_probability,
        )?;
        Ok(Self::new(policy))
    }

    /// Active assignment policy.
    pub fn policy(&self) -> &TerrainPolicy {
        &self.policy
    }

    /// Generates a fresh disk of `ring_count` rings around the center.
    ///
    /// Cells get ids `1..=1 + 3R(R+1)`; every adjacent pair gets one edge.
    pub fn generate_initial_map<R: Rng + ?Sized>(
        &self,
        ring_count: u32,
        alliance_ids: &[AllianceId],
        rng: &mut R,
    ) -> Result<MapBatch, MapError> {
        if alliance_ids.is_empty() {
            return Err(MapError::NoAlliances);
        }
        let batch = self.grow(HexMap::default(), ring_count, alliance_ids, rng)?;
        tracing::debug!(
            target: "crusade_map::generator",
            ring_count,
            cells = batch.cells.len(),
            edges = batch.edges.len(),
            "generator.initial.complete"
        );
        Ok(batch)
    }

    /// Extends persisted cells and edges out to `target_ring_count` rings.
    ///
    /// Returns only the new cells and the edges touching them. A target at or
    /// below the current ring count is a no-op.
    pub fn expand_map<R: Rng + ?Sized>(
        &self,
        existing_cells: &[HexCell],
        existing_edges: &[HexEdge],
        target_ring_count: u32,
        alliance_ids: &[AllianceId],
        rng: &mut R,
    ) -> Result<MapBatch, MapError> {
        let map = HexMap::from_parts(existing_cells.to_vec(), existing_edges.to_vec())?;
        self.expand(&map, target_ring_count, alliance_ids, rng)
    }

    /// [`HexPlanetGenerator::expand_map`] over an already indexed map.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        map: &HexMap,
        target_ring_count: u32,
        alliance_ids: &[AllianceId],
        rng: &mut R,
    ) -> Result<MapBatch, MapError> {
        if let Some(current) = map.ring_count().filter(|&c| target_ring_count <= c) {
            tracing::debug!(
                target: "crusade_map::generator",
                current,
                target_ring_count,
                "generator.expand.noop"
            );
            return Ok(MapBatch::default());
        }
        if alliance_ids.is_empty() {
            return Err(MapError::NoAlliances);
        }
        let batch = self.grow(map.clone(), target_ring_count, alliance_ids, rng)?;
        tracing::debug!(
            target: "crusade_map::generator",
            from = ?map.ring_count(),
            to = target_ring_count,
            cells = batch.cells.len(),
            edges = batch.edges.len(),
            "generator.expand.complete"
        );
        Ok(batch)
    }

    /// Fills every spiral coordinate up to `ring_count` missing from `working`.
    fn grow<R: Rng + ?Sized>(
        &self,
        mut working: HexMap,
        ring_count: u32,
        alliance_ids: &[AllianceId],
        rng: &mut R,
    ) -> Result<MapBatch, MapError> {
        let first_new = working.next_cell_id();
        let first_edge = working.next_edge_id();
        let mut next_id = first_new;
        let mut cells = Vec::new();

        for radius in 0..=ring_count {
            for coordinate in hex::ring(radius) {
                if working.contains(coordinate) {
                    continue;
                }
                let neighbors: Vec<TerrainState> = working
                    .neighbors_of(coordinate)
                    .map(|c| c.terrain)
                    .collect();
                let cell = HexCell {
                    id: next_id,
                    coordinate,
                    terrain: self.policy.pick_terrain(radius, &neighbors, rng),
                    has_warehouse: self.policy.roll_warehouse(rng),
                    patron: self.policy.pick_patron(alliance_ids, rng),
                };
                next_id += 1;
                working.push_cell(cell.clone())?;
                cells.push(cell);
            }
        }

        let edges = derive_edges(&working, first_new, first_edge);
        Ok(MapBatch { cells, edges })
    }
}
