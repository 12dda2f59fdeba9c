//! Planet map model: cells, edges, and the coordinate index over them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::generator::MapError;
use crate::hex;
use crate::terrain::TerrainState;
use crate::{AllianceId, CellId, EdgeId};

/// One tile of the planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    /// Sequential id in generation order, starting at 1.
    pub id: CellId,
    /// Axial coordinate (`x` = q, `y` = r). Never changes after creation.
    pub coordinate: Hex,
    /// Terrain label.
    pub terrain: TerrainState,
    /// Alliance currently claiming the cell.
    pub patron: Option<AllianceId>,
    /// Whether the cell holds a warehouse.
    pub has_warehouse: bool,
}

impl HexCell {
    /// Ring the cell sits on.
    pub fn ring(&self) -> u32 {
        hex::ring_of(self.coordinate)
    }
}

/// Undirected adjacency between two cells, stored lower id first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexEdge {
    /// Sequential id in emission order, starting at 1.
    pub id: EdgeId,
    /// Smaller of the two cell ids.
    pub lower: CellId,
    /// Larger of the two cell ids.
    pub higher: CellId,
    /// Reserved gameplay marker; always `None` when generated.
    pub state: Option<String>,
}

impl HexEdge {
    /// Edge between `a` and `b`, oriented so that `lower < higher`.
    pub fn new(id: EdgeId, a: CellId, b: CellId) -> Self {
        Self {
            id,
            lower: a.min(b),
            higher: a.max(b),
            state: None,
        }
    }

    /// Whether this edge joins `a` and `b`, in either order.
    pub fn connects(&self, a: CellId, b: CellId) -> bool {
        (self.lower, self.higher) == (a.min(b), a.max(b))
    }
}

/// Cells and edges added by a single generation or expansion pass.
///
/// Callers persist a batch as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapBatch {
    /// New cells, ascending by id.
    pub cells: Vec<HexCell>,
    /// New edges, ascending by id.
    pub edges: Vec<HexEdge>,
}

impl MapBatch {
    /// True when the pass added nothing.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.edges.is_empty()
    }
}

/// Counts describing a map; printed by the CLI `show` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    /// Number of cells.
    pub cells: usize,
    /// Number of edges.
    pub edges: usize,
    /// Outermost ring, `None` for an empty map.
    pub rings: Option<u32>,
    /// Cells holding a warehouse.
    pub warehouses: usize,
    /// Cells without a patron alliance.
    pub unclaimed: usize,
}

impl fmt::Display for MapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rings {
            Some(rings) => write!(f, "radius {rings}")?,
            None => write!(f, "empty map")?,
        }
        write!(
            f,
            ": {} cells, {} edges, {} warehouses, {} unclaimed",
            self.cells, self.edges, self.warehouses, self.unclaimed
        )
    }
}

/// Owned planet map with a coordinate index.
///
/// Cells are kept ascending by id and the index is a bijection between
/// coordinates and cells; [`HexMap::from_parts`] refuses input that breaks it.
#[derive(Debug, Clone, Default)]
pub struct HexMap {
    cells: Vec<HexCell>,
    edges: Vec<HexEdge>,
    by_coordinate: HashMap<Hex, usize>,
    by_id: HashMap<CellId, usize>,
    edge_ids: HashSet<EdgeId>,
    edge_pairs: HashSet<(CellId, CellId)>,
}

impl HexMap {
    /// Builds a map from persisted rows, validating ids, coordinates and edges.
    pub fn from_parts(
        mut cells: Vec<HexCell>,
        mut edges: Vec<HexEdge>,
    ) -> Result<Self, MapError> {
        cells.sort_by_key(|c| c.id);
        edges.sort_by_key(|e| e.id);

        let mut map = Self::default();
        for cell in cells {
            map.push_cell(cell)?;
        }
        map.push_edges(edges)?;
        Ok(map)
    }

    // ── Per-cell access ────────────────────────────────────────────

    /// All cells, ascending by id.
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// All edges, ascending by id.
    pub fn edges(&self) -> &[HexEdge] {
        &self.edges
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the map has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell by id.
    pub fn cell(&self, id: CellId) -> Option<&HexCell> {
        self.by_id.get(&id).map(|&i| &self.cells[i])
    }

    /// Cell at an axial coordinate.
    pub fn cell_at(&self, coordinate: Hex) -> Option<&HexCell> {
        self.by_coordinate.get(&coordinate).map(|&i| &self.cells[i])
    }

    /// Whether a cell exists at `coordinate`.
    pub fn contains(&self, coordinate: Hex) -> bool {
        self.by_coordinate.contains_key(&coordinate)
    }

    /// Existing cells adjacent to `coordinate`, in ring-direction order.
    pub fn neighbors_of(&self, coordinate: Hex) -> impl Iterator<Item = &HexCell> {
        hex::neighbors(coordinate)
            .into_iter()
            .filter_map(|n| self.cell_at(n))
    }

    // ── Derived values ─────────────────────────────────────────────

    /// Outermost ring holding a cell, `None` for an empty map.
    pub fn ring_count(&self) -> Option<u32> {
        self.cells.iter().map(HexCell::ring).max()
    }

    /// Id the next generated cell receives.
    pub fn next_cell_id(&self) -> CellId {
        self.cells.last().map_or(1, |c| c.id + 1)
    }

    /// Id the next emitted edge receives.
    pub fn next_edge_id(&self) -> EdgeId {
        self.edges.iter().map(|e| e.id).max().map_or(1, |id| id + 1)
    }

    /// Cell, edge, warehouse and patron counts.
    pub fn summary(&self) -> MapSummary {
        MapSummary {
            cells: self.cells.len(),
            edges: self.edges.len(),
            rings: self.ring_count(),
            warehouses: self.cells.iter().filter(|c| c.has_warehouse).count(),
            unclaimed: self.cells.iter().filter(|c| c.patron.is_none()).count(),
        }
    }

    // ── Mutation (append only) ─────────────────────────────────────

    /// Appends a generated batch.
    pub fn extend(&mut self, batch: MapBatch) -> Result<(), MapError> {
        for cell in batch.cells {
            self.push_cell(cell)?;
        }
        self.push_edges(batch.edges)
    }

    pub(crate) fn push_cell(&mut self, cell: HexCell) -> Result<(), MapError> {
        let last_id = self.cells.last().map_or(0, |c| c.id);
        if cell.id <= last_id {
            return Err(MapError::InconsistentMap(format!(
                "cell id {} must be above {last_id}",
                cell.id
            )));
        }
        if let Some(other) = self.cell_at(cell.coordinate) {
            return Err(MapError::InconsistentMap(format!(
                "cells {} and {} share coordinate ({}, {})",
                other.id, cell.id, cell.coordinate.x, cell.coordinate.y
            )));
        }
        let index = self.cells.len();
        self.by_coordinate.insert(cell.coordinate, index);
        self.by_id.insert(cell.id, index);
        self.cells.push(cell);
        Ok(())
    }

    fn push_edges(&mut self, edges: Vec<HexEdge>) -> Result<(), MapError> {
        for edge in edges {
            if edge.lower >= edge.higher {
                return Err(MapError::InconsistentMap(format!(
                    "edge {} is not oriented lower to higher",
                    edge.id
                )));
            }
            if self.cell(edge.lower).is_none() || self.cell(edge.higher).is_none() {
                return Err(MapError::InconsistentMap(format!(
                    "edge {} references a missing cell",
                    edge.id
                )));
            }
            let pair = (edge.lower, edge.higher);
            if self.edge_ids.contains(&edge.id) || self.edge_pairs.contains(&pair) {
                return Err(MapError::InconsistentMap(format!(
                    "edge {} duplicates an existing edge",
                    edge.id
                )));
            }
            self.edge_ids.insert(edge.id);
            self.edge_pairs.insert(pair);
            self.edges.push(edge);
        }
        Ok(())
    }
}

/// Edges touching at least one cell with id `>= first_new`.
///
/// Every adjacent pair is emitted once, from the lower id, scanning cells in
/// id order and neighbors in ring-direction order. Ids start at `first_edge_id`.
pub fn derive_edges(map: &HexMap, first_new: CellId, first_edge_id: EdgeId) -> Vec<HexEdge> {
    let mut edges = Vec::new();
    let mut next_id = first_edge_id;
    for cell in map.cells() {
        for neighbor in map.neighbors_of(cell.coordinate) {
            if cell.id < neighbor.id && neighbor.id >= first_new {
                edges.push(HexEdge::new(next_id, cell.id, neighbor.id));
                next_id += 1;
            }
        }
    }
    edges
}
