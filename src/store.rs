//! Persistence for alliances, players and the planet map.
//!
//! [`MapStore`] is the seam the campaign layer writes through; [`SqliteStore`]
//! is the SQLite implementation. Connections are opened explicitly and owned
//! by the store, never shared through a global.

use std::path::Path;

use hexx::Hex;
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::generator::MapError;
use crate::hex;
use crate::map::{HexCell, HexEdge, HexMap, MapBatch};
use crate::terrain::TerrainState;
use crate::{AllianceId, CellId};

const MAP_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS alliances (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS players (
  id INTEGER PRIMARY KEY,
  alliance_id INTEGER REFERENCES alliances(id)
);

CREATE TABLE IF NOT EXISTS hex_cells (
  id INTEGER PRIMARY KEY,
  q INTEGER,
  r INTEGER,
  terrain TEXT NOT NULL,
  patron_alliance_id INTEGER REFERENCES alliances(id),
  has_warehouse INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS hex_edges (
  id INTEGER PRIMARY KEY,
  lower_cell_id INTEGER NOT NULL REFERENCES hex_cells(id),
  higher_cell_id INTEGER NOT NULL REFERENCES hex_cells(id),
  state TEXT,
  CHECK (lower_cell_id < higher_cell_id),
  UNIQUE (lower_cell_id, higher_cell_id)
);
"#;

const COORDINATE_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS hex_cells_coordinate ON hex_cells (q, r)";

/// Failures reading or writing the map store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite rejected a statement.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row cannot be turned back into a map value.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
    /// Stored rows break the map invariants.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Storage the campaign layer reads rosters from and writes map batches to.
pub trait MapStore {
    /// Ids of every alliance, ascending.
    fn alliance_ids(&self) -> Result<Vec<AllianceId>, StoreError>;

    /// Number of players belonging to some alliance.
    fn alliance_player_count(&self) -> Result<u32, StoreError>;

    /// The persisted planet map.
    fn load_map(&self) -> Result<HexMap, StoreError>;

    /// Writes a generated batch; either every row lands or none does.
    fn persist_batch(&mut self, batch: &MapBatch) -> Result<(), StoreError>;

    /// Deletes every cell and edge.
    fn clear_map(&mut self) -> Result<(), StoreError>;
}

/// SQLite-backed [`MapStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Fresh in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Takes ownership of `conn`, applying the schema and pending migrations.
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(MAP_DB_SCHEMA)?;
        let mut store = Self { conn };
        store.ensure_coordinate_columns()?;
        store.backfill_coordinates()?;
        Ok(store)
    }

    // ── Roster administration ──────────────────────────────────────

    /// Registers an alliance and returns its id.
    pub fn add_alliance(&mut self, name: &str) -> Result<AllianceId, StoreError> {
        self.conn
            .execute("INSERT INTO alliances (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Registers a player, optionally inside an alliance, and returns its id.
    pub fn add_player(&mut self, alliance_id: Option<AllianceId>) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO players (alliance_id) VALUES (?1)",
            params![alliance_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Migrations ─────────────────────────────────────────────────

    /// Adds `q`/`r` to cell tables created before coordinates were stored.
    fn ensure_coordinate_columns(&self) -> Result<(), StoreError> {
        let columns: Vec<String> = {
            let mut stmt = self.conn.prepare("PRAGMA table_info(hex_cells)")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
            rows.collect::<Result<_, _>>()?
        };
        for column in ["q", "r"] {
            if !columns.iter().any(|c| c == column) {
                self.conn.execute_batch(&format!(
                    "ALTER TABLE hex_cells ADD COLUMN {column} INTEGER"
                ))?;
                tracing::info!(
                    target: "crusade_map::store",
                    column,
                    "store.migration.added_column"
                );
            }
        }
        self.conn.execute_batch(COORDINATE_INDEX)?;
        Ok(())
    }

    /// Fills missing coordinates by replaying the canonical spiral over ids.
    ///
    /// Only correct for legacy maps generated gap-free in spiral order.
    fn backfill_coordinates(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let ids: Vec<CellId> = {
            let mut stmt =
                tx.prepare("SELECT id FROM hex_cells WHERE q IS NULL OR r IS NULL ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get::<_, CellId>(0))?;
            rows.collect::<Result<_, _>>()?
        };
        if ids.is_empty() {
            return Ok(());
        }
        {
            let mut update = tx.prepare("UPDATE hex_cells SET q = ?1, r = ?2 WHERE id = ?3")?;
            for &id in &ids {
                let coordinate = hex::canonical_coordinate(id).ok_or_else(|| {
                    StoreError::InvalidData(format!("cell id {id} has no canonical coordinate"))
                })?;
                update.execute(params![coordinate.x, coordinate.y, id])?;
            }
        }
        tx.commit()?;
        tracing::warn!(
            target: "crusade_map::store",
            cells = ids.len(),
            "store.migration.backfilled_coordinates"
        );
        Ok(())
    }
}

impl MapStore for SqliteStore {
    fn alliance_ids(&self) -> Result<Vec<AllianceId>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id FROM alliances ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, AllianceId>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn alliance_player_count(&self) -> Result<u32, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM players WHERE alliance_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        u32::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("player count {count} out of range")))
    }

    fn load_map(&self) -> Result<HexMap, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, q, r, terrain, patron_alliance_id, has_warehouse
             FROM hex_cells ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, CellId>(0)?,
                row.get::<_, Option<i32>>(1)?,
                row.get::<_, Option<i32>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<AllianceId>>(4)?,
                row.get::<_, bool>(5)?,
            ))
        })?;
        let mut cells = Vec::new();
        for row in rows {
            let (id, q, r, terrain, patron, has_warehouse) = row?;
            let (Some(q), Some(r)) = (q, r) else {
                return Err(StoreError::InvalidData(format!("cell {id} has no coordinate")));
            };
            let terrain: TerrainState = terrain
                .parse()
                .map_err(|e| StoreError::InvalidData(format!("cell {id}: {e}")))?;
            cells.push(HexCell {
                id,
                coordinate: Hex::new(q, r),
                terrain,
                patron,
                has_warehouse,
            });
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, lower_cell_id, higher_cell_id, state FROM hex_edges ORDER BY id",
        )?;
        let edges = stmt
            .query_map([], |row| {
                Ok(HexEdge {
                    id: row.get(0)?,
                    lower: row.get(1)?,
                    higher: row.get(2)?,
                    state: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HexMap::from_parts(cells, edges)?)
    }

    fn persist_batch(&mut self, batch: &MapBatch) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_cell = tx.prepare(
                "INSERT INTO hex_cells (id, q, r, terrain, patron_alliance_id, has_warehouse)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for cell in &batch.cells {
                insert_cell.execute(params![
                    cell.id,
                    cell.coordinate.x,
                    cell.coordinate.y,
                    cell.terrain.as_str(),
                    cell.patron,
                    cell.has_warehouse,
                ])?;
            }
            let mut insert_edge = tx.prepare(
                "INSERT INTO hex_edges (id, lower_cell_id, higher_cell_id, state)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for edge in &batch.edges {
                insert_edge.execute(params![edge.id, edge.lower, edge.higher, edge.state])?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            target: "crusade_map::store",
            cells = batch.cells.len(),
            edges = batch.edges.len(),
            "store.batch.persisted"
        );
        Ok(())
    }

    fn clear_map(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let edges = tx.execute("DELETE FROM hex_edges", [])?;
        let cells = tx.execute("DELETE FROM hex_cells", [])?;
        tx.commit()?;
        tracing::info!(target: "crusade_map::store", cells, edges, "store.map.cleared");
        Ok(())
    }
}
