#![warn(missing_docs)]
//! Hexagonal planet maps for narrative crusade campaigns.
//!
//! A planet is a disk of hex cells around a center, each carrying a terrain
//! type, a patron alliance and maybe a warehouse. Adjacent cells are joined
//! by undirected edges. Maps are generated once and then grown ring by ring
//! as the roster grows; existing cells and edges are never rewritten.

pub mod campaign;
pub mod config;
pub mod generator;
pub mod hex;
pub mod map;
pub mod math;
pub mod store;
pub mod terrain;

/// Cell identifier; 1-based and dense in generation order.
pub type CellId = u32;
/// Edge identifier; 1-based and dense in generation order.
pub type EdgeId = u32;
/// Identifier of an alliance row in the roster.
pub type AllianceId = i64;

pub use campaign::{Campaign, CampaignError};
pub use config::{ConfigError, CrusadeConfig};
pub use generator::{HexPlanetGenerator, MapError};
pub use map::{HexCell, HexEdge, HexMap, MapBatch, MapSummary};
pub use store::{MapStore, SqliteStore, StoreError};
pub use terrain::{TerrainPolicy, TerrainState};
