//! Campaign-side orchestration: read the roster, run the generator, persist.
//!
//! Each call is one pass persisted as a single batch. Callers must not run
//! two passes against the same store concurrently.

use rand::Rng;
use thiserror::Error;

use crate::config::{CampaignSettings, CrusadeConfig};
use crate::generator::{HexPlanetGenerator, MapError};
use crate::map::{MapBatch, MapSummary};
use crate::math;
use crate::store::{MapStore, StoreError};

/// Failures of a campaign operation.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Generation or expansion rejected its input.
    #[error(transparent)]
    Map(#[from] MapError),
    /// The store failed to read or write.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Initial generation was requested over an existing map.
    #[error("planet already has {cells} cells; clear it before generating a new one")]
    MapAlreadyExists {
        /// Cells currently stored.
        cells: usize,
    },
}

/// A planet map bound to its store and generation rules.
pub struct Campaign<S> {
    store: S,
    generator: HexPlanetGenerator,
    settings: CampaignSettings,
}

impl<S: MapStore> Campaign<S> {
    /// Wraps `store` with the generator and sizing rules from `config`.
    pub fn new(store: S, config: &CrusadeConfig) -> Result<Self, CampaignError> {
        Ok(Self {
            store,
            generator: HexPlanetGenerator::from_settings(&config.generator)?,
            settings: config.campaign.clone(),
        })
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying store, mutably (roster administration).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Generates and persists a new planet.
    ///
    /// `ring_count` defaults to the configured initial ring count.
    pub fn generate_planet<R: Rng + ?Sized>(
        &mut self,
        ring_count: Option<u32>,
        rng: &mut R,
    ) -> Result<MapBatch, CampaignError> {
        let existing = self.store.load_map()?;
        if !existing.is_empty() {
            return Err(CampaignError::MapAlreadyExists {
                cells: existing.len(),
            });
        }
        let ring_count = ring_count.unwrap_or(self.settings.initial_rings);
        let roster = self.store.alliance_ids()?;
        let batch = self
            .generator
            .generate_initial_map(ring_count, &roster, rng)?;
        self.store.persist_batch(&batch)?;
        tracing::info!(
            target: "crusade_map::campaign",
            ring_count,
            alliances = roster.len(),
            cells = batch.cells.len(),
            edges = batch.edges.len(),
            "campaign.planet.generated"
        );
        Ok(batch)
    }

    /// Expands the stored planet to `target_ring_count` rings.
    ///
    /// Returns the added cells and edges; empty when the planet is already
    /// that large.
    pub fn expand_planet<R: Rng + ?Sized>(
        &mut self,
        target_ring_count: u32,
        rng: &mut R,
    ) -> Result<MapBatch, CampaignError> {
        let map = self.store.load_map()?;
        let roster = self.store.alliance_ids()?;
        let batch = self
            .generator
            .expand(&map, target_ring_count, &roster, rng)?;
        if batch.is_empty() {
            tracing::info!(
                target: "crusade_map::campaign",
                current = ?map.ring_count(),
                target_ring_count,
                "campaign.planet.unchanged"
            );
            return Ok(batch);
        }
        self.store.persist_batch(&batch)?;
        tracing::info!(
            target: "crusade_map::campaign",
            from = ?map.ring_count(),
            to = target_ring_count,
            cells = batch.cells.len(),
            edges = batch.edges.len(),
            "campaign.planet.expanded"
        );
        Ok(batch)
    }

    /// Ring count warranted by the alliance-affiliated player count.
    pub fn warranted_rings(&self) -> Result<u32, CampaignError> {
        let players = self.store.alliance_player_count()?;
        Ok(math::rings_for_players(
            players,
            self.settings.hexes_per_player,
        ))
    }

    /// Expands the planet to the size warranted by the current roster.
    pub fn grow_for_players<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<MapBatch, CampaignError> {
        let target = self.warranted_rings()?;
        self.expand_planet(target, rng)
    }

    /// Deletes every cell and edge; the roster is kept.
    pub fn clear_planet(&mut self) -> Result<(), CampaignError> {
        self.store.clear_map()?;
        Ok(())
    }

    /// Counts describing the stored planet.
    pub fn summary(&self) -> Result<MapSummary, CampaignError> {
        Ok(self.store.load_map()?.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn campaign(alliances: &[&str]) -> Campaign<SqliteStore> {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for name in alliances {
            store.add_alliance(name).unwrap();
        }
        Campaign::new(store, &CrusadeConfig::default()).unwrap()
    }

    #[test]
    fn generate_uses_configured_initial_rings() {
        let mut c = campaign(&["A", "B"]);
        let batch = c
            .generate_planet(None, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(batch.cells.len(), 7);
        assert_eq!(c.summary().unwrap().cells, 7);
    }

    #[test]
    fn generate_without_alliances_fails_and_stores_nothing() {
        let mut c = campaign(&[]);
        let err = c
            .generate_planet(Some(2), &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, CampaignError::Map(MapError::NoAlliances)));
        assert_eq!(c.summary().unwrap().cells, 0);
    }

    #[test]
    fn generate_twice_is_refused() {
        let mut c = campaign(&["A"]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        c.generate_planet(Some(1), &mut rng).unwrap();
        let err = c.generate_planet(Some(1), &mut rng).unwrap_err();
        assert!(matches!(err, CampaignError::MapAlreadyExists { cells: 7 }));
    }

    #[test]
    fn expand_persists_only_new_rows() {
        let mut c = campaign(&["A", "B", "C"]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let initial = c.generate_planet(Some(1), &mut rng).unwrap();
        let batch = c.expand_planet(2, &mut rng).unwrap();
        assert_eq!(batch.cells.len(), 12);

        let map = c.store().load_map().unwrap();
        assert_eq!(map.len(), 19);
        assert_eq!(&map.cells()[..7], initial.cells.as_slice());

        let again = c.expand_planet(2, &mut rng).unwrap();
        assert!(again.is_empty());
        assert_eq!(c.store().load_map().unwrap().len(), 19);
    }

    #[test]
    fn clear_then_regenerate() {
        let mut c = campaign(&["A"]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        c.generate_planet(Some(2), &mut rng).unwrap();
        c.clear_planet().unwrap();
        assert!(c.summary().unwrap().rings.is_none());
        c.generate_planet(Some(1), &mut rng).unwrap();
        assert_eq!(c.summary().unwrap().rings, Some(1));
    }

    #[test]
    fn grows_with_player_count() {
        let mut c = campaign(&["A", "B"]);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        c.generate_planet(Some(1), &mut rng).unwrap();

        let alliances = c.store().alliance_ids().unwrap();
        // 7 players * 3 hexes = 21 cells -> radius 3
        for i in 0..7 {
            c.store_mut()
                .add_player(Some(alliances[i % alliances.len()]))
                .unwrap();
        }
        assert_eq!(c.warranted_rings().unwrap(), 3);

        let batch = c.grow_for_players(&mut rng).unwrap();
        assert_eq!(batch.cells.len(), 37 - 7);
        assert_eq!(c.summary().unwrap().rings, Some(3));
    }

    #[test]
    fn huge_hexes_per_player_caps_the_warranted_radius() {
        let mut config = CrusadeConfig::default();
        config.campaign.hexes_per_player = u32::MAX;
        let mut store = SqliteStore::open_in_memory().unwrap();
        let alliance = store.add_alliance("A").unwrap();
        store.add_player(Some(alliance)).unwrap();
        let c = Campaign::new(store, &config).unwrap();
        assert_eq!(
            c.warranted_rings().unwrap(),
            math::radius_containing_cell(u32::MAX)
        );
    }

    #[test]
    fn small_roster_does_not_shrink_the_planet() {
        let mut c = campaign(&["A"]);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        c.generate_planet(Some(2), &mut rng).unwrap();
        let batch = c.grow_for_players(&mut rng).unwrap();
        assert!(batch.is_empty());
        assert_eq!(c.summary().unwrap().cells, 19);
    }
}
