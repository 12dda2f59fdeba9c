//! Structural properties of generated and expanded planets.

use std::collections::HashSet;

use crusade_map::map::HexMap;
use crusade_map::{HexPlanetGenerator, MapBatch, hex, math};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn generate(rings: u32, seed: u64) -> MapBatch {
    HexPlanetGenerator::default()
        .generate_initial_map(rings, &[1, 2, 3], &mut ChaCha8Rng::seed_from_u64(seed))
        .unwrap()
}

fn assert_complete(map: &HexMap) {
    let coords: HashSet<_> = map.cells().iter().map(|c| c.coordinate).collect();
    assert_eq!(coords.len(), map.len(), "coordinates are not unique");

    let mut pairs = HashSet::new();
    for edge in map.edges() {
        assert!(edge.lower < edge.higher);
        assert!(pairs.insert((edge.lower, edge.higher)), "duplicate edge {edge:?}");
    }
    for cell in map.cells() {
        for neighbor in map.neighbors_of(cell.coordinate) {
            let pair = (cell.id.min(neighbor.id), cell.id.max(neighbor.id));
            assert!(pairs.contains(&pair), "missing edge {pair:?}");
        }
    }
    let ids: HashSet<_> = map.edges().iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), map.edges().len());
}

#[test]
fn closed_form_sizes() {
    for (rings, cells) in [(0, 1), (1, 7), (2, 19), (3, 37)] {
        assert_eq!(generate(rings, 0).cells.len(), cells);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generated_disk_is_complete(rings in 0u32..6, seed in any::<u64>()) {
        let batch = generate(rings, seed);
        prop_assert_eq!(batch.cells.len() as u64, math::cells_in_radius(rings));

        let coords: Vec<_> = batch.cells.iter().map(|c| c.coordinate).collect();
        let spiral: Vec<_> = hex::spiral(rings).collect();
        prop_assert_eq!(coords, spiral);

        let map = HexMap::from_parts(batch.cells, batch.edges).unwrap();
        assert_complete(&map);
    }

    #[test]
    fn same_seed_same_planet(rings in 0u32..5, seed in any::<u64>()) {
        prop_assert_eq!(generate(rings, seed), generate(rings, seed));
    }

    #[test]
    fn expansion_only_appends(
        from in 0u32..4,
        extra in 0u32..3,
        seed in any::<u64>(),
    ) {
        let generator = HexPlanetGenerator::default();
        let initial = generate(from, seed);
        let mut map = HexMap::from_parts(initial.cells.clone(), initial.edges.clone()).unwrap();

        let target = from + extra;
        let batch = generator
            .expand(&map, target, &[4], &mut ChaCha8Rng::seed_from_u64(seed ^ 1))
            .unwrap();
        if extra == 0 {
            prop_assert!(batch.is_empty());
        }
        prop_assert!(batch.cells.iter().all(|c| c.ring() > from));
        prop_assert!(batch.cells.iter().all(|c| c.patron == Some(4)));

        map.extend(batch).unwrap();
        prop_assert_eq!(map.len() as u64, math::cells_in_radius(target));
        prop_assert_eq!(&map.cells()[..initial.cells.len()], initial.cells.as_slice());
        prop_assert_eq!(&map.edges()[..initial.edges.len()], initial.edges.as_slice());
        assert_complete(&map);
    }

    #[test]
    fn canonical_coordinate_inverts_spiral(rings in 0u32..8) {
        for (index, coordinate) in hex::spiral(rings).enumerate() {
            prop_assert_eq!(hex::canonical_coordinate(index as u32 + 1), Some(coordinate));
        }
    }
}

#[test]
fn stepwise_and_direct_growth_share_topology() {
    let generator = HexPlanetGenerator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let initial = generator.generate_initial_map(0, &[1], &mut rng).unwrap();
    let mut stepwise = HexMap::from_parts(initial.cells, initial.edges).unwrap();
    for target in 1..=4 {
        let batch = generator.expand(&stepwise, target, &[1], &mut rng).unwrap();
        stepwise.extend(batch).unwrap();
    }

    let direct = generate(4, 21);
    let coords = |cells: &[crusade_map::HexCell]| -> Vec<_> {
        cells.iter().map(|c| (c.id, c.coordinate)).collect()
    };
    assert_eq!(coords(stepwise.cells()), coords(&direct.cells));
    assert_eq!(stepwise.edges().len(), direct.edges.len());
}
