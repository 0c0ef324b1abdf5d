use ecogrid_core::{Coord, EntityId, GenerationConfig, RulesConfig, Sex, SimulationConfig, WorldConfig};
use ecogrid_world::{Creature, Ecosystem, Grid, SeededDice, Vitals};
use proptest::prelude::*;

fn small_world(seed: u64, side: i32) -> SimulationConfig {
    SimulationConfig {
        seed,
        world: WorldConfig {
            height: side,
            width: side,
            growth_margin: 5,
        },
        ..Default::default()
    }
}

fn animal(kind: u8, sex: Sex, hit_power: f64) -> Creature {
    let vitals = Vitals::newborn(sex, hit_power);
    match kind % 3 {
        0 => Creature::Herbivore(vitals),
        1 => Creature::Omnivore(vitals),
        _ => Creature::Carnivore {
            vitals,
            aggressiveness: 0,
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn grid_and_footprints_agree_after_every_tick(
        seed in any::<u64>(),
        side in 6i32..24,
        count in 0usize..120,
        ticks in 1usize..12,
    ) {
        let config = small_world(seed, side);
        let mut eco = Ecosystem::new(&config).unwrap();
        eco.populate(&GenerationConfig { total_entity_count: count, ..Default::default() });
        prop_assert_eq!(eco.verify_invariants(), Ok(()));

        for _ in 0..ticks {
            let population = eco.advance_tick();
            prop_assert_eq!(eco.verify_invariants(), Ok(()));
            prop_assert_eq!(population, eco.population());
            for entity in eco.registry().iter() {
                prop_assert!(entity.footprint.len() <= entity.size as usize);
                prop_assert!(!entity.footprint.is_empty());
                for &coord in entity.footprint.cells() {
                    prop_assert!(eco.grid().contents(coord).contains(&entity.id));
                }
            }
            if population.is_extinct() {
                break;
            }
        }
    }

    #[test]
    fn dead_entities_leave_no_trace(seed in any::<u64>(), count in 1usize..80) {
        let mut eco = Ecosystem::new(&small_world(seed, 16)).unwrap();
        eco.populate(&GenerationConfig { total_entity_count: count, ..Default::default() });
        let before: Vec<EntityId> = eco.registry().snapshot();

        eco.advance_tick();

        let occupants: Vec<EntityId> = eco
            .grid()
            .occupied()
            .flat_map(|(_, cell)| cell.occupants().to_vec())
            .collect();
        for id in before.into_iter().filter(|id| eco.get(*id).is_none()) {
            prop_assert!(!occupants.contains(&id));
        }
    }

    #[test]
    fn single_sex_animals_never_breed(
        seed in any::<u64>(),
        sex in prop_oneof![Just(Sex::Male), Just(Sex::Female)],
        herd in proptest::collection::vec((0u8..3, 20u32..29, 1u32..300, 0i32..12, 0i32..12), 1..40),
    ) {
        let mut eco = Ecosystem::with_dice(
            &WorldConfig { height: 12, width: 12, growth_margin: 5 },
            RulesConfig::default(),
            SeededDice::new(seed),
        );
        for (kind, age, mass, row, col) in herd {
            let _ = eco.place_at(age, mass as f64, animal(kind, sex, 20.0), Coord::new(row, col));
        }
        let initial = eco.population().total();

        for _ in 0..10 {
            let population = eco.advance_tick();
            prop_assert_eq!(eco.last_report().births, 0);
            prop_assert!(population.total() <= initial);
        }
    }

    #[test]
    fn under_age_animals_never_breed(
        seed in any::<u64>(),
        herd in proptest::collection::vec((0u8..3, any::<bool>(), 0u32..10, 1u32..300), 2..40),
    ) {
        let mut eco = Ecosystem::with_dice(
            &WorldConfig { height: 6, width: 6, growth_margin: 5 },
            RulesConfig::default(),
            SeededDice::new(seed),
        );
        for (kind, male, age, mass) in herd {
            let _ = eco.place_at(age, mass as f64, animal(kind, Sex::from_bool(male), 20.0), Coord::new(3, 3));
        }

        // The oldest reaches 18 after nine ticks, below the maturity age of 20
        for _ in 0..9 {
            eco.advance_tick();
            prop_assert_eq!(eco.last_report().births, 0);
        }
    }

    #[test]
    fn growth_preserves_occupants(
        side in 1i32..30,
        margin in 1i32..8,
        placements in proptest::collection::vec((0u64..20, 0i32..30, 0i32..30), 0..60),
    ) {
        let mut grid = Grid::new(side, side, margin);
        let mut expected = Vec::new();
        for (id, row, col) in placements {
            let coord = Coord::new(row % side, col % side);
            grid.occupy(coord, EntityId(id));
            if !expected.contains(&(coord, EntityId(id))) {
                expected.push((coord, EntityId(id)));
            }
        }

        prop_assert_eq!(grid.grow(), margin);
        prop_assert_eq!(grid.height, side + 2 * margin);
        prop_assert_eq!(grid.width, side + 2 * margin);

        let total: usize = grid.occupied().map(|(_, cell)| cell.occupants().len()).sum();
        prop_assert_eq!(total, expected.len());
        for (coord, id) in expected {
            prop_assert!(grid.contents(coord.shifted(margin)).contains(&id));
        }
    }

    #[test]
    fn seeded_runs_are_reproducible(seed in any::<u64>()) {
        let run = || {
            let mut eco = Ecosystem::new(&small_world(seed, 14)).unwrap();
            eco.populate(&GenerationConfig { total_entity_count: 60, ..Default::default() });
            for _ in 0..5 {
                eco.advance_tick();
            }
            eco.snapshot()
        };
        let first = run();
        let second = run();
        prop_assert_eq!(first.entities, second.entities);
        prop_assert_eq!(first.cells, second.cells);
    }
}
