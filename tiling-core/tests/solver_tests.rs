// tiling-core/tests/solver_tests.rs
use tiling_core::tiling_rules::{
    EdgeType, EdgeTypeId, TileEdge, TileTransformPermission, TileType, TileTypeId, Tileset,
};
use tiling_core::{GridSlotTopology, SlotTopology, Solver, SolverOptions, WangRuleset, RELATION_COUNT};

fn edge(index: usize, flipped: bool) -> TileEdge {
    TileEdge::new(EdgeTypeId(index), flipped)
}

fn tile(edges: [(usize, bool); 4]) -> TileType {
    TileType::from_solved_edges(edges.map(|(e, f)| edge(e, f)))
}

// Two tile types over three border edge types, every symmetry allowed.
fn two_tile_fixture() -> Tileset {
    Tileset {
        edge_types: vec![EdgeType::default(); 3],
        tile_types: vec![
            tile([(0, false), (1, false), (0, true), (1, true)]),
            tile([(2, false), (2, false), (2, true), (2, true)]),
        ],
        default_transform_permission: TileTransformPermission::default(),
    }
}

fn tile_of(ruleset: &WangRuleset, variant: usize) -> TileTypeId {
    ruleset
        .table()
        .variants()
        .variant_to_tile(variant)
        .map(|v| v.tile)
        .expect("Variant should exist")
}

#[test]
fn test_three_by_three_grid_solves() {
    let tileset = two_tile_fixture();
    let ruleset = WangRuleset::from_tileset(&tileset);
    assert_eq!(ruleset.variant_count(), 32);

    for seed in 0..10 {
        let grid = GridSlotTopology::new(3, 3);
        let options = SolverOptions::builder().random_seed(seed).build();
        let mut solver = Solver::new(&grid, &ruleset, options);
        assert!(solver.solve(true), "Seed {seed} should solve");
        assert!(solver.is_solved());
        assert_eq!(solver.stats().attempt_seeds.first(), Some(&seed));

        let assignments: Vec<usize> = solver
            .assignments()
            .into_iter()
            .map(|a| a.expect("Every slot should be assigned"))
            .collect();
        for slot in 0..grid.slot_count() {
            for relation in 0..RELATION_COUNT {
                if let Some((neighbor, back)) = grid.neighbor_of(slot, relation) {
                    assert!(
                        ruleset.allows(assignments[slot], relation, assignments[neighbor], back),
                        "Seed {seed}: slots {slot} and {neighbor} do not match"
                    );
                }
            }
        }
        assert!(solver.check_local_consistency().is_ok());
        assert!(solver.check_integrity(false));
    }
}

#[test]
fn test_same_seed_same_solution() {
    let ruleset = WangRuleset::from_tileset(&two_tile_fixture());
    let grid = GridSlotTopology::new(5, 4);
    let options = SolverOptions::builder().random_seed(42).build();

    let mut first = Solver::new(&grid, &ruleset, options);
    let mut second = Solver::new(&grid, &ruleset, options);
    assert!(first.solve(true));
    assert!(second.solve(true));
    assert_eq!(first.assignments(), second.assignments());
    assert_eq!(first.stats().choice_count, second.stats().choice_count);
}

#[test]
fn test_border_invariant() {
    // e0 may face the boundary, e1 may not, e2 may only face the boundary.
    let tileset = Tileset {
        edge_types: vec![
            EdgeType::default(),
            EdgeType {
                border_edge: false,
                ..EdgeType::default()
            },
            EdgeType {
                border_only: true,
                ..EdgeType::default()
            },
        ],
        tile_types: vec![
            tile([(0, false), (0, false), (0, true), (0, true)]),
            tile([(1, false), (1, false), (1, true), (1, true)]),
            tile([(2, false), (0, false), (2, true), (0, true)]),
        ],
        default_transform_permission: TileTransformPermission::default(),
    };
    let ruleset = WangRuleset::from_tileset(&tileset);
    let grid = GridSlotTopology::new(3, 3);
    let mut solver = Solver::new(&grid, &ruleset, SolverOptions::default());
    assert!(solver.apply_initial_constraints());

    for (slot, states) in solver.slots().iter().enumerate() {
        assert!(!states.is_empty());
        for variant in states.iter() {
            for relation in 0..RELATION_COUNT {
                let label = ruleset.label(variant, relation);
                if grid.neighbor_of(slot, relation).is_none() {
                    assert!(ruleset.border_labels().contains(&label), "Slot {slot} label {label}");
                } else {
                    assert!(!ruleset.border_only_labels().contains(&label), "Slot {slot} label {label}");
                }
            }
        }
    }

    // Only the center may hold the interior-only tile; the border-only one never fits.
    let center = grid.index(1, 1).expect("Center exists");
    let holds = |slot: usize, tile: usize| {
        solver.slots()[slot]
            .iter()
            .any(|v| tile_of(&ruleset, v) == TileTypeId(tile))
    };
    assert!(holds(center, 1));
    assert!(!holds(0, 1));
    assert!((0..9).all(|slot| !holds(slot, 2)));
    assert!((0..9).all(|slot| holds(slot, 0)));
}

#[test]
fn test_failure_records_impossible_neighborhood() {
    // A lone tile that cannot face itself.
    let tileset = Tileset {
        edge_types: vec![EdgeType::default()],
        tile_types: vec![tile([(0, false); 4])],
        default_transform_permission: TileTransformPermission::NONE,
    };
    let ruleset = WangRuleset::from_tileset(&tileset);
    let grid = GridSlotTopology::new(3, 3);
    let mut solver = Solver::new(&grid, &ruleset, SolverOptions::builder().max_attempts(3).build());
    assert!(!solver.solve(true));

    let neighborhoods = &solver.stats().impossible_neighborhoods;
    assert!(!neighborhoods.is_empty());
    for neighborhood in neighborhoods {
        assert!(solver.check_impossible_neighborhood(neighborhood));
    }
}

#[test]
fn test_attempt_seeds_are_recorded() {
    // Attempt i starts from the base seed plus i.
    let ruleset = WangRuleset::from_tileset(&two_tile_fixture());
    let grid = GridSlotTopology::new(2, 1);
    let options = SolverOptions::builder().random_seed(9).max_attempts(5).build();
    let mut solver = Solver::new(&grid, &ruleset, options);
    assert!(solver.solve(true));
    let seeds = &solver.stats().attempt_seeds;
    assert_eq!(seeds.first(), Some(&9));
    for (i, seed) in seeds.iter().enumerate() {
        assert_eq!(*seed, 9 + i as u64);
    }
}

#[test]
fn test_failed_attempts_restart_with_next_seed() {
    // One observation per attempt cannot fill a 3x3 grid, so every attempt fails.
    let ruleset = WangRuleset::from_tileset(&two_tile_fixture());
    let grid = GridSlotTopology::new(3, 3);
    let options = SolverOptions::builder()
        .random_seed(9)
        .max_attempts(3)
        .max_steps(1)
        .build();
    let mut solver = Solver::new(&grid, &ruleset, options);
    assert!(!solver.solve(true));
    assert_eq!(solver.stats().attempt_seeds, vec![9, 10, 11]);
    assert_eq!(solver.stats().attempt_count, 3);
}

#[test]
fn test_initial_constraints_skip_and_give_up() {
    // The only edge type may not face the boundary, so every border slot empties.
    let tileset = Tileset {
        edge_types: vec![EdgeType {
            border_edge: false,
            ..EdgeType::default()
        }],
        tile_types: vec![tile([(0, false), (0, false), (0, true), (0, true)])],
        default_transform_permission: TileTransformPermission::NONE,
    };
    let ruleset = WangRuleset::from_tileset(&tileset);
    let grid = GridSlotTopology::new(3, 3);
    let mut solver = Solver::new(&grid, &ruleset, SolverOptions::builder().max_attempts(2).build());
    assert!(!solver.apply_initial_constraints());

    // Slot 1 borders the emptied slot 0 and is skipped; slot 2 reaches the cap.
    assert_eq!(solver.stats().impossible_neighborhoods.len(), 2);
    let empties: Vec<usize> = solver
        .slots()
        .iter()
        .enumerate()
        .filter(|(_, states)| states.is_empty())
        .map(|(slot, _)| slot)
        .collect();
    assert_eq!(empties, vec![0, 2]);
}
