use light_bike_core::{cell_index, CellCoord, GridSize, Heading, OccupancyView};
use light_bike_system_chaser::{candidates, Chaser, ChaserState, Intent, Tuning};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GRID: GridSize = GridSize::new(30, 30);

#[test]
fn lookahead_flags_walls_within_range() {
    let chaser = Chaser::default();
    let cells = occupancy_with(GRID, &[]);
    let occupancy = OccupancyView::new(&cells, GRID);

    assert!(chaser.is_safe(CellCoord::new(15, 15), Heading::Right, occupancy));
    assert!(chaser.is_safe(CellCoord::new(17, 15), Heading::Right, occupancy));
    assert!(!chaser.is_safe(CellCoord::new(18, 15), Heading::Right, occupancy));
    assert!(!chaser.is_safe(CellCoord::new(11, 15), Heading::Up, occupancy));
    assert!(chaser.is_safe(CellCoord::new(12, 12), Heading::Up, occupancy));
}

#[test]
fn lookahead_flags_trails_within_range() {
    let chaser = Chaser::default();
    let cells = occupancy_with(GRID, &[CellCoord::new(15, 3)]);
    let occupancy = OccupancyView::new(&cells, GRID);

    assert!(!chaser.is_safe(CellCoord::new(15, 15), Heading::Up, occupancy));
    assert!(chaser.is_safe(CellCoord::new(16, 15), Heading::Up, occupancy));
    assert!(chaser.is_safe(CellCoord::new(15, 16), Heading::Up, occupancy));
}

#[test]
fn cruising_bot_keeps_straight_when_everything_is_safe() {
    let chaser = calm_chaser();
    let cells = occupancy_with(GRID, &[]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let decision = chaser.decide(CellCoord::new(15, 15), Heading::Down, None, occupancy, &mut rng);

    assert_eq!(decision.heading, Heading::Down);
    assert_eq!(decision.intent, Intent::Cruise);
    assert_eq!(decision.cooldown, 6);
}

#[test]
fn cruising_bot_turns_left_before_right() {
    let chaser = calm_chaser();
    let cells = occupancy_with(GRID, &[CellCoord::new(20, 15)]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let decision = chaser.decide(CellCoord::new(15, 15), Heading::Right, None, occupancy, &mut rng);

    assert_eq!(decision.heading, Heading::Up);
    assert_eq!(decision.intent, Intent::Cruise);
}

#[test]
fn chasing_bot_closes_in_on_target() {
    let chaser = calm_chaser();
    let cells = occupancy_with(GRID, &[]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let decision = chaser.decide(
        CellCoord::new(15, 15),
        Heading::Right,
        Some(CellCoord::new(15, 3)),
        occupancy,
        &mut rng,
    );

    assert_eq!(decision.heading, Heading::Up);
    assert_eq!(decision.intent, Intent::Chase);
    assert_eq!(decision.cooldown, 6);
}

#[test]
fn chase_ties_resolve_in_evaluation_order() {
    let chaser = calm_chaser();
    let cells = occupancy_with(GRID, &[]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let cell = CellCoord::new(15, 15);

    let decision = chaser.decide(cell, Heading::Left, Some(cell), occupancy, &mut rng);

    assert_eq!(decision.heading, Heading::Left);
}

#[test]
fn chase_ignores_unsafe_shortcuts() {
    let chaser = calm_chaser();
    // Target sits straight up, but the column above is blocked.
    let cells = occupancy_with(GRID, &[CellCoord::new(15, 10)]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let decision = chaser.decide(
        CellCoord::new(15, 15),
        Heading::Right,
        Some(CellCoord::new(15, 5)),
        occupancy,
        &mut rng,
    );

    assert_ne!(decision.heading, Heading::Up);
    assert_eq!(decision.intent, Intent::Chase);
}

#[test]
fn cornered_bot_guesses_with_short_cooldown() {
    let chaser = Chaser::default();
    let grid = GridSize::new(5, 5);
    let cells = occupancy_with(grid, &[]);
    let occupancy = OccupancyView::new(&cells, grid);
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let decision = chaser.decide(CellCoord::new(2, 2), Heading::Up, None, occupancy, &mut rng);

    assert_eq!(decision.intent, Intent::Cornered);
    assert_eq!(decision.cooldown, 4);
    assert!(candidates(Heading::Up).contains(&decision.heading));
}

#[test]
fn always_wandering_bot_still_picks_safe_headings() {
    let chaser = Chaser::new(Tuning {
        random_turn_probability: 1.0,
        ..Tuning::default()
    });
    let cells = occupancy_with(GRID, &[CellCoord::new(20, 15)]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let cell = CellCoord::new(15, 15);

    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let decision = chaser.decide(cell, Heading::Right, None, occupancy, &mut rng);
        assert_eq!(decision.intent, Intent::Wander);
        assert_ne!(decision.heading, Heading::Right);
        assert!(chaser.is_safe(cell, decision.heading, occupancy));
    }
}

#[test]
fn lone_safe_heading_is_never_randomised() {
    let chaser = Chaser::new(Tuning {
        random_turn_probability: 1.0,
        ..Tuning::default()
    });
    let grid = GridSize::new(30, 30);
    // Only the corridor to the right is open.
    let cells = occupancy_with(
        grid,
        &[
            CellCoord::new(15, 14),
            CellCoord::new(15, 16),
            CellCoord::new(14, 15),
        ],
    );
    let occupancy = OccupancyView::new(&cells, grid);
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let decision = chaser.decide(CellCoord::new(15, 15), Heading::Up, None, occupancy, &mut rng);

    assert_eq!(decision.heading, Heading::Right);
    assert_eq!(decision.intent, Intent::Cruise);
}

#[test]
fn safe_candidate_is_chosen_whenever_one_exists() {
    let chaser = Chaser::default();
    let grid = GridSize::new(24, 24);

    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let blocked: Vec<CellCoord> = (0..60)
            .map(|_| CellCoord::new(rng.gen_range(0..24), rng.gen_range(0..24)))
            .collect();
        let cells = occupancy_with(grid, &blocked);
        let occupancy = OccupancyView::new(&cells, grid);
        let cell = CellCoord::new(rng.gen_range(0..24), rng.gen_range(0..24));
        let heading = Heading::ALL[rng.gen_range(0..4)];
        let target = rng
            .gen_bool(0.5)
            .then(|| CellCoord::new(rng.gen_range(0..24), rng.gen_range(0..24)));

        let any_safe = candidates(heading)
            .iter()
            .any(|candidate| chaser.is_safe(cell, *candidate, occupancy));
        let decision = chaser.decide(cell, heading, target, occupancy, &mut rng);

        if any_safe {
            assert!(
                chaser.is_safe(cell, decision.heading, occupancy),
                "seed {seed}: picked unsafe {:?}",
                decision.heading
            );
        } else {
            assert_eq!(decision.intent, Intent::Cornered);
        }
    }
}

#[test]
fn cooldown_skips_decisions() {
    let chaser = calm_chaser();
    let cells = occupancy_with(GRID, &[]);
    let occupancy = OccupancyView::new(&cells, GRID);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut state = ChaserState::new();
    let cell = CellCoord::new(15, 15);

    let first = state.steer(&chaser, cell, Heading::Down, None, occupancy, &mut rng);
    assert_eq!(first.map(|decision| decision.heading), Some(Heading::Down));
    assert_eq!(state.cooldown(), 6);

    for remaining in (0..6).rev() {
        assert_eq!(
            state.steer(&chaser, cell, Heading::Down, None, occupancy, &mut rng),
            None
        );
        assert_eq!(state.cooldown(), remaining);
    }

    assert!(state
        .steer(&chaser, cell, Heading::Down, None, occupancy, &mut rng)
        .is_some());
}

fn calm_chaser() -> Chaser {
    Chaser::new(Tuning {
        random_turn_probability: 0.0,
        ..Tuning::default()
    })
}

fn occupancy_with(grid: GridSize, blocked: &[CellCoord]) -> Vec<bool> {
    let mut cells = vec![false; usize::try_from(grid.cell_count()).expect("grid fits usize")];
    for cell in blocked {
        if let Some(index) = cell_index(grid, *cell) {
            cells[index] = true;
        }
    }
    cells
}
