//! End-to-end scenarios (spec §8), run against the real
//! `rustsat-glucose` backend rather than the in-crate mock solver.

use polypack::amo::AmoScheme;
use polypack::encoder::PlacementEncoder;
use polypack::instance::ScheduleItem;
use polypack::optimizer::OptimizationDriver;
use polypack::shapes::{parse_shape, WELL_KNOWN_SHAPES};
use polypack::solver::GlucoseSolver;
use polypack::var::VarAllocator;

fn optimal_width(
    items: &[ScheduleItem],
    height: usize,
    max_width: usize,
    use_cardinality: bool,
    amo_scheme: AmoScheme,
) -> usize {
    let mut vars = VarAllocator::new();
    let mut solver = GlucoseSolver::new();
    let encoder = PlacementEncoder::build(
        &mut vars,
        &mut |clause| solver.add_clause(&clause),
        items,
        height,
        max_width,
        use_cardinality,
        amo_scheme,
    );

    let mut driver = OptimizationDriver::new(solver, encoder.block_vars.clone(), max_width);
    driver.optimize(|_, _| {});
    driver.upper_bound()
}

fn square() -> polypack::shapes::ShapeSet {
    WELL_KNOWN_SHAPES.last().unwrap().clone()
}

fn bar() -> polypack::shapes::ShapeSet {
    WELL_KNOWN_SHAPES[5].clone()
}

fn l_tetromino() -> polypack::shapes::ShapeSet {
    parse_shape("  #\n###")
}

#[test]
fn scenario_1_single_square() {
    let items = vec![ScheduleItem::new(0, 1, square())];
    for scheme in [AmoScheme::Pairwise, AmoScheme::Binary, AmoScheme::Commander, AmoScheme::Product] {
        for use_cardinality in [true, false] {
            assert_eq!(optimal_width(&items, 2, 4, use_cardinality, scheme), 2);
        }
    }
}

#[test]
fn scenario_2_two_overlapping_squares() {
    let items = vec![
        ScheduleItem::new(0, 1, square()),
        ScheduleItem::new(0, 1, square()),
    ];
    for scheme in [AmoScheme::Pairwise, AmoScheme::Binary, AmoScheme::Commander, AmoScheme::Product] {
        for use_cardinality in [true, false] {
            assert_eq!(optimal_width(&items, 2, 4, use_cardinality, scheme), 4);
        }
    }
}

#[test]
fn scenario_3_two_disjoint_in_time_squares() {
    let items = vec![
        ScheduleItem::new(0, 1, square()),
        ScheduleItem::new(1, 2, square()),
    ];
    for scheme in [AmoScheme::Pairwise, AmoScheme::Binary, AmoScheme::Commander, AmoScheme::Product] {
        for use_cardinality in [true, false] {
            assert_eq!(optimal_width(&items, 2, 4, use_cardinality, scheme), 2);
        }
    }
}

#[test]
fn scenario_4_single_l_tetromino() {
    let items = vec![ScheduleItem::new(0, 1, l_tetromino())];
    assert_eq!(optimal_width(&items, 2, 5, true, AmoScheme::Pairwise), 3);
}

#[test]
fn scenario_5_three_simultaneous_bars() {
    let items = vec![
        ScheduleItem::new(0, 1, bar()),
        ScheduleItem::new(0, 1, bar()),
        ScheduleItem::new(0, 1, bar()),
    ];
    assert_eq!(optimal_width(&items, 3, 5, true, AmoScheme::Product), 4);
}

#[test]
fn scenario_6_empty_schedule() {
    let items: Vec<ScheduleItem> = Vec::new();
    for scheme in [AmoScheme::Pairwise, AmoScheme::Binary, AmoScheme::Commander, AmoScheme::Product] {
        for use_cardinality in [true, false] {
            assert_eq!(optimal_width(&items, 2, 4, use_cardinality, scheme), 0);
        }
    }
}
