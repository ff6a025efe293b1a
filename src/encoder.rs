//! Placement encoder (component F): turns a schedule of polyomino
//! blocks into the CNF described by spec §4.F, directly grounded on
//! `original_source/packing.py`'s `PackingSolver.__init__`.

use std::collections::BTreeMap;
use std::collections::HashMap;

use typed_index_collections::TiVec;

use crate::amo::{encode_at_most_one, AmoScheme};
use crate::cardinality::encode_cardinality;
use crate::instance::{ScheduleItem, StepId};
use crate::var::VarAllocator;

/// What a single choice literal means: item `item_id` is placed with
/// orientation `orientation` so its normalized top-left cell lands at
/// `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    pub item_id: usize,
    pub row: usize,
    pub col: usize,
    pub orientation: usize,
}

/// The fully built CNF bookkeeping needed to read back a solution and
/// to drive the width optimizer: the choice-variable map and the
/// per-column "block this column and everything right of it" variables
/// (spec §4.F / §4.G).
pub struct PlacementEncoder {
    pub choices: HashMap<i32, Choice>,
    pub block_vars: Vec<i32>,
    pub steps: usize,
    pub height: usize,
    pub max_width: usize,
}

impl PlacementEncoder {
    /// Emit every clause for `items` via `emit`, allocating variables
    /// from `vars`, and return the bookkeeping needed afterwards.
    pub fn build(
        vars: &mut VarAllocator,
        emit: &mut impl FnMut(Vec<i32>),
        items: &[ScheduleItem],
        height: usize,
        max_width: usize,
        use_cardinality: bool,
        amo_scheme: AmoScheme,
    ) -> Self {
        let steps = items.iter().map(|item| item.end).max().unwrap_or(0);

        let mut choices: HashMap<i32, Choice> = HashMap::new();
        let mut blocked: BTreeMap<(usize, usize, usize), Vec<i32>> = BTreeMap::new();
        let mut pos_used: TiVec<StepId, usize> = std::iter::repeat(0).take(steps).collect();

        for (item_id, item) in items.iter().enumerate() {
            let weight = item.shape.orientations()[0].len();
            for t in item.begin..item.end {
                pos_used[StepId(t)] += weight;
            }

            let mut item_choices: Vec<i32> = Vec::new();

            for (orientation, mask) in item.shape.orientations().iter().enumerate() {
                let mask_width = mask.max_col() as usize;
                let mask_height = mask.max_row() as usize;

                for row in 0..height.saturating_sub(mask_height) {
                    for col in 0..max_width.saturating_sub(mask_width) {
                        let choice = vars.alloc().pos();
                        item_choices.push(choice);
                        choices.insert(
                            choice,
                            Choice { item_id, row, col, orientation },
                        );

                        for t in item.begin..item.end {
                            for &(di, dj) in mask.cells() {
                                let cell_row = row + di as usize;
                                let cell_col = col + dj as usize;
                                blocked.entry((t, cell_row, cell_col)).or_default().push(choice);
                            }
                        }
                    }
                }
            }

            emit(item_choices.clone());
            encode_at_most_one(vars, emit, &item_choices, amo_scheme);
        }

        if use_cardinality {
            for (StepId(t), &use_count) in pos_used.iter_enumerated() {
                let mut in_use: Vec<i32> = Vec::new();

                for j in 0..max_width {
                    for i in 0..height {
                        let in_use_var = vars.alloc().pos();
                        in_use.push(in_use_var);

                        let blocking = blocked.get(&(t, i, j)).cloned().unwrap_or_default();
                        for &choice in &blocking {
                            emit(vec![-choice, in_use_var]);
                        }
                        let mut clause = vec![-in_use_var];
                        clause.extend(blocking.iter().copied());
                        emit(clause);
                    }
                }

                encode_cardinality(vars, emit, &in_use, use_count, use_count);
            }
        }

        let block_vars: Vec<i32> = vars.alloc_many(max_width).iter().map(|v| v.pos()).collect();

        for (j, &block_var) in block_vars.iter().enumerate() {
            for i in 0..height {
                for t in 0..steps {
                    blocked.entry((t, i, j)).or_default().push(block_var);
                }
            }
        }

        for i in 0..block_vars.len().saturating_sub(1) {
            emit(vec![-block_vars[i], block_vars[i + 1]]);
        }

        for blocked_list in blocked.values() {
            encode_at_most_one(vars, emit, blocked_list, amo_scheme);
        }

        PlacementEncoder { choices, block_vars, steps, height, max_width }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::WELL_KNOWN_SHAPES;
    use crate::solver::mock::MockSolver;
    use crate::solver::{IncrementalSolver, SolveOutcome};

    fn square() -> crate::shapes::ShapeSet {
        WELL_KNOWN_SHAPES.last().unwrap().clone()
    }

    #[test]
    fn single_square_is_satisfiable_at_its_own_size() {
        let items = vec![ScheduleItem::new(0, 1, square())];
        let mut vars = VarAllocator::new();
        let mut solver = MockSolver::new();
        let encoder = PlacementEncoder::build(
            &mut vars,
            &mut |clause| solver.add_clause(&clause),
            &items,
            2,
            2,
            true,
            AmoScheme::Pairwise,
        );

        assert_eq!(encoder.block_vars.len(), 2);
        for &v in &encoder.block_vars {
            solver.assume(-v);
        }
        assert_eq!(solver.solve(None), SolveOutcome::Sat);
    }

    #[test]
    fn single_square_is_unsatisfiable_in_a_too_small_strip() {
        let items = vec![ScheduleItem::new(0, 1, square())];
        let mut vars = VarAllocator::new();
        let mut solver = MockSolver::new();
        let encoder = PlacementEncoder::build(
            &mut vars,
            &mut |clause| solver.add_clause(&clause),
            &items,
            2,
            1,
            true,
            AmoScheme::Pairwise,
        );

        assert_eq!(solver.solve(None), SolveOutcome::Unsat);
        assert!(encoder.choices.is_empty(), "no placement fits a width-1 strip");
    }

    #[test]
    fn forcing_width_one_blocked_makes_two_disjoint_squares_satisfiable() {
        // Two 2x2 squares scheduled at disjoint times can share a 2-wide strip.
        let items = vec![
            ScheduleItem::new(0, 1, square()),
            ScheduleItem::new(1, 2, square()),
        ];
        let mut vars = VarAllocator::new();
        let mut solver = MockSolver::new();
        let encoder = PlacementEncoder::build(
            &mut vars,
            &mut |clause| solver.add_clause(&clause),
            &items,
            2,
            2,
            true,
            AmoScheme::Pairwise,
        );

        for &v in &encoder.block_vars {
            solver.assume(-v);
        }
        assert_eq!(solver.solve(None), SolveOutcome::Sat);
    }
}
