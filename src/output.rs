//! Solution readout and JSON artifacts (spec §3/§7), grounded on
//! `original_source/packing.py`'s `save_solution`, supplemented with
//! `chrono`-stamped metadata the way the teacher's own stats dumps do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::encoder::PlacementEncoder;
use crate::error::{PolypackError, Result};
use crate::solver::{IncrementalSolver, TriVal};

/// One cell of the packed grid: `None` if unused, `Some(item_id)`
/// otherwise.
pub type Cell = Option<usize>;

/// `grid[t][row][col]`, one `height x width` plane per time step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Solution {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<Vec<Cell>>>,
    pub generated_at: DateTime<Utc>,
}

/// Paint a solution using the original item list (shape cells are read
/// back from each item's `ShapeSet`), asserting no cell is written
/// twice (spec §7).
pub fn paint_solution(
    solver: &impl IncrementalSolver,
    encoder: &PlacementEncoder,
    items: &[crate::instance::ScheduleItem],
    width: usize,
    generated_at: DateTime<Utc>,
) -> Solution {
    let mut grid: Vec<Vec<Vec<Cell>>> =
        vec![vec![vec![None; width]; encoder.height]; encoder.steps];

    let true_choices: HashMap<i32, _> = encoder
        .choices
        .iter()
        .filter(|(&var, _)| solver.value(var) == TriVal::True)
        .map(|(&var, choice)| (var, *choice))
        .collect();

    for choice in true_choices.values() {
        let item = &items[choice.item_id];
        let mask = &item.shape.orientations()[choice.orientation];

        for &(di, dj) in mask.cells() {
            let cell_row = choice.row + di as usize;
            let cell_col = choice.col + dj as usize;

            for t in item.begin..item.end {
                let cell = &mut grid[t][cell_row][cell_col];
                assert!(cell.is_none(), "cell ({t},{cell_row},{cell_col}) painted twice");
                *cell = Some(choice.item_id);
            }
        }
    }

    Solution { width, height: encoder.height, grid, generated_at }
}

/// Write a solution artifact to `path` as JSON, mirroring
/// `save_solution`'s `solution_{width}.json` naming convention.
pub fn save_solution(solution: &Solution, path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|err| PolypackError::Configuration(format!("creating {}: {err}", path.display())))?;
    serde_json::to_writer(file, solution)
        .map_err(|err| PolypackError::Configuration(format!("writing {}: {err}", path.display())))
}

pub fn load_solution(path: &std::path::Path) -> Result<Solution> {
    let file = std::fs::File::open(path)
        .map_err(|err| PolypackError::Configuration(format!("opening {}: {err}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|err| PolypackError::Configuration(format!("parsing {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amo::AmoScheme;
    use crate::instance::ScheduleItem;
    use crate::shapes::WELL_KNOWN_SHAPES;
    use crate::solver::mock::MockSolver;
    use crate::solver::SolveOutcome;
    use crate::var::VarAllocator;

    fn now_placeholder() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).expect("epoch is a valid timestamp")
    }

    #[test]
    fn painted_solution_has_no_double_writes_for_a_single_square() {
        let square = WELL_KNOWN_SHAPES.last().unwrap().clone();
        let items = vec![ScheduleItem::new(0, 1, square)];

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

        let solution = paint_solution(&solver, &encoder, &items, 2, now_placeholder());
        assert_eq!(solution.grid.len(), 1);
        let mut covered = 0;
        for row in &solution.grid[0] {
            for cell in row {
                if cell.is_some() {
                    covered += 1;
                }
            }
        }
        assert_eq!(covered, 4);
    }

    #[test]
    fn solution_round_trips_through_json() {
        let solution = Solution {
            width: 2,
            height: 2,
            grid: vec![vec![vec![Some(0), None], vec![None, Some(0)]]],
            generated_at: now_placeholder(),
        };

        let dir = std::env::temp_dir().join(format!("polypack-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solution_2.json");

        save_solution(&solution, &path).unwrap();
        let loaded = load_solution(&path).unwrap();
        assert_eq!(loaded.width, solution.width);
        assert_eq!(loaded.grid, solution.grid);

        std::fs::remove_file(&path).unwrap();
    }
}
