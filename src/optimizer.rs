//! Width optimizer (component G): the alternating upper/lower bound
//! search with adaptive timeouts, grounded directly on
//! `original_source/packing.py`'s `optimize`/`solve`/`lower_blocked_width`
//! and mirroring the teacher's `solve_debug_with_mode` main-loop shape.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::solver::{IncrementalSolver, SolveOutcome, TriVal};

/// Drives `solver` towards the optimal strip width for a formula built
/// by [`crate::encoder::PlacementEncoder`].
pub struct OptimizationDriver<S: IncrementalSolver> {
    pub solver: S,
    block_vars: Vec<i32>,
    max_width: usize,
    /// Largest width proven infeasible, or -1 if none yet.
    lower: i64,
    /// Smallest width proven feasible, or `max_width + 1` if none yet.
    upper: i64,
    /// Smallest width permanently forbidden by a unit clause so far.
    blocked_width: usize,
    lower_timeout_secs: f64,
    upper_timeout_secs: f64,
}

impl<S: IncrementalSolver> OptimizationDriver<S> {
    pub fn new(solver: S, block_vars: Vec<i32>, max_width: usize) -> Self {
        OptimizationDriver {
            solver,
            block_vars,
            max_width,
            lower: -1,
            upper: max_width as i64 + 1,
            blocked_width: max_width,
            lower_timeout_secs: 5.0,
            upper_timeout_secs: 5.0,
        }
    }

    /// Tightest infeasible/feasible bracket found so far: `(lower, upper)`
    /// with every width in `lower+1..upper` still open.
    pub fn bounds(&self) -> (i64, i64) {
        (self.lower, self.upper)
    }

    pub fn upper_bound(&self) -> usize {
        self.upper.max(0) as usize
    }

    /// Permanently forbid any width `>= width` for the rest of the
    /// search. A no-op once a tighter permanent bound is already set.
    pub fn lower_blocked_width(&mut self, width: usize) {
        if width < self.blocked_width {
            self.blocked_width = width;
            let blocked = self.block_vars[width];
            self.solver.add_clause(&[blocked]);
        }
    }

    /// One bounded query asking "does a packing of strip width `width`
    /// exist?". Returns `true` if the query reached a definite verdict
    /// (as opposed to timing out), and calls `on_solution` with the
    /// achieved width whenever a strictly tighter upper bound is found
    /// — the caller reads the placement back from `self.solver`'s model
    /// via the encoder's choice map.
    pub fn solve_at(
        &mut self,
        width: usize,
        timeout: Option<Duration>,
        mut on_solution: impl FnMut(&mut S, usize),
    ) -> bool {
        if width < self.blocked_width {
            let blocked = self.block_vars[width];
            self.solver.assume(blocked);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let result = self.solver.solve(deadline);

        let mut new_lower = result == SolveOutcome::Unsat;
        if new_lower {
            self.lower = width as i64;
        }

        loop {
            if self.lower >= self.max_width as i64 {
                break;
            }
            let idx = (self.lower + 1) as usize;
            if idx >= self.block_vars.len() {
                break;
            }
            if self.solver.fixed(self.block_vars[idx]) != TriVal::False {
                break;
            }
            self.lower += 1;
            new_lower = true;
        }

        if new_lower {
            debug!("new lower bound {}..{}", self.lower + 1, self.upper);
        }

        match result {
            SolveOutcome::Sat => {
                let used = self
                    .block_vars
                    .iter()
                    .filter(|&&v| self.solver.value(v) == TriVal::True)
                    .count();
                let achieved_width = self.max_width - used;
                self.upper = achieved_width as i64;
                on_solution(&mut self.solver, achieved_width);
                self.lower_blocked_width(achieved_width.saturating_sub(1));
                debug!("new upper bound {}..{}", self.lower + 1, self.upper);
                true
            }
            SolveOutcome::Unsat => true,
            SolveOutcome::Interrupted => false,
        }
    }

    /// The full alternating-query search: narrows `[lower, upper)` down
    /// to a single width, reporting each improvement via `on_solution`.
    pub fn optimize(&mut self, mut on_solution: impl FnMut(&mut S, usize)) {
        info!("optimizing...");
        while self.lower + 1 < self.upper {
            if self.lower + 2 == self.upper {
                self.solve_at((self.lower + 1) as usize, None, &mut on_solution);
                break;
            }

            let progress = self.solve_at(
                (self.upper - 1) as usize,
                Some(Duration::from_secs_f64(self.upper_timeout_secs)),
                &mut on_solution,
            );
            if !progress {
                self.upper_timeout_secs *= 2.0;
            }

            if self.lower + 1 >= self.upper {
                break;
            }

            let progress = self.solve_at(
                (self.lower + 1) as usize,
                Some(Duration::from_secs_f64(self.lower_timeout_secs)),
                &mut on_solution,
            );
            if !progress {
                self.lower_timeout_secs *= 1.1;
            }
        }
    }
}
