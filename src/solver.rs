//! SAT solver adapter (component E): the narrow incremental interface
//! the rest of the core consumes, plus the production backend wired to
//! `rustsat-glucose`.
//!
//! The core (amo/cardinality/encoder/optimizer) is generic over
//! `IncrementalSolver` the same way the teacher's `sat.rs` is generic
//! over `impl SatInstance<L> + SatSolverWithCore<Lit = L>` — we spell
//! out our own trait here because the teacher's concrete crate
//! (`satcoder`) is a local path dependency in its own workspace and
//! isn't fetchable from this crate (see DESIGN.md).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rustsat::instances::Cnf;
use rustsat::solvers::{Interrupt, InterruptSolver, Solve, SolveIncremental, SolverResult as RustSatResult};
use rustsat::types::{Lit, TernaryVal, Var};
use rustsat_glucose::core::Glucose;

/// Outcome of one `solve()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    Sat,
    Unsat,
    Interrupted,
}

/// Three-valued literal query result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriVal {
    True,
    False,
    Unknown,
}

/// The narrow incremental interface (spec §4.E): add, assume, solve,
/// value, fixed, and a wall-clock deadline in place of a polled
/// terminate callback. Implementations are expected to actually abort
/// an in-flight search once the deadline passes, not merely refuse to
/// start one (see `GlucoseSolver::solve`'s side-thread interrupter).
pub trait IncrementalSolver {
    /// Append a permanent clause over signed DIMACS-style literals.
    fn add_clause(&mut self, clause: &[i32]);

    /// Assert a literal for the next `solve()` call only.
    fn assume(&mut self, lit: i32);

    /// Solve under the current assumptions and deadline.
    fn solve(&mut self, deadline: Option<Instant>) -> SolveOutcome;

    /// Value of `lit` in the last SAT model.
    fn value(&self, lit: i32) -> TriVal;

    /// Whether `lit` is permanently implied by the clause database,
    /// independent of the last solve's assumptions.
    fn fixed(&self, lit: i32) -> TriVal;
}

fn lit_from_i32(lit: i32) -> Lit {
    let var = Var::new((lit.unsigned_abs() - 1) as u32);
    if lit > 0 {
        var.pos_lit()
    } else {
        var.neg_lit()
    }
}

fn i32_from_lit(lit: Lit) -> i32 {
    let idx = lit.vidx() as i32 + 1;
    if lit.is_pos() {
        idx
    } else {
        -idx
    }
}

/// Production backend: an incremental Glucose CDCL solver via `rustsat`.
pub struct GlucoseSolver {
    inner: Glucose,
    assumptions: Vec<Lit>,
    last_result: Option<RustSatResult>,
}

impl Default for GlucoseSolver {
    fn default() -> Self {
        GlucoseSolver {
            inner: Glucose::default(),
            assumptions: Vec::new(),
            last_result: None,
        }
    }
}

impl GlucoseSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncrementalSolver for GlucoseSolver {
    fn add_clause(&mut self, clause: &[i32]) {
        let mut cnf = Cnf::new();
        cnf.add_clause(clause.iter().map(|&l| lit_from_i32(l)).collect());
        if let Err(err) = self.inner.add_cnf(cnf) {
            warn!("glucose rejected a clause after a solved state: {err}");
        }
    }

    fn assume(&mut self, lit: i32) {
        self.assumptions.push(lit_from_i32(lit));
    }

    fn solve(&mut self, deadline: Option<Instant>) -> SolveOutcome {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                self.assumptions.clear();
                return SolveOutcome::Interrupted;
            }
        }

        // Poll the deadline on a side thread and call into the solver's own
        // interrupt handle when it passes, so a search that is still running
        // at the timeout actually aborts instead of running to completion.
        let timer = deadline.map(|deadline| {
            let done = Arc::new(AtomicBool::new(false));
            let interrupter = self.inner.interrupter();
            let handle = {
                let done = Arc::clone(&done);
                std::thread::spawn(move || {
                    while Instant::now() < deadline {
                        if done.load(Ordering::Relaxed) {
                            return;
                        }
                        std::thread::sleep(Duration::from_millis(10));
                    }
                    if !done.load(Ordering::Relaxed) {
                        interrupter.interrupt();
                    }
                })
            };
            (handle, done)
        });

        let assumps = std::mem::take(&mut self.assumptions);
        let result = self.inner.solve_assumps(&assumps);

        if let Some((handle, done)) = timer {
            done.store(true, Ordering::Relaxed);
            let _ = handle.join();
        }

        match result {
            Ok(RustSatResult::Sat) => {
                self.last_result = Some(RustSatResult::Sat);
                SolveOutcome::Sat
            }
            Ok(RustSatResult::Unsat) => {
                self.last_result = Some(RustSatResult::Unsat);
                SolveOutcome::Unsat
            }
            Ok(RustSatResult::Interrupted) => SolveOutcome::Interrupted,
            Err(err) => {
                debug!("solver protocol error: {err}");
                SolveOutcome::Interrupted
            }
        }
    }

    fn value(&self, lit: i32) -> TriVal {
        match self.inner.lit_val(lit_from_i32(lit)) {
            Ok(TernaryVal::True) => TriVal::True,
            Ok(TernaryVal::False) => TriVal::False,
            Ok(TernaryVal::DontCare) | Err(_) => TriVal::Unknown,
        }
    }

    fn fixed(&self, _lit: i32) -> TriVal {
        // No root-level-implication query in `rustsat`'s trait surface;
        // conservatively report Unknown (see DESIGN.md open question 4).
        TriVal::Unknown
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! A tiny in-memory solver used by `encoder`/`optimizer` unit tests,
    //! so the core's control flow can be exercised without depending on
    //! `rustsat-glucose`'s actual search. Backed by the same DPLL-style
    //! brute solver as `amo`/`cardinality`'s property tests.
    use super::*;
    use crate::test_support::solve_clauses;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct MockSolver {
        pub clauses: Vec<Vec<i32>>,
        assumptions: Vec<i32>,
        model: Option<HashMap<i32, bool>>,
    }

    impl MockSolver {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl IncrementalSolver for MockSolver {
        fn add_clause(&mut self, clause: &[i32]) {
            self.clauses.push(clause.to_vec());
        }

        fn assume(&mut self, lit: i32) {
            self.assumptions.push(lit);
        }

        fn solve(&mut self, deadline: Option<Instant>) -> SolveOutcome {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    self.assumptions.clear();
                    return SolveOutcome::Interrupted;
                }
            }
            let assumps = std::mem::take(&mut self.assumptions);
            let fixed: HashMap<i32, bool> = assumps.iter().map(|&l| (l.abs(), l > 0)).collect();
            match solve_clauses(&self.clauses, &fixed) {
                Some(model) => {
                    self.model = Some(model);
                    SolveOutcome::Sat
                }
                None => {
                    self.model = None;
                    SolveOutcome::Unsat
                }
            }
        }

        fn value(&self, lit: i32) -> TriVal {
            match self.model.as_ref().and_then(|m| m.get(&lit.abs())) {
                Some(&v) => {
                    if v == (lit > 0) {
                        TriVal::True
                    } else {
                        TriVal::False
                    }
                }
                None => TriVal::Unknown,
            }
        }

        fn fixed(&self, _lit: i32) -> TriVal {
            TriVal::Unknown
        }
    }
}
