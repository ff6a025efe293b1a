//! Crate-wide error types (spec §7). Manual `Display`/`Error` impls,
//! matching the corpus's idiom for small focused error enums (see
//! `jesper-olsen-sat_puzzles`'s `SudokuParseError`) rather than pulling
//! in `thiserror`, which the teacher's own dependency table doesn't
//! carry either.

use std::fmt;

#[derive(Debug)]
pub enum PolypackError {
    /// Invalid at-most-one scheme name, non-positive dimensions, or
    /// `max_width` too small for some orientation.
    Configuration(String),
    /// The SAT or IP solver back-end could not be initialized.
    BackendUnavailable(String),
    /// The solver returned a status this adapter doesn't recognize.
    SolverProtocol(String),
    /// The formula is UNSAT even at `max_width`.
    Infeasible { max_width: usize },
}

impl fmt::Display for PolypackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolypackError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            PolypackError::BackendUnavailable(msg) => {
                write!(f, "solver back-end unavailable: {msg}")
            }
            PolypackError::SolverProtocol(msg) => write!(f, "solver protocol error: {msg}"),
            PolypackError::Infeasible { max_width } => write!(
                f,
                "no packing exists within given bounds (max_width = {max_width})"
            ),
        }
    }
}

impl std::error::Error for PolypackError {}

pub type Result<T> = std::result::Result<T, PolypackError>;
