//! Shared DPLL-style brute-force solver used by `amo`, `cardinality`, and
//! `solver`'s test-only `MockSolver` — one oracle instead of three copies.

#![cfg(test)]

use std::collections::HashMap;

fn value_of(assign: &HashMap<i32, bool>, lit: i32) -> Option<bool> {
    assign.get(&lit.abs()).map(|&v| if lit > 0 { v } else { !v })
}

fn search(clauses: &[Vec<i32>], assign: &mut HashMap<i32, bool>) -> bool {
    loop {
        let mut progressed = false;
        for clause in clauses {
            let mut unknown = None;
            let mut satisfied = false;
            let mut unknown_count = 0;
            for &lit in clause {
                match value_of(assign, lit) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        unknown_count += 1;
                        unknown = Some(lit);
                    }
                }
            }
            if satisfied {
                continue;
            }
            if unknown_count == 0 {
                return false;
            }
            if unknown_count == 1 {
                let lit = unknown.unwrap();
                assign.insert(lit.abs(), lit > 0);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    let unassigned = clauses.iter().flatten().map(|lit| lit.abs()).find(|v| !assign.contains_key(v));

    match unassigned {
        None => clauses.iter().all(|clause| clause.iter().any(|&lit| value_of(assign, lit) == Some(true))),
        Some(v) => {
            for candidate in [true, false] {
                let mut next = assign.clone();
                next.insert(v, candidate);
                if search(clauses, &mut next) {
                    *assign = next;
                    return true;
                }
            }
            false
        }
    }
}

/// Find a satisfying assignment extending `fixed`, with every other
/// variable existentially quantified. Returns the full assignment on
/// success.
pub(crate) fn solve_clauses(clauses: &[Vec<i32>], fixed: &HashMap<i32, bool>) -> Option<HashMap<i32, bool>> {
    let mut assign = fixed.clone();
    if search(clauses, &mut assign) {
        Some(assign)
    } else {
        None
    }
}

/// Whether `clauses` is satisfiable with `fixed` held constant.
pub(crate) fn satisfiable(clauses: &[Vec<i32>], fixed: &HashMap<i32, bool>) -> bool {
    solve_clauses(clauses, fixed).is_some()
}
