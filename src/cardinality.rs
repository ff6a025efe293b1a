//! Cardinality encoder (component D): `low <= sum(literals) <= high`,
//! built by threading a Batcher sorting network over the literals and
//! clamping the sorted tail/head to constants.

use crate::sorting_network::sorting_network;
use crate::var::VarAllocator;

/// Encode `low <= sum(literals) <= high` by emitting clauses through
/// `emit`, allocating auxiliaries from `vars`.
///
/// `literals.len() >= low`, `high <= literals.len()` and `low <= high`
/// are the caller's responsibility (spec §4.D's contract); violating
/// them produces an over- or under-constrained (but still well-formed)
/// encoding rather than a panic, since `low`/`high` only gate which
/// comparator outputs get forced.
pub fn encode_cardinality(
    vars: &mut VarAllocator,
    emit: &mut impl FnMut(Vec<i32>),
    literals: &[i32],
    low: usize,
    high: usize,
) {
    let mut working: Vec<i32> = literals.to_vec();

    for (a, b) in sorting_network(working.len()) {
        let out_low = vars.alloc().pos();
        let out_high = vars.alloc().pos();

        let in_a = working[a];
        let in_b = working[b];

        emit(vec![-in_a, out_high]);
        emit(vec![-in_b, out_high]);
        emit(vec![-in_a, -in_b, out_low]);

        emit(vec![in_a, -out_low]);
        emit(vec![in_b, -out_low]);
        emit(vec![in_a, in_b, -out_high]);

        working[a] = out_low;
        working[b] = out_high;
    }

    // `working` is now ascending; reverse so index 0 is the largest.
    for (i, &lit) in working.iter().rev().enumerate() {
        if i < low {
            emit(vec![lit]);
        } else if i >= high {
            emit(vec![-lit]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::satisfiable;
    use std::collections::HashMap;

    fn check(n: usize, low: usize, high: usize) {
        let mut vars = VarAllocator::new();
        let literals: Vec<i32> = vars.alloc_many(n).iter().map(|v| v.pos()).collect();
        let mut clauses = Vec::new();
        encode_cardinality(&mut vars, &mut |c| clauses.push(c), &literals, low, high);

        for assignment in 0..(1u64 << n) {
            let fixed: HashMap<i32, bool> = literals
                .iter()
                .enumerate()
                .map(|(i, &lit)| (lit, (assignment >> i) & 1 == 1))
                .collect();
            let count = (0..n).filter(|&i| (assignment >> i) & 1 == 1).count();
            let expected = low <= count && count <= high;

            assert_eq!(
                satisfiable(&clauses, &fixed),
                expected,
                "n={n} low={low} high={high} assignment={assignment:b}"
            );
        }
    }

    #[test]
    fn matches_exact_count_for_all_bounds_up_to_8() {
        for n in 0..=8usize {
            for low in 0..=n {
                for high in low..=n {
                    check(n, low, high);
                }
            }
        }
    }

    #[test]
    fn spot_checks_up_to_16() {
        for n in [9usize, 12, 16] {
            check(n, 0, n);
            check(n, n, n);
            check(n, n / 2, n / 2);
            check(n, n / 3, 2 * n / 3);
        }
    }
}
