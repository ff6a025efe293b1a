//! At-most-one encoder (component C): "at most one of N literals is
//! true", in four interchangeable schemes.
//!
//! Literals are plain DIMACS-style signed integers (`i32`): positive is
//! the variable, negative is its complement. This matches `var::Var`'s
//! `pos()`/`neg()` convention and keeps clause emission scheme-agnostic
//! down to a single `FnMut(Vec<i32>)` sink.

use crate::var::VarAllocator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmoScheme {
    Pairwise,
    Binary,
    Commander,
    Product,
}

impl AmoScheme {
    /// Scheme name as used on the CLI (`--at-most-one`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pairwise" => Some(AmoScheme::Pairwise),
            "binary" => Some(AmoScheme::Binary),
            "commander" => Some(AmoScheme::Commander),
            "product" => Some(AmoScheme::Product),
            _ => None,
        }
    }

    fn threshold(self) -> usize {
        match self {
            AmoScheme::Pairwise => usize::MAX,
            AmoScheme::Binary => 4,
            AmoScheme::Commander => 16,
            AmoScheme::Product => 16,
        }
    }
}

/// Encode "at most one of `literals` is true" by emitting clauses
/// through `emit`, allocating any needed auxiliary variables from
/// `vars`.
pub fn encode_at_most_one(
    vars: &mut VarAllocator,
    emit: &mut impl FnMut(Vec<i32>),
    literals: &[i32],
    scheme: AmoScheme,
) {
    if literals.len() <= 1 {
        return;
    }
    if literals.len() == 2 {
        emit(vec![-literals[0], -literals[1]]);
        return;
    }

    if literals.len() > scheme.threshold() {
        match scheme {
            AmoScheme::Pairwise => unreachable!("pairwise has no finite threshold"),
            AmoScheme::Binary => encode_binary(vars, emit, literals),
            AmoScheme::Commander => encode_commander(vars, emit, literals),
            AmoScheme::Product => encode_product(vars, emit, literals),
        }
    } else {
        encode_pairwise(emit, literals);
    }
}

fn encode_pairwise(emit: &mut impl FnMut(Vec<i32>), literals: &[i32]) {
    for i in 0..literals.len() {
        for j in (i + 1)..literals.len() {
            emit(vec![-literals[i], -literals[j]]);
        }
    }
}

fn encode_binary(vars: &mut VarAllocator, emit: &mut impl FnMut(Vec<i32>), literals: &[i32]) {
    let bits = usize::BITS - (literals.len() - 1).leading_zeros();
    let index: Vec<i32> = vars.alloc_many(bits as usize).iter().map(|v| v.pos()).collect();

    for (i, &lit) in literals.iter().enumerate() {
        for (bit, &index_bit) in index.iter().enumerate() {
            if (i >> bit) & 1 == 1 {
                emit(vec![-lit, index_bit]);
            } else {
                emit(vec![-lit, -index_bit]);
            }
        }
    }
}

fn encode_commander(vars: &mut VarAllocator, emit: &mut impl FnMut(Vec<i32>), literals: &[i32]) {
    let group_count = (literals.len() as f64).sqrt() as usize;
    let group_count = group_count.max(1);

    let commanders: Vec<i32> = vars.alloc_many(group_count).iter().map(|v| v.pos()).collect();

    let mut groups: Vec<Vec<i32>> = vec![Vec::new(); group_count];
    for (i, &lit) in literals.iter().enumerate() {
        groups[i % group_count].push(lit);
    }
    for (k, group) in groups.iter_mut().enumerate() {
        group.push(-commanders[k]);
    }

    for group in &groups {
        emit(group.clone());
        encode_at_most_one(vars, emit, group, AmoScheme::Commander);
    }

    encode_at_most_one(vars, emit, &commanders, AmoScheme::Commander);
}

fn encode_product(vars: &mut VarAllocator, emit: &mut impl FnMut(Vec<i32>), literals: &[i32]) {
    let rows = (literals.len() as f64).sqrt() as usize;
    let rows = rows.max(1);
    let columns = (literals.len() + rows - 1) / rows;

    let row_vars: Vec<i32> = vars.alloc_many(rows).iter().map(|v| v.pos()).collect();
    let column_vars: Vec<i32> = vars.alloc_many(columns).iter().map(|v| v.pos()).collect();

    for (i, &row_var) in row_vars.iter().enumerate() {
        for (j, &column_var) in column_vars.iter().enumerate() {
            let k = i * columns + j;
            if let Some(&input_var) = literals.get(k) {
                emit(vec![-input_var, row_var]);
                emit(vec![-input_var, column_var]);
            }
        }
    }

    encode_at_most_one(vars, emit, &row_vars, AmoScheme::Product);
    encode_at_most_one(vars, emit, &column_vars, AmoScheme::Product);
}
