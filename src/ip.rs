//! Integer-programming formulation (component H): the same packing
//! problem expressed as 0/1 integer constraints instead of CNF,
//! grounded on `original_source/packing_ip.py`. Two solve paths mirror
//! the pack's IP examples: an in-process `grb` (Gurobi) model, and an
//! MPS file shelled out to an external solver (`cbc`) via `duct`,
//! matching the original's `subprocess.check_call(['cbc', ...])`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::error::{PolypackError, Result};
use crate::instance::ScheduleItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Equal,
    GreaterEqual,
    LessEqual,
}

impl RowKind {
    fn mps_code(self) -> &'static str {
        match self {
            RowKind::Equal => "E",
            RowKind::GreaterEqual => "G",
            RowKind::LessEqual => "L",
        }
    }
}

/// One row: `sum(coef * column) <kind> rhs`.
pub struct Constraint {
    pub terms: Vec<(f64, String)>,
    pub kind: RowKind,
    pub rhs: f64,
}

/// What a `c_*` column means, for reading a solved model back.
#[derive(Clone, Copy, Debug)]
pub struct IpChoice {
    pub item_id: usize,
    pub row: usize,
    pub col: usize,
    pub orientation: usize,
}

pub struct IpModel {
    pub constraints: Vec<Constraint>,
    pub choices: BTreeMap<String, IpChoice>,
    pub block_vars: Vec<String>,
    pub max_width: usize,
}

impl IpModel {
    /// Build the full constraint set for `items` (spec §4.F's variables,
    /// expressed as 0/1 IP columns instead of SAT literals).
    pub fn build(items: &[ScheduleItem], height: usize, max_width: usize, use_cardinality: bool) -> Self {
        let steps = items.iter().map(|item| item.end).max().unwrap_or(0);

        let mut constraints: Vec<Constraint> = Vec::new();
        let mut choices: BTreeMap<String, IpChoice> = BTreeMap::new();
        let mut blocked: BTreeMap<(usize, usize, usize), Vec<String>> = BTreeMap::new();
        let mut pos_used = vec![0usize; steps];

        for (item_id, item) in items.iter().enumerate() {
            let weight = item.shape.orientations()[0].len();
            for t in item.begin..item.end {
                pos_used[t] += weight;
            }

            let mut item_choices: Vec<String> = Vec::new();

            for (orientation, mask) in item.shape.orientations().iter().enumerate() {
                let mask_width = mask.max_col() as usize;
                let mask_height = mask.max_row() as usize;

                for row in 0..height.saturating_sub(mask_height) {
                    for col in 0..max_width.saturating_sub(mask_width) {
                        let column = format!("c_{item_id}_{row}_{col}_{orientation}");
                        item_choices.push(column.clone());
                        choices.insert(column.clone(), IpChoice { item_id, row, col, orientation });

                        for t in item.begin..item.end {
                            for &(di, dj) in mask.cells() {
                                let cell_row = row + di as usize;
                                let cell_col = col + dj as usize;
                                blocked.entry((t, cell_row, cell_col)).or_default().push(column.clone());
                            }
                        }
                    }
                }
            }

            constraints.push(Constraint {
                terms: item_choices.into_iter().map(|c| (1.0, c)).collect(),
                kind: RowKind::Equal,
                rhs: 1.0,
            });
        }

        if use_cardinality {
            for (t, &use_count) in pos_used.iter().enumerate() {
                let mut in_use: Vec<String> = Vec::new();

                for j in 0..max_width {
                    for i in 0..height {
                        let in_use_var = format!("f_{t}_{j}_{i}");
                        in_use.push(in_use_var.clone());

                        let blocking = blocked.get(&(t, i, j)).cloned().unwrap_or_default();
                        for choice in &blocking {
                            constraints.push(Constraint {
                                terms: vec![(-1.0, choice.clone()), (1.0, in_use_var.clone())],
                                kind: RowKind::GreaterEqual,
                                rhs: 0.0,
                            });
                        }

                        let mut terms = vec![(-1.0, in_use_var.clone())];
                        terms.extend(blocking.iter().map(|c| (1.0, c.clone())));
                        constraints.push(Constraint { terms, kind: RowKind::GreaterEqual, rhs: 0.0 });
                    }
                }

                constraints.push(Constraint {
                    terms: in_use.into_iter().map(|v| (1.0, v)).collect(),
                    kind: RowKind::Equal,
                    rhs: use_count as f64,
                });
            }
        }

        let block_vars: Vec<String> = (0..max_width).map(|j| format!("b_{j}")).collect();

        for (j, block_var) in block_vars.iter().enumerate() {
            for i in 0..height {
                for t in 0..steps {
                    blocked.entry((t, i, j)).or_default().push(block_var.clone());
                }
            }
        }

        for i in 0..block_vars.len().saturating_sub(1) {
            constraints.push(Constraint {
                terms: vec![(-1.0, block_vars[i].clone()), (1.0, block_vars[i + 1].clone())],
                kind: RowKind::GreaterEqual,
                rhs: 0.0,
            });
        }

        let mut width_terms: Vec<(f64, String)> = vec![(1.0, "b".to_string())];
        width_terms.extend(block_vars.iter().map(|v| (1.0, v.clone())));
        constraints.push(Constraint { terms: width_terms, kind: RowKind::Equal, rhs: max_width as f64 });

        for blocked_list in blocked.values() {
            constraints.push(Constraint {
                terms: blocked_list.iter().map(|v| (1.0, v.clone())).collect(),
                kind: RowKind::LessEqual,
                rhs: 1.0,
            });
        }

        IpModel { constraints, choices, block_vars, max_width }
    }

    /// Emit the model in fixed-format MPS, objective `width = b + sum(block_vars)`
    /// minimized — same column/row layout as `packing_ip.py`'s `optimize`.
    pub fn write_mps(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "NAME TESTPROB")?;
        writeln!(out, "ROWS")?;
        writeln!(out, " N width")?;

        let mut by_column: BTreeMap<&str, Vec<(f64, usize)>> = BTreeMap::new();
        for (i, constraint) in self.constraints.iter().enumerate() {
            writeln!(out, " {} R{i}", constraint.kind.mps_code())?;
            for (coef, col) in &constraint.terms {
                by_column.entry(col.as_str()).or_default().push((*coef, i));
            }
        }

        writeln!(out, "COLUMNS")?;
        for (col, rows) in &by_column {
            for (coef, i) in rows {
                writeln!(out, "    {col} R{i} {coef}")?;
            }
            if *col == "b" {
                writeln!(out, "    b width 1")?;
            }
        }

        writeln!(out, "RHS")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            writeln!(out, "    RHS1 R{i} {}", constraint.rhs)?;
        }

        writeln!(out, "BOUNDS")?;
        for col in by_column.keys() {
            if *col != "b" {
                writeln!(out, " BV BND1 {col}")?;
            } else {
                writeln!(out, " LI BND1 {col} 0")?;
            }
        }

        writeln!(out, "ENDATA")?;
        out.flush()
    }

    pub fn to_mps_string(&self) -> String {
        let mut buf: Vec<u8> = Vec::new();
        self.write_mps(&mut buf).expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(buf).expect("MPS output is ASCII")
    }

    /// Shell out to the external `cbc` solver over a temporary MPS file,
    /// the same external-process path as the original tool.
    pub fn solve_with_cbc(&self, workdir: &std::path::Path) -> Result<()> {
        let mps_path = workdir.join("instance.mps");
        std::fs::write(&mps_path, self.to_mps_string())
            .map_err(|err| PolypackError::BackendUnavailable(format!("writing MPS file: {err}")))?;

        duct::cmd!("cbc", &mps_path)
            .run()
            .map(|_| ())
            .map_err(|err| PolypackError::BackendUnavailable(format!("running cbc: {err}")))
    }

    /// Build and solve the equivalent model in-process via the `grb`
    /// (Gurobi) bindings, returning the achieved width.
    pub fn solve_with_gurobi(&self) -> Result<usize> {
        use grb::prelude::*;

        let mut model = Model::new("polypack")
            .map_err(|err| PolypackError::BackendUnavailable(format!("starting gurobi: {err}")))?;

        let mut columns: BTreeMap<&str, grb::Var> = BTreeMap::new();
        let mut all_columns: Vec<&str> = self
            .constraints
            .iter()
            .flat_map(|c| c.terms.iter().map(|(_, col)| col.as_str()))
            .collect();
        all_columns.push("b");
        all_columns.sort_unstable();
        all_columns.dedup();

        for col in all_columns {
            let var = if col == "b" {
                add_ctsvar!(model, name: col, bounds: 0.0..)
            } else {
                add_binvar!(model, name: col)
            }
            .map_err(|err| PolypackError::SolverProtocol(format!("adding column {col}: {err}")))?;
            columns.insert(col, var);
        }

        for (i, constraint) in self.constraints.iter().enumerate() {
            let expr = grb::expr::LinExpr::new().add_terms(
                constraint.terms.iter().map(|(coef, col)| (*coef, *columns.get(col.as_str()).unwrap())),
            );
            let sense = match constraint.kind {
                RowKind::Equal => grb::ConstrSense::Equal,
                RowKind::GreaterEqual => grb::ConstrSense::GreaterEqual,
                RowKind::LessEqual => grb::ConstrSense::LessEqual,
            };
            model
                .add_constr(&format!("R{i}"), c!(expr, sense, constraint.rhs))
                .map_err(|err| PolypackError::SolverProtocol(format!("adding row R{i}: {err}")))?;
        }

        model
            .set_objective(*columns.get("b").unwrap(), grb::ModelSense::Minimize)
            .map_err(|err| PolypackError::SolverProtocol(format!("setting objective: {err}")))?;

        model
            .optimize()
            .map_err(|err| PolypackError::SolverProtocol(format!("optimizing: {err}")))?;

        let status = model
            .status()
            .map_err(|err| PolypackError::SolverProtocol(format!("reading status: {err}")))?;
        if status != grb::Status::Optimal {
            return Err(PolypackError::Infeasible { max_width: self.max_width });
        }

        let objective = model
            .get_attr(grb::attr::ObjVal)
            .map_err(|err| PolypackError::SolverProtocol(format!("reading objective: {err}")))?;
        Ok(objective.round() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::WELL_KNOWN_SHAPES;

    #[test]
    fn mps_output_has_matching_row_and_column_sections() {
        let square = WELL_KNOWN_SHAPES.last().unwrap().clone();
        let items = vec![ScheduleItem::new(0, 1, square)];
        let model = IpModel::build(&items, 2, 2, true);

        let mps = model.to_mps_string();
        assert!(mps.starts_with("NAME TESTPROB\n"));
        assert!(mps.contains("ROWS\n"));
        assert!(mps.contains("COLUMNS\n"));
        assert!(mps.contains("RHS\n"));
        assert!(mps.contains("BOUNDS\n"));
        assert!(mps.trim_end().ends_with("ENDATA"));
        assert!(mps.contains("b width 1"));
    }

    #[test]
    fn every_choice_column_is_binary_bounded() {
        let square = WELL_KNOWN_SHAPES.last().unwrap().clone();
        let items = vec![ScheduleItem::new(0, 1, square)];
        let model = IpModel::build(&items, 2, 2, true);

        let mps = model.to_mps_string();
        for column in model.choices.keys() {
            let mut buf = String::new();
            write!(buf, " BV BND1 {column}").unwrap();
            assert!(mps.contains(&buf), "missing binary bound for {column}");
        }
    }
}
