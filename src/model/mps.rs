//! Free-format MPS export with symbolic row and column labels.
//!
//! Labels are the model's own constraint and variable names (whitespace
//! replaced by underscores), so IIS listings and external tooling reference
//! the constraint families directly.

use super::expr::Comparison;
use super::variables::VarDomain;
use super::MipModel;
use std::io::{self, Write};

/// Writes `model` in free MPS format under the given problem name.
pub fn write_mps<W: Write>(model: &MipModel, name: &str, out: &mut W) -> io::Result<()> {
    writeln!(out, "NAME {}", label(name))?;

    writeln!(out, "ROWS")?;
    writeln!(out, " N obj")?;
    for row in &model.rows {
        let sense = match row.cmp {
            Comparison::LessEq => 'L',
            Comparison::GreaterEq => 'G',
            Comparison::Equal => 'E',
        };
        writeln!(out, " {} {}", sense, label(&row.name))?;
    }

    // Column-major coefficients: for each variable, its objective term plus
    // every row it appears in. Binary columns sit inside INTORG/INTEND
    // marker sections.
    let columns = column_entries(model);
    writeln!(out, "COLUMNS")?;
    let mut integer_section = false;
    let mut marker_count = 0usize;
    for (v, def) in model.variables.defs().iter().enumerate() {
        let wants_integer = def.domain == VarDomain::Binary;
        if wants_integer != integer_section {
            let kind = if wants_integer { "'INTORG'" } else { "'INTEND'" };
            writeln!(out, "    MARKER{marker_count} 'MARKER' {kind}")?;
            marker_count += 1;
            integer_section = wants_integer;
        }
        for (row_name, coefficient) in &columns[v] {
            writeln!(out, "    {} {} {}", label(&def.name), row_name, fmt(*coefficient))?;
        }
    }
    if integer_section {
        writeln!(out, "    MARKER{marker_count} 'MARKER' 'INTEND'")?;
    }

    writeln!(out, "RHS")?;
    for row in &model.rows {
        if row.rhs != 0.0 {
            writeln!(out, "    RHS {} {}", label(&row.name), fmt(row.rhs))?;
        }
    }

    // Binaries are integer columns bounded to [0, 1]; continuous variables
    // keep the default [0, inf) bounds.
    writeln!(out, "BOUNDS")?;
    for def in model.variables.defs() {
        if def.domain == VarDomain::Binary {
            writeln!(out, " BV BND {}", label(&def.name))?;
        }
    }

    writeln!(out, "ENDATA")
}

/// Renders the model to an MPS string.
pub fn mps_string(model: &MipModel, name: &str) -> String {
    let mut buffer = Vec::new();
    write_mps(model, name, &mut buffer).expect("writing to a Vec cannot fail");
    String::from_utf8(buffer).expect("MPS output is ASCII")
}

/// Per-variable list of `(row label, coefficient)`, objective included.
fn column_entries(model: &MipModel) -> Vec<Vec<(String, f64)>> {
    let mut columns: Vec<Vec<(String, f64)>> = vec![Vec::new(); model.variables.len()];
    for &(var, coefficient) in model.objective.terms() {
        columns[var.index()].push(("obj".to_string(), coefficient));
    }
    for row in &model.rows {
        let row_label = label(&row.name);
        for &(var, coefficient) in row.expr.terms() {
            columns[var.index()].push((row_label.clone(), coefficient));
        }
    }
    columns
}

fn label(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn fmt(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HangarLayout;
    use crate::params::ParameterTable;
    use crate::scenario::{IndexSets, JobRow, Scenario};

    fn model() -> MipModel {
        let rows = vec![JobRow::new("A1", 1.0, "A", 2.0, 0.0)];
        let scenario = Scenario::build(&rows, &[], HangarLayout::new(1, vec![])).unwrap();
        let idx = IndexSets::build(&scenario);
        let params = ParameterTable::from_scenario(&scenario);
        MipModel::assemble(&scenario, &idx, &params).unwrap()
    }

    #[test]
    fn sections_appear_in_order() {
        let text = mps_string(&model(), "case");
        let name = text.find("NAME case").unwrap();
        let rows = text.find("\nROWS").unwrap();
        let columns = text.find("\nCOLUMNS").unwrap();
        let rhs = text.find("\nRHS").unwrap();
        let bounds = text.find("\nBOUNDS").unwrap();
        let end = text.find("\nENDATA").unwrap();
        assert!(name < rows && rows < columns && columns < rhs && rhs < bounds && bounds < end);
    }

    #[test]
    fn symbolic_labels_survive() {
        let text = mps_string(&model(), "case");
        assert!(text.contains("one_placement(A1)"));
        assert!(text.contains("x(slot0,position1,A1)"));
        assert!(text.contains("late_finish(A-exit)"));
    }

    #[test]
    fn binaries_are_marked_and_bounded() {
        let text = mps_string(&model(), "case");
        assert!(text.contains("'INTORG'"));
        assert!(text.contains("'INTEND'"));
        assert!(text.contains(" BV BND x(slot0,position1,A1)"));
        assert!(!text.contains(" BV BND start_job(A1)"));
    }

    #[test]
    fn labels_replace_whitespace() {
        assert_eq!(label("tail no 7(a b)"), "tail_no_7(a_b)");
    }
}
