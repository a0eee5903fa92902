//! Linear-expression IR shared by the assembler, the MPS writer, the solver
//! driver, and the IIS filter.

use std::fmt;

/// Handle to a decision variable in the
/// [`VariableCatalog`](super::variables::VariableCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A sum of `coefficient * variable` terms. Terms are merged per variable so
/// each column appears at most once per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(var: VarId, coefficient: f64) -> Self {
        Self {
            terms: vec![(var, coefficient)],
        }
    }

    /// Adds `coefficient * var`, merging with an existing term for `var`.
    pub fn add(mut self, var: VarId, coefficient: f64) -> Self {
        match self.terms.iter_mut().find(|(v, _)| *v == var) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((var, coefficient)),
        }
        self
    }

    /// Adds `coefficient * v` for every variable in `vars`.
    pub fn add_sum(mut self, vars: impl IntoIterator<Item = VarId>, coefficient: f64) -> Self {
        for var in vars {
            self = self.add(var, coefficient);
        }
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression against a dense value vector.
    pub fn value(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var.index()])
            .sum()
    }
}

/// Row sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::LessEq => "<=",
            Comparison::GreaterEq => ">=",
            Comparison::Equal => "=",
        })
    }
}

/// A named linear constraint: `expr cmp rhs`.
///
/// The name is symbolic (`family(index,...)`) and survives into MPS output
/// and IIS listings, so diagnostics reference the constraint families the
/// model is specified in.
#[derive(Debug, Clone, PartialEq)]
pub struct RowConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub cmp: Comparison,
    pub rhs: f64,
}

impl RowConstraint {
    pub fn satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.value(values);
        match self.cmp {
            Comparison::LessEq => lhs <= self.rhs + tolerance,
            Comparison::GreaterEq => lhs >= self.rhs - tolerance,
            Comparison::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}
