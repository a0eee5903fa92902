//! Engine-agnostic irreducible infeasible subsystem (IIS) computation.
//!
//! A deletion filter over the named constraint rows: drop a candidate, test
//! feasibility of the relaxation, and keep the candidate out whenever the
//! model stays infeasible without it. What remains is irreducible: every
//! surviving row is necessary for the conflict. A first pass over whole
//! constraint families keeps the number of relaxation solves proportional
//! to the conflict, not the model.

use super::feasible;
use crate::model::MipModel;
use good_lp::ResolutionError;
use log::{debug, warn};

/// Above this row count the filter is skipped; each candidate costs one
/// relaxation solve.
const MAX_FILTER_ROWS: usize = 20_000;

/// Returns the names of an irreducible infeasible subsystem of `model`,
/// which must be infeasible when all rows are active.
pub(crate) fn deletion_filter(model: &MipModel) -> Result<Vec<String>, ResolutionError> {
    let n = model.rows.len();
    if n > MAX_FILTER_ROWS {
        warn!("skipping IIS computation: {n} rows exceed the {MAX_FILTER_ROWS} row budget");
        return Ok(Vec::new());
    }

    let mut active = vec![true; n];

    // Family pass: a family is the row-name prefix before the index list.
    // Dropping an entire unnecessary family removes many candidates with a
    // single solve.
    let mut families: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut family_slot: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for (i, row) in model.rows.iter().enumerate() {
        let family = row.name.split('(').next().unwrap_or(&row.name);
        let slot = *family_slot.entry(family).or_insert_with(|| {
            families.push((family, Vec::new()));
            families.len() - 1
        });
        families[slot].1.push(i);
    }
    for (family, rows) in &families {
        for &i in rows {
            active[i] = false;
        }
        if feasible(model, &active)? {
            // The family participates in the conflict; put it back.
            for &i in rows {
                active[i] = true;
            }
        } else {
            debug!("IIS filter: family {family} is not part of the conflict");
        }
    }

    // Row pass over the surviving candidates.
    for i in 0..n {
        if !active[i] {
            continue;
        }
        active[i] = false;
        if feasible(model, &active)? {
            active[i] = true;
        }
    }

    Ok(model
        .rows
        .iter()
        .enumerate()
        .filter(|(i, _)| active[*i])
        .map(|(_, row)| row.name.clone())
        .collect())
}
