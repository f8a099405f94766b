use serde::{Deserialize, Serialize};
use tabrs_core::math::{approx_ge, approx_le, dot, RealNumber};
use tabrs_core::problem::{ProblemLP, Relation};

use crate::SolverError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintCheck<T> {
    pub index: usize,
    pub lhs: T,
    pub rhs: T,
    pub relation: Relation,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableCheck<T> {
    pub index: usize,
    pub value: T,
    pub nonnegative: bool,
}

/// Recomputation of a candidate point against the untransformed problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification<T> {
    pub constraints: Vec<ConstraintCheck<T>>,
    pub variables: Vec<VariableCheck<T>>,
    pub objective: T,
}

impl<T> Verification<T> {
    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|c| c.satisfied) && self.variables.iter().all(|v| v.nonnegative)
    }
}

/// Checks `primal` against the original problem (before any sign flip) with
/// an absolute slack of `1e-5`.
pub fn verify_solution<T: RealNumber>(
    problem: &ProblemLP<T>,
    primal: &[T],
) -> Result<Verification<T>, SolverError> {
    problem
        .validate()
        .map_err(|err| SolverError::InvalidProblem(err.to_string()))?;
    if primal.len() != problem.nvars() {
        return Err(SolverError::InvalidProblem(format!(
            "solution length {} != nvars {}",
            primal.len(),
            problem.nvars()
        )));
    }
    let tol = T::from_f64(1e-5).unwrap();
    let relation = problem.direction.relation();
    let constraints = problem
        .rhs
        .iter()
        .enumerate()
        .map(|(index, &rhs)| {
            let lhs = dot(problem.constraints.row(index), primal);
            let satisfied = match relation {
                Relation::LessEqual => approx_le(lhs, rhs, tol),
                Relation::GreaterEqual => approx_ge(lhs, rhs, tol),
            };
            ConstraintCheck {
                index,
                lhs,
                rhs,
                relation,
                satisfied,
            }
        })
        .collect();
    let variables = primal
        .iter()
        .enumerate()
        .map(|(index, &value)| VariableCheck {
            index,
            value,
            nonnegative: approx_ge(value, T::zero(), tol),
        })
        .collect();
    Ok(Verification {
        constraints,
        variables,
        objective: dot(&problem.cost, primal),
    })
}
