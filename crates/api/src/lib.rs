#![forbid(unsafe_code)]

pub mod verify;

use tabrs_algos::SimplexSolver;
use tabrs_core::math::{RealNumber, Scalar};
use tabrs_core::options::SolveOptions;
use tabrs_core::problem::{DenseMatrix, Direction, ProblemError, ProblemLP};
use tabrs_core::traits::TraceObserver;
use thiserror::Error;
use tracing::debug;

pub use tabrs_core::solution::{Solution, Status};
pub use tabrs_core::stats::{Elimination, PivotKind, PivotNarration, PivotRecord, Ratio, SolveStats};
pub use tabrs_core::traits::{NoTrace, TraceEvent, TraceStep};
pub use verify::{verify_solution, ConstraintCheck, Verification, VariableCheck};

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("problem validation failed: {0}")]
    InvalidProblem(String),
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error("numerical failure: {0}")]
    Numerical(String),
}

impl From<anyhow::Error> for SolverError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ProblemError>() {
            Ok(problem) => SolverError::Problem(problem),
            Err(other) => SolverError::Numerical(format!("{other:#}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LpBuilder<T: RealNumber> {
    cost: Option<Vec<T>>,
    rows: Vec<Vec<T>>,
    rhs: Vec<T>,
    direction: Direction,
}

impl<T> Default for LpBuilder<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            cost: None,
            rows: Vec::new(),
            rhs: Vec::new(),
            direction: Direction::Maximize,
        }
    }
}

impl<T> LpBuilder<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maximize(mut self, cost: Vec<T>) -> Self {
        self.cost = Some(cost);
        self.direction = Direction::Maximize;
        self
    }

    pub fn minimize(mut self, cost: Vec<T>) -> Self {
        self.cost = Some(cost);
        self.direction = Direction::Minimize;
        self
    }

    /// Appends one row. The sense is `<=` when maximizing and `>=` when
    /// minimizing.
    pub fn constraint(mut self, row: Vec<T>, rhs: T) -> Self {
        self.rows.push(row);
        self.rhs.push(rhs);
        self
    }

    pub fn a(mut self, rows: Vec<Vec<T>>, rhs: Vec<T>) -> Self {
        self.rows = rows;
        self.rhs = rhs;
        self
    }

    pub fn build(self) -> Result<ProblemLP<T>, SolverError> {
        let cost = self
            .cost
            .ok_or_else(|| SolverError::InvalidProblem("objective vector missing".into()))?;
        let constraints = if self.rows.is_empty() {
            DenseMatrix::zeros(0, cost.len())
        } else {
            DenseMatrix::from_rows(&self.rows)
                .map_err(|err| SolverError::InvalidProblem(err.to_string()))?
        };
        let problem = ProblemLP {
            constraints,
            rhs: self.rhs,
            cost,
            direction: self.direction,
        };
        problem
            .validate()
            .map_err(|err| SolverError::InvalidProblem(err.to_string()))?;
        Ok(problem)
    }
}

pub struct Solver<T: RealNumber> {
    options: SolveOptions<T>,
}

impl<T> Solver<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self {
            options: SolveOptions::default(),
        }
    }

    pub fn options(mut self, options: SolveOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn tolerance(mut self, tolerance: T) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    pub fn solve_lp(&mut self, problem: &ProblemLP<T>) -> Result<Solution<T>, SolverError> {
        let mut simplex = SimplexSolver::new(self.options.clone());
        Ok(simplex.solve(problem)?)
    }

    /// Solves with `observer` receiving the initial tableau and one snapshot
    /// per pivot. Turns tracing on for this call.
    pub fn solve_lp_traced<O>(
        &mut self,
        problem: &ProblemLP<T>,
        observer: &mut O,
    ) -> Result<Solution<T>, SolverError>
    where
        O: TraceObserver<T> + ?Sized,
    {
        let options = self.options.clone().traced(true);
        debug!(
            nvars = problem.nvars(),
            nconstraints = problem.nconstraints(),
            "dispatching to simplex"
        );
        let mut simplex = SimplexSolver::new(options);
        Ok(simplex.solve_with(problem, observer)?)
    }
}

impl<T> Default for Solver<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::new()
    }
}

pub fn solve_lp<T: RealNumber>(
    problem: &ProblemLP<T>,
    options: SolveOptions<T>,
) -> Result<Solution<T>, SolverError> {
    Solver::new().options(options).solve_lp(problem)
}

/// Maximize `3x1 + 2x2` subject to `2x1 + x2 <= 20` and `x1 + 2x2 <= 20`.
pub fn demo_problem() -> ProblemLP<Scalar> {
    ProblemLP {
        constraints: DenseMatrix {
            nrows: 2,
            ncols: 2,
            data: vec![2.0, 1.0, 1.0, 2.0],
        },
        rhs: vec![20.0, 20.0],
        cost: vec![3.0, 2.0],
        direction: Direction::Maximize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_cost() {
        let err = LpBuilder::<f64>::new()
            .constraint(vec![1.0], 1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(_)));
    }

    #[test]
    fn builder_rejects_ragged_rows() {
        let err = LpBuilder::new()
            .maximize(vec![1.0, 1.0])
            .constraint(vec![1.0, 1.0], 4.0)
            .constraint(vec![1.0], 2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(_)));
    }

    #[test]
    fn builder_without_rows_gives_empty_constraint_block() {
        let problem = LpBuilder::new().minimize(vec![1.0, 2.0]).build().unwrap();
        assert_eq!(problem.constraints.shape(), (0, 2));
        assert_eq!(problem.direction, Direction::Minimize);
    }

    #[test]
    fn engine_errors_are_classified() {
        let problem = LpBuilder::new()
            .maximize(vec![1.0])
            .constraint(vec![1.0], -1.0)
            .build()
            .unwrap();
        let err = Solver::new().solve_lp(&problem).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Problem(ProblemError::InfeasibleBasis { row: 0, .. })
        ));
    }
}
