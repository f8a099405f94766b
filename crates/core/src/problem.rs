use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProblemError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("problem has no decision variables")]
    Empty,
    #[error("non-finite value in {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },
    #[error(
        "slack basis is infeasible: row {row} has right-hand side {value} and the objective row is not dual feasible"
    )]
    InfeasibleBasis { row: usize, value: f64 },
    #[error("problem is infeasible: constraint row {row} cannot be satisfied")]
    Infeasible { row: usize },
}

pub type ProblemResult<T> = Result<T, ProblemError>;

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub data: Vec<T>,
}

impl<T> DenseMatrix<T>
where
    T: RealNumber,
{
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            data: vec![T::zero(); nrows * ncols],
        }
    }

    /// Builds a matrix from nested rows. The column count is taken from the
    /// first row; an empty slice gives a `0 x 0` matrix.
    pub fn from_rows(rows: &[Vec<T>]) -> ProblemResult<Self> {
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(ProblemError::DimensionMismatch(format!(
                    "row {i} has {} entries, expected {ncols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            nrows: rows.len(),
            ncols,
            data,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.ncols;
        &self.data[start..start + self.ncols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.ncols;
        &mut self.data[start..start + self.ncols]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.nrows).map(move |row| self.data[row * self.ncols + col])
    }

    pub fn negated(&self) -> Self {
        Self {
            nrows: self.nrows,
            ncols: self.ncols,
            data: self.data.iter().map(|v| -*v).collect(),
        }
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.data.len() != self.nrows * self.ncols {
            return Err(ProblemError::DimensionMismatch(format!(
                "data length {} != nrows * ncols ({})",
                self.data.len(),
                self.nrows * self.ncols
            )));
        }
        Ok(())
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.ncols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.ncols + col]
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Maximize,
    Minimize,
}

impl Direction {
    /// Constraint sense paired with this direction in standard inequality form.
    pub fn relation(self) -> Relation {
        match self {
            Direction::Maximize => Relation::LessEqual,
            Direction::Minimize => Relation::GreaterEqual,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Maximize => write!(f, "maximize"),
            Direction::Minimize => write!(f, "minimize"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Relation {
    LessEqual,
    GreaterEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEqual => write!(f, "<="),
            Relation::GreaterEqual => write!(f, ">="),
        }
    }
}

/// `max c.x s.t. Ax <= b` or `min c.x s.t. Ax >= b`, with `x >= 0` in both cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemLP<T> {
    pub constraints: DenseMatrix<T>,
    pub rhs: Vec<T>,
    pub cost: Vec<T>,
    #[serde(default)]
    pub direction: Direction,
}

impl<T> ProblemLP<T>
where
    T: RealNumber,
{
    pub fn nvars(&self) -> usize {
        self.cost.len()
    }

    pub fn nconstraints(&self) -> usize {
        self.rhs.len()
    }

    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.nvars();
        if n == 0 {
            return Err(ProblemError::Empty);
        }
        self.constraints.validate()?;
        if self.constraints.nrows != self.rhs.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint rows {} != rhs len {}",
                self.constraints.nrows,
                self.rhs.len()
            )));
        }
        if self.constraints.nrows > 0 && self.constraints.ncols != n {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint matrix columns {} != nvars {n}",
                self.constraints.ncols
            )));
        }
        check_finite("constraints", &self.constraints.data)?;
        check_finite("rhs", &self.rhs)?;
        check_finite("cost", &self.cost)?;
        Ok(())
    }

    /// Equivalent maximization problem with `<=` rows. Minimization problems
    /// come back with constraints, rhs and cost negated; `self` is untouched.
    pub fn to_maximization(&self) -> ProblemLP<T> {
        match self.direction {
            Direction::Maximize => self.clone(),
            Direction::Minimize => ProblemLP {
                constraints: self.constraints.negated(),
                rhs: self.rhs.iter().map(|v| -*v).collect(),
                cost: self.cost.iter().map(|v| -*v).collect(),
                direction: Direction::Maximize,
            },
        }
    }
}

fn check_finite<T: RealNumber>(what: &'static str, values: &[T]) -> ProblemResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ProblemError::NonFinite { what, index }),
        None => Ok(()),
    }
}
