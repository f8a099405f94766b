use anyhow::{anyhow, Result};
use itertools::Itertools;
use std::cmp::Ordering;
use tabrs_core::math::RealNumber;
use tabrs_core::problem::{DenseMatrix, Direction, ProblemLP, ProblemResult};
use tabrs_core::stats::{Elimination, Ratio};

/// Dense Simplex tableau in maximization form.
///
/// Layout is `(m + 1) x (n + m + 1)`: constraint rows first, the objective
/// row last; decision columns, then one slack column per constraint, then the
/// right-hand side.
#[derive(Debug, Clone)]
pub struct Tableau<T: RealNumber> {
    matrix: DenseMatrix<T>,
    basis: Vec<usize>,
    nvars: usize,
    tolerance: T,
}

impl<T> Tableau<T>
where
    T: RealNumber,
{
    /// Builds the all-slack starting tableau. Minimization problems are
    /// sign-flipped first; `problem` itself is not modified.
    pub fn new(problem: &ProblemLP<T>, tolerance: T) -> ProblemResult<Self> {
        problem.validate()?;
        let canonical = problem.to_maximization();
        let n = canonical.nvars();
        let m = canonical.nconstraints();
        let rhs_col = n + m;
        let mut matrix = DenseMatrix::zeros(m + 1, n + m + 1);
        for i in 0..m {
            matrix.row_mut(i)[..n].copy_from_slice(canonical.constraints.row(i));
            matrix[(i, n + i)] = T::one();
            matrix[(i, rhs_col)] = canonical.rhs[i];
        }
        for (j, c) in canonical.cost.iter().enumerate() {
            matrix[(m, j)] = -*c;
        }
        Ok(Self {
            matrix,
            basis: (n..n + m).collect(),
            nvars: n,
            tolerance,
        })
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn nconstraints(&self) -> usize {
        self.basis.len()
    }

    pub fn matrix(&self) -> &DenseMatrix<T> {
        &self.matrix
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    fn rhs_col(&self) -> usize {
        self.matrix.ncols - 1
    }

    pub fn rhs(&self, row: usize) -> T {
        self.matrix[(row, self.rhs_col())]
    }

    /// Objective row without its right-hand side.
    pub fn objective_row(&self) -> &[T] {
        let row = self.matrix.row(self.nconstraints());
        &row[..row.len() - 1]
    }

    /// Current objective of the maximization form.
    pub fn objective_estimate(&self) -> T {
        self.rhs(self.nconstraints())
    }

    pub fn is_optimal(&self) -> bool {
        let tol = self.tolerance;
        self.objective_row().iter().all(|v| *v >= -tol)
    }

    /// Entering column: the most negative reduced cost, lowest index on ties.
    pub fn pivot_column(&self) -> Option<usize> {
        let row = self.objective_row();
        row.iter()
            .position_min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .filter(|&col| row[col] < -self.tolerance)
    }

    pub fn is_unbounded(&self, column: usize) -> bool {
        let tol = self.tolerance;
        self.matrix
            .column(column)
            .take(self.nconstraints())
            .all(|v| v <= tol)
    }

    /// Minimum-ratio candidates for `column`, one per constraint row. Rows
    /// whose pivot column entry is not positive carry no value.
    pub fn ratio_test(&self, column: usize) -> Vec<Ratio<T>> {
        (0..self.nconstraints())
            .map(|i| {
                let entry = self.matrix[(i, column)];
                let rhs = self.rhs(i);
                Ratio {
                    index: i,
                    numerator: rhs,
                    denominator: entry,
                    value: (entry > self.tolerance).then(|| rhs / entry),
                }
            })
            .collect()
    }

    /// `None` marks rows whose pivot column entry is not positive.
    pub fn ratios(&self, column: usize) -> Vec<Option<T>> {
        self.ratio_test(column)
            .into_iter()
            .map(|ratio| ratio.value)
            .collect()
    }

    /// Leaving row: smallest eligible ratio, first row on ties.
    pub fn pivot_row(&self, column: usize) -> Option<usize> {
        first_minimum(self.ratios(column).into_iter().enumerate())
    }

    pub fn is_primal_feasible(&self) -> bool {
        let tol = self.tolerance;
        (0..self.nconstraints()).all(|i| self.rhs(i) >= -tol)
    }

    /// Row with the most negative right-hand side, first row on ties.
    pub fn dual_pivot_row(&self) -> Option<usize> {
        (0..self.nconstraints())
            .map(|i| (i, self.rhs(i)))
            .filter(|(_, rhs)| *rhs < -self.tolerance)
            .fold(None, |best: Option<(usize, T)>, (i, rhs)| match best {
                Some((_, b)) if rhs >= b => best,
                _ => Some((i, rhs)),
            })
            .map(|(i, _)| i)
    }

    /// Dual ratio candidates for `row`, one per non-RHS column:
    /// `reduced cost / |entry|` for negative entries.
    pub fn dual_ratio_test(&self, row: usize) -> Vec<Ratio<T>> {
        let entries = self.matrix.row(row);
        self.objective_row()
            .iter()
            .zip(entries)
            .enumerate()
            .map(|(j, (&d, &a))| Ratio {
                index: j,
                numerator: d,
                denominator: a.abs(),
                value: (a < -self.tolerance).then(|| d / -a),
            })
            .collect()
    }

    /// Entering column for a dual pivot on `row`: among negative entries,
    /// the smallest `reduced cost / |entry|`, lowest index on ties.
    pub fn dual_pivot_column(&self, row: usize) -> Option<usize> {
        first_minimum(
            self.dual_ratio_test(row)
                .into_iter()
                .map(|ratio| (ratio.index, ratio.value)),
        )
    }

    /// Row-reduces on `(row, column)` and makes `column` basic in `row`.
    /// Returns the row operations applied to the other rows, in row order.
    pub fn pivot(&mut self, row: usize, column: usize) -> Result<Vec<Elimination<T>>> {
        let m = self.nconstraints();
        if row >= m || column >= self.rhs_col() {
            return Err(anyhow!(
                "pivot position ({row}, {column}) outside the {m} x {} coefficient block",
                self.rhs_col()
            ));
        }
        let element = self.matrix[(row, column)];
        if element.abs() <= self.tolerance {
            let magnitude = element.abs().to_f64().unwrap_or(f64::NAN);
            return Err(anyhow!(
                "near-zero pivot element at row {row}, column {column} (|a| = {magnitude:.3e})"
            ));
        }

        for value in self.matrix.row_mut(row) {
            *value = *value / element;
        }
        let normalized = self.matrix.row(row).to_vec();
        let mut eliminations = Vec::new();
        for i in (0..=m).filter(|&i| i != row) {
            let multiplier = self.matrix[(i, column)];
            if multiplier == T::zero() {
                continue;
            }
            for (value, p) in self.matrix.row_mut(i).iter_mut().zip(&normalized) {
                *value -= multiplier * *p;
            }
            eliminations.push(Elimination { row: i, multiplier });
        }
        self.basis[row] = column;
        Ok(eliminations)
    }

    /// Reads decision values off the basis and the objective in the caller's
    /// direction. Non-basic decision variables are zero.
    pub fn extract(&self, direction: Direction) -> (Vec<T>, T) {
        let mut primal = vec![T::zero(); self.nvars];
        for (i, &var) in self.basis.iter().enumerate() {
            if var < self.nvars {
                primal[var] = self.rhs(i);
            }
        }
        let objective = match direction {
            Direction::Maximize => self.objective_estimate(),
            Direction::Minimize => -self.objective_estimate(),
        };
        (primal, objective)
    }
}

fn first_minimum<T, I>(candidates: I) -> Option<usize>
where
    T: RealNumber,
    I: Iterator<Item = (usize, Option<T>)>,
{
    candidates
        .filter_map(|(i, ratio)| ratio.map(|r| (i, r)))
        .fold(None, |best: Option<(usize, T)>, (i, r)| match best {
            Some((_, b)) if r >= b => best,
            _ => Some((i, r)),
        })
        .map(|(i, _)| i)
}
