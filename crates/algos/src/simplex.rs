use anyhow::{anyhow, Result};
use tabrs_core::math::{RealNumber, Timer};
use tabrs_core::options::SolveOptions;
use tabrs_core::problem::{Direction, ProblemError, ProblemLP};
use tabrs_core::solution::Solution;
use tabrs_core::stats::{PivotKind, PivotNarration, PivotRecord, SolveStats};
use tabrs_core::traits::{NoTrace, TraceEvent, TraceObserver, TraceStep};
use tracing::{debug, info, warn};

use crate::tableau::Tableau;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Initialized,
    Iterating,
    Optimal,
    Unbounded,
}

impl SolverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SolverState::Optimal | SolverState::Unbounded)
    }
}

pub struct SimplexSolver<T: RealNumber> {
    options: SolveOptions<T>,
    iteration: usize,
}

impl<T> SimplexSolver<T>
where
    T: RealNumber,
{
    pub fn new(options: SolveOptions<T>) -> Self {
        Self {
            options,
            iteration: 0,
        }
    }

    pub fn options(&self) -> &SolveOptions<T> {
        &self.options
    }

    pub fn solve(&mut self, problem: &ProblemLP<T>) -> Result<Solution<T>> {
        self.solve_with(problem, &mut NoTrace)
    }

    /// Runs the Simplex loop to a terminal state, reporting snapshots to
    /// `observer` when tracing is enabled.
    ///
    /// Degenerate problems can cycle: ties are broken by lowest index only.
    pub fn solve_with<O>(&mut self, problem: &ProblemLP<T>, observer: &mut O) -> Result<Solution<T>>
    where
        O: TraceObserver<T> + ?Sized,
    {
        let timer = Timer::start();
        self.iteration = 0;
        let mut stats = SolveStats::new();
        let mut tableau = Tableau::new(problem, self.options.tolerance)?;
        debug!(
            nvars = tableau.nvars(),
            nconstraints = tableau.nconstraints(),
            direction = %problem.direction,
            "tableau constructed"
        );
        let flipped = problem.direction == Direction::Minimize;
        self.emit(observer, &tableau, "initial", TraceStep::Initial { flipped });

        if !tableau.is_primal_feasible() {
            self.restore_feasibility(&mut tableau, &mut stats, observer)?;
        }

        let mut state = SolverState::Initialized;
        while !state.is_terminal() {
            state = match state {
                SolverState::Initialized => SolverState::Iterating,
                _ => self.step(&mut tableau, &mut stats, observer)?,
            };
        }

        stats.solve_time = timer.elapsed();
        if state == SolverState::Unbounded {
            return Ok(Solution::unbounded(self.iteration, stats));
        }
        let (primal, objective) = tableau.extract(problem.direction);
        info!(
            iterations = self.iteration,
            pivots = stats.pivots(),
            objective = objective.to_f64().unwrap_or(f64::NAN),
            "optimal solution found"
        );
        Ok(Solution::optimal(primal, objective, self.iteration, stats))
    }

    fn step<O>(
        &mut self,
        tableau: &mut Tableau<T>,
        stats: &mut SolveStats<T>,
        observer: &mut O,
    ) -> Result<SolverState>
    where
        O: TraceObserver<T> + ?Sized,
    {
        self.iteration += 1;
        if tableau.is_optimal() {
            return Ok(SolverState::Optimal);
        }
        let column = tableau
            .pivot_column()
            .ok_or_else(|| anyhow!("objective row has no entering column"))?;
        if tableau.is_unbounded(column) {
            warn!(
                iteration = self.iteration,
                column, "pivot column has no positive entry, problem is unbounded"
            );
            return Ok(SolverState::Unbounded);
        }
        let row = tableau
            .pivot_row(column)
            .ok_or_else(|| anyhow!("ratio test found no leaving row for column {column}"))?;
        let narration = self.apply(tableau, stats, PivotKind::Primal, row, column)?;
        let label = format!("pivot on row {}, column {}", row + 1, column + 1);
        self.emit(observer, tableau, &label, TraceStep::Pivot(&narration));
        Ok(SolverState::Iterating)
    }

    /// Dual Simplex pivots until every right-hand side is non-negative. Only
    /// possible when the objective row is already dual feasible.
    fn restore_feasibility<O>(
        &mut self,
        tableau: &mut Tableau<T>,
        stats: &mut SolveStats<T>,
        observer: &mut O,
    ) -> Result<()>
    where
        O: TraceObserver<T> + ?Sized,
    {
        if !tableau.is_optimal() {
            let row = tableau.dual_pivot_row().unwrap_or_default();
            let value = tableau.rhs(row).to_f64().unwrap_or(f64::NAN);
            return Err(ProblemError::InfeasibleBasis { row, value }.into());
        }
        while let Some(row) = tableau.dual_pivot_row() {
            self.iteration += 1;
            let column = tableau
                .dual_pivot_column(row)
                .ok_or(ProblemError::Infeasible { row })?;
            let narration = self.apply(tableau, stats, PivotKind::Dual, row, column)?;
            let label = format!("dual pivot on row {}, column {}", row + 1, column + 1);
            self.emit(observer, tableau, &label, TraceStep::Pivot(&narration));
        }
        Ok(())
    }

    fn apply(
        &self,
        tableau: &mut Tableau<T>,
        stats: &mut SolveStats<T>,
        kind: PivotKind,
        row: usize,
        column: usize,
    ) -> Result<PivotNarration<T>> {
        let leaving = tableau.basis()[row];
        let pivot_element = tableau.matrix()[(row, column)];
        let (criterion, ratios) = match kind {
            PivotKind::Primal => (tableau.objective_row()[column], tableau.ratio_test(column)),
            PivotKind::Dual => (tableau.rhs(row), tableau.dual_ratio_test(row)),
        };
        let eliminations = tableau.pivot(row, column)?;
        let objective = tableau.objective_estimate();
        debug!(
            iteration = self.iteration,
            ?kind,
            row,
            entering = column,
            leaving,
            objective = objective.to_f64().unwrap_or(f64::NAN),
            "pivot"
        );
        let record = PivotRecord {
            iteration: self.iteration,
            kind,
            row,
            entering: column,
            leaving,
            pivot_element,
            objective,
        };
        stats.push(record.clone());
        Ok(PivotNarration {
            record,
            criterion,
            ratios,
            eliminations,
        })
    }

    fn emit<O>(&self, observer: &mut O, tableau: &Tableau<T>, label: &str, step: TraceStep<'_, T>)
    where
        O: TraceObserver<T> + ?Sized,
    {
        if !self.options.trace {
            return;
        }
        observer.observe(&TraceEvent {
            iteration: self.iteration,
            label,
            step,
            tableau: tableau.matrix(),
            basis: tableau.basis(),
            nvars: tableau.nvars(),
        });
    }
}
