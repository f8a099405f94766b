use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PivotKind {
    /// Dantzig entering column, minimum-ratio leaving row.
    Primal,
    /// Feasibility restoration on a negative right-hand side.
    Dual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotRecord<T: RealNumber> {
    pub iteration: usize,
    pub kind: PivotKind,
    pub row: usize,
    pub entering: usize,
    pub leaving: usize,
    pub pivot_element: T,
    /// Objective row RHS after the pivot (maximization form).
    pub objective: T,
}

/// One candidate of a ratio test: `numerator / denominator`, or `None` when
/// the candidate is ineligible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ratio<T> {
    pub index: usize,
    pub numerator: T,
    pub denominator: T,
    pub value: Option<T>,
}

/// Row operation `row -= multiplier * pivot_row` performed while clearing
/// the pivot column. `row == nconstraints` is the objective row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Elimination<T> {
    pub row: usize,
    pub multiplier: T,
}

/// Everything needed to explain a single pivot step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotNarration<T: RealNumber> {
    pub record: PivotRecord<T>,
    /// Value that selected the first index: the objective-row entry of the
    /// entering column (primal) or the right-hand side of the leaving row (dual).
    pub criterion: T,
    /// Per constraint row for primal pivots, per column for dual pivots.
    pub ratios: Vec<Ratio<T>>,
    pub eliminations: Vec<Elimination<T>>,
}

impl<T> PivotNarration<T>
where
    T: RealNumber,
{
    /// Ratio that decided the second index.
    pub fn winning_ratio(&self) -> Option<T> {
        let index = match self.record.kind {
            PivotKind::Primal => self.record.row,
            PivotKind::Dual => self.record.entering,
        };
        self.ratios
            .iter()
            .find(|ratio| ratio.index == index)
            .and_then(|ratio| ratio.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStats<T: RealNumber> {
    pub history: Vec<PivotRecord<T>>,
    pub solve_time: Duration,
}

impl<T> SolveStats<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            solve_time: Duration::ZERO,
        }
    }

    pub fn push(&mut self, record: PivotRecord<T>) {
        self.history.push(record);
    }

    pub fn pivots(&self) -> usize {
        self.history.len()
    }

    pub fn primal_pivots(&self) -> impl Iterator<Item = &PivotRecord<T>> {
        self.history
            .iter()
            .filter(|record| record.kind == PivotKind::Primal)
    }
}

impl<T> Default for SolveStats<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::new()
    }
}
