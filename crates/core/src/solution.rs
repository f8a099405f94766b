use crate::math::RealNumber;
use crate::stats::SolveStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Optimal,
    Unbounded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution<T: RealNumber> {
    pub status: Status,
    /// Decision variable values, present only when optimal.
    pub primal: Option<Vec<T>>,
    /// Objective value in the caller's direction, present only when optimal.
    pub objective_value: Option<T>,
    pub iterations: usize,
    pub stats: SolveStats<T>,
}

impl<T> Solution<T>
where
    T: RealNumber,
{
    pub fn optimal(
        primal: Vec<T>,
        objective_value: T,
        iterations: usize,
        stats: SolveStats<T>,
    ) -> Self {
        Self {
            status: Status::Optimal,
            primal: Some(primal),
            objective_value: Some(objective_value),
            iterations,
            stats,
        }
    }

    pub fn unbounded(iterations: usize, stats: SolveStats<T>) -> Self {
        Self {
            status: Status::Unbounded,
            primal: None,
            objective_value: None,
            iterations,
            stats,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }
}
