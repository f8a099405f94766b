use crate::math::RealNumber;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOptions<T: RealNumber> {
    /// Single tolerance used by the optimality, unboundedness, ratio and
    /// feasibility tests.
    pub tolerance: T,
    /// Emit trace snapshots to the observer passed to the solver.
    pub trace: bool,
}

impl<T> SolveOptions<T>
where
    T: RealNumber,
{
    pub fn with_tolerance(tolerance: T) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn traced(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

impl<T> Default for SolveOptions<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            tolerance: T::from_f64(1e-9).unwrap(),
            trace: false,
        }
    }
}
