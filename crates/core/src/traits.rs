use crate::math::RealNumber;
use crate::problem::DenseMatrix;
use crate::stats::PivotNarration;

/// What happened just before a snapshot was taken.
#[derive(Debug, Clone, Copy)]
pub enum TraceStep<'a, T: RealNumber> {
    /// Freshly built tableau. `flipped` is set when a minimization was
    /// negated into maximization form.
    Initial { flipped: bool },
    Pivot(&'a PivotNarration<T>),
}

/// Snapshot handed to a [`TraceObserver`] after construction and after each pivot.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a, T: RealNumber> {
    pub iteration: usize,
    pub label: &'a str,
    pub step: TraceStep<'a, T>,
    pub tableau: &'a DenseMatrix<T>,
    pub basis: &'a [usize],
    /// Number of original decision variables; basis entries at or above this are slacks.
    pub nvars: usize,
}

impl<'a, T: RealNumber> TraceEvent<'a, T> {
    pub fn nconstraints(&self) -> usize {
        self.basis.len()
    }

    pub fn pivot(&self) -> Option<&'a PivotNarration<T>> {
        match self.step {
            TraceStep::Pivot(narration) => Some(narration),
            TraceStep::Initial { .. } => None,
        }
    }
}

pub trait TraceObserver<T: RealNumber> {
    fn observe(&mut self, event: &TraceEvent<'_, T>);
}

impl<T, F> TraceObserver<T> for F
where
    T: RealNumber,
    F: FnMut(&TraceEvent<'_, T>),
{
    fn observe(&mut self, event: &TraceEvent<'_, T>) {
        self(event)
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl<T: RealNumber> TraceObserver<T> for NoTrace {
    fn observe(&mut self, _event: &TraceEvent<'_, T>) {}
}
