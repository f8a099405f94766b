#![forbid(unsafe_code)]

pub mod simplex;
pub mod tableau;

pub use simplex::{SimplexSolver, SolverState};
pub use tableau::Tableau;
