use anyhow::Result;
use rand::{rngs::SmallRng, Rng};
use tabrs_api::LpBuilder;
use tabrs_core::math::Scalar;
use tabrs_core::problem::ProblemLP;

/// Random `max c.x, Ax <= b` instance with positive `A`, `b` and `c`, so the
/// slack basis is feasible and the optimum is bounded.
pub fn random_feasible_lp(m: usize, n: usize, rng: &mut SmallRng) -> Result<ProblemLP<Scalar>> {
    let rows: Vec<Vec<Scalar>> = (0..m)
        .map(|_| (0..n).map(|_| 0.1 + rng.gen::<Scalar>()).collect())
        .collect();
    let rhs: Vec<Scalar> = (0..m).map(|_| 1.0 + 10.0 * rng.gen::<Scalar>()).collect();
    let cost: Vec<Scalar> = (0..n).map(|_| 0.5 + rng.gen::<Scalar>()).collect();
    Ok(LpBuilder::new().maximize(cost).a(rows, rhs).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tabrs_api::{solve_lp, verify_solution, Status};
    use tabrs_core::options::SolveOptions;

    #[test]
    fn random_instances_solve_to_feasible_optima() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let problem = random_feasible_lp(6, 4, &mut rng).unwrap();
            let solution = solve_lp(&problem, SolveOptions::default()).unwrap();
            assert_eq!(solution.status, Status::Optimal);
            let report = verify_solution(&problem, solution.primal.as_ref().unwrap()).unwrap();
            assert!(report.is_feasible());
            let objective = solution.objective_value.unwrap();
            assert!((report.objective - objective).abs() <= 1e-6 * (1.0 + objective.abs()));
        }
    }
}
