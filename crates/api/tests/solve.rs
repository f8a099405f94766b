use approx::assert_relative_eq;
use tabrs_api::{demo_problem, solve_lp, verify_solution, LpBuilder, Solver, Status, TraceEvent};
use tabrs_core::options::SolveOptions;

#[test]
fn demo_problem_solves_and_verifies() {
    let problem = demo_problem();
    let solution = solve_lp(&problem, SolveOptions::default()).expect("solve");
    assert_eq!(solution.status, Status::Optimal);
    let x = solution.primal.expect("primal");
    let report = verify_solution(&problem, &x).expect("verify");
    assert!(report.is_feasible());
    assert_relative_eq!(report.objective, 100.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(solution.objective_value.unwrap(), report.objective, epsilon = 1e-9);
}

#[test]
fn minimization_verifies_against_original_rows() {
    let problem = LpBuilder::new()
        .minimize(vec![2.0, 3.0])
        .constraint(vec![1.0, 2.0], 4.0)
        .constraint(vec![3.0, 1.0], 6.0)
        .build()
        .expect("build");
    let solution = Solver::new().solve_lp(&problem).expect("solve");
    let x = solution.primal.expect("primal");
    let report = verify_solution(&problem, &x).expect("verify");
    assert!(report.is_feasible());
    assert!(report.objective > 0.0);
    assert_relative_eq!(solution.objective_value.unwrap(), report.objective, epsilon = 1e-9);
}

#[test]
fn closure_observer_sees_every_pivot() {
    let problem = demo_problem();
    let mut labels = Vec::new();
    let mut observer = |event: &TraceEvent<'_, f64>| labels.push(event.label.to_string());
    let solution = Solver::new()
        .solve_lp_traced(&problem, &mut observer)
        .expect("solve");
    assert_eq!(labels.len(), solution.stats.pivots() + 1);
    assert_eq!(labels[0], "initial");
}

#[test]
fn unbounded_has_no_values() {
    let problem = LpBuilder::new()
        .maximize(vec![1.0, 1.0])
        .constraint(vec![1.0, -1.0], 2.0)
        .build()
        .expect("build");
    let solution = Solver::new().solve_lp(&problem).expect("solve");
    assert_eq!(solution.status, Status::Unbounded);
    assert!(solution.primal.is_none());
}
