use anyhow::Result;
use tabrs_api::{demo_problem, verify_solution, LpBuilder, Solver, TraceEvent, TraceStep};
use tabrs_core::math::Scalar;
use tabrs_core::problem::ProblemLP;

fn main() -> Result<()> {
    run("production mix", &demo_problem())?;

    // min 2x1 + 3x2  s.t.  x1 + 2x2 >= 4,  3x1 + x2 >= 6
    let diet = LpBuilder::new()
        .minimize(vec![2.0, 3.0])
        .constraint(vec![1.0, 2.0], 4.0)
        .constraint(vec![3.0, 1.0], 6.0)
        .build()?;
    run("diet", &diet)
}

fn run(name: &str, problem: &ProblemLP<Scalar>) -> Result<()> {
    println!("== {name} ({} {} variables)", problem.direction, problem.nvars());
    let mut observer = |event: &TraceEvent<'_, Scalar>| match event.step {
        TraceStep::Initial { flipped } => println!("  {} (sign flipped: {flipped})", event.label),
        TraceStep::Pivot(step) => println!(
            "  {}: pivot element {:.3}, objective {:.3}",
            event.label, step.record.pivot_element, step.record.objective
        ),
    };
    let solution = Solver::<Scalar>::new().solve_lp_traced(problem, &mut observer)?;

    println!("status: {:?}", solution.status);
    println!("primal: {:?}", solution.primal);
    println!("objective: {:?}", solution.objective_value);
    if let Some(primal) = &solution.primal {
        let report = verify_solution(problem, primal)?;
        println!("feasible against the original rows: {}", report.is_feasible());
    }
    Ok(())
}
