use itertools::Itertools;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use tabrs_api::{PivotKind, PivotNarration, Solution, Status, TraceEvent, Verification};
use tabrs_core::math::Scalar;
use tabrs_core::problem::Direction;
use tabrs_core::traits::{TraceObserver, TraceStep};

const RULE_WIDTH: usize = 80;

pub fn variable_name(var: usize, nvars: usize) -> String {
    if var < nvars {
        format!("x{}", var + 1)
    } else {
        format!("s{}", var - nvars + 1)
    }
}

pub fn render_tableau(event: &TraceEvent<'_, Scalar>) -> String {
    let tableau = event.tableau;
    let m = event.nconstraints();
    let rhs_col = tableau.ncols - 1;
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{}", event.label);
    let _ = writeln!(out, "Tableau - iteration {}", event.iteration);
    let _ = writeln!(out, "{rule}");

    let mut header = String::from("Base |");
    for var in 0..rhs_col {
        let _ = write!(header, " {:^6} |", variable_name(var, event.nvars));
    }
    header.push_str("    RHS   |");
    let separator = "-".repeat(header.chars().count());
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{separator}");

    for (i, &var) in event.basis.iter().enumerate() {
        let _ = write!(out, " {:<4}|", variable_name(var, event.nvars));
        write_cells(&mut out, tableau.row(i));
    }
    let _ = writeln!(out, "{separator}");
    let _ = write!(out, "  Z  |");
    write_cells(&mut out, tableau.row(m));
    let _ = writeln!(out, "{rule}");
    out
}

/// Step-by-step explanation of what produced the snapshot in `event`.
pub fn render_step(event: &TraceEvent<'_, Scalar>) -> String {
    let mut out = String::new();
    match event.step {
        TraceStep::Initial { flipped } => {
            if flipped {
                out.push_str("converting the minimization into an equivalent maximization:\n");
                out.push_str("  1. objective coefficients multiplied by -1\n");
                out.push_str("  2. constraint coefficients and right-hand sides multiplied by -1\n");
            }
            let m = event.nconstraints();
            if m > 0 {
                let _ = writeln!(
                    out,
                    "building the initial tableau: slack variables s1..s{m} turn each row into an equality"
                );
            }
        }
        TraceStep::Pivot(narration) => write_pivot(&mut out, event, narration),
    }
    out
}

fn write_pivot(out: &mut String, event: &TraceEvent<'_, Scalar>, narration: &PivotNarration<Scalar>) {
    let record = &narration.record;
    let row = record.row + 1;
    let column = record.entering + 1;
    let winning = narration
        .winning_ratio()
        .map(|r| format!("{r:.2}"))
        .unwrap_or_else(|| "--".into());

    let _ = writeln!(out, "iteration {}:", record.iteration);
    match record.kind {
        PivotKind::Primal => {
            let _ = writeln!(
                out,
                "  pivot column: {column} (most negative Z-row value: {:.2})",
                narration.criterion
            );
            out.push_str("  ratios (RHS / pivot column coefficient):\n");
            for ratio in &narration.ratios {
                match ratio.value {
                    Some(value) => {
                        let _ = writeln!(
                            out,
                            "    row {}: {:.2} / {:.2} = {value:.2}",
                            ratio.index + 1,
                            ratio.numerator,
                            ratio.denominator
                        );
                    }
                    None => {
                        let _ = writeln!(out, "    row {}: -- (coefficient <= 0)", ratio.index + 1);
                    }
                }
            }
            let _ = writeln!(out, "  pivot row: {row} (smallest ratio: {winning})");
        }
        PivotKind::Dual => {
            let _ = writeln!(
                out,
                "  pivot row: {row} (most negative right-hand side: {:.2})",
                narration.criterion
            );
            out.push_str("  ratios (Z-row value / |row coefficient|):\n");
            for ratio in &narration.ratios {
                let name = variable_name(ratio.index, event.nvars);
                match ratio.value {
                    Some(value) => {
                        let _ = writeln!(
                            out,
                            "    {name}: {:.2} / {:.2} = {value:.2}",
                            ratio.numerator, ratio.denominator
                        );
                    }
                    None => {
                        let _ = writeln!(out, "    {name}: -- (coefficient >= 0)");
                    }
                }
            }
            let _ = writeln!(out, "  pivot column: {column} (smallest ratio: {winning})");
        }
    }
    let _ = writeln!(out, "  pivot element: {:.2}", record.pivot_element);
    out.push_str("  pivot operation:\n");
    let _ = writeln!(
        out,
        "    1. normalise the pivot row (row {row} /= {:.2})",
        record.pivot_element
    );
    out.push_str("    2. clear the other entries of the pivot column\n");
    let m = event.nconstraints();
    for step in &narration.eliminations {
        let target = if step.row == m {
            "Z".to_string()
        } else {
            (step.row + 1).to_string()
        };
        let _ = writeln!(
            out,
            "       row {target} -= {:.2} × (new row {row})",
            step.multiplier
        );
    }
    let _ = writeln!(
        out,
        "  {} enters the basis, {} leaves",
        variable_name(record.entering, event.nvars),
        variable_name(record.leaving, event.nvars)
    );
}

/// Closing narration: why the loop stopped and how the values are read off
/// the final `basis`. `converted` is the objective of the maximization form.
pub fn render_extraction(
    solution: &Solution<Scalar>,
    direction: Direction,
    basis: &[usize],
    converted: Scalar,
) -> String {
    let mut out = String::new();
    let primal = match (solution.status, &solution.primal, solution.objective_value) {
        (Status::Optimal, Some(primal), Some(_)) => primal,
        _ => {
            out.push_str("the problem is unbounded: the pivot column has no positive coefficient\n");
            return out;
        }
    };
    out.push_str("optimal solution found: every Z-row coefficient is non-negative\n");
    out.push_str("reading the solution off the final tableau:\n");
    let nvars = primal.len();
    for (var, value) in primal.iter().enumerate() {
        let kind = if basis.contains(&var) {
            "basic"
        } else {
            "non-basic"
        };
        let _ = writeln!(out, "  {} = {value:.2} ({kind})", variable_name(var, nvars));
    }
    match direction {
        Direction::Maximize => {
            let _ = writeln!(out, "  maximum value: Z = {converted:.2}");
        }
        Direction::Minimize => {
            let _ = writeln!(out, "  objective of the converted problem: Z' = {converted:.2}");
            let _ = writeln!(out, "  minimum value: Z = -Z' = {:.2}", -converted);
        }
    }
    out
}

fn write_cells(out: &mut String, row: &[Scalar]) {
    let (rhs, coefficients) = match row.split_last() {
        Some(split) => split,
        None => return,
    };
    for value in coefficients {
        let _ = write!(out, " {value:6.2} |");
    }
    let _ = writeln!(out, " {rhs:8.2} |");
}

pub fn render_solution(solution: &Solution<Scalar>, direction: Direction) -> String {
    match (solution.status, &solution.primal, solution.objective_value) {
        (Status::Optimal, Some(primal), Some(objective)) => {
            let values = primal
                .iter()
                .enumerate()
                .map(|(i, v)| format!("x{}={v:.2}", i + 1))
                .join(", ");
            let label = match direction {
                Direction::Maximize => "Maximum",
                Direction::Minimize => "Minimum",
            };
            format!(
                "status: optimal\nsolution: [ {values} ]\n{label}: Z = {objective:.2}\niters: {}\n",
                solution.iterations
            )
        }
        _ => format!(
            "status: unbounded\nthe objective increases without limit\niters: {}\n",
            solution.iterations
        ),
    }
}

pub fn render_verification(report: &Verification<Scalar>) -> String {
    let mut out = String::from("verification against the original data:\n");
    for check in &report.constraints {
        let _ = writeln!(
            out,
            "  constraint {}: {:.2} {} {:.2} {}",
            check.index + 1,
            check.lhs,
            check.relation,
            check.rhs,
            mark(check.satisfied)
        );
    }
    for check in &report.variables {
        let _ = writeln!(
            out,
            "  x{} = {:.2} >= 0 {}",
            check.index + 1,
            check.value,
            mark(check.nonnegative)
        );
    }
    let _ = writeln!(out, "  objective with this solution: Z = {:.2}", report.objective);
    out
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "VIOLATED"
    }
}

/// Prints every trace snapshot with its narration, optionally waiting for
/// Enter between them.
pub struct TableauPrinter<W: Write> {
    out: W,
    pause: bool,
    basis: Vec<usize>,
    converted: Scalar,
}

impl<W: Write> TableauPrinter<W> {
    pub fn new(out: W, pause: bool) -> Self {
        Self {
            out,
            pause,
            basis: Vec::new(),
            converted: 0.0,
        }
    }

    /// Explains the outcome using the last snapshot seen.
    pub fn finish(&mut self, solution: &Solution<Scalar>, direction: Direction) -> io::Result<()> {
        let text = render_extraction(solution, direction, &self.basis, self.converted);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn wait_for_enter(&mut self) -> io::Result<()> {
        write!(self.out, "press Enter to continue...")?;
        self.out.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

impl<W: Write> TraceObserver<Scalar> for TableauPrinter<W> {
    fn observe(&mut self, event: &TraceEvent<'_, Scalar>) {
        self.basis = event.basis.to_vec();
        let tableau = event.tableau;
        self.converted = tableau[(tableau.nrows - 1, tableau.ncols - 1)];

        let text = format!("{}{}", render_step(event), render_tableau(event));
        if let Err(err) = self.out.write_all(text.as_bytes()) {
            tracing::warn!(%err, "failed to print tableau");
            return;
        }
        if self.pause {
            if let Err(err) = self.wait_for_enter() {
                tracing::warn!(%err, "pause interrupted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabrs_api::{demo_problem, verify_solution, LpBuilder, Solver};
    use tabrs_core::problem::ProblemLP;

    #[test]
    fn names_decision_and_slack_columns() {
        assert_eq!(variable_name(0, 2), "x1");
        assert_eq!(variable_name(1, 2), "x2");
        assert_eq!(variable_name(2, 2), "s1");
        assert_eq!(variable_name(3, 2), "s2");
    }

    #[test]
    fn printer_renders_initial_and_pivot_tableaux() {
        let mut buffer = Vec::new();
        {
            let mut printer = TableauPrinter::new(&mut buffer, false);
            Solver::new()
                .solve_lp_traced(&demo_problem(), &mut printer)
                .unwrap();
        }
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("initial"));
        assert!(text.contains("pivot on row 1, column 1"));
        assert!(text.contains("Base |   x1   |   x2   |   s1   |   s2   |    RHS   |"));
        assert!(text.contains(" s1  |   2.00 |   1.00 |   1.00 |   0.00 |    20.00 |"));
        assert!(text.contains("  Z  |  -3.00 |  -2.00 |   0.00 |   0.00 |     0.00 |"));
    }

    fn narrate(problem: &ProblemLP<Scalar>) -> String {
        let mut buffer = Vec::new();
        {
            let mut printer = TableauPrinter::new(&mut buffer, false);
            let solution = Solver::new().solve_lp_traced(problem, &mut printer).unwrap();
            printer.finish(&solution, problem.direction).unwrap();
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn narrates_ratio_test_and_row_operations() {
        let text = narrate(&demo_problem());
        assert!(text.contains("  pivot column: 1 (most negative Z-row value: -3.00)"));
        assert!(text.contains("    row 1: 20.00 / 2.00 = 10.00\n    row 2: 20.00 / 1.00 = 20.00\n"));
        assert!(text.contains("  pivot row: 1 (smallest ratio: 10.00)"));
        assert!(text.contains("  pivot element: 2.00"));
        assert!(text.contains("    1. normalise the pivot row (row 1 /= 2.00)"));
        assert!(text.contains("       row 2 -= 1.00 × (new row 1)"));
        assert!(text.contains("       row Z -= -3.00 × (new row 1)"));
        assert!(text.contains("  x1 enters the basis, s1 leaves"));
        assert!(text.contains("    row 2: 10.00 / 1.50 = 6.67"));
        assert!(text.contains("  pivot row: 2 (smallest ratio: 6.67)"));
        assert!(text.contains("  x1 = 6.67 (basic)"));
        assert!(text.contains("  maximum value: Z = 33.33"));
        assert!(!text.contains("converting the minimization"));
    }

    #[test]
    fn marks_ineligible_rows() {
        let problem = LpBuilder::new()
            .maximize(vec![1.0, 0.0])
            .constraint(vec![1.0, 1.0], 4.0)
            .constraint(vec![-1.0, 1.0], 2.0)
            .build()
            .unwrap();
        let text = narrate(&problem);
        assert!(text.contains("    row 1: 4.00 / 1.00 = 4.00"));
        assert!(text.contains("    row 2: -- (coefficient <= 0)"));
        assert!(text.contains("  x2 = 0.00 (non-basic)"));
    }

    #[test]
    fn narrates_sign_flip_and_dual_step() {
        let problem = LpBuilder::new()
            .minimize(vec![1.0, 1.0])
            .constraint(vec![1.0, 1.0], 2.0)
            .build()
            .unwrap();
        let text = narrate(&problem);
        assert!(text.contains("converting the minimization into an equivalent maximization"));
        assert!(text.contains("  pivot row: 1 (most negative right-hand side: -2.00)"));
        assert!(text.contains("    x1: 1.00 / 1.00 = 1.00"));
        assert!(text.contains("    s1: -- (coefficient >= 0)"));
        assert!(text.contains("  objective of the converted problem: Z' = -2.00"));
        assert!(text.contains("  minimum value: Z = -Z' = 2.00"));
    }

    #[test]
    fn unbounded_outcome_is_explained() {
        let problem = LpBuilder::new()
            .maximize(vec![1.0])
            .constraint(vec![-1.0], 5.0)
            .build()
            .unwrap();
        let text = narrate(&problem);
        assert!(text.contains("the problem is unbounded"));
    }

    #[test]
    fn summary_and_verification_text() {
        let problem = demo_problem();
        let solution = Solver::new().solve_lp(&problem).unwrap();
        let summary = render_solution(&solution, problem.direction);
        assert!(summary.contains("x1=6.67, x2=6.67"));
        assert!(summary.contains("Maximum: Z = 33.33"));

        let report = verify_solution(&problem, solution.primal.as_ref().unwrap()).unwrap();
        let text = render_verification(&report);
        assert!(text.contains("constraint 1: 20.00 <= 20.00 ok"));
    }
}
