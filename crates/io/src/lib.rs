#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tabrs_core::math::Scalar;
use tabrs_core::problem::{DenseMatrix, Direction, ProblemLP, ProblemResult};
use tabrs_core::solution::Solution;

/// On-disk problem layout: constraint rows, right-hand sides, objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonProblem {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub a: Vec<Vec<Scalar>>,
    #[serde(default)]
    pub b: Vec<Scalar>,
    pub c: Vec<Scalar>,
}

impl JsonProblem {
    pub fn into_problem(self) -> ProblemResult<ProblemLP<Scalar>> {
        let constraints = if self.a.is_empty() {
            DenseMatrix::zeros(0, self.c.len())
        } else {
            DenseMatrix::from_rows(&self.a)?
        };
        let problem = ProblemLP {
            constraints,
            rhs: self.b,
            cost: self.c,
            direction: self.direction,
        };
        problem.validate()?;
        Ok(problem)
    }

    pub fn from_problem(problem: &ProblemLP<Scalar>) -> Self {
        Self {
            direction: problem.direction,
            a: (0..problem.constraints.nrows)
                .map(|i| problem.constraints.row(i).to_vec())
                .collect(),
            b: problem.rhs.clone(),
            c: problem.cost.clone(),
        }
    }
}

pub fn parse_json_problem(contents: &str) -> Result<ProblemLP<Scalar>> {
    match serde_json::from_str::<JsonProblem>(contents) {
        Ok(raw) => raw.into_problem().context("invalid problem"),
        Err(parse_err) => {
            if serde_json::from_str::<Solution<Scalar>>(contents).is_ok() {
                Err(anyhow!(
                    "JSON file contains a solver solution, but a tabrs problem (with 'a', 'b' and 'c' fields) was expected."
                ))
            } else {
                Err(parse_err).context("failed to parse JSON problem")
            }
        }
    }
}

pub fn read_json_problem<P: AsRef<Path>>(path: P) -> Result<ProblemLP<Scalar>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .with_context(|| format!("failed to read {:?}", path))?;
    parse_json_problem(&contents).with_context(|| format!("in {:?}", path))
}

pub fn write_json_problem<P: AsRef<Path>>(path: P, problem: &ProblemLP<Scalar>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &JsonProblem::from_problem(problem))
        .context("failed to serialise problem")?;
    writer
        .flush()
        .with_context(|| format!("failed to write problem into {:?}", path))?;
    Ok(())
}

pub fn write_solution<P: AsRef<Path>>(path: P, solution: &Solution<Scalar>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent directory {:?}", parent))?;
        }
    }

    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, solution).context("failed to serialise solution")?;
    writer
        .flush()
        .with_context(|| format!("failed to write solution into {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabrs_core::stats::SolveStats;

    #[test]
    fn parses_minimal_problem() {
        let input = r#"{"direction":"minimize","a":[[1.0,1.0]],"b":[2.0],"c":[1.0,1.0]}"#;
        let problem = parse_json_problem(input).unwrap();
        assert_eq!(problem.direction, Direction::Minimize);
        assert_eq!(problem.constraints.shape(), (1, 2));
        assert_eq!(problem.rhs, vec![2.0]);
    }

    #[test]
    fn direction_defaults_to_maximize() {
        let input = r#"{"a":[[2.0,1.0],[1.0,2.0]],"b":[20.0,20.0],"c":[3.0,2.0]}"#;
        let problem = parse_json_problem(input).unwrap();
        assert_eq!(problem.direction, Direction::Maximize);
        let back = JsonProblem::from_problem(&problem);
        assert_eq!(back.a, vec![vec![2.0, 1.0], vec![1.0, 2.0]]);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let input = r#"{"a":[[1.0,1.0]],"b":[2.0,3.0],"c":[1.0,1.0]}"#;
        assert!(parse_json_problem(input).is_err());
    }

    #[test]
    fn rejects_non_numeric_values() {
        let input = r#"{"a":[["x",1.0]],"b":[2.0],"c":[1.0,1.0]}"#;
        let err = parse_json_problem(input).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse JSON problem"));
    }

    #[test]
    fn recognises_solution_files() {
        let solution = Solution::optimal(vec![1.0], 1.0, 1, SolveStats::new());
        let text = serde_json::to_string(&solution).unwrap();
        let err = parse_json_problem(&text).unwrap_err();
        assert!(err.to_string().contains("solver solution"));
    }

    #[test]
    fn writing_into_missing_directory_reports_the_path() {
        let path = std::env::temp_dir()
            .join(format!("tabrs-io-missing-{}", std::process::id()))
            .join("problem.json");
        let problem = parse_json_problem(r#"{"a":[[1.0]],"b":[4.0],"c":[2.0]}"#).unwrap();
        let err = write_json_problem(&path, &problem).unwrap_err();
        assert!(err.to_string().contains("failed to create"));
    }

    #[test]
    fn problem_file_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("tabrs-io-{}", std::process::id()));
        let problem_path = dir.join("problem.json");
        let solution_path = dir.join("out").join("solution.json");
        fs::create_dir_all(&dir).unwrap();

        let problem = parse_json_problem(r#"{"a":[[1.0]],"b":[4.0],"c":[2.0]}"#).unwrap();
        write_json_problem(&problem_path, &problem).unwrap();
        let reread = read_json_problem(&problem_path).unwrap();
        assert_eq!(reread.constraints, problem.constraints);
        assert_eq!(reread.cost, vec![2.0]);

        let solution = Solution::optimal(vec![4.0], 8.0, 2, SolveStats::new());
        write_solution(&solution_path, &solution).unwrap();
        assert!(solution_path.exists());
        fs::remove_dir_all(&dir).ok();
    }
}
