use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlanError;

pub const DEFAULT_POLY_DEGREE: usize = 1;
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub months: Vec<f64>,
    pub progress: Vec<f64>,
    pub duration: u32,
    pub poly_degree: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Projection {
    pub all_months: Vec<u32>,
    pub projection: Vec<f64>,
    pub coefficients: Vec<f64>,
}

pub fn project(request: &ProjectionRequest, default_degree: usize) -> Result<Projection, PlanError> {
    if request.months.len() != request.progress.len() {
        return Err(PlanError::data(
            "Length of 'months' and 'progress' must match.",
        ));
    }
    if request.months.is_empty() {
        return Err(PlanError::data("at least one progress point is required"));
    }
    if request.duration > MAX_PROJECTION_MONTHS {
        return Err(PlanError::data(format!(
            "duration cannot exceed {MAX_PROJECTION_MONTHS} months"
        )));
    }
    let degree = request.poly_degree.unwrap_or(default_degree);
    let coefficients = fit_polynomial(&request.months, &request.progress, degree)?;
    debug!(degree, ?coefficients, "projection fitted");

    let all_months: Vec<u32> = (0..=request.duration).collect();
    let projection = all_months
        .iter()
        .map(|m| evaluate(&coefficients, f64::from(*m)))
        .collect();
    Ok(Projection {
        all_months,
        projection,
        coefficients,
    })
}

pub fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Result<Vec<f64>, PlanError> {
    let distinct = distinct_count(xs);
    if degree >= distinct {
        return Err(PlanError::data(format!(
            "a degree {degree} polynomial needs more than {distinct} distinct months"
        )));
    }
    let size = degree + 1;
    let mut normal = vec![vec![0.0; size + 1]; size];
    for (x, y) in xs.iter().zip(ys) {
        let powers: Vec<f64> = (0..size).map(|p| x.powi(p as i32)).collect();
        for row in 0..size {
            for col in 0..size {
                normal[row][col] += powers[row] * powers[col];
            }
            normal[row][size] += powers[row] * y;
        }
    }
    solve(normal).ok_or_else(|| {
        PlanError::data(format!(
            "cannot fit a degree {degree} polynomial to {} points",
            xs.len()
        ))
    })
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

pub fn evaluate(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn solve(mut matrix: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = matrix.len();
    let scale = matrix
        .iter()
        .flat_map(|row| row[..n].iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);
    for col in 0..n {
        let pivot = (col..n).max_by(|a, b| matrix[*a][col].abs().total_cmp(&matrix[*b][col].abs()))?;
        if matrix[pivot][col].abs() <= scale * 1e-12 {
            return None;
        }
        matrix.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..=n {
                matrix[row][k] -= factor * matrix[col][k];
            }
        }
    }
    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (matrix[row][n] - tail) / matrix[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_close;

    #[test]
    fn linear_fit_recovers_line() {
        let request = ProjectionRequest {
            months: vec![1.0, 2.0, 3.0, 4.0],
            progress: vec![150.0, 300.0, 450.0, 600.0],
            duration: 6,
            poly_degree: None,
        };
        let projection = project(&request, DEFAULT_POLY_DEGREE).expect("projection");
        assert_eq!(projection.all_months, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_close(projection.projection[0], 0.0);
        assert_close(projection.projection[6], 900.0);
    }

    #[test]
    fn quadratic_fit_is_exact_on_quadratic_data() {
        let xs = [0.0, 1.0, 2.0, 3.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 + 3.0 * x + 0.5 * x * x).collect();
        let coefficients = fit_polynomial(&xs, &ys, 2).expect("fit");
        assert_close(coefficients[0], 2.0);
        assert_close(coefficients[1], 3.0);
        assert_close(coefficients[2], 0.5);
        assert_close(evaluate(&coefficients, 4.0), 22.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let request = ProjectionRequest {
            months: vec![1.0, 2.0],
            progress: vec![100.0],
            duration: 3,
            poly_degree: Some(1),
        };
        let err = project(&request, DEFAULT_POLY_DEGREE).expect_err("must fail");
        assert_eq!(err.status().as_tag(), "data_error");
    }

    #[test]
    fn degree_is_bounded_by_distinct_months() {
        let request = ProjectionRequest {
            months: vec![1.0, 2.0],
            progress: vec![1.0, 2.0],
            duration: 3,
            poly_degree: Some(usize::MAX),
        };
        let err = project(&request, DEFAULT_POLY_DEGREE).expect_err("must fail");
        assert_eq!(err.status().as_tag(), "data_error");

        let repeated = ProjectionRequest {
            months: vec![1.0, 1.0, 2.0, 2.0],
            progress: vec![1.0, 1.5, 2.0, 2.5],
            duration: 3,
            poly_degree: Some(2),
        };
        assert!(project(&repeated, DEFAULT_POLY_DEGREE).is_err());
        assert!(fit_polynomial(&[1.0, 2.0, 3.0], &[1.0, 4.0, 9.0], 100_000).is_err());
    }

    #[test]
    fn duration_is_capped() {
        let request = ProjectionRequest {
            months: vec![1.0, 2.0],
            progress: vec![1.0, 2.0],
            duration: u32::MAX,
            poly_degree: None,
        };
        let err = project(&request, DEFAULT_POLY_DEGREE).expect_err("must fail");
        assert!(err.message().contains("1200"));

        let longest = ProjectionRequest {
            duration: MAX_PROJECTION_MONTHS,
            ..request
        };
        let projection = project(&longest, DEFAULT_POLY_DEGREE).expect("projection");
        assert_eq!(projection.all_months.len(), 1201);
    }

    #[test]
    fn too_few_points_for_degree_is_singular() {
        assert!(fit_polynomial(&[1.0, 1.0], &[5.0, 7.0], 1).is_err());
        let constant = fit_polynomial(&[4.0], &[10.0], 0).expect("constant fit");
        assert_close(constant[0], 10.0);
    }
}
