//! Small dense linear algebra on row-major `d×d` matrices.
//!
//! Sized for the online learner (d = 21): direct Gaussian elimination with
//! partial pivoting, no allocation beyond one augmented copy. Singular or
//! ill-conditioned systems never fault; a pivot whose magnitude falls below
//! `PIVOT_EPS` is replaced by `±PIVOT_EPS`, so the result is always finite
//! for finite input, if possibly inaccurate.

use std::fmt;

/// Floor applied to pivot magnitudes.
pub const PIVOT_EPS: f64 = 1e-8;

/// Shape mismatch between a matrix and a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeError {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape mismatch: expected {} elements, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for ShapeError {}

/// Dot product over the shorter of the two slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// `d×d` identity scaled by `lambda`.
pub fn scaled_identity(d: usize, lambda: f64) -> Vec<f64> {
    let mut m = vec![0.0; d * d];
    for i in 0..d {
        m[i * d + i] = lambda;
    }
    m
}

/// Matrix-vector multiply: result = A * v (A is d×d stored row-major).
pub fn mat_vec_mul(a: &[f64], v: &[f64]) -> Result<Vec<f64>, ShapeError> {
    let d = v.len();
    check_square(a, d)?;
    let mut result = vec![0.0; d];
    for (i, r) in result.iter_mut().enumerate() {
        *r = dot(&a[i * d..(i + 1) * d], v);
    }
    Ok(result)
}

/// Rank-1 update in place: A += x xᵀ.
pub fn add_outer(a: &mut [f64], x: &[f64]) -> Result<(), ShapeError> {
    let d = x.len();
    check_square(a, d)?;
    for i in 0..d {
        for j in 0..d {
            a[i * d + j] += x[i] * x[j];
        }
    }
    Ok(())
}

/// Solve A z = y by Gaussian elimination with partial pivoting.
pub fn solve_linear(a: &[f64], y: &[f64]) -> Result<Vec<f64>, ShapeError> {
    let d = y.len();
    check_square(a, d)?;
    let w = d + 1;

    // Augmented [A | y]
    let mut m = vec![0.0; d * w];
    for i in 0..d {
        m[i * w..i * w + d].copy_from_slice(&a[i * d..(i + 1) * d]);
        m[i * w + d] = y[i];
    }

    for col in 0..d {
        let mut max_row = col;
        for row in (col + 1)..d {
            if m[row * w + col].abs() > m[max_row * w + col].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..w {
                m.swap(col * w + j, max_row * w + j);
            }
        }

        let mut pivot = m[col * w + col];
        if pivot.abs() < PIVOT_EPS || !pivot.is_finite() {
            pivot = if pivot < 0.0 { -PIVOT_EPS } else { PIVOT_EPS };
        }
        for j in col..w {
            m[col * w + j] /= pivot;
        }

        for row in 0..d {
            if row == col {
                continue;
            }
            let factor = m[row * w + col];
            if factor == 0.0 {
                continue;
            }
            for j in col..w {
                m[row * w + j] -= factor * m[col * w + j];
            }
        }
    }

    Ok((0..d).map(|i| m[i * w + d]).collect())
}

/// xᵀ A⁻¹ x computed by solving A z = x, without forming A⁻¹.
pub fn quad_form_inv(a: &[f64], x: &[f64]) -> Result<f64, ShapeError> {
    let z = solve_linear(a, x)?;
    Ok(dot(x, &z))
}

fn check_square(a: &[f64], d: usize) -> Result<(), ShapeError> {
    if a.len() != d * d {
        return Err(ShapeError {
            expected: d * d,
            actual: a.len(),
        });
    }
    Ok(())
}
