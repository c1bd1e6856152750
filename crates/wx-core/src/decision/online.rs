//! Ridge-regularized online linear model (LinUCB).
//!
//! ```text
//!   A = λI + Σ x_t x_tᵀ      (design matrix)
//!   b = Σ r_t x_t             (reward vector)
//!   θ = A⁻¹ b                 (solved, never inverted)
//!   UCB(x) = xᵀθ + α √max(ε, xᵀA⁻¹x)
//! ```
//!
//! A and b are sufficient statistics; the raw history is never kept.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wx_math::{add_outer, dot, quad_form_inv, scaled_identity, solve_linear, ShapeError};

/// Floor on the predictive variance.
pub const MIN_VARIANCE: f64 = 1e-8;

#[derive(Debug, Error)]
pub enum OnlineError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("non-finite {0} supplied to online update")]
    NonFinite(&'static str),
}

impl From<ShapeError> for OnlineError {
    fn from(e: ShapeError) -> Self {
        OnlineError::DimensionMismatch {
            expected: e.expected,
            actual: e.actual,
        }
    }
}

impl From<OnlineError> for wx_common::Error {
    fn from(e: OnlineError) -> Self {
        match e {
            OnlineError::DimensionMismatch { expected, actual } => {
                wx_common::Error::DimensionMismatch { expected, actual }
            }
            OnlineError::NonFinite(what) => wx_common::Error::NumericalInstability(format!(
                "non-finite {what} supplied to online update"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UcbScore {
    pub mean: f64,
    pub ucb: f64,
    pub variance: f64,
}

/// Per-cohort learner state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineState {
    /// Row-major d×d design matrix.
    a: Vec<f64>,
    b: Vec<f64>,
    dim: usize,
    lambda: f64,
    updates: u64,
}

impl OnlineState {
    pub fn new(dim: usize, lambda: f64) -> Self {
        Self {
            a: scaled_identity(dim, lambda),
            b: vec![0.0; dim],
            dim,
            lambda,
            updates: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Number of rank-1 updates folded in.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn design_matrix(&self) -> &[f64] {
        &self.a
    }

    pub fn reward_vector(&self) -> &[f64] {
        &self.b
    }

    fn check_dim(&self, x: &[f64]) -> Result<(), OnlineError> {
        if x.len() != self.dim {
            return Err(OnlineError::DimensionMismatch {
                expected: self.dim,
                actual: x.len(),
            });
        }
        Ok(())
    }

    /// A += xxᵀ, b += r·x. Either both change or neither does.
    pub fn update(&mut self, x: &[f64], reward: f64) -> Result<(), OnlineError> {
        self.check_dim(x)?;
        if !reward.is_finite() {
            return Err(OnlineError::NonFinite("reward"));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(OnlineError::NonFinite("context"));
        }
        add_outer(&mut self.a, x)?;
        for (b_i, &x_i) in self.b.iter_mut().zip(x) {
            *b_i += reward * x_i;
        }
        self.updates += 1;
        Ok(())
    }

    /// Ridge coefficients θ solving Aθ = b.
    pub fn theta(&self) -> Vec<f64> {
        // A and b are sized together at construction, so the solve cannot
        // fail on shape.
        solve_linear(&self.a, &self.b).unwrap_or_else(|_| vec![0.0; self.dim])
    }

    pub fn ucb_score(&self, x: &[f64], alpha: f64) -> Result<UcbScore, OnlineError> {
        self.check_dim(x)?;
        let mean = dot(&self.theta(), x);
        let variance = quad_form_inv(&self.a, x)?.max(MIN_VARIANCE);
        Ok(UcbScore {
            mean,
            ucb: mean + alpha * variance.sqrt(),
            variance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_ridge_identity() {
        let st = OnlineState::new(3, 5.0);
        assert_eq!(st.design_matrix(), &[5.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 5.0]);
        assert_eq!(st.theta(), vec![0.0; 3]);
        assert_eq!(st.updates(), 0);
    }

    #[test]
    fn fresh_ucb_is_pure_exploration() {
        let st = OnlineState::new(2, 5.0);
        let s = st.ucb_score(&[1.0, 1.0], 1.2).unwrap();
        assert_eq!(s.mean, 0.0);
        assert!((s.variance - 0.4).abs() < 1e-12);
        assert!((s.ucb - 1.2 * 0.4f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_context_hits_variance_floor() {
        let st = OnlineState::new(2, 5.0);
        let s = st.ucb_score(&[0.0, 0.0], 1.0).unwrap();
        assert_eq!(s.variance, MIN_VARIANCE);
    }

    #[test]
    fn update_is_rank_one() {
        let mut st = OnlineState::new(2, 1.0);
        st.update(&[1.0, 2.0], 0.5).unwrap();
        assert_eq!(st.design_matrix(), &[2.0, 2.0, 2.0, 5.0]);
        assert_eq!(st.reward_vector(), &[0.5, 1.0]);
        assert_eq!(st.updates(), 1);
    }

    #[test]
    fn repeated_updates_converge_to_reward() {
        let x = [0.3, -1.2, 2.0, 0.5];
        let mut st = OnlineState::new(x.len(), 5.0);
        let mut prev_err = f64::INFINITY;
        for n in 1..=2000 {
            st.update(&x, 0.8).unwrap();
            if n % 500 == 0 {
                let err = (dot(&st.theta(), &x) - 0.8).abs();
                assert!(err < prev_err);
                prev_err = err;
            }
        }
        assert!(prev_err < 1e-3);
    }

    #[test]
    fn dimension_mismatch_leaves_state_untouched() {
        let mut st = OnlineState::new(3, 5.0);
        let before = st.clone();
        assert!(matches!(
            st.update(&[1.0, 2.0], 1.0),
            Err(OnlineError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(st.ucb_score(&[1.0], 1.0).is_err());
        assert_eq!(st, before);
    }

    #[test]
    fn non_finite_reward_rejected() {
        let mut st = OnlineState::new(2, 5.0);
        assert!(matches!(
            st.update(&[1.0, 1.0], f64::NAN),
            Err(OnlineError::NonFinite("reward"))
        ));
        assert_eq!(st.updates(), 0);
    }

    #[test]
    fn near_singular_stays_finite() {
        let mut st = OnlineState::new(3, 1e-12);
        for _ in 0..10 {
            st.update(&[1.0, 1.0, 1.0], 1.0).unwrap();
        }
        let s = st.ucb_score(&[1.0, -1.0, 0.0], 1.1).unwrap();
        assert!(s.mean.is_finite() && s.ucb.is_finite() && s.variance.is_finite());
    }

    #[test]
    fn converts_into_unified_error() {
        let err: wx_common::Error = OnlineError::DimensionMismatch {
            expected: 21,
            actual: 3,
        }
        .into();
        assert_eq!(err.code(), 30);
    }
}
