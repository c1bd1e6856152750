//! Budget staging: a rate-limited ramp from the current multiplier toward a
//! target.
//!
//! Each day moves by at most `current * max_daily` toward the target and
//! is clamped to `[floor, ceiling]`, so the ramp never overshoots. The
//! running total stays exact; reported steps are rounded to cents.

use serde::{Deserialize, Serialize};
use wx_config::StagingPolicy;
use wx_math::{clamp, round_to};

/// Smallest per-day cap accepted.
const MIN_MAX_DAILY: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedPlan {
    /// One multiplier per day, two decimals.
    pub steps: Vec<f64>,
    pub narrative: String,
}

fn percent(v: f64) -> String {
    format!("{}%", ((v - 1.0) * 100.0).round() as i64)
}

fn narrate(steps: &[f64]) -> String {
    let mut out = String::from("Staged: ");
    for (day, step) in steps.iter().take(3).enumerate() {
        match day {
            0 => out.push_str(&format!("{} today", percent(*step))),
            n => out.push_str(&format!(", {} day {}", percent(*step), n + 1)),
        }
    }
    out
}

/// Plan the ramp toward `target` under `policy`.
pub fn stage_plan(target: f64, policy: &StagingPolicy) -> StagedPlan {
    let horizon = policy.horizon.max(1);
    let max_daily = policy.max_daily.max(MIN_MAX_DAILY);

    let mut steps = Vec::with_capacity(horizon);
    let mut current = policy.start;
    for _ in 0..horizon {
        let remaining = target - current;
        let allowed = remaining.signum() * remaining.abs().min(current * max_daily);
        current = clamp(current + allowed, policy.floor, policy.ceiling);
        steps.push(round_to(current, 2));
    }

    let narrative = narrate(&steps);
    StagedPlan { steps, narrative }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ramps_up_under_cap() {
        let plan = stage_plan(1.5, &StagingPolicy::default());
        assert_eq!(plan.steps.len(), 3);
        assert!(approx(plan.steps[0], 1.15));
        assert_eq!(plan.steps[1], 1.32);
        assert!(approx(plan.steps[2], 1.5));
        assert_eq!(plan.narrative, "Staged: 15% today, 32% day 2, 50% day 3");
    }

    #[test]
    fn ramps_down() {
        let plan = stage_plan(0.7, &StagingPolicy::default());
        assert!(approx(plan.steps[0], 0.85));
        assert_eq!(plan.steps[1], 0.72);
        assert!(plan.steps.windows(2).all(|w| w[1] <= w[0]));
        assert!(plan.steps.iter().all(|&s| s >= 0.7 - 1e-12));
        assert!(plan.narrative.starts_with("Staged: -15% today"));
    }

    #[test]
    fn at_target_stays() {
        let plan = stage_plan(1.0, &StagingPolicy::default());
        assert_eq!(plan.steps, vec![1.0, 1.0, 1.0]);
        assert_eq!(plan.narrative, "Staged: 0% today, 0% day 2, 0% day 3");
    }

    #[test]
    fn clamped_to_bounds() {
        let policy = StagingPolicy {
            start: 2.9,
            max_daily: 0.5,
            ..StagingPolicy::default()
        };
        let plan = stage_plan(10.0, &policy);
        assert!(plan.steps.iter().all(|&s| s <= 3.0));
        assert_eq!(plan.steps[0], 3.0);
    }

    #[test]
    fn degenerate_options_are_floored() {
        let policy = StagingPolicy {
            horizon: 0,
            max_daily: 0.0,
            ..StagingPolicy::default()
        };
        let plan = stage_plan(2.0, &policy);
        assert_eq!(plan.steps.len(), 1);
        assert!(approx(plan.steps[0], 1.01));
        assert_eq!(plan.narrative, "Staged: 1% today");
    }

    #[test]
    fn long_horizon_narrates_three_days() {
        let policy = StagingPolicy {
            horizon: 6,
            ..StagingPolicy::default()
        };
        let plan = stage_plan(2.0, &policy);
        assert_eq!(plan.steps.len(), 6);
        assert!(plan.narrative.contains("day 3"));
        assert!(!plan.narrative.contains("day 4"));
    }

    #[test]
    fn steps_rounded_but_ramp_exact() {
        // 1.0 → 1.104 → 1.2188 (exact) vs 1.10 → 1.21 (compounded rounding).
        let policy = StagingPolicy {
            max_daily: 0.104,
            horizon: 2,
            ..StagingPolicy::default()
        };
        let plan = stage_plan(2.0, &policy);
        assert_eq!(plan.steps, vec![1.1, 1.22]);
    }
}
