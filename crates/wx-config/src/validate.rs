//! Semantic validation of configuration.

use thiserror::Error;

use crate::config::Config;
use crate::MAX_SPAN_DAYS;

/// Result type for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("invalid priors: {0}")]
    InvalidPriors(String),
}

impl From<ValidationError> for wx_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidPriors(msg) => wx_common::Error::InvalidPriors(msg),
            ValidationError::UnsupportedVersion(v) => wx_common::Error::SchemaValidation(v),
            other => wx_common::Error::Config(other.to_string()),
        }
    }
}

fn require(cond: bool, field: &'static str, message: impl Into<String>) -> ValidationResult<()> {
    if cond {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field,
            message: message.into(),
        })
    }
}

fn unit(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Validate every section of a configuration.
pub fn validate_config(config: &Config) -> ValidationResult<()> {
    if !wx_common::schema::is_compatible(&config.schema_version) {
        return Err(ValidationError::UnsupportedVersion(
            config.schema_version.clone(),
        ));
    }

    let s = &config.scoring;
    require(
        s.ridge_lambda.is_finite() && s.ridge_lambda > 0.0,
        "scoring.ridge_lambda",
        "must be positive",
    )?;
    require(
        s.default_alpha.is_finite() && s.default_alpha >= 0.0,
        "scoring.default_alpha",
        "must be non-negative",
    )?;
    require(
        s.online_alpha.is_finite() && s.online_alpha >= 0.0,
        "scoring.online_alpha",
        "must be non-negative",
    )?;
    require(unit(s.prior_weight), "scoring.prior_weight", "must be in [0, 1]")?;
    require(unit(s.ucb_weight), "scoring.ucb_weight", "must be in [0, 1]")?;
    require(
        unit(s.prior_only_confidence),
        "scoring.prior_only_confidence",
        "must be in [0, 1]",
    )?;
    require(
        unit(s.blended_confidence),
        "scoring.blended_confidence",
        "must be in [0, 1]",
    )?;
    require(
        unit(s.default_spend_today) && unit(s.default_spend_7d),
        "scoring.default_spend",
        "must be in [0, 1]",
    )?;
    let w = &s.pseudo_reward;
    require(
        [w.dryness, w.promo_strength, w.spend_today]
            .iter()
            .all(|v| v.is_finite()),
        "scoring.pseudo_reward",
        "weights must be finite",
    )?;

    if let Some(max) = config.registry.max_cohorts {
        require(max > 0, "registry.max_cohorts", "must be at least 1")?;
    }

    let st = &config.staging;
    require(
        st.max_daily.is_finite() && st.max_daily > 0.0,
        "staging.max_daily",
        "must be positive",
    )?;
    require(
        (1..=MAX_SPAN_DAYS).contains(&st.horizon),
        "staging.horizon",
        format!("must be between 1 and {MAX_SPAN_DAYS}"),
    )?;
    require(
        st.floor.is_finite() && st.ceiling.is_finite() && st.floor < st.ceiling,
        "staging.floor",
        format!("floor {} must be below ceiling {}", st.floor, st.ceiling),
    )?;

    let sf = &config.safety;
    require(sf.min_days >= 1, "safety.min_days", "must be at least 1")?;
    require(
        [
            sf.insufficient_damping,
            sf.gust_damping,
            sf.precip_damping,
            sf.temp_range_damping,
        ]
        .iter()
        .all(|v| unit(*v)),
        "safety.damping",
        "damping factors must be in [0, 1]",
    )?;
    require(
        sf.gust_norm_mph > 0.0 && sf.temp_range_norm_f > 0.0,
        "safety.norm",
        "normalizers must be positive",
    )?;
    require(unit(sf.halt_entropy), "safety.halt_entropy", "must be in [0, 1]")?;

    let r = &config.recommend;
    require(
        unit(r.automation_threshold),
        "recommend.automation_threshold",
        "must be in [0, 1]",
    )?;
    require(r.max_picks >= 1, "recommend.max_picks", "must be at least 1")?;
    require(
        r.audit_capacity >= 1,
        "recommend.audit_capacity",
        "must be at least 1",
    )?;

    config
        .priors
        .validate()
        .map_err(ValidationError::InvalidPriors)?;

    Ok(())
}
