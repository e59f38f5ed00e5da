use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::processors::gap_filler::{FillStrategy, ForwardFill, LinearInterpolation};

/// Closed physical range `[min, max]` a variable can plausibly take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalBounds {
    pub min: f64,
    pub max: f64,
}

impl PhysicalBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Boundary values are inside the range.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// How gaps in a variable are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillMethod {
    /// Positional linear interpolation, no extrapolation at the edges.
    Linear,
    /// Carry the last known value forward; leading gaps become zero.
    ForwardFillThenZero,
}

impl FillMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMethod::Linear => "linear",
            FillMethod::ForwardFillThenZero => "forward-fill-then-zero",
        }
    }

    pub fn strategy(&self) -> Box<dyn FillStrategy> {
        match self {
            FillMethod::Linear => Box::new(LinearInterpolation),
            FillMethod::ForwardFillThenZero => Box::new(ForwardFill::with_leading_default(0.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Smoothly varying quantities such as temperature.
    Continuous,
    /// Pulse-like quantities bounded below, such as precipitation.
    Bounded,
}

/// QC policy for one named variable: physical bounds plus fill strategy.
///
/// The pipeline stages only talk to this type, so adding a new kind of
/// variable means adding a policy, not touching the stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_policy_bounds"))]
pub struct VariablePolicy {
    #[validate(length(min = 1))]
    pub name: String,

    pub min: f64,

    pub max: f64,

    pub fill: FillMethod,

    /// Whether the z-score stage evaluates this variable. Defaults to true
    /// for continuous variables and false for bounded ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_check: Option<bool>,
}

impl VariablePolicy {
    pub fn continuous(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            fill: FillMethod::Linear,
            outlier_check: None,
        }
    }

    pub fn bounded(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            fill: FillMethod::ForwardFillThenZero,
            outlier_check: None,
        }
    }

    pub fn with_outlier_check(mut self, enabled: bool) -> Self {
        self.outlier_check = Some(enabled);
        self
    }

    pub fn physical_bounds(&self) -> PhysicalBounds {
        PhysicalBounds::new(self.min, self.max)
    }

    pub fn fill_strategy(&self) -> Box<dyn FillStrategy> {
        self.fill.strategy()
    }

    pub fn kind(&self) -> VariableKind {
        match self.fill {
            FillMethod::Linear => VariableKind::Continuous,
            FillMethod::ForwardFillThenZero => VariableKind::Bounded,
        }
    }

    pub fn applies_outlier_check(&self) -> bool {
        self.outlier_check
            .unwrap_or(self.kind() == VariableKind::Continuous)
    }
}

fn validate_policy_bounds(policy: &VariablePolicy) -> Result<(), ValidationError> {
    if !policy.min.is_finite() || !policy.max.is_finite() || policy.min > policy.max {
        let mut error = ValidationError::new("physical_bounds");
        error.message = Some(Cow::Owned(format!(
            "Invalid bounds [{}, {}] for variable '{}'",
            policy.min, policy.max, policy.name
        )));
        return Err(error);
    }
    Ok(())
}
