use tracing::{debug, info, warn};

use crate::models::{AnnotatedColumn, AnnotatedSeries, VariablePolicy};

/// Reconstructs missing entries of one variable.
///
/// Implementations see positions only, not dates: records are treated as
/// equally spaced.
pub trait FillStrategy {
    fn name(&self) -> &'static str;

    /// Returns a vector of the same length; present values are copied through.
    fn fill(&self, values: &[Option<f64>]) -> Vec<Option<f64>>;
}

/// Linear interpolation between the nearest present neighbours.
/// Gaps before the first or after the last present value stay missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolation;

impl FillStrategy for LinearInterpolation {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fill(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut filled = values.to_vec();
        let mut previous: Option<(usize, f64)> = None;

        for (index, value) in values.iter().enumerate() {
            let Some(value) = *value else {
                continue;
            };

            if let Some((start, start_value)) = previous {
                let span = (index - start) as f64;
                for (gap, slot) in filled.iter_mut().enumerate().take(index).skip(start + 1) {
                    let offset = (gap - start) as f64;
                    *slot = Some(start_value + (value - start_value) * offset / span);
                }
            }
            previous = Some((index, value));
        }

        filled
    }
}

/// Carries the last present value forward. Entries before the first present
/// value take `leading_default`, so the result has no gaps.
#[derive(Debug, Clone, Copy)]
pub struct ForwardFill {
    leading_default: f64,
}

impl ForwardFill {
    pub fn with_leading_default(value: f64) -> Self {
        Self {
            leading_default: value,
        }
    }
}

impl FillStrategy for ForwardFill {
    fn name(&self) -> &'static str {
        "forward-fill-then-zero"
    }

    fn fill(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut last = Some(self.leading_default);
        values
            .iter()
            .map(|value| {
                if value.is_some() {
                    last = *value;
                }
                last
            })
            .collect()
    }
}

/// Third QC stage: fills every variable according to its policy. The raw
/// values and flags are left as they are; results go to `filled`.
pub struct GapFiller<'a> {
    policies: &'a [VariablePolicy],
}

impl<'a> GapFiller<'a> {
    pub fn new(policies: &'a [VariablePolicy]) -> Self {
        Self { policies }
    }

    pub fn apply(&self, mut series: AnnotatedSeries) -> AnnotatedSeries {
        for column in &mut series.columns {
            let Some(policy) = self.policies.iter().find(|p| p.name == column.name) else {
                debug!(variable = %column.name, "No policy, skipping gap filling");
                continue;
            };

            let strategy = policy.fill_strategy();
            let gaps = column.raw.iter().filter(|v| v.is_none()).count();
            Self::fill_column(column, strategy.as_ref());
            let unresolved = column.unresolved();

            if !column.is_empty() && column.present_values().next().is_none() && unresolved > 0 {
                warn!(
                    variable = %column.name,
                    strategy = strategy.name(),
                    "No usable values, variable left entirely missing"
                );
            }

            info!(
                variable = %column.name,
                strategy = strategy.name(),
                filled = gaps - unresolved,
                unresolved,
                "Gaps filled"
            );
        }

        series
    }

    pub fn fill_column(column: &mut AnnotatedColumn, strategy: &dyn FillStrategy) {
        column.filled = Some(strategy.fill(&column.raw));
    }
}
