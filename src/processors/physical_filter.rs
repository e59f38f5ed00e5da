use tracing::{debug, info};

use crate::models::{AnnotatedColumn, AnnotatedSeries, PhysicalBounds, QualityFlag, VariablePolicy};

/// First QC stage: rejects values outside each variable's physical range.
///
/// Decisions are per record; no state is carried between records. Values
/// already missing on input are left missing with a good flag.
pub struct PhysicalLimitFilter<'a> {
    policies: &'a [VariablePolicy],
}

impl<'a> PhysicalLimitFilter<'a> {
    pub fn new(policies: &'a [VariablePolicy]) -> Self {
        Self { policies }
    }

    pub fn apply(&self, mut series: AnnotatedSeries) -> AnnotatedSeries {
        for column in &mut series.columns {
            let Some(policy) = self.policies.iter().find(|p| p.name == column.name) else {
                debug!(variable = %column.name, "No policy, skipping physical-limit check");
                continue;
            };

            let bounds = policy.physical_bounds();
            let rejected = Self::check_column(column, bounds);

            info!(
                variable = %column.name,
                min = bounds.min,
                max = bounds.max,
                rejected,
                "Physical-limit check applied"
            );
        }

        series
    }

    /// Flag every present value strictly outside `bounds`. Returns the
    /// number of values rejected.
    pub fn check_column(column: &mut AnnotatedColumn, bounds: PhysicalBounds) -> usize {
        let mut rejected = 0;

        for index in 0..column.len() {
            let Some(value) = column.raw[index] else {
                continue;
            };

            if !bounds.contains(value) {
                debug!(
                    variable = %column.name,
                    index,
                    value,
                    "Value outside physical limits"
                );
                column.reject(index, QualityFlag::PhysicallyInvalid);
                rejected += 1;
            }
        }

        rejected
    }
}
