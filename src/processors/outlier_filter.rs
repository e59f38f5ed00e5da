use tracing::{debug, info, warn};

use crate::models::{
    AnnotatedColumn, AnnotatedSeries, OutlierCheck, QualityFlag, SkipReason, VariablePolicy,
    ZScoreStats,
};
use crate::utils::constants::MIN_STATISTICAL_SAMPLES;

/// Second QC stage: single-pass z-score test per variable.
///
/// Mean and standard deviation are computed once over the values that
/// survived the physical-limit stage. They are recorded on the column, and a
/// later run over the same column reuses them, so running the stage twice
/// flags nothing new.
pub struct StatisticalOutlierFilter<'a> {
    threshold: f64,
    policies: &'a [VariablePolicy],
}

impl<'a> StatisticalOutlierFilter<'a> {
    pub fn new(threshold: f64, policies: &'a [VariablePolicy]) -> Self {
        Self {
            threshold,
            policies,
        }
    }

    pub fn apply(&self, mut series: AnnotatedSeries) -> AnnotatedSeries {
        for column in &mut series.columns {
            let Some(policy) = self.policies.iter().find(|p| p.name == column.name) else {
                debug!(variable = %column.name, "No policy, skipping z-score check");
                continue;
            };

            if !policy.applies_outlier_check() {
                column.outlier_check = OutlierCheck::Skipped(SkipReason::Disabled);
                debug!(variable = %column.name, "Z-score check disabled by policy");
                continue;
            }

            let rejected = self.check_column(column);
            match column.outlier_check {
                OutlierCheck::Applied(stats) => info!(
                    variable = %column.name,
                    mean = stats.mean,
                    std_dev = stats.std_dev,
                    samples = stats.sample_count,
                    rejected,
                    "Z-score check applied"
                ),
                OutlierCheck::Skipped(reason) => warn!(
                    variable = %column.name,
                    reason = reason.describe(),
                    "Degenerate statistics, z-score check skipped"
                ),
                OutlierCheck::NotRun => {}
            }
        }

        series
    }

    /// Flag present values with `|z| > threshold`. Returns the number of
    /// values rejected.
    pub fn check_column(&self, column: &mut AnnotatedColumn) -> usize {
        let stats = match column.outlier_check {
            OutlierCheck::Applied(stats) => stats,
            _ => match compute_stats(column.present_values()) {
                Ok(stats) => stats,
                Err(reason) => {
                    column.outlier_check = OutlierCheck::Skipped(reason);
                    return 0;
                }
            },
        };

        let mut rejected = 0;
        for index in 0..column.len() {
            let Some(value) = column.raw[index] else {
                continue;
            };

            let z = stats.z_score(value);
            if z.abs() > self.threshold {
                debug!(variable = %column.name, index, value, z, "Statistical outlier");
                column.reject(index, QualityFlag::StatisticalOutlier);
                rejected += 1;
            }
        }

        column.outlier_check = OutlierCheck::Applied(stats);
        rejected
    }
}

/// Sample mean and standard deviation (n - 1 denominator).
pub fn compute_stats(values: impl Iterator<Item = f64>) -> Result<ZScoreStats, SkipReason> {
    let values: Vec<f64> = values.collect();
    let n = values.len();
    if n < MIN_STATISTICAL_SAMPLES {
        return Err(SkipReason::InsufficientSamples);
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return Err(SkipReason::ZeroVariance);
    }

    Ok(ZScoreStats {
        mean,
        std_dev,
        sample_count: n,
    })
}
