use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AnnotatedSeries, OutlierCheck, QualityFlag};
use crate::settings::QcConfig;

#[derive(Debug, Clone, Serialize)]
pub struct QcReport {
    pub total_records: usize,
    pub z_threshold: f64,
    pub variables: Vec<VariableReport>,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableReport {
    pub name: String,
    pub fill_method: Option<String>,
    pub good: usize,
    pub physically_invalid: usize,
    pub statistical_outliers: usize,
    pub originally_missing: usize,
    pub unresolved_after_fill: usize,
    pub outlier_check: OutlierCheck,
}

/// One value removed by QC, with the value as it was loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub variable: String,
    pub date: NaiveDate,
    pub original: Option<f64>,
    pub flag: QualityFlag,
}

impl QcReport {
    pub fn from_series(series: &AnnotatedSeries, config: &QcConfig) -> Self {
        let mut variables = Vec::with_capacity(series.columns.len());
        let mut rejections = Vec::new();

        for column in &series.columns {
            variables.push(VariableReport {
                name: column.name.clone(),
                fill_method: config
                    .policy(&column.name)
                    .map(|p| p.fill.as_str().to_string()),
                good: column.count_flag(QualityFlag::Good),
                physically_invalid: column.count_flag(QualityFlag::PhysicallyInvalid),
                statistical_outliers: column.count_flag(QualityFlag::StatisticalOutlier),
                originally_missing: column.originally_missing(),
                unresolved_after_fill: column.unresolved(),
                outlier_check: column.outlier_check,
            });

            let entries = series.dates.iter().zip(&column.flags).zip(&column.original);
            for ((date, flag), original) in entries {
                if !flag.is_good() {
                    rejections.push(Rejection {
                        variable: column.name.clone(),
                        date: *date,
                        original: *original,
                        flag: *flag,
                    });
                }
            }
        }

        rejections.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.variable.cmp(&b.variable)));

        Self {
            total_records: series.len(),
            z_threshold: config.z_threshold,
            variables,
            rejections,
        }
    }

    pub fn total_rejections(&self) -> usize {
        self.rejections.len()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableReport> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Quality Control Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", self.total_records));
        summary.push_str(&format!("Z-score Threshold: {}\n", self.z_threshold));

        for variable in &self.variables {
            summary.push_str(&format!("\n[{}]\n", variable.name));
            summary.push_str(&format!(
                "  Good: {} ({:.1}%)\n",
                variable.good,
                self.percentage(variable.good)
            ));
            summary.push_str(&format!(
                "  Physically Invalid (flag 1): {} ({:.1}%)\n",
                variable.physically_invalid,
                self.percentage(variable.physically_invalid)
            ));
            summary.push_str(&format!(
                "  Statistical Outliers (flag 2): {} ({:.1}%)\n",
                variable.statistical_outliers,
                self.percentage(variable.statistical_outliers)
            ));
            summary.push_str(&format!(
                "  Missing on Input: {}\n",
                variable.originally_missing
            ));

            match variable.outlier_check {
                OutlierCheck::Applied(stats) => summary.push_str(&format!(
                    "  Z-score Basis: mean={:.3}, std={:.3}, n={}\n",
                    stats.mean, stats.std_dev, stats.sample_count
                )),
                OutlierCheck::Skipped(reason) => summary.push_str(&format!(
                    "  Z-score Check: skipped ({})\n",
                    reason.describe()
                )),
                OutlierCheck::NotRun => summary.push_str("  Z-score Check: not run\n"),
            }

            if let Some(method) = &variable.fill_method {
                summary.push_str(&format!(
                    "  Fill: {} ({} unresolved)\n",
                    method, variable.unresolved_after_fill
                ));
            }
        }

        summary.push_str(&format!("\nRejected Values: {}\n", self.rejections.len()));

        if !self.rejections.is_empty() {
            summary.push_str("\nTop 10 Rejections:\n");
            for (i, rejection) in self.rejections.iter().take(10).enumerate() {
                let original = rejection
                    .original
                    .map_or_else(|| "missing".to_string(), |v| v.to_string());
                summary.push_str(&format!(
                    "  {}. {} on {}: {} ({})\n",
                    i + 1,
                    rejection.variable,
                    rejection.date,
                    original,
                    rejection.flag.label()
                ));
            }
        }

        summary
    }

    fn percentage(&self, count: usize) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total_records as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnotatedColumn;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_report_counts_and_rejections() {
        let mut temperature =
            AnnotatedColumn::new("temperature", vec![Some(25.0), Some(999.9), None, Some(60.0)]);
        temperature.reject(1, QualityFlag::PhysicallyInvalid);
        temperature.reject(3, QualityFlag::StatisticalOutlier);
        temperature.filled = Some(vec![Some(25.0), None, None, None]);

        let series = AnnotatedSeries {
            dates: vec![day(1), day(2), day(3), day(4)],
            columns: vec![temperature],
        };

        let report = QcReport::from_series(&series, &QcConfig::default());
        let variable = report.variable("temperature").unwrap();

        assert_eq!(report.total_records, 4);
        assert_eq!(variable.good, 2);
        assert_eq!(variable.physically_invalid, 1);
        assert_eq!(variable.statistical_outliers, 1);
        assert_eq!(variable.originally_missing, 1);
        assert_eq!(variable.unresolved_after_fill, 3);
        assert_eq!(variable.fill_method.as_deref(), Some("linear"));

        assert_eq!(report.total_rejections(), 2);
        assert_eq!(report.rejections[0].date, day(2));
        assert_eq!(report.rejections[0].original, Some(999.9));

        let summary = report.summary();
        assert!(summary.contains("Physically Invalid (flag 1): 1 (25.0%)"));
        assert!(summary.contains("temperature on 2024-01-02: 999.9 (physically invalid)"));
        assert!(summary.contains("Z-score Check: not run"));
    }

    #[test]
    fn test_short_date_axis_does_not_panic() {
        let mut temperature = AnnotatedColumn::new("temperature", vec![Some(999.9), Some(999.9)]);
        temperature.reject(0, QualityFlag::PhysicallyInvalid);
        temperature.reject(1, QualityFlag::PhysicallyInvalid);

        let series = AnnotatedSeries {
            dates: vec![day(1)],
            columns: vec![temperature],
        };

        let report = QcReport::from_series(&series, &QcConfig::default());
        assert_eq!(report.total_rejections(), 1);
        assert_eq!(report.rejections[0].date, day(1));
    }

    #[test]
    fn test_empty_series_summary() {
        let report = QcReport::from_series(&AnnotatedSeries::default(), &QcConfig::default());
        assert_eq!(report.total_records, 0);
        assert!(report.summary().contains("Rejected Values: 0"));
    }
}
