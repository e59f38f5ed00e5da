use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::observation::ObservationSeries;
use crate::models::quality::QualityFlag;

/// Sample statistics the z-score stage evaluated a variable against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreStats {
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: usize,
}

impl ZScoreStats {
    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Policy disables the z-score check for this variable.
    Disabled,
    /// Fewer than two non-missing values.
    InsufficientSamples,
    /// Standard deviation is zero or not finite.
    ZeroVariance,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled by policy",
            SkipReason::InsufficientSamples => "fewer than 2 samples",
            SkipReason::ZeroVariance => "zero variance",
        }
    }
}

/// Outcome of the z-score stage for one variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum OutlierCheck {
    #[default]
    NotRun,
    Skipped(SkipReason),
    Applied(ZScoreStats),
}

/// One variable after QC: the untouched input, the QC'd raw value, the
/// flag, and the gap-filled value side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedColumn {
    pub name: String,
    /// Values as loaded, never modified.
    pub original: Vec<Option<f64>>,
    /// Values after QC. Flagged entries are `None`.
    pub raw: Vec<Option<f64>>,
    pub flags: Vec<QualityFlag>,
    /// Gap-filled values; `None` until the gap filler has run.
    pub filled: Option<Vec<Option<f64>>>,
    pub outlier_check: OutlierCheck,
}

impl AnnotatedColumn {
    pub fn new(name: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            flags: vec![QualityFlag::Good; values.len()],
            raw: values.clone(),
            original: values,
            filled: None,
            outlier_check: OutlierCheck::NotRun,
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Record a verdict for one entry. A rejected entry always loses its
    /// raw value, and an existing non-good flag is kept.
    pub fn reject(&mut self, index: usize, verdict: QualityFlag) {
        self.flags[index] = self.flags[index].escalate(verdict);
        self.raw[index] = None;
    }

    pub fn count_flag(&self, flag: QualityFlag) -> usize {
        self.flags.iter().filter(|f| **f == flag).count()
    }

    /// Entries missing on input (not QC rejections).
    pub fn originally_missing(&self) -> usize {
        self.original.iter().filter(|v| v.is_none()).count()
    }

    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.raw.iter().filter_map(|v| *v)
    }

    /// Entries the gap filler could not resolve.
    pub fn unresolved(&self) -> usize {
        match &self.filled {
            Some(filled) => filled.iter().filter(|v| v.is_none()).count(),
            None => self.raw.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// A series with every variable annotated by the QC stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<AnnotatedColumn>,
}

impl AnnotatedSeries {
    pub fn column(&self, name: &str) -> Option<&AnnotatedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Every column must carry one entry per date in each of its vectors.
    pub fn check_lengths(&self) -> Result<()> {
        let expected = self.dates.len();
        for column in &self.columns {
            let filled_len = column.filled.as_ref().map_or(expected, Vec::len);
            if column.original.len() != expected
                || column.raw.len() != expected
                || column.flags.len() != expected
                || filled_len != expected
            {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Column {} does not match the {} dates of its series",
                    column.name, expected
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl From<&ObservationSeries> for AnnotatedSeries {
    fn from(series: &ObservationSeries) -> Self {
        Self {
            dates: series.dates().to_vec(),
            columns: series
                .variables()
                .iter()
                .map(|v| AnnotatedColumn::new(&v.name, v.values.clone()))
                .collect(),
        }
    }
}
