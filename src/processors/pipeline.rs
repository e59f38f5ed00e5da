use tracing::{info, info_span};

use crate::error::{ProcessingError, Result};
use crate::models::{AnnotatedSeries, ObservationSeries};
use crate::processors::gap_filler::GapFiller;
use crate::processors::outlier_filter::StatisticalOutlierFilter;
use crate::processors::physical_filter::PhysicalLimitFilter;
use crate::processors::qc_report::QcReport;
use crate::settings::QcConfig;

/// Runs physical-limit, z-score and gap-filling stages in that order.
///
/// A run is a pure function of the input series and the configuration the
/// pipeline was built with.
#[derive(Debug, Clone)]
pub struct QcPipeline {
    config: QcConfig,
}

impl QcPipeline {
    pub fn new(config: QcConfig) -> Result<Self> {
        config.validate_all()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    pub fn run(&self, series: &ObservationSeries) -> Result<AnnotatedSeries> {
        let span = info_span!("qc_run", records = series.len());
        let _guard = span.enter();

        self.check_variables(series)?;
        info!(variables = ?series.variable_names(), "Starting QC run");

        let annotated = AnnotatedSeries::from(series);
        let annotated = self.physical_stage(annotated);
        let annotated = self.statistical_stage(annotated);
        let annotated = self.fill_stage(annotated);

        info!("QC run complete");
        Ok(annotated)
    }

    pub fn run_with_report(&self, series: &ObservationSeries) -> Result<(AnnotatedSeries, QcReport)> {
        let annotated = self.run(series)?;
        let report = QcReport::from_series(&annotated, &self.config);
        Ok((annotated, report))
    }

    pub fn physical_stage(&self, series: AnnotatedSeries) -> AnnotatedSeries {
        PhysicalLimitFilter::new(&self.config.variables).apply(series)
    }

    pub fn statistical_stage(&self, series: AnnotatedSeries) -> AnnotatedSeries {
        StatisticalOutlierFilter::new(self.config.z_threshold, &self.config.variables).apply(series)
    }

    pub fn fill_stage(&self, series: AnnotatedSeries) -> AnnotatedSeries {
        GapFiller::new(&self.config.variables).apply(series)
    }

    /// Every variable in the input must have a policy.
    fn check_variables(&self, series: &ObservationSeries) -> Result<()> {
        for name in series.variable_names() {
            if self.config.policy(name).is_none() {
                return Err(ProcessingError::UnknownVariable(name.to_string()));
            }
        }
        Ok(())
    }
}
