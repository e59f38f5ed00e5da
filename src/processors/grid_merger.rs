use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{GridDataset, ObservationSeries, StationMetadata};
use crate::utils::constants::DEFAULT_GRID_TOLERANCE;

/// Station observation paired with the model value of the nearest grid node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub station_id: String,
    pub observed: Option<f64>,
    pub model: Option<f64>,
    /// `observed - model`
    pub bias: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MergeResult {
    pub cell_lat: f64,
    pub cell_lon: f64,
    pub records: Vec<MergedRecord>,
}

impl MergeResult {
    pub fn mean_bias(&self) -> Option<f64> {
        let biases: Vec<f64> = self.records.iter().filter_map(|r| r.bias).collect();
        if biases.is_empty() {
            None
        } else {
            Some(biases.iter().sum::<f64>() / biases.len() as f64)
        }
    }
}

/// Joins a station series with the nearest grid cell on date (inner join).
pub struct StationGridMerger {
    tolerance: f64,
}

impl StationGridMerger {
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_GRID_TOLERANCE,
        }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn merge(
        &self,
        station: &StationMetadata,
        series: &ObservationSeries,
        variable: &str,
        grid: &GridDataset,
    ) -> Result<MergeResult> {
        station.validate()?;

        let observed = series.variable(variable).ok_or_else(|| {
            ProcessingError::MissingData(format!("Station series has no '{}' column", variable))
        })?;

        let (cell_lat, cell_lon) =
            grid.nearest_cell(station.latitude, station.longitude, self.tolerance)?;
        let cell = grid.cell_series(cell_lat, cell_lon);

        let records: Vec<MergedRecord> = series
            .dates()
            .iter()
            .zip(observed)
            .filter_map(|(date, observed)| {
                cell.get(date).map(|model| MergedRecord {
                    date: *date,
                    station_id: station.station_id.clone(),
                    observed: *observed,
                    model: *model,
                    bias: observed.zip(*model).map(|(o, m)| o - m),
                })
            })
            .collect();

        if records.is_empty() {
            return Err(ProcessingError::DataMerge(format!(
                "No dates shared between station {} and grid cell ({}, {})",
                station.station_id, cell_lat, cell_lon
            )));
        }

        info!(
            station = %station.station_id,
            cell_lat,
            cell_lon,
            matched = records.len(),
            "Merged station with nearest grid cell"
        );

        Ok(MergeResult {
            cell_lat,
            cell_lon,
            records,
        })
    }
}

impl Default for StationGridMerger {
    fn default() -> Self {
        Self::new()
    }
}
