use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};

/// One value of a gridded field at a grid node and date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub time: NaiveDate,
    pub lat: f64,
    pub lon: f64,
    pub value: Option<f64>,
}

/// A regular (time, lat, lon) field held as long-form points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridDataset {
    points: Vec<GridPoint>,
}

impl GridDataset {
    pub fn new(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct latitudes, ascending.
    pub fn latitudes(&self) -> Vec<f64> {
        axis_values(self.points.iter().map(|p| p.lat))
    }

    /// Distinct longitudes, ascending.
    pub fn longitudes(&self) -> Vec<f64> {
        axis_values(self.points.iter().map(|p| p.lon))
    }

    /// Nearest grid node to `(lat, lon)`, chosen independently per axis.
    /// Either axis further than `tolerance` degrees away is an error.
    pub fn nearest_cell(&self, lat: f64, lon: f64, tolerance: f64) -> Result<(f64, f64)> {
        let out_of_range = || ProcessingError::NoGridCellInRange {
            lat,
            lon,
            tolerance,
        };

        let cell_lat = nearest(&self.latitudes(), lat, tolerance).ok_or_else(out_of_range)?;
        let cell_lon = nearest(&self.longitudes(), lon, tolerance).ok_or_else(out_of_range)?;
        Ok((cell_lat, cell_lon))
    }

    /// Time series at one grid node, keyed by date.
    pub fn cell_series(&self, lat: f64, lon: f64) -> BTreeMap<NaiveDate, Option<f64>> {
        self.points
            .iter()
            .filter(|p| p.lat == lat && p.lon == lon)
            .map(|p| (p.time, p.value))
            .collect()
    }
}

fn axis_values(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    axis.sort_by(f64::total_cmp);
    axis.dedup();
    axis
}

/// Closest axis value; ties go to the lower value.
fn nearest(axis: &[f64], target: f64, tolerance: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for value in axis {
        let closer = match best {
            Some(current) => (value - target).abs() < (current - target).abs(),
            None => true,
        };
        if closer {
            best = Some(*value);
        }
    }
    best.filter(|b| (b - target).abs() <= tolerance)
}
