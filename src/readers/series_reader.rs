use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::ObservationSeries;
use crate::settings::QcConfig;
use crate::utils::constants::{
    DATETIME_FORMATS, DATE_FORMATS, DEFAULT_DATE_COLUMN, DEFAULT_MISSING_MARKERS,
};

/// Loads a station series from CSV: one date column plus numeric variable
/// columns.
///
/// Cells matching a missing marker become missing values. Any other
/// non-numeric cell aborts the load.
pub struct SeriesReader {
    date_column: String,
    missing_markers: Vec<String>,
    variables: Option<Vec<String>>,
}

impl SeriesReader {
    pub fn new() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            missing_markers: DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect(),
            variables: None,
        }
    }

    /// Reader restricted to the variables the config has policies for.
    pub fn from_config(config: &QcConfig) -> Self {
        Self {
            date_column: config.date_column.clone(),
            missing_markers: config.missing_markers.clone(),
            variables: Some(config.variable_names()),
        }
    }

    pub fn with_date_column(mut self, date_column: &str) -> Self {
        self.date_column = date_column.to_string();
        self
    }

    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn read_series(&self, path: &Path) -> Result<ObservationSeries> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<ObservationSeries> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let date_index = headers
            .iter()
            .position(|h| h == self.date_column)
            .ok_or_else(|| {
                ProcessingError::MissingData(format!("Date column '{}' not found", self.date_column))
            })?;

        let columns = self.select_columns(&headers, date_index)?;

        let mut dates = Vec::new();
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); columns.len()];

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());

            let date_str = record.get(date_index).unwrap_or("");
            let date = parse_date(date_str).ok_or_else(|| ProcessingError::InvalidValue {
                line,
                column: self.date_column.clone(),
                value: date_str.to_string(),
            })?;
            dates.push(date);

            for (slot, (index, name)) in values.iter_mut().zip(&columns) {
                let raw = record.get(*index).unwrap_or("");
                slot.push(parse_numeric(raw, &self.missing_markers, line, name)?);
            }
        }

        debug!(records = dates.len(), variables = columns.len(), "Series loaded");

        let mut series = ObservationSeries::new(dates)?;
        for ((_, name), column) in columns.into_iter().zip(values) {
            series.push_variable(&name, column)?;
        }
        Ok(series)
    }

    fn select_columns(
        &self,
        headers: &csv::StringRecord,
        date_index: usize,
    ) -> Result<Vec<(usize, String)>> {
        let available: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_index)
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let Some(wanted) = &self.variables else {
            return Ok(available);
        };

        let selected: Vec<(usize, String)> = available
            .into_iter()
            .filter(|(_, name)| wanted.contains(name))
            .collect();

        if selected.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "None of the variables {:?} found in input",
                wanted
            )));
        }

        Ok(selected)
    }
}

impl Default for SeriesReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `YYYY-MM-DD`, `YYYYMMDD`, or a date with a time-of-day suffix.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|dt| dt.date())
        })
}

/// Parse one numeric cell. Missing markers and NaN spellings map to `None`.
pub fn parse_numeric(
    raw: &str,
    missing_markers: &[String],
    line: u64,
    column: &str,
) -> Result<Option<f64>> {
    let raw = raw.trim();
    if missing_markers.iter().any(|m| m == raw) {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(ProcessingError::InvalidValue {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}
