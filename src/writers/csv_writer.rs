use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::{AnnotatedSeries, ObservationSeries};
use crate::processors::MergedRecord;
use crate::utils::constants::{DEFAULT_DATE_COLUMN, FILLED_COLUMN_SUFFIX, FLAG_COLUMN_PREFIX};

/// Writes series as CSV. Missing values are written as empty cells.
pub struct CsvWriter {
    date_column: String,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
        }
    }

    pub fn with_date_column(mut self, date_column: &str) -> Self {
        self.date_column = date_column.to_string();
        self
    }

    /// Header: date, then `<var>, qc_flag_<var>, <var>_filled` per variable.
    pub fn write_annotated(&self, series: &AnnotatedSeries, path: &Path) -> Result<()> {
        self.write_annotated_to(series, File::create(path)?)
    }

    pub fn write_annotated_to<W: Write>(&self, series: &AnnotatedSeries, writer: W) -> Result<()> {
        series.check_lengths()?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![self.date_column.clone()];
        for column in &series.columns {
            header.push(column.name.clone());
            header.push(format!("{}{}", FLAG_COLUMN_PREFIX, column.name));
            header.push(format!("{}{}", column.name, FILLED_COLUMN_SUFFIX));
        }
        csv_writer.write_record(&header)?;

        for (index, date) in series.dates.iter().enumerate() {
            let mut row = vec![date.format("%Y-%m-%d").to_string()];
            for column in &series.columns {
                row.push(format_value(column.raw.get(index).copied().flatten()));
                row.push(
                    column
                        .flags
                        .get(index)
                        .map_or(String::new(), |flag| flag.as_u8().to_string()),
                );
                row.push(format_value(
                    column
                        .filled
                        .as_ref()
                        .and_then(|filled| filled.get(index).copied().flatten()),
                ));
            }
            csv_writer.write_record(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Plain observations, in the same layout the reader accepts.
    pub fn write_observations(&self, series: &ObservationSeries, path: &Path) -> Result<()> {
        self.write_observations_to(series, File::create(path)?)
    }

    pub fn write_observations_to<W: Write>(
        &self,
        series: &ObservationSeries,
        writer: W,
    ) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![self.date_column.clone()];
        header.extend(series.variables().iter().map(|v| v.name.clone()));
        csv_writer.write_record(&header)?;

        for (index, date) in series.dates().iter().enumerate() {
            let mut row = vec![date.format("%Y-%m-%d").to_string()];
            row.extend(series.variables().iter().map(|v| format_value(v.values[index])));
            csv_writer.write_record(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_merged(&self, records: &[MergedRecord], path: &Path) -> Result<()> {
        self.write_merged_to(records, File::create(path)?)
    }

    pub fn write_merged_to<W: Write>(&self, records: &[MergedRecord], writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            self.date_column.as_str(),
            "station_id",
            "observed",
            "model",
            "bias",
        ])?;

        for record in records {
            csv_writer.write_record([
                record.date.format("%Y-%m-%d").to_string(),
                record.station_id.clone(),
                format_value(record.observed),
                format_value(record.model),
                format_value(record.bias),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest representation that reads back to the same value; whole numbers
/// keep one decimal place.
fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{:.1}", v),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::models::{AnnotatedColumn, QualityFlag};
    use crate::readers::SeriesReader;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_write_annotated_layout() {
        let mut column = AnnotatedColumn::new("temperature", vec![Some(25.0), Some(999.9), Some(27.5)]);
        column.reject(1, QualityFlag::PhysicallyInvalid);
        column.filled = Some(vec![Some(25.0), Some(26.25), Some(27.5)]);
        let series = AnnotatedSeries {
            dates: vec![day(1), day(2), day(3)],
            columns: vec![column],
        };

        let mut buffer = Vec::new();
        CsvWriter::new().write_annotated_to(&series, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(
            output,
            "date,temperature,qc_flag_temperature,temperature_filled\n\
             2024-01-01,25.0,0,25.0\n\
             2024-01-02,,1,26.25\n\
             2024-01-03,27.5,0,27.5\n"
        );
    }

    #[test]
    fn test_filled_shorter_than_dates_is_an_error() {
        let mut column = AnnotatedColumn::new("temperature", vec![Some(25.0), Some(26.0)]);
        column.filled = Some(vec![Some(25.0)]);
        let series = AnnotatedSeries {
            dates: vec![day(1), day(2)],
            columns: vec![column],
        };

        let mut buffer = Vec::new();
        let result = CsvWriter::new().write_annotated_to(&series, &mut buffer);
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_observations_read_back() {
        let series = ObservationSeries::new(vec![day(1), day(2)])
            .unwrap()
            .with_variable("temperature", vec![Some(999.9), None])
            .unwrap()
            .with_variable("precipitation", vec![Some(0.0), Some(20.5)])
            .unwrap();

        let mut buffer = Vec::new();
        CsvWriter::new()
            .write_observations_to(&series, &mut buffer)
            .unwrap();

        let read_back = SeriesReader::new().read_from(buffer.as_slice()).unwrap();
        assert_eq!(read_back, series);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(25.0)), "25.0");
        assert_eq!(format_value(Some(-0.5)), "-0.5");
        assert_eq!(format_value(None), "");
    }
}
