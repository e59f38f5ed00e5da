use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::{GridDataset, GridPoint};
use crate::readers::series_reader::{parse_date, parse_numeric};
use crate::utils::constants::DEFAULT_MISSING_MARKERS;

/// Loads a gridded field flattened to long-form CSV rows
/// (`time, lat, lon, <value>`).
pub struct GridReader {
    value_column: String,
    missing_markers: Vec<String>,
}

impl GridReader {
    pub fn new(value_column: &str) -> Self {
        Self {
            value_column: value_column.to_string(),
            missing_markers: DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn read_grid(&self, path: &Path) -> Result<GridDataset> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<GridDataset> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let index_of = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ProcessingError::MissingData(format!("Grid column '{}' not found", name))
            })
        };
        let time_index = index_of("time")?;
        let lat_index = index_of("lat")?;
        let lon_index = index_of("lon")?;
        let value_index = index_of(&self.value_column)?;

        let mut points = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());

            let time_str = record.get(time_index).unwrap_or("");
            let time = parse_date(time_str).ok_or_else(|| ProcessingError::InvalidValue {
                line,
                column: "time".to_string(),
                value: time_str.to_string(),
            })?;

            let coordinate = |index: usize, column: &str| {
                parse_numeric(record.get(index).unwrap_or(""), &[], line, column)?.ok_or_else(|| {
                    ProcessingError::InvalidCoordinate(format!("Empty {} at line {}", column, line))
                })
            };

            points.push(GridPoint {
                time,
                lat: coordinate(lat_index, "lat")?,
                lon: coordinate(lon_index, "lon")?,
                value: parse_numeric(
                    record.get(value_index).unwrap_or(""),
                    &self.missing_markers,
                    line,
                    &self.value_column,
                )?,
            });
        }

        Ok(GridDataset::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_long_form_grid() {
        let csv = "\
time,lat,lon,model_temp
2024-01-01,-14.0,171.5,28.1
2024-01-01,-14.0,172.0,NaN
2024-01-02 00:00:00,-14.0,171.5,27.9
";
        let grid = GridReader::new("model_temp").read_from(csv.as_bytes()).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.longitudes(), vec![171.5, 172.0]);
        let cell = grid.cell_series(-14.0, 172.0);
        assert_eq!(cell.values().next(), Some(&None));
    }

    #[test]
    fn test_missing_value_column() {
        let csv = "time,lat,lon,value\n2024-01-01,-14.0,171.5,28.1\n";
        assert!(matches!(
            GridReader::new("model_temp").read_from(csv.as_bytes()),
            Err(ProcessingError::MissingData(_))
        ));
    }

    #[test]
    fn test_empty_coordinate_rejected() {
        let csv = "time,lat,lon,model_temp\n2024-01-01,,171.5,28.1\n";
        assert!(matches!(
            GridReader::new("model_temp").read_from(csv.as_bytes()),
            Err(ProcessingError::InvalidValue { .. }) | Err(ProcessingError::InvalidCoordinate(_))
        ));
    }
}
