use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::models::AnnotatedSeries;
use crate::writers::{CsvWriter, ParquetWriter};

/// On-disk layout for an annotated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    /// Parquet when the extension says so (any case), CSV otherwise.
    pub fn from_path(path: &Path) -> Self {
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        if is_parquet {
            OutputFormat::Parquet
        } else {
            OutputFormat::Csv
        }
    }
}

/// Write an annotated series in the format chosen by `path`. Compression
/// only applies to Parquet output.
pub fn write_annotated(
    series: &AnnotatedSeries,
    path: &Path,
    compression: &str,
    date_column: &str,
) -> Result<OutputFormat> {
    let format = OutputFormat::from_path(path);

    match format {
        OutputFormat::Parquet => ParquetWriter::new()
            .with_compression(compression)?
            .with_date_column(date_column)
            .write_series(series, path)?,
        OutputFormat::Csv => CsvWriter::new()
            .with_date_column(date_column)
            .write_annotated(series, path)?,
    }

    info!(?format, records = series.len(), path = %path.display(), "Annotated series written");
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnotatedColumn;
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use parquet::basic::Compression;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn sample_series() -> AnnotatedSeries {
        let mut column = AnnotatedColumn::new("temperature", vec![Some(25.0), None]);
        column.filled = Some(vec![Some(25.0), Some(25.0)]);
        AnnotatedSeries {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ],
            columns: vec![column],
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("qc.parquet")), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("QC.PARQUET")), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("qc.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("qc")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("parquet.txt")), OutputFormat::Csv);
    }

    #[test]
    fn test_parquet_extension_writes_parquet() -> Result<()> {
        let temp_dir = TempDir::new()?;

        for name in ["qc.parquet", "QC.PARQUET"] {
            let path = temp_dir.path().join(name);
            let format = write_annotated(&sample_series(), &path, "zstd", "day")?;
            assert_eq!(format, OutputFormat::Parquet);

            let info = ParquetWriter::new().get_file_info(&path)?;
            assert_eq!(info.total_rows, 2);
            assert!(matches!(info.compression, Compression::ZSTD(_)));

            let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
            assert_eq!(builder.schema().field(0).name(), "day");
        }
        Ok(())
    }

    #[test]
    fn test_csv_extension_writes_csv() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("qc.csv");

        let format = write_annotated(&sample_series(), &path, "snappy", "day")?;
        assert_eq!(format, OutputFormat::Csv);

        let contents = fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "day,temperature,qc_flag_temperature,temperature_filled\n\
             2024-01-01,25.0,0,25.0\n\
             2024-01-02,,0,25.0\n"
        );
        Ok(())
    }

    #[test]
    fn test_unknown_compression_rejected_for_parquet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("qc.parquet");
        assert!(write_annotated(&sample_series(), &path, "brotli9", "date").is_err());
    }
}
