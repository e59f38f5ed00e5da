use crate::error::{ProcessingError, Result};
use crate::models::AnnotatedSeries;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_DATE_COLUMN, DEFAULT_ROW_GROUP_SIZE, FILLED_COLUMN_SUFFIX, FLAG_COLUMN_PREFIX,
};
use arrow::array::{ArrayRef, Date32Array, Float64Array, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub struct ParquetWriter {
    compression: Compression,
    date_column: String,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_date_column(mut self, date_column: &str) -> Self {
        self.date_column = date_column.to_string();
        self
    }

    /// Write an annotated series. Each variable contributes a raw, flag and
    /// filled column.
    pub fn write_series(&self, series: &AnnotatedSeries, path: &Path) -> Result<()> {
        series.check_lengths()?;
        let schema = self.create_schema(series);

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(DEFAULT_ROW_GROUP_SIZE)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        if !series.is_empty() {
            let batch = self.series_to_batch(series, schema)?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    /// Create Arrow schema for an annotated series
    fn create_schema(&self, series: &AnnotatedSeries) -> Arc<Schema> {
        let mut fields = vec![Field::new(&self.date_column, DataType::Date32, false)];

        for column in &series.columns {
            fields.push(Field::new(&column.name, DataType::Float64, true));
            fields.push(Field::new(
                format!("{}{}", FLAG_COLUMN_PREFIX, column.name),
                DataType::UInt8,
                false,
            ));
            fields.push(Field::new(
                format!("{}{}", column.name, FILLED_COLUMN_SUFFIX),
                DataType::Float64,
                true,
            ));
        }

        Arc::new(Schema::new(fields))
    }

    /// Convert an annotated series to an Arrow RecordBatch
    fn series_to_batch(&self, series: &AnnotatedSeries, schema: Arc<Schema>) -> Result<RecordBatch> {
        let dates: Vec<i32> = series
            .dates
            .iter()
            .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();

        let mut arrays: Vec<ArrayRef> = vec![Arc::new(Date32Array::from(dates))];

        for column in &series.columns {
            let flags: Vec<u8> = column.flags.iter().map(|f| f.as_u8()).collect();
            let filled = column
                .filled
                .clone()
                .unwrap_or_else(|| vec![None; column.len()]);

            arrays.push(Arc::new(Float64Array::from(column.raw.clone())));
            arrays.push(Arc::new(UInt8Array::from(flags)));
            arrays.push(Arc::new(Float64Array::from(filled)));
        }

        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Get file statistics. The compression reported is the one stored in
    /// the file, not this writer's setting.
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let columns = metadata.file_metadata().schema_descr().num_columns();
        let file_size = std::fs::metadata(path)?.len();
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            Compression::UNCOMPRESSED
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            columns,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub columns: usize,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.columns,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnotatedColumn, QualityFlag};
    use arrow::array::Array;
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    fn sample_series() -> AnnotatedSeries {
        let mut column = AnnotatedColumn::new("temperature", vec![Some(25.0), Some(999.9), Some(27.0)]);
        column.reject(1, QualityFlag::PhysicallyInvalid);
        column.filled = Some(vec![Some(25.0), Some(26.0), Some(27.0)]);

        AnnotatedSeries {
            dates: (1..=3)
                .map(|d| NaiveDate::from_ymd_opt(1970, 1, d).unwrap())
                .collect(),
            columns: vec![column],
        }
    }

    #[test]
    fn test_write_empty_series() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_series(&AnnotatedSeries::default(), temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 0);
        Ok(())
    }

    #[test]
    fn test_write_and_read_back_flags() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_series(&sample_series(), temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 3);
        assert_eq!(info.columns, 4);

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(temp_file.path())?)?.build()?;
        let batch = reader.into_iter().next().unwrap()?;

        let dates = batch.column(0).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(dates.value(0), 0);

        let raw = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert!(raw.is_null(1));

        let flags = batch.column(2).as_any().downcast_ref::<UInt8Array>().unwrap();
        assert_eq!(flags.values().to_vec(), vec![0, 1, 0]);

        let filled = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(filled.value(1), 26.0);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_series(&sample_series(), temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }

    #[test]
    fn test_file_info_reports_stored_compression() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        ParquetWriter::new()
            .with_compression("zstd")?
            .write_series(&sample_series(), temp_file.path())?;

        let info = ParquetWriter::new().get_file_info(temp_file.path())?;
        assert!(matches!(info.compression, Compression::ZSTD(_)));

        let uncompressed = NamedTempFile::new()?;
        ParquetWriter::new()
            .with_compression("none")?
            .write_series(&sample_series(), uncompressed.path())?;
        let info = ParquetWriter::new().get_file_info(uncompressed.path())?;
        assert_eq!(info.compression, Compression::UNCOMPRESSED);
        Ok(())
    }

    #[test]
    fn test_configured_date_column_name() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        ParquetWriter::new()
            .with_date_column("day")
            .write_series(&sample_series(), temp_file.path())?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(temp_file.path())?)?;
        let names: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names[0], "day");
        assert_eq!(names[2], "qc_flag_temperature");
        Ok(())
    }

    #[test]
    fn test_mismatched_column_length_rejected() -> Result<()> {
        let mut series = sample_series();
        series.columns[0].raw.pop();
        let temp_file = NamedTempFile::new()?;

        assert!(matches!(
            ParquetWriter::new().write_series(&series, temp_file.path()),
            Err(ProcessingError::InvalidFormat(_))
        ));
        Ok(())
    }
}
