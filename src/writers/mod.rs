pub mod csv_writer;
pub mod output;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use output::{write_annotated, OutputFormat};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
