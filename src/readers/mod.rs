pub mod grid_reader;
pub mod series_reader;

pub use grid_reader::GridReader;
pub use series_reader::{parse_date, parse_numeric, SeriesReader};
