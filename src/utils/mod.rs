pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;
pub mod sample_data;

pub use constants::*;
pub use coordinates::{parse_latitude, parse_longitude};
pub use filename::{generate_default_merge_filename, generate_default_output_filename};
pub use progress::ProgressReporter;
pub use sample_data::{dirty_sample_series, synthetic_series};
