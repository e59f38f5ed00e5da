/// Variable names used by the training datasets
pub const TEMPERATURE: &str = "temperature";
pub const PRECIPITATION: &str = "precipitation";

/// Physical limits (operational defaults)
pub const TEMP_MIN: f64 = -50.0;
pub const TEMP_MAX: f64 = 50.0;
pub const PRECIP_MIN: f64 = 0.0;
pub const PRECIP_MAX: f64 = 500.0; // Daily max realistic limit

/// Statistical QC
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;
pub const MIN_STATISTICAL_SAMPLES: usize = 2;

/// Input parsing
pub const DEFAULT_DATE_COLUMN: &str = "date";
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["", "NaN", "nan", "NA", "null", "-9999"];
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Output column naming
pub const FLAG_COLUMN_PREFIX: &str = "qc_flag_";
pub const FILLED_COLUMN_SUFFIX: &str = "_filled";

/// Grid extraction
pub const DEFAULT_GRID_TOLERANCE: f64 = 0.5;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CLIMATE_QC";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
