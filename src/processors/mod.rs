pub mod gap_filler;
pub mod grid_merger;
pub mod outlier_filter;
pub mod physical_filter;
pub mod pipeline;
pub mod qc_report;

pub use gap_filler::{FillStrategy, ForwardFill, GapFiller, LinearInterpolation};
pub use grid_merger::{MergeResult, MergedRecord, StationGridMerger};
pub use outlier_filter::{compute_stats, StatisticalOutlierFilter};
pub use physical_filter::PhysicalLimitFilter;
pub use pipeline::QcPipeline;
pub use qc_report::{QcReport, Rejection, VariableReport};
