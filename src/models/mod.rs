pub mod annotated;
pub mod grid;
pub mod observation;
pub mod policy;
pub mod quality;
pub mod station;

pub use annotated::{AnnotatedColumn, AnnotatedSeries, OutlierCheck, SkipReason, ZScoreStats};
pub use grid::{GridDataset, GridPoint};
pub use observation::{Observation, ObservationSeries, VariableSeries};
pub use policy::{FillMethod, PhysicalBounds, VariableKind, VariablePolicy};
pub use quality::QualityFlag;
pub use station::StationMetadata;
