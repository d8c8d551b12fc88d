pub mod business_record;
pub mod dataset;

// Re-export common types
pub use business_record::{BusinessRecord, SourceFigures};
pub use dataset::{Dataset, DatasetSchema};

/// Period label of a dataset row (e.g., "Jan", "2024-03")
pub type PeriodLabel = String;
