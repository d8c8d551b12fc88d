pub mod error;
pub mod summary;
pub mod types;

// Re-export commonly used items
pub use error::{AnalystError, Result};
pub use summary::{wants_trend_chart, BusinessSummary};
pub use types::{BusinessRecord, Dataset, DatasetSchema, PeriodLabel, SourceFigures};
