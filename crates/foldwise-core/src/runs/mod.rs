//! Run records, execution and query filters

pub mod evaluation;
pub mod executor;
pub mod filter;
pub mod rows;
#[allow(clippy::module_inception)]
pub mod run;
pub mod summary;

pub use evaluation::{MEAN_ABSOLUTE_ERROR, PREDICTIVE_ACCURACY, evaluate};
pub use executor::{RunExecutor, TraceGranularity};
pub use filter::RunFilter;
pub use rows::{PredictionRow, TraceRow};
pub use run::{Run, RunDescription};
pub use summary::RunSummary;
