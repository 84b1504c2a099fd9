//! Hyperparameter search with an inner stratified k-fold

pub mod scoring;
pub mod search_cv;
pub mod space;
pub mod trace;

pub use scoring::accuracy;
pub use search_cv::{DEFAULT_INNER_FOLDS, SearchCv, SearchStrategy};
pub use space::{ParamDistribution, ParamGrid, expand_grid};
pub use trace::{SearchTrace, TraceIteration};
