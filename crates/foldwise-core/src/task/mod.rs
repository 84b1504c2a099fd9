//! Task descriptors
//!
//! A [`Task`] is the immutable description of a prediction problem: the
//! dataset, the ordered class labels, and the train/test partition for every
//! (repeat, fold) pair of its estimation procedure.

mod dataset;
mod folds;
mod splits;
#[allow(clippy::module_inception)]
mod task;

pub use dataset::Dataset;
pub use folds::stratified_folds;
pub use splits::{Split, Splits};
pub use task::{EstimationKind, EstimationProcedure, Task};
