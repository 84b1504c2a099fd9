//! Foldwise Core Library
//!
//! Tasks and their cross-validation splits, a small set of estimators, the
//! run executor that turns an estimator and a task into prediction and
//! trace rows, and the client that publishes and queries runs on the
//! experiment-tracking service.

#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]

pub mod arff;
pub mod config;
pub mod error;
pub mod estimators;
pub mod model;
pub mod runs;
pub mod search;
pub mod service;
pub mod task;

// Re-export commonly used types
pub use config::{Config, ConfigLoader};
pub use error::{FoldwiseError, FoldwiseResult};
pub use model::{Classifier, Estimator, FlowDescription, FlowRegistry, ModelAdapter, ParamValue};
pub use runs::{PredictionRow, Run, RunExecutor, RunFilter, RunSummary, TraceGranularity, TraceRow};
pub use search::SearchCv;
pub use service::{RunService, ServiceClient};
pub use task::{Dataset, Splits, Task};
