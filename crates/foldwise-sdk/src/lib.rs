//! Foldwise SDK
//!
//! High-level entry point for running a classifier against a remote task
//! and publishing the result.
//!
//! # Example
//!
//! ```no_run
//! use foldwise_sdk::FoldwiseSdk;
//! use foldwise_sdk::estimators::LogisticRegression;
//!
//! # async fn example() -> foldwise_sdk::FoldwiseResult<()> {
//! let sdk = FoldwiseSdk::new()?;
//! let mut run = sdk.run_task(59, Box::new(LogisticRegression::new())).await?;
//! println!("accuracy: {:?}", run.evaluations.get("predictive_accuracy"));
//! let run_id = sdk.publish(&mut run).await?;
//! println!("published run {}", run_id);
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::FoldwiseSdk;

// Re-export core types for convenience
pub use foldwise_core::{
    Config, Dataset, Estimator, FlowDescription, FlowRegistry, FoldwiseError, FoldwiseResult,
    ModelAdapter, Run, RunExecutor, RunFilter, RunService, RunSummary, SearchCv, ServiceClient,
    Task, TraceGranularity,
};
pub use foldwise_core::{estimators, search};
