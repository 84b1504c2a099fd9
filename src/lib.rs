//! foldwise
//!
//! Run classifiers against cross-validation tasks from an experiment-tracking
//! service, publish the resulting runs and query published ones. This crate
//! re-exports the SDK; see [`FoldwiseSdk`].

pub use foldwise_core as core;
pub use foldwise_sdk::*;
