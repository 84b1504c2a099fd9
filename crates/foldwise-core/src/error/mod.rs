//! Error types for foldwise
//!
//! Every failure surfaces as a [`FoldwiseError`] variant. The four kinds a
//! caller most often has to tell apart are:
//! - `Capability`: the model lacks an operation the task needs
//! - `InvalidConfiguration`: a hyperparameter value the algorithm rejects
//! - `ServerRejection`: the service refused the request
//! - `NotFound`: the referenced run, task or dataset does not exist remotely
//!
//! Nothing in this crate retries or downgrades an error to a partial result.

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{FoldwiseError, FoldwiseResult, OptionExt, ResultExt, UnifiedError};
