use crate::error::FoldwiseResult;
use crate::model::FlowDescription;
use crate::runs::{Run, RunFilter, RunSummary};
use crate::task::Task;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Operations against the experiment-tracking service
#[async_trait]
pub trait RunService: Send + Sync {
    /// Fetch a task with its dataset and splits
    async fn get_task(&self, task_id: u64) -> FoldwiseResult<Task>;

    /// Fetch a published run with its evaluations
    async fn get_run(&self, run_id: u64) -> FoldwiseResult<Run>;

    /// One page of runs matching `filter`, keyed by run id.
    ///
    /// A filter without criteria is still sent; the service rejects it.
    async fn list_runs(&self, filter: &RunFilter) -> FoldwiseResult<BTreeMap<u64, RunSummary>>;

    /// Upload a run and store the assigned id on it.
    ///
    /// Returns the existing id without contacting the service when the run
    /// was already published.
    async fn publish_run(&self, run: &mut Run) -> FoldwiseResult<u64>;

    /// Id of `flow` on the service, uploading it when unknown
    async fn ensure_flow(&self, flow: &FlowDescription) -> FoldwiseResult<u64>;
}
