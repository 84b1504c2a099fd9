//! Task execution, publishing and run queries

use super::FoldwiseSdk;
use foldwise_core::error::{FoldwiseError, FoldwiseResult};
use foldwise_core::model::{Estimator, ModelAdapter};
use foldwise_core::runs::{Run, RunFilter, RunSummary};
use foldwise_core::task::Task;
use std::collections::BTreeMap;
use tracing::{debug, info};

impl FoldwiseSdk {
    /// Fetch a task with its dataset and splits
    pub async fn get_task(&self, task_id: u64) -> FoldwiseResult<Task> {
        self.service.get_task(task_id).await
    }

    /// Run `estimator` on an already loaded task.
    ///
    /// The estimator is validated and serialized before any fold is fitted,
    /// so configuration and capability errors surface without training.
    pub fn run_local(&self, task: &Task, estimator: Box<dyn Estimator>) -> FoldwiseResult<Run> {
        let adapter = ModelAdapter::new(estimator, &self.registry)?;
        debug!(flow = %adapter.flow().name, task_id = task.task_id(), "executing run");
        self.executor.execute(task, &adapter)
    }

    /// Fetch task `task_id` and run `estimator` on it
    pub async fn run_task(&self, task_id: u64, estimator: Box<dyn Estimator>) -> FoldwiseResult<Run> {
        let task = self.get_task(task_id).await?;
        self.run_local(&task, estimator)
    }

    /// Publish a run, registering its flow first when needed.
    ///
    /// Publishing an already published run returns its id unchanged.
    pub async fn publish(&self, run: &mut Run) -> FoldwiseResult<u64> {
        self.service.publish_run(run).await
    }

    pub async fn get_run(&self, run_id: u64) -> FoldwiseResult<Run> {
        self.service.get_run(run_id).await
    }

    /// One page of runs matching `filter`
    pub async fn list_runs(&self, filter: &RunFilter) -> FoldwiseResult<BTreeMap<u64, RunSummary>> {
        self.service.list_runs(filter).await
    }

    /// Every run matching `filter`, fetched page by page.
    ///
    /// Pages use the filter's size, or the configured default page size.
    /// Fetching stops at the first short or empty page. A page size of zero
    /// is rejected.
    pub async fn list_all_runs(
        &self,
        filter: &RunFilter,
    ) -> FoldwiseResult<BTreeMap<u64, RunSummary>> {
        if filter.is_unfiltered() {
            return Err(FoldwiseError::invalid_input(
                "refusing to page through every run on the server; add a filter",
            ));
        }
        let size = filter.size.unwrap_or(self.config.default_page_size as u64);
        if size == 0 {
            return Err(FoldwiseError::invalid_input_field(
                "page size must be positive",
                "size",
            ));
        }
        let mut page = filter.clone().offset(filter.offset.unwrap_or(0)).size(size);
        let mut runs = BTreeMap::new();
        loop {
            let batch = self.service.list_runs(&page).await?;
            let fetched = batch.len() as u64;
            runs.extend(batch);
            if fetched == 0 || fetched < size {
                break;
            }
            match page.next_page() {
                Some(next) => page = next,
                None => break,
            }
        }
        info!(count = runs.len(), "listed runs");
        Ok(runs)
    }
}
