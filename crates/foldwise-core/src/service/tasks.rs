//! Task download: description, dataset file and splits file

use super::client::ServiceClient;
use super::wire::{DataSetResponse, TaskResponse};
use crate::arff;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::task::{Dataset, EstimationKind, EstimationProcedure, Splits, Task};
use tracing::{debug, info};

impl ServiceClient {
    pub(crate) async fn fetch_task(&self, task_id: u64) -> FoldwiseResult<Task> {
        let url = self.endpoint(&["task".to_string(), task_id.to_string()])?;
        let body = self
            .get_json::<TaskResponse>(url)
            .await?
            .map_err(|api| api.into_error("task", task_id))?
            .task;

        if let Some(kind) = &body.task_type {
            if !kind.to_ascii_lowercase().contains("classification") {
                return Err(FoldwiseError::invalid_task(format!(
                    "task {} is a '{}' task; only classification is supported",
                    task_id, kind
                )));
            }
        }

        let source = body
            .input
            .iter()
            .find_map(|input| input.data_set.as_ref())
            .ok_or_else(|| {
                FoldwiseError::invalid_task(format!("task {} has no source data", task_id))
            })?;
        let procedure = body
            .input
            .iter()
            .find_map(|input| input.estimation_procedure.as_ref())
            .ok_or_else(|| {
                FoldwiseError::invalid_task(format!("task {} has no estimation procedure", task_id))
            })?;

        let url = self.endpoint(&["data".to_string(), source.data_set_id.to_string()])?;
        let description = self
            .get_json::<DataSetResponse>(url)
            .await?
            .map_err(|api| api.into_error("dataset", source.data_set_id))?
            .data_set_description;
        debug!(dataset = ?description.name, "dataset description fetched");

        let dataset_file = self
            .get_text(&description.url)
            .await?
            .map_err(|api| api.into_error("dataset file", &description.url))?;
        let mut ignore = description.ignore_attribute.clone();
        ignore.extend(description.row_id_attribute.clone());
        let (dataset, class_labels) =
            Dataset::from_arff(&arff::parse(&dataset_file)?, &source.target_feature, &ignore)?;

        let splits_file = self
            .get_text(&procedure.data_splits_url)
            .await?
            .map_err(|api| api.into_error("splits file", &procedure.data_splits_url))?;
        let splits = Splits::from_arff(&arff::parse(&splits_file)?)?;

        let estimation = EstimationProcedure {
            kind: EstimationKind::from_service_name(&procedure.kind),
            repeats: procedure
                .parameter("number_repeats")
                .unwrap_or_else(|| splits.repeats()),
            folds: procedure
                .parameter("number_folds")
                .unwrap_or_else(|| splits.folds()),
        };

        let task = Task::new(
            body.task_id,
            source.data_set_id,
            source.target_feature.clone(),
            class_labels,
            estimation,
            splits,
            dataset,
        )?;
        info!(
            task_id,
            instances = task.num_instances(),
            procedure = %estimation,
            "task loaded"
        );
        Ok(task)
    }
}
