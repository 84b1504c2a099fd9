//! `runs list` and `runs get`

use crate::args::RunsAction;
use crate::console::CliConsole;
use foldwise_core::error::FoldwiseResult;
use foldwise_core::runs::RunFilter;
use foldwise_sdk::FoldwiseSdk;

pub async fn handle(sdk: &FoldwiseSdk, action: RunsAction, console: &CliConsole) -> FoldwiseResult<()> {
    match action {
        RunsAction::List {
            ids,
            tasks,
            uploaders,
            flows,
            tag,
            offset,
            size,
            all,
            json,
        } => {
            let mut filter = RunFilter::new()
                .ids(ids)
                .tasks(tasks)
                .uploaders(uploaders)
                .flows(flows);
            if let Some(tag) = tag {
                filter = filter.tag(tag);
            }
            if let Some(offset) = offset {
                filter = filter.offset(offset);
            }
            if let Some(size) = size {
                filter = filter.size(size);
            }
            list(sdk, &filter, all, json, console).await
        }
        RunsAction::Get { id, json } => get(sdk, id, json, console).await,
    }
}

async fn list(
    sdk: &FoldwiseSdk,
    filter: &RunFilter,
    all: bool,
    json: bool,
    console: &CliConsole,
) -> FoldwiseResult<()> {
    let runs = if all {
        sdk.list_all_runs(filter).await?
    } else {
        sdk.list_runs(filter).await?
    };

    if json {
        let summaries: Vec<_> = runs.values().collect();
        console.print_json(&serde_json::to_value(summaries)?);
        return Ok(());
    }
    if runs.is_empty() {
        console.warn("No runs match the filter");
        return Ok(());
    }
    console.print_table_header(&["run", "task", "setup", "flow", "uploader"]);
    for summary in runs.values() {
        console.print_table_row(&[
            summary.run_id.to_string(),
            summary.task_id.to_string(),
            summary.setup_id.to_string(),
            summary.flow_id.to_string(),
            summary.uploader.to_string(),
        ]);
    }
    console.info(&format!("{} runs", runs.len()));
    Ok(())
}

async fn get(sdk: &FoldwiseSdk, run_id: u64, json: bool, console: &CliConsole) -> FoldwiseResult<()> {
    let run = sdk.get_run(run_id).await?;
    if json {
        console.print_json(&serde_json::to_value(&run)?);
        return Ok(());
    }

    let optional = |value: Option<u64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    console.print_header(&format!("Run {}", run_id));
    console.field("task", run.task_id);
    console.field("dataset", run.dataset_id);
    console.field("flow", optional(run.flow_id));
    if let Some(name) = &run.flow_name {
        console.field("flow name", name);
    }
    console.field("setup", optional(run.setup_id));
    console.field("uploader", optional(run.uploader));
    if !run.tags.is_empty() {
        console.field("tags", run.tags.join(", "));
    }

    if !run.parameter_settings.is_empty() {
        console.print_header("Parameters");
        for setting in &run.parameter_settings {
            console.field(&setting.name, &setting.value);
        }
    }
    if !run.evaluations.is_empty() {
        console.print_header("Evaluations");
        for (metric, value) in &run.evaluations {
            console.field(metric, format!("{:.6}", value));
        }
    }
    for (metric, per_repeat) in &run.detailed_evaluations {
        let folds: usize = per_repeat.iter().map(Vec::len).sum();
        console.info(&format!(
            "{}: {} repeats, {} fold scores",
            metric,
            per_repeat.len(),
            folds
        ));
    }
    Ok(())
}
