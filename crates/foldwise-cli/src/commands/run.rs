//! `run`: execute a model on a task and optionally publish it

use super::models::build_estimator;
use crate::args::{RunArgs, TraceChoice};
use crate::console::CliConsole;
use foldwise_core::error::{FoldwiseError, FoldwiseResult};
use foldwise_core::runs::{MEAN_ABSOLUTE_ERROR, PREDICTIVE_ACCURACY, Run, RunExecutor, TraceGranularity};
use foldwise_sdk::FoldwiseSdk;
use std::time::Instant;

pub async fn execute(sdk: FoldwiseSdk, args: RunArgs, console: &mut CliConsole) -> FoldwiseResult<()> {
    let granularity = match args.trace {
        TraceChoice::Iteration => TraceGranularity::PerIteration,
        TraceChoice::InnerSplit => TraceGranularity::PerInnerSplit,
    };
    let sdk = sdk.with_executor(
        RunExecutor::new()
            .with_trace_granularity(granularity)
            .with_parallelism(args.parallel),
    );
    // fail on bad model settings before any download
    let estimator = build_estimator(args.model, args.search, args.n_iter, args.seed)?;

    console.start_progress(&format!("Downloading task {}", args.task_id));
    let task = sdk.get_task(args.task_id).await;
    console.finish_progress();
    let task = task?;

    console.start_progress(&format!(
        "Running {} on task {} ({})",
        estimator.kind(),
        task.task_id(),
        task.procedure()
    ));
    let started = Instant::now();
    let run = sdk.run_local(&task, estimator);
    console.finish_progress();
    let mut run = run?;

    print_summary(&run, started.elapsed(), console);

    if let Some(path) = &args.output {
        std::fs::write(path, run.predictions_arff().to_string()).map_err(|e| {
            FoldwiseError::io_with_path(
                format!("Failed to write predictions: {}", e),
                path.display().to_string(),
            )
        })?;
        console.success(&format!("Predictions written to {}", path.display()));
    }

    if args.publish {
        for tag in args.tags {
            run = run.with_tag(tag);
        }
        console.start_progress("Publishing run");
        let published = sdk.publish(&mut run).await;
        console.finish_progress();
        let run_id = published?;
        console.success(&format!("Published run {}", run_id));
    } else if !args.tags.is_empty() {
        console.warn("Tags are only sent when publishing (--publish)");
    }
    Ok(())
}

fn print_summary(run: &Run, elapsed: std::time::Duration, console: &CliConsole) {
    console.print_header("Run summary");
    console.field("task", run.task_id);
    if let Some(name) = &run.flow_name {
        console.field("flow", name);
    }
    console.field("predictions", run.predictions.len());
    if let Some(trace) = &run.trace {
        console.field("trace rows", trace.len());
    }
    for metric in [PREDICTIVE_ACCURACY, MEAN_ABSOLUTE_ERROR] {
        if let Some(value) = run.evaluations.get(metric) {
            console.field(metric, format!("{:.4}", value));
        }
    }
    if let Some(per_repeat) = run.detailed_evaluations.get(PREDICTIVE_ACCURACY) {
        for (repeat, folds) in per_repeat.iter().enumerate() {
            let scores: Vec<String> = folds.iter().map(|s| format!("{:.3}", s)).collect();
            console.info(&format!("repeat {}: {}", repeat, scores.join(" ")));
        }
    }
    console.field("elapsed", format!("{:.2}s", elapsed.as_secs_f64()));
}
