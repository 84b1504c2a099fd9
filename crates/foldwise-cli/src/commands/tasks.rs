//! `tasks get`

use crate::console::CliConsole;
use foldwise_core::error::FoldwiseResult;
use foldwise_sdk::FoldwiseSdk;

pub async fn get(sdk: &FoldwiseSdk, task_id: u64, console: &mut CliConsole) -> FoldwiseResult<()> {
    console.start_progress(&format!("Downloading task {}", task_id));
    let task = sdk.get_task(task_id).await;
    console.finish_progress();
    let task = task?;

    console.print_header(&format!("Task {}", task.task_id()));
    console.field("dataset", task.dataset_id());
    console.field("target", task.target_feature());
    console.field("classes", task.class_labels().join(", "));
    console.field("instances", task.num_instances());
    console.field("features", task.dataset().n_features());
    console.field("procedure", task.procedure());

    let mut counts = vec![0usize; task.class_labels().len()];
    for &target in task.dataset().targets() {
        counts[target] += 1;
    }
    console.print_header("Class distribution");
    for (label, count) in task.class_labels().iter().zip(counts) {
        console.field(label, count);
    }
    Ok(())
}
