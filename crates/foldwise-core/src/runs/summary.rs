use serde::{Deserialize, Serialize};

/// One entry of a run listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: u64,
    pub task_id: u64,
    pub setup_id: u64,
    pub flow_id: u64,
    pub uploader: u64,
}
