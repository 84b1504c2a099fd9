//! JSON shapes returned by the service.
//!
//! The service is loose with types: numbers frequently arrive as strings and
//! single-element lists collapse to a bare object. The helpers here accept
//! both forms.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_to_u64(&value).ok_or_else(|| de::Error::custom(format!("expected an integer, got {}", value)))
}

pub(crate) fn lenient_opt_u64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_u64))
}

pub(crate) fn lenient_opt_i64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_to_f64(&value).ok_or_else(|| de::Error::custom(format!("expected a number, got {}", value)))
}

pub(crate) fn lenient_opt_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }))
}

/// A list that may also arrive as a single object, or be absent
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(de::Error::custom))
            .collect(),
        Some(item) => serde_json::from_value(item)
            .map(|single| vec![single])
            .map_err(de::Error::custom),
    }
}

// ---- errors ----

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub additional_information: Option<String>,
}

// ---- run listing ----

#[derive(Debug, Deserialize)]
pub(crate) struct RunListResponse {
    pub runs: RunList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunList {
    #[serde(default, deserialize_with = "one_or_many")]
    pub run: Vec<RunListEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunListEntry {
    #[serde(deserialize_with = "lenient_u64")]
    pub run_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub task_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub setup_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub flow_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub uploader: u64,
}

// ---- single run ----

#[derive(Debug, Deserialize)]
pub(crate) struct RunResponse {
    pub run: RunBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunBody {
    #[serde(deserialize_with = "lenient_u64")]
    pub run_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub task_id: u64,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub uploader: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub flow_id: Option<u64>,
    #[serde(default)]
    pub flow_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub setup_id: Option<u64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub tag: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub parameter_setting: Vec<WireParameterSetting>,
    pub input_data: InputData,
    #[serde(default)]
    pub output_data: Option<OutputData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireParameterSetting {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InputData {
    #[serde(deserialize_with = "one_or_many")]
    pub dataset: Vec<InputDataset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InputDataset {
    #[serde(deserialize_with = "lenient_u64")]
    pub did: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputData {
    #[serde(default, deserialize_with = "one_or_many")]
    pub evaluation: Vec<WireEvaluation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEvaluation {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub repeat: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub fold: Option<u64>,
}

// ---- tasks and datasets ----

#[derive(Debug, Deserialize)]
pub(crate) struct TaskResponse {
    pub task: TaskBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskBody {
    #[serde(deserialize_with = "lenient_u64")]
    pub task_id: u64,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub input: Vec<TaskInput>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskInput {
    pub name: String,
    #[serde(default)]
    pub data_set: Option<TaskDataSet>,
    #[serde(default)]
    pub estimation_procedure: Option<WireEstimationProcedure>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskDataSet {
    #[serde(deserialize_with = "lenient_u64")]
    pub data_set_id: u64,
    pub target_feature: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEstimationProcedure {
    #[serde(rename = "type")]
    pub kind: String,
    pub data_splits_url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub parameter: Vec<ProcedureParameter>,
}

impl WireEstimationProcedure {
    pub fn parameter(&self, name: &str) -> Option<usize> {
        self.parameter
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_deref())
            .and_then(|v| v.trim().parse().ok())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcedureParameter {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataSetResponse {
    pub data_set_description: DataSetDescription,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataSetDescription {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub default_target_attribute: Option<String>,
    #[serde(default)]
    pub row_id_attribute: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub ignore_attribute: Vec<String>,
}

// ---- flows and uploads ----

#[derive(Debug, Deserialize)]
pub(crate) struct FlowExistsResponse {
    pub flow_exists: FlowExists,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlowExists {
    #[serde(deserialize_with = "lenient_bool")]
    pub exists: bool,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub id: Option<i64>,
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        other => Err(de::Error::custom(format!("expected a boolean, got {}", other))),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadFlowResponse {
    pub upload_flow: UploadedId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedId {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadRunResponse {
    pub upload_run: UploadedRun,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedRun {
    #[serde(deserialize_with = "lenient_u64")]
    pub run_id: u64,
}

/// Body of the `description` part when uploading a flow
#[derive(Debug, Serialize)]
pub(crate) struct FlowUpload<'a> {
    pub flow: &'a crate::model::FlowDescription,
}

/// Body of the `description` part when uploading a run
#[derive(Debug, Serialize)]
pub(crate) struct RunUpload<'a> {
    pub run: &'a crate::runs::RunDescription,
}
