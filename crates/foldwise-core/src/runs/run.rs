//! The run record

use super::rows::{PredictionRow, TraceRow};
use crate::arff::{ArffDocument, ArffRow, AttributeKind};
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::{FlowDescription, ParameterSetting};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One execution of a model against a task.
///
/// Built once by the executor (or parsed from the service). Afterwards only
/// server-assigned fields (`run_id`, `flow_id`, `setup_id`, `uploader`) and
/// server evaluations change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: Option<u64>,
    pub task_id: u64,
    pub dataset_id: u64,
    pub flow_id: Option<u64>,
    /// Present for locally executed runs
    pub flow: Option<FlowDescription>,
    pub flow_name: Option<String>,
    pub setup_id: Option<u64>,
    pub uploader: Option<u64>,
    pub parameter_settings: Vec<ParameterSetting>,
    pub class_labels: Vec<String>,
    pub predictions: Vec<PredictionRow>,
    pub trace: Option<Vec<TraceRow>>,
    pub evaluations: BTreeMap<String, f64>,
    /// metric -> repeat -> fold
    pub detailed_evaluations: BTreeMap<String, Vec<Vec<f64>>>,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Run description sent alongside the prediction file on publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescription {
    pub task_id: u64,
    pub flow_id: u64,
    pub parameter_setting: Vec<ParameterSetting>,
    #[serde(default)]
    pub tag: Vec<String>,
}

impl Run {
    /// A run record that has not been published
    pub fn local(
        task_id: u64,
        dataset_id: u64,
        flow: FlowDescription,
        class_labels: Vec<String>,
        predictions: Vec<PredictionRow>,
        trace: Option<Vec<TraceRow>>,
    ) -> Self {
        Self {
            run_id: None,
            task_id,
            dataset_id,
            flow_id: None,
            flow_name: Some(flow.name.clone()),
            parameter_settings: flow.parameter_settings(),
            flow: Some(flow),
            setup_id: None,
            uploader: None,
            class_labels,
            predictions,
            trace,
            evaluations: BTreeMap::new(),
            detailed_evaluations: BTreeMap::new(),
            tags: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_published(&self) -> bool {
        self.run_id.is_some()
    }

    /// Prediction rows as ARFF cells
    pub fn data_content(&self) -> Vec<ArffRow> {
        self.predictions.iter().map(PredictionRow::to_arff_row).collect()
    }

    fn has_inner_folds(&self) -> bool {
        self.trace
            .as_ref()
            .is_some_and(|rows| rows.iter().any(|r| r.inner_fold.is_some()))
    }

    fn trace_parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .trace
            .iter()
            .flatten()
            .flat_map(|row| row.parameters.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Trace rows as ARFF cells; `None` when the model did no search
    pub fn trace_content(&self) -> Option<Vec<ArffRow>> {
        let rows = self.trace.as_ref()?;
        let inner = self.has_inner_folds();
        let names = self.trace_parameter_names();
        Some(rows.iter().map(|row| row.to_arff_row(inner, &names)).collect())
    }

    /// Full prediction document
    pub fn predictions_arff(&self) -> ArffDocument {
        let labels = AttributeKind::Nominal(self.class_labels.clone());
        let mut document = ArffDocument::new(format!("openml_task_{}_predictions", self.task_id))
            .with_attribute("repeat", AttributeKind::Numeric)
            .with_attribute("fold", AttributeKind::Numeric)
            .with_attribute("row_id", AttributeKind::Numeric);
        for label in &self.class_labels {
            document = document.with_attribute(format!("confidence.{}", label), AttributeKind::Numeric);
        }
        document = document
            .with_attribute("prediction", labels.clone())
            .with_attribute("correct", labels);
        document.data = self.data_content();
        document
    }

    /// Full trace document, if any
    pub fn trace_arff(&self) -> Option<ArffDocument> {
        let data = self.trace_content()?;
        let mut document = ArffDocument::new(format!("openml_task_{}_search_trace", self.task_id))
            .with_attribute("repeat", AttributeKind::Numeric)
            .with_attribute("fold", AttributeKind::Numeric)
            .with_attribute("iteration", AttributeKind::Numeric);
        if self.has_inner_folds() {
            document = document.with_attribute("inner_fold", AttributeKind::Numeric);
        }
        document = document
            .with_attribute("evaluation", AttributeKind::Numeric)
            .with_attribute(
                "selected",
                AttributeKind::Nominal(vec!["true".into(), "false".into()]),
            );
        for name in self.trace_parameter_names() {
            document = document.with_attribute(format!("parameter_{}", name), AttributeKind::String);
        }
        document.data = data;
        Some(document)
    }

    /// Description for upload; requires the flow to be registered
    pub fn description(&self) -> FoldwiseResult<RunDescription> {
        let flow_id = self.flow_id.ok_or_else(|| {
            FoldwiseError::invalid_input_field("run has no flow id; register the flow first", "flow_id")
        })?;
        Ok(RunDescription {
            task_id: self.task_id,
            flow_id,
            parameter_setting: self.parameter_settings.clone(),
            tag: self.tags.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arff;

    fn sample_run(trace: Option<Vec<TraceRow>>) -> Run {
        let labels = vec!["a".to_string(), "b".to_string()];
        let predictions = vec![PredictionRow {
            repeat: 0,
            fold: 0,
            row_id: 3,
            probabilities: vec![0.25, 0.75],
            prediction: "b".into(),
            truth: "a".into(),
        }];
        let flow = FlowDescription::new("foldwise.estimators.dummy", "1").with_parameter("strategy", "\"prior\"");
        Run::local(7, 61, flow, labels, predictions, trace)
    }

    fn trace_row(iteration: usize, inner_fold: Option<usize>) -> TraceRow {
        let mut parameters = BTreeMap::new();
        parameters.insert("C".to_string(), iteration.to_string());
        TraceRow {
            repeat: 0,
            fold: 0,
            iteration,
            inner_fold,
            evaluation: 0.5,
            selected: iteration == 0,
            parameters,
        }
    }

    #[test]
    fn test_local_run_defaults() {
        let run = sample_run(None);
        assert!(!run.is_published());
        assert_eq!(run.parameter_settings.len(), 1);
        assert_eq!(run.flow_name.as_deref(), Some("foldwise.estimators.dummy"));
        assert!(run.trace_content().is_none());
        assert!(run.trace_arff().is_none());
    }

    #[test]
    fn test_predictions_arff_parses_back() {
        let run = sample_run(None);
        let text = run.predictions_arff().to_string();
        let parsed = arff::parse(&text).unwrap();
        assert_eq!(parsed.attributes.len(), 7);
        assert_eq!(parsed.attributes[3].name, "confidence.a");
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0][6].as_str(), Some("a"));
    }

    #[test]
    fn test_trace_arff_columns() {
        let run = sample_run(Some(vec![trace_row(0, None), trace_row(1, None)]));
        let doc = run.trace_arff().unwrap();
        let names: Vec<&str> = doc.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["repeat", "fold", "iteration", "evaluation", "selected", "parameter_C"]
        );
        assert_eq!(run.trace_content().unwrap().len(), 2);

        let inner = sample_run(Some(vec![trace_row(0, Some(0)), trace_row(0, Some(1))]));
        assert_eq!(inner.trace_arff().unwrap().attributes[3].name, "inner_fold");
    }

    #[test]
    fn test_description_requires_flow_id() {
        let mut run = sample_run(None).with_tag("study_1");
        assert!(run.description().is_err());
        run.flow_id = Some(12);
        let description = run.description().unwrap();
        assert_eq!(description.flow_id, 12);
        assert_eq!(description.tag, vec!["study_1"]);
    }
}
