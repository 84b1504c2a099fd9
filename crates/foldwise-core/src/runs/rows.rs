//! Per-instance prediction rows and per-iteration trace rows

use crate::arff::{ArffRow, ArffValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prediction for one test instance of one (repeat, fold)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub repeat: usize,
    pub fold: usize,
    /// Instance index within the task's dataset
    pub row_id: usize,
    /// One probability per task class, in task class order
    pub probabilities: Vec<f64>,
    pub prediction: String,
    pub truth: String,
}

impl PredictionRow {
    /// `[repeat, fold, row_id, confidence.., prediction, correct]`
    pub fn to_arff_row(&self) -> ArffRow {
        let mut row = Vec::with_capacity(self.probabilities.len() + 5);
        row.push(ArffValue::from(self.repeat));
        row.push(ArffValue::from(self.fold));
        row.push(ArffValue::from(self.row_id));
        row.extend(self.probabilities.iter().map(|p| ArffValue::Real(*p)));
        row.push(ArffValue::from(self.prediction.as_str()));
        row.push(ArffValue::from(self.truth.as_str()));
        row
    }

    pub fn is_correct(&self) -> bool {
        self.prediction == self.truth
    }
}

/// One search evaluation inside one outer (repeat, fold)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub repeat: usize,
    pub fold: usize,
    pub iteration: usize,
    /// Inner fold, for per-inner-split traces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_fold: Option<usize>,
    pub evaluation: f64,
    pub selected: bool,
    /// Parameter name to JSON-encoded value
    pub parameters: BTreeMap<String, String>,
}

impl TraceRow {
    /// Row cells for the given parameter columns; absent parameters are missing
    pub fn to_arff_row(&self, with_inner_fold: bool, parameter_names: &[String]) -> ArffRow {
        let mut row = vec![
            ArffValue::from(self.repeat),
            ArffValue::from(self.fold),
            ArffValue::from(self.iteration),
        ];
        if with_inner_fold {
            row.push(self.inner_fold.map_or(ArffValue::Missing, ArffValue::from));
        }
        row.push(ArffValue::Real(self.evaluation));
        row.push(ArffValue::from(self.selected));
        row.extend(parameter_names.iter().map(|name| {
            self.parameters
                .get(name)
                .map_or(ArffValue::Missing, |v| ArffValue::from(v.as_str()))
        }));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_row_layout() {
        let row = PredictionRow {
            repeat: 1,
            fold: 2,
            row_id: 40,
            probabilities: vec![0.2, 0.3, 0.5],
            prediction: "c".into(),
            truth: "b".into(),
        };
        let cells = row.to_arff_row();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[2], ArffValue::Integer(40));
        assert_eq!(cells[5], ArffValue::Real(0.5));
        assert_eq!(cells[7], ArffValue::from("b"));
        assert!(!row.is_correct());
    }

    #[test]
    fn test_trace_row_layout() {
        let mut parameters = BTreeMap::new();
        parameters.insert("C".to_string(), "0.1".to_string());
        let row = TraceRow {
            repeat: 0,
            fold: 3,
            iteration: 4,
            inner_fold: Some(1),
            evaluation: 0.9,
            selected: true,
            parameters,
        };
        let names = vec!["C".to_string(), "max_iter".to_string()];
        let cells = row.to_arff_row(true, &names);
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[3], ArffValue::Integer(1));
        assert_eq!(cells[5], ArffValue::from("true"));
        assert_eq!(cells[6], ArffValue::from("0.1"));
        assert_eq!(cells[7], ArffValue::Missing);

        assert_eq!(row.to_arff_row(false, &names).len(), 7);
    }
}
