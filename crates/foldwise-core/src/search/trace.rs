//! Search history recorded by a fitted search wrapper

use crate::model::ParamMap;
use serde::{Deserialize, Serialize};

/// One evaluated parameter setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceIteration {
    pub params: ParamMap,
    /// Mean score over the inner folds
    pub mean_score: f64,
    /// Score on each inner fold, in fold order
    pub split_scores: Vec<f64>,
}

/// All iterations of one search, in evaluation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTrace {
    pub iterations: Vec<TraceIteration>,
    /// Index of the iteration that was refitted
    pub best_index: usize,
}

impl SearchTrace {
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Number of inner folds each iteration was scored on
    pub fn inner_folds(&self) -> usize {
        self.iterations
            .first()
            .map_or(0, |iteration| iteration.split_scores.len())
    }

    pub fn best(&self) -> Option<&TraceIteration> {
        self.iterations.get(self.best_index)
    }

    /// Names of every searched parameter, sorted
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .iterations
            .iter()
            .flat_map(|iteration| iteration.params.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
