//! The task descriptor

use super::dataset::Dataset;
use super::splits::{Split, Splits};
use crate::error::{FoldwiseError, FoldwiseResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of estimation procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationKind {
    CrossValidation,
    Holdout,
    LeaveOneOut,
    Custom,
}

impl EstimationKind {
    /// Map the service's procedure type string
    pub fn from_service_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "crossvalidation" | "cross_validation" => Self::CrossValidation,
            "holdout" => Self::Holdout,
            "leaveoneout" | "leave_one_out" => Self::LeaveOneOut,
            _ => Self::Custom,
        }
    }
}

impl fmt::Display for EstimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CrossValidation => "crossvalidation",
            Self::Holdout => "holdout",
            Self::LeaveOneOut => "leaveoneout",
            Self::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// Estimation procedure parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationProcedure {
    pub kind: EstimationKind,
    pub repeats: usize,
    pub folds: usize,
}

impl EstimationProcedure {
    pub fn cross_validation(repeats: usize, folds: usize) -> Self {
        Self {
            kind: EstimationKind::CrossValidation,
            repeats,
            folds,
        }
    }
}

impl fmt::Display for EstimationProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} x {} folds)", self.kind, self.repeats, self.folds)
    }
}

/// A supervised classification task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    task_id: u64,
    dataset_id: u64,
    target_feature: String,
    class_labels: Vec<String>,
    procedure: EstimationProcedure,
    splits: Splits,
    dataset: Dataset,
}

impl Task {
    /// Assemble and validate a task.
    ///
    /// No split may share an index between train and test. For
    /// cross-validation the test sets of every repeat must cover all
    /// instances exactly once; other procedures only forbid repeats.
    pub fn new(
        task_id: u64,
        dataset_id: u64,
        target_feature: impl Into<String>,
        class_labels: Vec<String>,
        procedure: EstimationProcedure,
        splits: Splits,
        dataset: Dataset,
    ) -> FoldwiseResult<Self> {
        let task = Self {
            task_id,
            dataset_id,
            target_feature: target_feature.into(),
            class_labels,
            procedure,
            splits,
            dataset,
        };
        task.validate()?;
        Ok(task)
    }

    fn validate(&self) -> FoldwiseResult<()> {
        if self.class_labels.is_empty() {
            return Err(FoldwiseError::invalid_task("task has no class labels"));
        }
        let n = self.dataset.len();
        if n == 0 {
            return Err(FoldwiseError::invalid_task("task dataset is empty"));
        }
        if let Some(&bad) = self
            .dataset
            .targets()
            .iter()
            .find(|&&t| t >= self.class_labels.len())
        {
            return Err(FoldwiseError::invalid_task(format!(
                "target class index {} outside {} labels",
                bad,
                self.class_labels.len()
            )));
        }
        if self.splits.repeats() != self.procedure.repeats || self.splits.folds() != self.procedure.folds
        {
            return Err(FoldwiseError::invalid_task(format!(
                "splits are {} x {} but the procedure declares {} x {}",
                self.splits.repeats(),
                self.splits.folds(),
                self.procedure.repeats,
                self.procedure.folds
            )));
        }

        let mut seen = vec![0usize; n];
        for repeat in 0..self.splits.repeats() {
            seen.iter_mut().for_each(|c| *c = 0);
            for fold in 0..self.splits.folds() {
                let split = self
                    .splits
                    .get(repeat, fold)
                    .ok_or_else(|| FoldwiseError::invalid_task("missing split"))?;
                check_split(split, n, repeat, fold)?;
                for &i in &split.test {
                    seen[i] += 1;
                }
            }
            let partitions = matches!(
                self.procedure.kind,
                EstimationKind::CrossValidation | EstimationKind::LeaveOneOut
            );
            if let Some(i) = seen
                .iter()
                .position(|&c| c > 1 || (partitions && c == 0))
            {
                return Err(FoldwiseError::invalid_task(format!(
                    "instance {} appears in {} test folds of repeat {}",
                    i, seen[i], repeat
                )));
            }
        }
        Ok(())
    }

    /// A locally generated task using repeated stratified cross-validation
    pub fn cross_validated(
        task_id: u64,
        dataset: Dataset,
        class_labels: Vec<String>,
        repeats: usize,
        folds: usize,
        seed: u64,
    ) -> FoldwiseResult<Self> {
        let splits = Splits::stratified_cv(dataset.targets(), repeats, folds, seed)?;
        Self::new(
            task_id,
            0,
            "class",
            class_labels,
            EstimationProcedure::cross_validation(repeats, folds),
            splits,
            dataset,
        )
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn dataset_id(&self) -> u64 {
        self.dataset_id
    }

    pub fn target_feature(&self) -> &str {
        &self.target_feature
    }

    /// Ordered class labels; defines the probability column order
    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn procedure(&self) -> EstimationProcedure {
        self.procedure
    }

    pub fn splits(&self) -> &Splits {
        &self.splits
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Total number of instances
    pub fn num_instances(&self) -> usize {
        self.dataset.len()
    }

    /// The split for (repeat, fold)
    pub fn split(&self, repeat: usize, fold: usize) -> Option<&Split> {
        self.splits.get(repeat, fold)
    }
}

fn check_split(split: &Split, n: usize, repeat: usize, fold: usize) -> FoldwiseResult<()> {
    if split.test.is_empty() {
        return Err(FoldwiseError::invalid_task(format!(
            "repeat {} fold {} has an empty test set",
            repeat, fold
        )));
    }
    if split.train.is_empty() {
        return Err(FoldwiseError::invalid_task(format!(
            "repeat {} fold {} has an empty training set",
            repeat, fold
        )));
    }
    if let Some(&i) = split.train.iter().chain(&split.test).find(|&&i| i >= n) {
        return Err(FoldwiseError::invalid_task(format!(
            "repeat {} fold {} references instance {} of {}",
            repeat, fold, i, n
        )));
    }
    let mut in_test = vec![false; n];
    for &i in &split.test {
        in_test[i] = true;
    }
    if let Some(&i) = split.train.iter().find(|&&i| in_test[i]) {
        return Err(FoldwiseError::invalid_task(format!(
            "repeat {} fold {} uses instance {} for both training and testing",
            repeat, fold, i
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["a".into(), "b".into()]
    }

    #[test]
    fn test_cross_validated_task_is_valid() {
        let dataset = Dataset::synthetic_blobs(10, 2, 2, 0);
        let task = Task::cross_validated(1, dataset, labels(), 2, 5, 0).unwrap();
        assert_eq!(task.num_instances(), 20);
        assert_eq!(task.procedure().folds, 5);
        assert!(task.split(1, 4).is_some());
    }

    #[test]
    fn test_overlapping_test_folds_rejected() {
        let dataset = Dataset::synthetic_blobs(2, 1, 2, 0);
        let splits = Splits::new(
            1,
            2,
            vec![
                Split {
                    train: vec![2, 3],
                    test: vec![0, 1],
                },
                Split {
                    train: vec![0, 3],
                    test: vec![1, 2],
                },
            ],
        )
        .unwrap();
        let err = Task::new(
            1,
            1,
            "class",
            labels(),
            EstimationProcedure::cross_validation(1, 2),
            splits,
            dataset,
        )
        .unwrap_err();
        assert!(matches!(err, FoldwiseError::InvalidTask { .. }));
    }

    #[test]
    fn test_train_test_overlap_rejected() {
        let dataset = Dataset::synthetic_blobs(1, 1, 2, 0);
        let splits = Splits::new(
            1,
            1,
            vec![Split {
                train: vec![0, 1],
                test: vec![0, 1],
            }],
        )
        .unwrap();
        let result = Task::new(
            1,
            1,
            "class",
            labels(),
            EstimationProcedure::cross_validation(1, 1),
            splits,
            dataset,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_procedure_mismatch_rejected() {
        let dataset = Dataset::synthetic_blobs(5, 1, 2, 0);
        let splits = Splits::stratified_cv(dataset.targets(), 1, 5, 0).unwrap();
        let result = Task::new(
            1,
            1,
            "class",
            labels(),
            EstimationProcedure::cross_validation(2, 5),
            splits,
            dataset,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_estimation_kind_names() {
        assert_eq!(
            EstimationKind::from_service_name("crossvalidation"),
            EstimationKind::CrossValidation
        );
        assert_eq!(EstimationKind::from_service_name("bootstrap"), EstimationKind::Custom);
    }
}
