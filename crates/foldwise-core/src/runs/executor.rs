//! Executes an adapted model over every (repeat, fold) of a task

use super::evaluation::evaluate;
use super::rows::{PredictionRow, TraceRow};
use super::run::Run;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::estimators::math::argmax;
use crate::model::ModelAdapter;
use crate::search::SearchTrace;
use crate::task::{Split, Task};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Trace row granularity for search wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceGranularity {
    /// One row per search iteration per outer (repeat, fold), scored by the
    /// iteration's mean inner-CV score
    #[default]
    PerIteration,
    /// One row per search iteration per inner fold of the search's own CV
    PerInnerSplit,
}

/// Output of one (repeat, fold)
#[derive(Debug)]
struct FoldOutput {
    predictions: Vec<PredictionRow>,
    trace: Option<Vec<TraceRow>>,
}

/// Runs an adapted model against a task
#[derive(Debug, Clone, Default)]
pub struct RunExecutor {
    granularity: TraceGranularity,
    parallel: bool,
}

impl RunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_granularity(mut self, granularity: TraceGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Fit folds on the rayon pool; output order is unchanged
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn trace_granularity(&self) -> TraceGranularity {
        self.granularity
    }

    /// Execute every (repeat, fold) and assemble the run.
    ///
    /// Rows come out in (repeat, fold, test-instance) order. The first fit or
    /// predict failure aborts the whole run.
    pub fn execute(&self, task: &Task, adapter: &ModelAdapter) -> FoldwiseResult<Run> {
        let started = Instant::now();
        let jobs: Vec<(usize, usize, &Split)> = task.splits().iter().collect();

        let outputs: Vec<FoldOutput> = if self.parallel {
            jobs.par_iter()
                .map(|(repeat, fold, split)| self.run_fold(task, adapter, *repeat, *fold, split))
                .collect::<FoldwiseResult<Vec<_>>>()?
        } else {
            jobs.iter()
                .map(|(repeat, fold, split)| self.run_fold(task, adapter, *repeat, *fold, split))
                .collect::<FoldwiseResult<Vec<_>>>()?
        };

        let mut predictions = Vec::with_capacity(task.num_instances() * task.procedure().repeats);
        let mut trace: Option<Vec<TraceRow>> = None;
        for output in outputs {
            predictions.extend(output.predictions);
            if let Some(rows) = output.trace {
                trace.get_or_insert_with(Vec::new).extend(rows);
            }
        }

        let mut run = Run::local(
            task.task_id(),
            task.dataset_id(),
            adapter.flow().clone(),
            task.class_labels().to_vec(),
            predictions,
            trace,
        );
        let procedure = task.procedure();
        let (flat, detailed) = evaluate(
            &run.predictions,
            &run.class_labels,
            procedure.repeats,
            procedure.folds,
        );
        run.evaluations = flat;
        run.detailed_evaluations = detailed;

        info!(
            task_id = task.task_id(),
            flow = %adapter.flow().name,
            rows = run.predictions.len(),
            trace_rows = run.trace.as_ref().map_or(0, Vec::len),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run executed"
        );
        Ok(run)
    }

    fn run_fold(
        &self,
        task: &Task,
        adapter: &ModelAdapter,
        repeat: usize,
        fold: usize,
        split: &Split,
    ) -> FoldwiseResult<FoldOutput> {
        let kind = adapter.kind();
        let mut estimator = adapter.fresh_estimator();
        let classifier = estimator.as_classifier_mut().ok_or_else(|| {
            FoldwiseError::capability(kind, format!("'{}' is not a classifier", kind))
        })?;

        let dataset = task.dataset();
        let (train_x, train_y) = dataset.select(&split.train);
        let mut seen = train_y.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() < task.class_labels().len() {
            warn!(
                repeat,
                fold,
                seen = seen.len(),
                classes = task.class_labels().len(),
                "training fold does not contain every class"
            );
        }

        classifier.fit(train_x.view(), &train_y)?;
        // fitting can change eligibility (search wrappers, pipelines)
        classifier.probability_support().require(kind)?;

        let (test_x, test_y) = dataset.select(&split.test);
        let proba = classifier.predict_proba(test_x.view())?;
        let classes = classifier.classes();
        if proba.nrows() != split.test.len() || proba.ncols() != classes.len() {
            return Err(FoldwiseError::estimator(
                kind,
                format!(
                    "predict_proba returned {}x{} for {} rows and {} classes",
                    proba.nrows(),
                    proba.ncols(),
                    split.test.len(),
                    classes.len()
                ),
            ));
        }

        let labels = task.class_labels();
        let mut predictions = Vec::with_capacity(split.test.len());
        for (i, (&row_id, &truth)) in split.test.iter().zip(&test_y).enumerate() {
            let mut probabilities = vec![0.0; labels.len()];
            for (column, &class) in classes.iter().enumerate() {
                if let Some(slot) = probabilities.get_mut(class) {
                    *slot = proba[[i, column]];
                }
            }
            normalize(&mut probabilities, kind)?;
            let predicted = argmax(probabilities.iter().copied());
            predictions.push(PredictionRow {
                repeat,
                fold,
                row_id,
                probabilities,
                prediction: labels[predicted].clone(),
                truth: labels[truth].clone(),
            });
        }

        let trace = classifier
            .search_trace()
            .map(|search| self.trace_rows(search, repeat, fold));
        debug!(repeat, fold, rows = predictions.len(), "fold done");
        Ok(FoldOutput { predictions, trace })
    }

    fn trace_rows(&self, search: &SearchTrace, repeat: usize, fold: usize) -> Vec<TraceRow> {
        let mut rows = Vec::new();
        for (iteration, entry) in search.iterations.iter().enumerate() {
            let parameters = entry
                .params
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect();
            let selected = iteration == search.best_index;
            match self.granularity {
                TraceGranularity::PerIteration => rows.push(TraceRow {
                    repeat,
                    fold,
                    iteration,
                    inner_fold: None,
                    evaluation: entry.mean_score,
                    selected,
                    parameters,
                }),
                TraceGranularity::PerInnerSplit => {
                    for (inner, score) in entry.split_scores.iter().enumerate() {
                        rows.push(TraceRow {
                            repeat,
                            fold,
                            iteration,
                            inner_fold: Some(inner),
                            evaluation: *score,
                            selected,
                            parameters: parameters.clone(),
                        });
                    }
                }
            }
        }
        rows
    }
}

/// Rescale to sum to one when the model's own rows drift
fn normalize(probabilities: &mut [f64], kind: &str) -> FoldwiseResult<()> {
    let sum: f64 = probabilities.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(FoldwiseError::estimator(
            kind,
            format!("probability row sums to {}", sum),
        ));
    }
    if (sum - 1.0).abs() > 1e-9 {
        probabilities.iter_mut().for_each(|p| *p /= sum);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::{
        DummyClassifier, LinearRegression, LogisticRegression, Pipeline, SgdClassifier, SgdLoss,
        StandardScaler,
    };
    use crate::model::{Estimator, FlowRegistry, ParamValue};
    use crate::runs::{PREDICTIVE_ACCURACY, Run};
    use crate::search::{ParamDistribution, ParamGrid, SearchCv};
    use crate::task::{Dataset, EstimationProcedure, Splits};
    use std::collections::BTreeMap;

    const LABELS: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

    fn iris_like(repeats: usize, folds: usize) -> Task {
        let dataset = Dataset::synthetic_blobs(50, 4, 3, 11);
        let labels = LABELS.iter().map(|s| s.to_string()).collect();
        Task::cross_validated(1939, dataset, labels, repeats, folds, 1).unwrap()
    }

    fn adapt(estimator: Box<dyn Estimator>) -> FoldwiseResult<ModelAdapter> {
        ModelAdapter::new(estimator, &FlowRegistry::new())
    }

    fn execute(task: &Task, estimator: Box<dyn Estimator>) -> Run {
        RunExecutor::new().execute(task, &adapt(estimator).unwrap()).unwrap()
    }

    #[test]
    fn test_repeated_cv_prediction_content() {
        let task = iris_like(10, 10);
        let run = execute(&task, Box::new(SgdClassifier::new(SgdLoss::Log).with_random_state(1)));

        assert!(run.trace_content().is_none());
        let content = run.data_content();
        assert_eq!(content.len(), 1500);
        for line in &content {
            assert_eq!(line.len(), 8);
            let repeat = line[0].as_i64().unwrap();
            let fold = line[1].as_i64().unwrap();
            let row_id = line[2].as_i64().unwrap();
            assert!((0..=9).contains(&repeat));
            assert!((0..=9).contains(&fold));
            assert!((0..=149).contains(&row_id));
            let sum: f64 = line[3..6].iter().map(|v| v.as_f64().unwrap()).sum();
            assert!((sum - 1.0).abs() < 1e-6);
            assert!(LABELS.contains(&line[6].as_str().unwrap()));
            assert!(LABELS.contains(&line[7].as_str().unwrap()));
        }
    }

    #[test]
    fn test_rows_in_canonical_order() {
        let task = iris_like(2, 5);
        let run = execute(&task, Box::new(DummyClassifier::prior()));
        let keys: Vec<(usize, usize)> = run.predictions.iter().map(|r| (r.repeat, r.fold)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let first_fold: Vec<usize> = run
            .predictions
            .iter()
            .filter(|r| r.repeat == 0 && r.fold == 0)
            .map(|r| r.row_id)
            .collect();
        assert_eq!(first_fold, task.split(0, 0).unwrap().test);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let task = iris_like(2, 5);
        let adapter = adapt(Box::new(LogisticRegression::new())).unwrap();
        let sequential = RunExecutor::new().execute(&task, &adapter).unwrap();
        let parallel = RunExecutor::new()
            .with_parallelism(true)
            .execute(&task, &adapter)
            .unwrap();
        assert_eq!(sequential.predictions, parallel.predictions);
        assert_eq!(sequential.evaluations, parallel.evaluations);
    }

    #[test]
    fn test_random_search_trace_rows() {
        let task = iris_like(1, 10);
        let mut distributions = BTreeMap::new();
        distributions.insert(
            "C".to_string(),
            ParamDistribution::choice([0.01, 0.1, 1.0, 10.0].map(ParamValue::Float)),
        );
        distributions.insert(
            "max_iter".to_string(),
            ParamDistribution::IntRange { low: 20, high: 100 },
        );
        let search = SearchCv::random(Box::new(LogisticRegression::new()), distributions, 5)
            .with_cv(3)
            .with_random_state(2);
        let run = execute(&task, Box::new(search));

        let trace = run.trace_content().unwrap();
        assert_eq!(trace.len(), 5 * 10);
        let rows = run.trace.as_ref().unwrap();
        for fold in 0..10 {
            let selected = rows.iter().filter(|r| r.fold == fold && r.selected).count();
            assert_eq!(selected, 1);
        }
    }

    #[test]
    fn test_grid_search_trace_rows() {
        let task = iris_like(1, 10);
        let mut grid = ParamGrid::new();
        grid.insert("C".into(), vec![0.01.into(), 0.1.into(), 10.0.into()]);
        grid.insert("max_iter".into(), vec![10i64.into(), 50i64.into(), 100i64.into()]);
        let search = SearchCv::grid(Box::new(LogisticRegression::new()), grid);
        let run = execute(&task, Box::new(search));
        assert_eq!(run.trace_content().unwrap().len(), 9 * 10);
    }

    #[test]
    fn test_per_inner_split_trace_uses_search_folds() {
        let task = iris_like(1, 4);
        let mut grid = ParamGrid::new();
        grid.insert("C".into(), vec![0.1.into(), 1.0.into()]);
        let search = SearchCv::grid(Box::new(LogisticRegression::new()), grid).with_cv(3);
        let adapter = adapt(Box::new(search)).unwrap();
        let run = RunExecutor::new()
            .with_trace_granularity(TraceGranularity::PerInnerSplit)
            .execute(&task, &adapter)
            .unwrap();

        let trace = run.trace_content().unwrap();
        assert_eq!(trace.len(), 2 * 3 * 4);
        assert!(trace.iter().all(|row| row.len() == 7));
    }

    #[test]
    fn test_pipeline_runs_without_trace() {
        let task = iris_like(1, 5);
        let pipeline = Pipeline::new(vec![
            (
                "scaler".to_string(),
                Box::new(StandardScaler::new().with_mean(false)) as Box<dyn Estimator>,
            ),
            ("dummy".to_string(), Box::new(DummyClassifier::prior()) as Box<dyn Estimator>),
        ])
        .unwrap();
        let run = execute(&task, Box::new(pipeline));
        assert_eq!(run.predictions.len(), 150);
        assert!(run.trace.is_none());
    }

    #[test]
    fn test_hinge_loss_rejected() {
        let err = adapt(Box::new(SgdClassifier::new(SgdLoss::Hinge).with_random_state(1)))
            .unwrap_err();
        assert!(err.is_capability());
        assert!(
            err.to_string()
                .contains("probability estimates are not available for loss='hinge'")
        );
    }

    #[test]
    fn test_search_selecting_hinge_fails_after_fit() {
        let task = iris_like(1, 3);
        let mut grid = ParamGrid::new();
        grid.insert("loss".into(), vec!["hinge".into()]);
        let search = SearchCv::grid(
            Box::new(SgdClassifier::new(SgdLoss::Log).with_random_state(1)),
            grid,
        );
        let adapter = adapt(Box::new(search)).unwrap();
        let err = RunExecutor::new().execute(&task, &adapter).unwrap_err();
        assert!(err.is_capability());
    }

    #[test]
    fn test_regression_model_rejected() {
        assert!(adapt(Box::new(LinearRegression::new())).unwrap_err().is_capability());
    }

    #[test]
    fn test_invalid_penalty_rejected() {
        let mut model = LogisticRegression::new();
        model.set_param("C", "abc".into()).unwrap();
        let err = adapt(Box::new(model)).unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_unseen_classes_are_zero_filled() {
        let dataset = Dataset::synthetic_blobs(2, 1, 3, 0);
        // train only on class 0 and 1 instances
        let train: Vec<usize> = (0..6).filter(|i| dataset.targets()[*i] != 2).collect();
        let test: Vec<usize> = (0..6).filter(|i| dataset.targets()[*i] == 2).collect();
        let splits = Splits::new(
            1,
            2,
            vec![
                Split {
                    train: train.clone(),
                    test: test.clone(),
                },
                Split {
                    train: test,
                    test: train,
                },
            ],
        )
        .unwrap();
        let labels = LABELS.iter().map(|s| s.to_string()).collect();
        let task = Task::new(
            1,
            1,
            "class",
            labels,
            EstimationProcedure::cross_validation(1, 2),
            splits,
            dataset,
        )
        .unwrap();

        let run = execute(&task, Box::new(DummyClassifier::prior()));
        let first = &run.predictions[0];
        assert_eq!(first.probabilities, vec![0.5, 0.5, 0.0]);
        assert_eq!(first.prediction, "Iris-setosa");
        assert_eq!(first.truth, "Iris-virginica");
        assert_eq!(run.evaluations[PREDICTIVE_ACCURACY], 0.0);
    }
}
