//! Grid and randomized hyperparameter search

use super::scoring::accuracy;
use super::space::{ParamDistribution, ParamGrid, expand_grid};
use super::trace::{SearchTrace, TraceIteration};
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::estimators::math::argmax;
use crate::model::params::{split_nested, unknown_param};
use crate::model::traits::not_fitted;
use crate::model::{Classifier, Estimator, ParamMap, ParamValue, ProbabilitySupport};
use crate::task::stratified_folds;
use ndarray::{Array2, ArrayView2, Axis};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::BTreeMap;
use tracing::debug;

/// Inner cross-validation folds used when none are configured
pub const DEFAULT_INNER_FOLDS: usize = 3;

/// How candidate settings are generated
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStrategy {
    /// Every combination of the grid
    Grid(ParamGrid),
    /// `n_iter` independent draws from the distributions
    Random {
        distributions: BTreeMap<String, ParamDistribution>,
        n_iter: usize,
    },
}

/// Search wrapper around a base classifier.
///
/// `fit` scores every candidate with stratified k-fold accuracy on the
/// training data, refits the best one on all of it and keeps the history
/// as a [`SearchTrace`]. Predictions come from the refitted model.
#[derive(Debug)]
pub struct SearchCv {
    base: Box<dyn Estimator>,
    strategy: SearchStrategy,
    cv: usize,
    random_state: u64,
    best: Option<Box<dyn Estimator>>,
    trace: Option<SearchTrace>,
}

impl SearchCv {
    pub fn grid(base: Box<dyn Estimator>, grid: ParamGrid) -> Self {
        Self::with_strategy(base, SearchStrategy::Grid(grid))
    }

    pub fn random(
        base: Box<dyn Estimator>,
        distributions: BTreeMap<String, ParamDistribution>,
        n_iter: usize,
    ) -> Self {
        Self::with_strategy(
            base,
            SearchStrategy::Random {
                distributions,
                n_iter,
            },
        )
    }

    fn with_strategy(base: Box<dyn Estimator>, strategy: SearchStrategy) -> Self {
        Self {
            base,
            strategy,
            cv: DEFAULT_INNER_FOLDS,
            random_state: 0,
            best: None,
            trace: None,
        }
    }

    /// Number of inner folds
    pub fn with_cv(mut self, cv: usize) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn cv(&self) -> usize {
        self.cv
    }

    pub fn strategy(&self) -> &SearchStrategy {
        &self.strategy
    }

    /// Best parameter setting, after fit
    pub fn best_params(&self) -> Option<&ParamMap> {
        self.trace.as_ref().and_then(|t| t.best()).map(|b| &b.params)
    }

    fn candidates(&self) -> Vec<ParamMap> {
        match &self.strategy {
            SearchStrategy::Grid(grid) => expand_grid(grid),
            SearchStrategy::Random {
                distributions,
                n_iter,
            } => {
                let mut rng = SmallRng::seed_from_u64(self.random_state);
                (0..*n_iter)
                    .map(|_| {
                        distributions
                            .iter()
                            .map(|(name, dist)| (name.clone(), dist.sample(&mut rng)))
                            .collect()
                    })
                    .collect()
            }
        }
    }

    fn searched_names(&self) -> Vec<&String> {
        match &self.strategy {
            SearchStrategy::Grid(grid) => grid.keys().collect(),
            SearchStrategy::Random { distributions, .. } => distributions.keys().collect(),
        }
    }

    fn fitted(&self) -> FoldwiseResult<&dyn Classifier> {
        self.best
            .as_ref()
            .and_then(|best| best.as_classifier())
            .ok_or_else(|| not_fitted(self.kind()))
    }

    /// Fresh base estimator configured with `params`
    fn configured(&self, params: &ParamMap) -> FoldwiseResult<Box<dyn Estimator>> {
        let mut estimator = self.base.clone_box();
        estimator.set_params(params)?;
        estimator.validate()?;
        Ok(estimator)
    }

    fn score_candidate(
        &self,
        params: &ParamMap,
        x: ArrayView2<'_, f64>,
        y: &[usize],
        folds: &[Vec<usize>],
    ) -> FoldwiseResult<Vec<f64>> {
        let n = y.len();
        folds
            .iter()
            .map(|test| {
                let train: Vec<usize> = (0..n).filter(|i| test.binary_search(i).is_err()).collect();
                let mut estimator = self.configured(params)?;
                let classifier = estimator
                    .as_classifier_mut()
                    .ok_or_else(|| not_a_classifier(self.base.kind()))?;
                let train_y: Vec<usize> = train.iter().map(|&i| y[i]).collect();
                classifier.fit(x.select(Axis(0), &train).view(), &train_y)?;
                let predicted = classifier.predict(x.select(Axis(0), test).view())?;
                let truth: Vec<usize> = test.iter().map(|&i| y[i]).collect();
                Ok(accuracy(&predicted, &truth))
            })
            .collect()
    }
}

fn not_a_classifier(kind: &str) -> FoldwiseError {
    FoldwiseError::capability(kind, format!("'{}' is not a classifier", kind))
}

impl Estimator for SearchCv {
    fn kind(&self) -> &'static str {
        match self.strategy {
            SearchStrategy::Grid(_) => "grid_search",
            SearchStrategy::Random { .. } => "randomized_search",
        }
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("cv".into(), self.cv.into());
        params.insert("random_state".into(), ParamValue::Int(self.random_state as i64));
        match &self.strategy {
            SearchStrategy::Grid(grid) => {
                params.insert(
                    "param_grid".into(),
                    serde_json::to_string(grid).unwrap_or_default().into(),
                );
            }
            SearchStrategy::Random {
                distributions,
                n_iter,
            } => {
                params.insert("n_iter".into(), (*n_iter).into());
                params.insert(
                    "param_distributions".into(),
                    serde_json::to_string(distributions).unwrap_or_default().into(),
                );
            }
        }
        for (name, value) in self.base.params() {
            params.insert(format!("estimator__{}", name), value);
        }
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        if let Some(("estimator", inner)) = split_nested(name) {
            return self.base.set_param(inner, value);
        }
        let kind = self.kind();
        match (name, &mut self.strategy) {
            ("cv", _) => {
                self.cv = value.as_i64().filter(|v| *v >= 2).map(|v| v as usize).ok_or_else(
                    || {
                        FoldwiseError::invalid_configuration(
                            "cv",
                            format!("cv must be at least 2; got (cv={})", value.repr()),
                        )
                    },
                )?
            }
            ("random_state", _) => self.random_state = value.as_i64().unwrap_or(0) as u64,
            ("n_iter", SearchStrategy::Random { n_iter, .. }) => {
                *n_iter = value.as_i64().filter(|v| *v > 0).map(|v| v as usize).ok_or_else(
                    || {
                        FoldwiseError::invalid_configuration(
                            "n_iter",
                            format!("n_iter must be positive; got (n_iter={})", value.repr()),
                        )
                    },
                )?
            }
            (other, _) => return Err(unknown_param(kind, other)),
        }
        Ok(())
    }

    fn validate(&self) -> FoldwiseResult<()> {
        if self.cv < 2 {
            return Err(FoldwiseError::invalid_configuration(
                "cv",
                format!("cv must be at least 2; got (cv={})", self.cv),
            ));
        }
        match &self.strategy {
            SearchStrategy::Grid(grid) => {
                if let Some((name, _)) = grid.iter().find(|(_, values)| values.is_empty()) {
                    return Err(FoldwiseError::invalid_configuration(
                        name.as_str(),
                        format!("Parameter grid for '{}' is empty", name),
                    ));
                }
            }
            SearchStrategy::Random {
                distributions,
                n_iter,
            } => {
                if *n_iter == 0 {
                    return Err(FoldwiseError::invalid_configuration(
                        "n_iter",
                        "n_iter must be positive; got (n_iter=0)",
                    ));
                }
                for (name, dist) in distributions {
                    dist.validate(name)?;
                }
            }
        }
        let known = self.base.params();
        if let Some(name) = self.searched_names().into_iter().find(|n| !known.contains_key(*n)) {
            return Err(unknown_param(self.base.kind(), name));
        }
        self.base.validate()
    }

    fn components(&self) -> Vec<(String, &dyn Estimator)> {
        vec![("estimator".to_string(), self.base.as_ref())]
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            base: self.base.clone_box(),
            strategy: self.strategy.clone(),
            cv: self.cv,
            random_state: self.random_state,
            best: None,
            trace: None,
        })
    }

    fn as_classifier(&self) -> Option<&dyn Classifier> {
        self.base.as_classifier().map(|_| self as &dyn Classifier)
    }

    fn as_classifier_mut(&mut self) -> Option<&mut dyn Classifier> {
        if self.base.as_classifier().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Classifier for SearchCv {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize]) -> FoldwiseResult<()> {
        self.validate()?;
        if y.len() < self.cv {
            return Err(FoldwiseError::estimator(
                self.kind(),
                format!("cannot run {}-fold search on {} samples", self.cv, y.len()),
            ));
        }
        let mut rng = SmallRng::seed_from_u64(self.random_state);
        let folds = stratified_folds(y, self.cv, &mut rng);

        let iterations = self
            .candidates()
            .into_iter()
            .map(|params| {
                let split_scores = self.score_candidate(&params, x, y, &folds)?;
                let mean_score = split_scores.iter().sum::<f64>() / split_scores.len() as f64;
                Ok(TraceIteration {
                    params,
                    mean_score,
                    split_scores,
                })
            })
            .collect::<FoldwiseResult<Vec<_>>>()?;

        let best_index = argmax(iterations.iter().map(|it| it.mean_score));
        let mut best = self.configured(&iterations[best_index].params)?;
        best.as_classifier_mut()
            .ok_or_else(|| not_a_classifier(self.base.kind()))?
            .fit(x, y)?;
        debug!(
            search = self.kind(),
            iterations = iterations.len(),
            best_index,
            "search finished"
        );

        self.best = Some(best);
        self.trace = Some(SearchTrace {
            iterations,
            best_index,
        });
        Ok(())
    }

    fn classes(&self) -> &[usize] {
        self.fitted().map(|c| c.classes()).unwrap_or(&[])
    }

    /// Before fit this reflects the base configuration; after fit, the
    /// refitted best one
    fn probability_support(&self) -> ProbabilitySupport {
        let current = self.best.as_ref().unwrap_or(&self.base);
        current.as_classifier().map_or_else(
            || ProbabilitySupport::Unsupported(format!("'{}' is not a classifier", current.kind())),
            |c| c.probability_support(),
        )
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        self.fitted()?.predict_proba(x)
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Vec<usize>> {
        self.fitted()?.predict(x)
    }

    fn search_trace(&self) -> Option<&SearchTrace> {
        self.trace.as_ref()
    }
}
