//! Baseline classifier that ignores the features

use super::math::distinct_classes;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::params::unknown_param;
use crate::model::traits::not_fitted;
use crate::model::{Classifier, Estimator, ParamMap, ParamValue};
use ndarray::{Array2, ArrayView2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// How the dummy classifier predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyStrategy {
    /// Class priors from the training labels
    Prior,
    /// All mass on the most frequent training class
    MostFrequent,
    /// Equal probability for every training class
    Uniform,
    /// Random one-hot rows drawn from the class priors
    Stratified,
}

impl DummyStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prior => "prior",
            Self::MostFrequent => "most_frequent",
            Self::Uniform => "uniform",
            Self::Stratified => "stratified",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "prior" => Some(Self::Prior),
            "most_frequent" => Some(Self::MostFrequent),
            "uniform" => Some(Self::Uniform),
            "stratified" => Some(Self::Stratified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DummyClassifier {
    strategy: DummyStrategy,
    random_state: Option<u64>,
    classes: Vec<usize>,
    priors: Vec<f64>,
}

impl DummyClassifier {
    pub fn new(strategy: DummyStrategy) -> Self {
        Self {
            strategy,
            random_state: None,
            classes: Vec::new(),
            priors: Vec::new(),
        }
    }

    pub fn prior() -> Self {
        Self::new(DummyStrategy::Prior)
    }

    pub fn most_frequent() -> Self {
        Self::new(DummyStrategy::MostFrequent)
    }

    pub fn uniform() -> Self {
        Self::new(DummyStrategy::Uniform)
    }

    pub fn strategy(&self) -> DummyStrategy {
        self.strategy
    }

    fn probability_row(&self) -> Vec<f64> {
        let k = self.classes.len();
        match self.strategy {
            DummyStrategy::Prior | DummyStrategy::Stratified => self.priors.clone(),
            DummyStrategy::MostFrequent => {
                let best = super::math::argmax(self.priors.iter().copied());
                (0..k).map(|i| if i == best { 1.0 } else { 0.0 }).collect()
            }
            DummyStrategy::Uniform => vec![1.0 / k as f64; k],
        }
    }
}

impl Default for DummyClassifier {
    fn default() -> Self {
        Self::prior()
    }
}

impl Estimator for DummyClassifier {
    fn kind(&self) -> &'static str {
        "dummy"
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("strategy".into(), self.strategy.as_str().into());
        params.insert(
            "random_state".into(),
            self.random_state
                .map_or(ParamValue::None, |s| ParamValue::Int(s as i64)),
        );
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        match name {
            "strategy" => {
                self.strategy = value
                    .as_str()
                    .and_then(DummyStrategy::parse)
                    .ok_or_else(|| {
                        FoldwiseError::invalid_configuration(
                            "strategy",
                            format!("Unknown dummy strategy {}", value.repr()),
                        )
                    })?;
            }
            "random_state" => self.random_state = value.as_i64().map(|s| s as u64),
            other => return Err(unknown_param(self.kind(), other)),
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            random_state: self.random_state,
            ..Self::new(self.strategy)
        })
    }

    fn as_classifier(&self) -> Option<&dyn Classifier> {
        Some(self)
    }

    fn as_classifier_mut(&mut self) -> Option<&mut dyn Classifier> {
        Some(self)
    }
}

impl Classifier for DummyClassifier {
    fn fit(&mut self, _x: ArrayView2<'_, f64>, y: &[usize]) -> FoldwiseResult<()> {
        if y.is_empty() {
            return Err(FoldwiseError::estimator(self.kind(), "cannot fit on zero samples"));
        }
        self.classes = distinct_classes(y);
        self.priors = self
            .classes
            .iter()
            .map(|c| y.iter().filter(|&&label| label == *c).count() as f64 / y.len() as f64)
            .collect();
        Ok(())
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        if self.classes.is_empty() {
            return Err(not_fitted(self.kind()));
        }
        let k = self.classes.len();
        if self.strategy == DummyStrategy::Stratified {
            let mut rng = SmallRng::seed_from_u64(self.random_state.unwrap_or(0));
            let mut proba = Array2::<f64>::zeros((x.nrows(), k));
            for mut row in proba.rows_mut() {
                let draw: f64 = rng.gen_range(0.0..1.0);
                let mut cumulative = 0.0;
                let mut chosen = k - 1;
                for (i, p) in self.priors.iter().enumerate() {
                    cumulative += p;
                    if draw < cumulative {
                        chosen = i;
                        break;
                    }
                }
                row[chosen] = 1.0;
            }
            return Ok(proba);
        }
        let row = self.probability_row();
        let mut proba = Array2::<f64>::zeros((x.nrows(), k));
        for mut out in proba.rows_mut() {
            out.iter_mut().zip(&row).for_each(|(o, p)| *o = *p);
        }
        Ok(proba)
    }
}
