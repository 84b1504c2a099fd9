//! Linear classifiers trained with stochastic gradient descent

use super::math::{distinct_classes, linear_scores, normalize_rows, sigmoid};
use super::scaler::column_moments;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::params::{positive_float, unknown_param};
use crate::model::traits::not_fitted;
use crate::model::{Classifier, Estimator, ParamMap, ParamValue, ProbabilitySupport};
use ndarray::{Array1, Array2, ArrayView2};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Loss minimised by [`SgdClassifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgdLoss {
    Hinge,
    Log,
    ModifiedHuber,
}

impl SgdLoss {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hinge => "hinge",
            Self::Log => "log",
            Self::ModifiedHuber => "modified_huber",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "hinge" => Some(Self::Hinge),
            "log" | "log_loss" => Some(Self::Log),
            "modified_huber" => Some(Self::ModifiedHuber),
            _ => None,
        }
    }

    /// dLoss/dScore for a ±1 target
    fn gradient(&self, score: f64, target: f64) -> f64 {
        let margin = score * target;
        match self {
            Self::Hinge => {
                if margin < 1.0 {
                    -target
                } else {
                    0.0
                }
            }
            Self::Log => -target * sigmoid(-margin),
            Self::ModifiedHuber => {
                if margin >= 1.0 {
                    0.0
                } else if margin >= -1.0 {
                    -2.0 * target * (1.0 - margin)
                } else {
                    -4.0 * target
                }
            }
        }
    }
}

/// One-vs-rest linear classifier.
///
/// Only the `log` and `modified_huber` losses yield probability estimates.
#[derive(Debug, Clone)]
pub struct SgdClassifier {
    loss: SgdLoss,
    alpha: f64,
    eta0: f64,
    max_iter: usize,
    random_state: Option<u64>,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    classes: Vec<usize>,
    mean: Array1<f64>,
    scale: Array1<f64>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl SgdClassifier {
    pub fn new(loss: SgdLoss) -> Self {
        Self {
            loss,
            alpha: 1e-4,
            eta0: 0.01,
            max_iter: 20,
            random_state: None,
            fitted: None,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn loss(&self) -> SgdLoss {
        self.loss
    }

    /// Train one binary model for `positive`, returning (weights, bias)
    fn fit_binary(&self, x: &Array2<f64>, y: &[usize], positive: usize, rng: &mut SmallRng) -> (Array1<f64>, f64) {
        let (n, d) = x.dim();
        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        for _ in 0..self.max_iter {
            order.shuffle(rng);
            for &i in &order {
                let row = x.row(i);
                let target = if y[i] == positive { 1.0 } else { -1.0 };
                let score = row.dot(&w) + b;
                let g = self.loss.gradient(score, target);
                w.mapv_inplace(|v| v * (1.0 - self.eta0 * self.alpha));
                if g != 0.0 {
                    w.scaled_add(-self.eta0 * g, &row);
                    b -= self.eta0 * g;
                }
            }
        }
        (w, b)
    }
}

impl Estimator for SgdClassifier {
    fn kind(&self) -> &'static str {
        "sgd_classifier"
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("loss".into(), self.loss.as_str().into());
        params.insert("alpha".into(), self.alpha.into());
        params.insert("eta0".into(), self.eta0.into());
        params.insert("max_iter".into(), self.max_iter.into());
        params.insert(
            "random_state".into(),
            self.random_state
                .map_or(ParamValue::None, |s| ParamValue::Int(s as i64)),
        );
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        match name {
            "loss" => {
                self.loss = value.as_str().and_then(SgdLoss::parse).ok_or_else(|| {
                    FoldwiseError::invalid_configuration(
                        "loss",
                        format!("The loss {} is not supported.", value.repr()),
                    )
                })?
            }
            "alpha" => self.alpha = positive_float(&value, "alpha", "alpha must be > 0")?,
            "eta0" => self.eta0 = positive_float(&value, "eta0", "eta0 must be > 0")?,
            "max_iter" => {
                self.max_iter = value
                    .as_i64()
                    .filter(|v| *v > 0)
                    .map(|v| v as usize)
                    .ok_or_else(|| {
                        FoldwiseError::invalid_configuration(
                            "max_iter",
                            format!("max_iter must be > zero. Got {}", value.repr()),
                        )
                    })?
            }
            "random_state" => self.random_state = value.as_i64().map(|s| s as u64),
            other => return Err(unknown_param(self.kind(), other)),
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            fitted: None,
            ..self.clone()
        })
    }

    fn as_classifier(&self) -> Option<&dyn Classifier> {
        Some(self)
    }

    fn as_classifier_mut(&mut self) -> Option<&mut dyn Classifier> {
        Some(self)
    }
}

impl Classifier for SgdClassifier {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize]) -> FoldwiseResult<()> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(FoldwiseError::estimator(
                self.kind(),
                format!("cannot fit {} rows against {} labels", x.nrows(), y.len()),
            ));
        }
        let classes = distinct_classes(y);
        let (mean, scale) = column_moments(x);
        let xs = (&x - &mean) / &scale;
        let mut rng = SmallRng::seed_from_u64(self.random_state.unwrap_or(0));

        let k = classes.len();
        let mut weights = Array2::<f64>::zeros((k, xs.ncols()));
        let mut bias = Array1::<f64>::zeros(k);
        if k > 1 {
            for (row, &class) in classes.iter().enumerate() {
                let (w, b) = self.fit_binary(&xs, y, class, &mut rng);
                weights.row_mut(row).assign(&w);
                bias[row] = b;
            }
        }

        self.fitted = Some(Fitted {
            classes,
            mean,
            scale,
            weights,
            bias,
        });
        Ok(())
    }

    fn classes(&self) -> &[usize] {
        self.fitted.as_ref().map_or(&[], |f| f.classes.as_slice())
    }

    fn probability_support(&self) -> ProbabilitySupport {
        match self.loss {
            SgdLoss::Log | SgdLoss::ModifiedHuber => ProbabilitySupport::Supported,
            loss => ProbabilitySupport::Unsupported(format!(
                "probability estimates are not available for loss='{}'",
                loss.as_str()
            )),
        }
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        self.probability_support().require(self.kind())?;
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        if fitted.classes.len() == 1 {
            return Ok(Array2::<f64>::ones((x.nrows(), 1)));
        }
        let xs = (&x - &fitted.mean) / &fitted.scale;
        let mut proba = linear_scores(xs.view(), &fitted.weights, &fitted.bias);
        match self.loss {
            SgdLoss::ModifiedHuber => proba.mapv_inplace(|s| (s.clamp(-1.0, 1.0) + 1.0) / 2.0),
            _ => proba.mapv_inplace(sigmoid),
        }
        normalize_rows(&mut proba);
        Ok(proba)
    }

    /// Hinge loss has no probabilities, so predictions use raw scores
    fn predict(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Vec<usize>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        if fitted.classes.len() == 1 {
            return Ok(vec![fitted.classes[0]; x.nrows()]);
        }
        let xs = (&x - &fitted.mean) / &fitted.scale;
        let scores = linear_scores(xs.view(), &fitted.weights, &fitted.bias);
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| fitted.classes[super::math::argmax(row.iter().copied())])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Dataset;

    #[test]
    fn test_hinge_has_no_probabilities() {
        let data = Dataset::synthetic_blobs(10, 2, 3, 1);
        let mut clf = SgdClassifier::new(SgdLoss::Hinge).with_random_state(1);
        let support = clf.probability_support();
        assert_eq!(
            support,
            ProbabilitySupport::Unsupported(
                "probability estimates are not available for loss='hinge'".into()
            )
        );
        clf.fit(data.features(), data.targets()).unwrap();
        assert!(clf.predict_proba(data.features()).unwrap_err().is_capability());
        assert_eq!(clf.predict(data.features()).unwrap().len(), 30);
    }

    #[test]
    fn test_log_loss_probabilities() {
        let data = Dataset::synthetic_blobs(20, 2, 3, 2);
        let mut clf = SgdClassifier::new(SgdLoss::Log).with_random_state(1);
        clf.fit(data.features(), data.targets()).unwrap();
        let proba = clf.predict_proba(data.features()).unwrap();
        assert_eq!(proba.dim(), (60, 3));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        let predictions = clf.predict(data.features()).unwrap();
        let correct = predictions
            .iter()
            .zip(data.targets())
            .filter(|(p, t)| p == t)
            .count();
        assert!(correct > 30);
    }

    #[test]
    fn test_loss_switch_changes_support() {
        let mut clf = SgdClassifier::new(SgdLoss::Hinge);
        clf.set_param("loss", "modified_huber".into()).unwrap();
        assert!(clf.probability_support().is_supported());
        assert!(clf.set_param("loss", "squared".into()).is_err());
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let data = Dataset::synthetic_blobs(10, 3, 2, 5);
        let mut a = SgdClassifier::new(SgdLoss::Log).with_random_state(9);
        let mut b = SgdClassifier::new(SgdLoss::Log).with_random_state(9);
        a.fit(data.features(), data.targets()).unwrap();
        b.fit(data.features(), data.targets()).unwrap();
        assert_eq!(
            a.predict_proba(data.features()).unwrap(),
            b.predict_proba(data.features()).unwrap()
        );
    }
}
