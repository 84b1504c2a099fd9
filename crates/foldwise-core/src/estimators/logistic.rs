//! Multinomial logistic regression

use super::math::{distinct_classes, encode_labels, linear_scores, softmax_rows};
use super::scaler::column_moments;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::params::{positive_float, unknown_param};
use crate::model::traits::not_fitted;
use crate::model::{Classifier, Estimator, ParamMap, ParamValue};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Softmax regression fitted by full-batch gradient descent with an L2
/// penalty of strength `1 / C`. Features are standardized internally.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    c: ParamValue,
    max_iter: usize,
    learning_rate: f64,
    tol: f64,
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

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            c: ParamValue::Float(1.0),
            max_iter: 200,
            learning_rate: 0.5,
            tol: 1e-6,
            fitted: None,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = ParamValue::Float(c);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn penalty(&self) -> FoldwiseResult<f64> {
        positive_float(&self.c, "C", "Penalty term must be positive")
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("C".into(), self.c.clone());
        params.insert("max_iter".into(), self.max_iter.into());
        params.insert("learning_rate".into(), self.learning_rate.into());
        params.insert("tol".into(), self.tol.into());
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        match name {
            // checked in validate so bad values surface with the estimator's wording
            "C" => self.c = value,
            "max_iter" => {
                self.max_iter = value
                    .as_i64()
                    .filter(|v| *v > 0)
                    .map(|v| v as usize)
                    .ok_or_else(|| {
                        FoldwiseError::invalid_configuration(
                            "max_iter",
                            format!(
                                "Maximum number of iteration must be positive; got (max_iter={})",
                                value.repr()
                            ),
                        )
                    })?
            }
            "learning_rate" => {
                self.learning_rate =
                    positive_float(&value, "learning_rate", "Learning rate must be positive")?
            }
            "tol" => self.tol = positive_float(&value, "tol", "Tolerance must be positive")?,
            other => return Err(unknown_param(self.kind(), other)),
        }
        Ok(())
    }

    fn validate(&self) -> FoldwiseResult<()> {
        self.penalty().map(|_| ())
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

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize]) -> FoldwiseResult<()> {
        let c = self.penalty()?;
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(FoldwiseError::estimator(
                self.kind(),
                format!("cannot fit {} rows against {} labels", x.nrows(), y.len()),
            ));
        }

        let classes = distinct_classes(y);
        let (mean, scale) = column_moments(x);
        let xs = (&x - &mean) / &scale;
        let (n, d) = xs.dim();
        let k = classes.len();

        let mut weights = Array2::<f64>::zeros((k, d));
        let mut bias = Array1::<f64>::zeros(k);

        if k > 1 {
            let encoded = encode_labels(y, &classes);
            let mut onehot = Array2::<f64>::zeros((n, k));
            for (i, &label) in encoded.iter().enumerate() {
                onehot[[i, label]] = 1.0;
            }
            let l2 = 1.0 / (c * n as f64);

            for _ in 0..self.max_iter {
                let mut proba = linear_scores(xs.view(), &weights, &bias);
                softmax_rows(&mut proba);
                let residual = proba - &onehot;
                let grad_w = residual.t().dot(&xs) / n as f64 + &weights * l2;
                let grad_b = residual.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(k));

                weights.scaled_add(-self.learning_rate, &grad_w);
                bias.scaled_add(-self.learning_rate, &grad_b);

                let step = grad_w.iter().chain(grad_b.iter()).fold(0.0_f64, |m, g| m.max(g.abs()));
                if step < self.tol {
                    break;
                }
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

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        let xs = (&x - &fitted.mean) / &fitted.scale;
        let mut proba = linear_scores(xs.view(), &fitted.weights, &fitted.bias);
        softmax_rows(&mut proba);
        Ok(proba)
    }
}
