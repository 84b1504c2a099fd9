//! Capability traits for estimators
//!
//! Every model implements [`Estimator`] (hyperparameters, cloning, nesting).
//! What it can *do* is queried through the `as_*` accessors: a model that is
//! not a [`Classifier`] cannot be run on a classification task, whatever else
//! it supports.

use super::params::{ParamMap, ParamValue};
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::estimators::math::argmax;
use crate::search::SearchTrace;
use ndarray::{Array2, ArrayView2};
use std::fmt;

/// Whether a classifier configuration can produce class probabilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbabilitySupport {
    Supported,
    /// Unsupported, with the reason shown to the caller
    Unsupported(String),
}

impl ProbabilitySupport {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }

    /// Convert into a capability error for `estimator`
    pub fn require(self, estimator: &str) -> FoldwiseResult<()> {
        match self {
            Self::Supported => Ok(()),
            Self::Unsupported(reason) => Err(FoldwiseError::capability(estimator, reason)),
        }
    }
}

/// Base trait for all models
pub trait Estimator: Send + Sync + fmt::Debug {
    /// Stable kind identifier, used to look up the flow serializer
    fn kind(&self) -> &'static str;

    /// Current hyperparameters
    fn params(&self) -> ParamMap;

    /// Set one hyperparameter; nested components use `step__param`
    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()>;

    /// Check hyperparameter values without fitting
    fn validate(&self) -> FoldwiseResult<()> {
        Ok(())
    }

    /// Named sub-estimators (pipeline steps, search base estimator)
    fn components(&self) -> Vec<(String, &dyn Estimator)> {
        Vec::new()
    }

    /// Unfitted copy with the same hyperparameters
    fn clone_box(&self) -> Box<dyn Estimator>;

    fn as_classifier(&self) -> Option<&dyn Classifier> {
        None
    }

    fn as_classifier_mut(&mut self) -> Option<&mut dyn Classifier> {
        None
    }

    fn as_regressor(&self) -> Option<&dyn Regressor> {
        None
    }

    fn as_regressor_mut(&mut self) -> Option<&mut dyn Regressor> {
        None
    }

    fn as_transformer(&self) -> Option<&dyn Transformer> {
        None
    }

    fn as_transformer_mut(&mut self) -> Option<&mut dyn Transformer> {
        None
    }

    /// Apply several hyperparameters in name order
    fn set_params(&mut self, params: &ParamMap) -> FoldwiseResult<()> {
        for (name, value) in params {
            self.set_param(name, value.clone())?;
        }
        Ok(())
    }
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A model that predicts class indices
pub trait Classifier: Estimator {
    /// Fit on rows `x` with class indices `y`
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize]) -> FoldwiseResult<()>;

    /// Class indices seen during fit, in `predict_proba` column order
    fn classes(&self) -> &[usize];

    /// One probability row per input row, columns ordered as `classes()`
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>>;

    /// Probability support of the current configuration
    fn probability_support(&self) -> ProbabilitySupport {
        ProbabilitySupport::Supported
    }

    /// Most probable class per row; the first class wins ties
    fn predict(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        let classes = self.classes();
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| classes[argmax(row.iter().copied())])
            .collect())
    }

    /// Search history, for hyperparameter-search wrappers after fit
    fn search_trace(&self) -> Option<&SearchTrace> {
        None
    }
}

/// A model that predicts real values
pub trait Regressor: Estimator {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[f64]) -> FoldwiseResult<()>;

    fn predict(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Vec<f64>>;
}

/// A preprocessing step
pub trait Transformer: Estimator {
    fn fit(&mut self, x: ArrayView2<'_, f64>) -> FoldwiseResult<()>;

    fn transform(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>>;
}

/// Error for predicting with an unfitted model
pub(crate) fn not_fitted(estimator: &str) -> FoldwiseError {
    FoldwiseError::estimator(estimator, "This estimator is not fitted yet; call fit first")
}
