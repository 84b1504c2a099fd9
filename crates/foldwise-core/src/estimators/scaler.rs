//! Standardization transformer

use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::params::unknown_param;
use crate::model::traits::not_fitted;
use crate::model::{Estimator, ParamMap, ParamValue, Transformer};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Column means and standard deviations; zero deviations become 1
pub(crate) fn column_moments(x: ArrayView2<'_, f64>) -> (Array1<f64>, Array1<f64>) {
    let d = x.ncols();
    let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
    let scale = x
        .std_axis(Axis(0), 0.0)
        .mapv(|s| if s > 1e-12 { s } else { 1.0 });
    (mean, scale)
}

/// Removes the mean and scales to unit variance, per column
#[derive(Debug, Clone)]
pub struct StandardScaler {
    with_mean: bool,
    with_std: bool,
    fitted: Option<(Array1<f64>, Array1<f64>)>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            with_mean: true,
            with_std: true,
            fitted: None,
        }
    }

    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.with_mean = with_mean;
        self
    }

    pub fn with_std(mut self, with_std: bool) -> Self {
        self.with_std = with_std;
        self
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for StandardScaler {
    fn kind(&self) -> &'static str {
        "standard_scaler"
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("with_mean".into(), self.with_mean.into());
        params.insert("with_std".into(), self.with_std.into());
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        let flag = value.as_bool().ok_or_else(|| {
            FoldwiseError::invalid_configuration(
                name,
                format!("{} must be a boolean; got {}", name, value.repr()),
            )
        });
        match name {
            "with_mean" => self.with_mean = flag?,
            "with_std" => self.with_std = flag?,
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

    fn as_transformer(&self) -> Option<&dyn Transformer> {
        Some(self)
    }

    fn as_transformer_mut(&mut self) -> Option<&mut dyn Transformer> {
        Some(self)
    }
}

impl Transformer for StandardScaler {
    fn fit(&mut self, x: ArrayView2<'_, f64>) -> FoldwiseResult<()> {
        let (mut mean, mut scale) = column_moments(x);
        if !self.with_mean {
            mean.fill(0.0);
        }
        if !self.with_std {
            scale.fill(1.0);
        }
        self.fitted = Some((mean, scale));
        Ok(())
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        let (mean, scale) = self.fitted.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        if x.ncols() != mean.len() {
            return Err(FoldwiseError::estimator(
                self.kind(),
                format!("fitted on {} features, got {}", mean.len(), x.ncols()),
            ));
        }
        Ok((&x - mean) / scale)
    }
}
