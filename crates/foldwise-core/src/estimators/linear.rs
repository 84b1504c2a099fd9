//! Ordinary least squares regression

use super::math::solve;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::params::unknown_param;
use crate::model::traits::not_fitted;
use crate::model::{Estimator, ParamMap, ParamValue, Regressor};
use ndarray::{Array1, Array2, ArrayView2, Axis, concatenate};

#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
    coefficients: Option<Array1<f64>>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            fit_intercept: true,
            coefficients: None,
        }
    }

    fn design(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        if !self.fit_intercept {
            return Ok(x.to_owned());
        }
        let ones = Array2::<f64>::ones((x.nrows(), 1));
        let design = concatenate(Axis(1), &[ones.view(), x.view()])?;
        Ok(design)
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for LinearRegression {
    fn kind(&self) -> &'static str {
        "linear_regression"
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("fit_intercept".into(), self.fit_intercept.into());
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        match name {
            "fit_intercept" => {
                self.fit_intercept = value.as_bool().ok_or_else(|| {
                    FoldwiseError::invalid_configuration(
                        "fit_intercept",
                        format!("fit_intercept must be a boolean; got {}", value.repr()),
                    )
                })?
            }
            other => return Err(unknown_param(self.kind(), other)),
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            fit_intercept: self.fit_intercept,
            coefficients: None,
        })
    }

    fn as_regressor(&self) -> Option<&dyn Regressor> {
        Some(self)
    }

    fn as_regressor_mut(&mut self) -> Option<&mut dyn Regressor> {
        Some(self)
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[f64]) -> FoldwiseResult<()> {
        if x.nrows() != y.len() {
            return Err(FoldwiseError::estimator(
                self.kind(),
                format!("{} rows but {} targets", x.nrows(), y.len()),
            ));
        }
        let design = self.design(x)?;
        let mut gram = design.t().dot(&design);
        // tiny ridge keeps collinear designs solvable
        for i in 0..gram.nrows() {
            gram[[i, i]] += 1e-10;
        }
        let rhs = design.t().dot(&Array1::from(y.to_vec()));
        let coefficients = solve(gram, rhs).ok_or_else(|| {
            FoldwiseError::estimator(self.kind(), "singular design matrix")
        })?;
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Vec<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| not_fitted(self.kind()))?;
        Ok(self.design(x)?.dot(coefficients).to_vec())
    }
}
