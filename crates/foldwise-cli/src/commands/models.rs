//! Estimators selectable from the command line

use clap::ValueEnum;
use foldwise_core::error::FoldwiseResult;
use foldwise_core::estimators::{
    DummyClassifier, LinearRegression, LogisticRegression, Pipeline, SgdClassifier, SgdLoss,
    StandardScaler,
};
use foldwise_core::model::{Estimator, ParamValue};
use foldwise_core::search::{ParamDistribution, ParamGrid, SearchCv};
use std::collections::BTreeMap;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Class prior baseline
    Dummy,
    /// Multinomial logistic regression
    Logistic,
    /// Scaled linear SGD with log loss
    SgdLog,
    /// Scaled linear SGD with hinge loss (no probabilities)
    SgdHinge,
    /// Least squares regression (not a classifier)
    Linear,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchChoice {
    Grid,
    Random,
}

fn sgd_pipeline(loss: SgdLoss, seed: u64) -> FoldwiseResult<Box<dyn Estimator>> {
    Ok(Box::new(Pipeline::new(vec![
        (
            "scaler".to_string(),
            Box::new(StandardScaler::new()) as Box<dyn Estimator>,
        ),
        (
            "sgd".to_string(),
            Box::new(SgdClassifier::new(loss).with_random_state(seed)),
        ),
    ])?))
}

fn base_estimator(model: ModelChoice, seed: u64) -> FoldwiseResult<Box<dyn Estimator>> {
    Ok(match model {
        ModelChoice::Dummy => {
            let mut dummy = DummyClassifier::prior();
            dummy.set_param("random_state", ParamValue::from(seed as i64))?;
            Box::new(dummy)
        }
        ModelChoice::Logistic => Box::new(LogisticRegression::new()),
        ModelChoice::SgdLog => sgd_pipeline(SgdLoss::Log, seed)?,
        ModelChoice::SgdHinge => sgd_pipeline(SgdLoss::Hinge, seed)?,
        ModelChoice::Linear => Box::new(LinearRegression::new()),
    })
}

fn floats(values: &[f64]) -> Vec<ParamValue> {
    values.iter().copied().map(ParamValue::from).collect()
}

fn search_grid(model: ModelChoice) -> ParamGrid {
    let mut grid = ParamGrid::new();
    match model {
        ModelChoice::Dummy => {
            grid.insert(
                "strategy".into(),
                vec!["prior".into(), "most_frequent".into(), "uniform".into()],
            );
        }
        ModelChoice::Logistic => {
            grid.insert("C".into(), floats(&[0.01, 0.1, 1.0, 10.0]));
        }
        ModelChoice::SgdLog | ModelChoice::SgdHinge => {
            grid.insert("sgd__alpha".into(), floats(&[1e-5, 1e-4, 1e-3]));
        }
        ModelChoice::Linear => {
            grid.insert("fit_intercept".into(), vec![true.into(), false.into()]);
        }
    }
    grid
}

fn search_distributions(model: ModelChoice) -> BTreeMap<String, ParamDistribution> {
    let mut distributions = BTreeMap::new();
    match model {
        ModelChoice::Logistic => {
            distributions.insert(
                "C".to_string(),
                ParamDistribution::LogUniform {
                    low: 1e-3,
                    high: 1e2,
                },
            );
        }
        ModelChoice::SgdLog | ModelChoice::SgdHinge => {
            distributions.insert(
                "sgd__alpha".to_string(),
                ParamDistribution::LogUniform {
                    low: 1e-6,
                    high: 1e-2,
                },
            );
        }
        other => {
            for (name, values) in search_grid(other) {
                distributions.insert(name, ParamDistribution::choice(values));
            }
        }
    }
    distributions
}

/// Build the estimator for `model`, wrapped in a search when requested
pub fn build_estimator(
    model: ModelChoice,
    search: Option<SearchChoice>,
    n_iter: usize,
    seed: u64,
) -> FoldwiseResult<Box<dyn Estimator>> {
    let base = base_estimator(model, seed)?;
    Ok(match search {
        None => base,
        Some(SearchChoice::Grid) => {
            Box::new(SearchCv::grid(base, search_grid(model)).with_random_state(seed))
        }
        Some(SearchChoice::Random) => Box::new(
            SearchCv::random(base, search_distributions(model), n_iter).with_random_state(seed),
        ),
    })
}
