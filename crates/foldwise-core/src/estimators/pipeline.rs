//! Chain of transformers ending in an estimator

use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::params::{split_nested, unknown_param};
use crate::model::{Classifier, Estimator, ParamMap, ParamValue, ProbabilitySupport};
use crate::search::SearchTrace;
use ndarray::{Array2, ArrayView2};

/// Named steps; every step but the last must be a transformer.
///
/// Step parameters are addressed as `<step>__<param>`.
#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<(String, Box<dyn Estimator>)>,
}

impl Pipeline {
    pub fn new(steps: Vec<(String, Box<dyn Estimator>)>) -> FoldwiseResult<Self> {
        let Some((_, head)) = steps.split_last() else {
            return Err(FoldwiseError::invalid_configuration(
                "steps",
                "A pipeline needs at least one step",
            ));
        };
        for (name, step) in head {
            if step.as_transformer().is_none() {
                return Err(FoldwiseError::invalid_configuration(
                    "steps",
                    format!(
                        "All intermediate steps should be transformers; '{}' ({}) isn't",
                        name,
                        step.kind()
                    ),
                ));
            }
        }
        for (i, (name, _)) in steps.iter().enumerate() {
            if name.contains("__") || steps[..i].iter().any(|(other, _)| other == name) {
                return Err(FoldwiseError::invalid_configuration(
                    "steps",
                    format!("Step names must be unique and must not contain '__': '{}'", name),
                ));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, &dyn Estimator)> {
        self.steps.iter().map(|(name, step)| (name.as_str(), step.as_ref()))
    }

    fn final_classifier(&self) -> Option<&dyn Classifier> {
        self.steps.last().and_then(|(_, step)| step.as_classifier())
    }

    fn transform_through(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        let mut current = x.to_owned();
        for (name, step) in &self.steps[..self.steps.len() - 1] {
            let transformer = step.as_transformer().ok_or_else(|| {
                FoldwiseError::estimator("pipeline", format!("step '{}' cannot transform", name))
            })?;
            current = transformer.transform(current.view())?;
        }
        Ok(current)
    }
}

impl Estimator for Pipeline {
    fn kind(&self) -> &'static str {
        "pipeline"
    }

    fn params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        for (name, step) in &self.steps {
            for (param, value) in step.params() {
                params.insert(format!("{}__{}", name, param), value);
            }
        }
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> FoldwiseResult<()> {
        let (step_name, param) = split_nested(name).ok_or_else(|| unknown_param("pipeline", name))?;
        let (_, step) = self
            .steps
            .iter_mut()
            .find(|(candidate, _)| candidate == step_name)
            .ok_or_else(|| unknown_param("pipeline", name))?;
        step.set_param(param, value)
    }

    fn validate(&self) -> FoldwiseResult<()> {
        self.steps.iter().try_for_each(|(_, step)| step.validate())
    }

    fn components(&self) -> Vec<(String, &dyn Estimator)> {
        self.steps
            .iter()
            .map(|(name, step)| (name.clone(), step.as_ref()))
            .collect()
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            steps: self
                .steps
                .iter()
                .map(|(name, step)| (name.clone(), step.clone_box()))
                .collect(),
        })
    }

    fn as_classifier(&self) -> Option<&dyn Classifier> {
        self.final_classifier().map(|_| self as &dyn Classifier)
    }

    fn as_classifier_mut(&mut self) -> Option<&mut dyn Classifier> {
        if self.final_classifier().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Classifier for Pipeline {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize]) -> FoldwiseResult<()> {
        let mut current = x.to_owned();
        let Some(((_, last), head)) = self.steps.split_last_mut() else {
            return Err(FoldwiseError::estimator("pipeline", "empty pipeline"));
        };
        for (name, step) in head {
            let transformer = step.as_transformer_mut().ok_or_else(|| {
                FoldwiseError::estimator("pipeline", format!("step '{}' cannot transform", name))
            })?;
            transformer.fit(current.view())?;
            current = transformer.transform(current.view())?;
        }
        let classifier = last.as_classifier_mut().ok_or_else(|| {
            FoldwiseError::capability("pipeline", "the final step is not a classifier")
        })?;
        classifier.fit(current.view(), y)
    }

    fn classes(&self) -> &[usize] {
        self.final_classifier().map(|c| c.classes()).unwrap_or(&[])
    }

    fn probability_support(&self) -> ProbabilitySupport {
        self.final_classifier().map_or_else(
            || ProbabilitySupport::Unsupported("the final step is not a classifier".into()),
            |c| c.probability_support(),
        )
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Array2<f64>> {
        let classifier = self.final_classifier().ok_or_else(|| {
            FoldwiseError::capability("pipeline", "the final step is not a classifier")
        })?;
        let transformed = self.transform_through(x)?;
        classifier.predict_proba(transformed.view())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> FoldwiseResult<Vec<usize>> {
        let classifier = self.final_classifier().ok_or_else(|| {
            FoldwiseError::capability("pipeline", "the final step is not a classifier")
        })?;
        let transformed = self.transform_through(x)?;
        classifier.predict(transformed.view())
    }

    fn search_trace(&self) -> Option<&SearchTrace> {
        self.final_classifier().and_then(|c| c.search_trace())
    }
}
