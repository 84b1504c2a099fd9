//! Bridge from a caller-supplied estimator to something the executor can run

use super::flow::{FlowDescription, ParameterSetting};
use super::registry::FlowRegistry;
use super::traits::Estimator;
use crate::error::{FoldwiseError, FoldwiseResult};
use tracing::debug;

/// A validated classifier together with its flow description
#[derive(Debug)]
pub struct ModelAdapter {
    estimator: Box<dyn Estimator>,
    flow: FlowDescription,
}

impl ModelAdapter {
    /// Validate and wrap an estimator.
    ///
    /// Checks run in order: hyperparameter validation, classifier capability,
    /// probability support, then flow serialization. The first failure is
    /// returned and nothing after it runs.
    pub fn new(estimator: Box<dyn Estimator>, registry: &FlowRegistry) -> FoldwiseResult<Self> {
        estimator.validate()?;

        let classifier = estimator.as_classifier().ok_or_else(|| {
            FoldwiseError::capability(
                estimator.kind(),
                format!(
                    "'{}' has no predict_proba and cannot be run on a classification task",
                    estimator.kind()
                ),
            )
        })?;
        classifier.probability_support().require(estimator.kind())?;

        let flow = registry.serialize(estimator.as_ref())?;
        debug!(flow = %flow.name, "adapted estimator");
        Ok(Self { estimator, flow })
    }

    pub fn kind(&self) -> &'static str {
        self.estimator.kind()
    }

    /// The wrapped, unfitted estimator
    pub fn estimator(&self) -> &dyn Estimator {
        self.estimator.as_ref()
    }

    pub fn flow(&self) -> &FlowDescription {
        &self.flow
    }

    pub fn parameter_settings(&self) -> Vec<ParameterSetting> {
        self.flow.parameter_settings()
    }

    /// A fresh unfitted copy for one fold
    pub fn fresh_estimator(&self) -> Box<dyn Estimator> {
        self.estimator.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::{LinearRegression, LogisticRegression, SgdClassifier, SgdLoss};
    use crate::model::{FlowSerializer, ParamValue};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSerializer(AtomicUsize);

    impl FlowSerializer for CountingSerializer {
        fn serialize(
            &self,
            estimator: &dyn Estimator,
            _registry: &FlowRegistry,
        ) -> FoldwiseResult<FlowDescription> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(FlowDescription::new(estimator.kind(), "test"))
        }
    }

    fn counting_registry() -> (FlowRegistry, Arc<CountingSerializer>) {
        let serializer = Arc::new(CountingSerializer::default());
        let registry = FlowRegistry::new().with_fallback(serializer.clone());
        (registry, serializer)
    }

    #[test]
    fn test_invalid_penalty_fails_before_serialization() {
        let (registry, serializer) = counting_registry();
        let mut model = LogisticRegression::new();
        model.set_param("C", ParamValue::from("abc")).unwrap();

        let err = ModelAdapter::new(Box::new(model), &registry).unwrap_err();
        assert!(err.is_invalid_configuration());
        assert!(err.to_string().contains("Penalty term must be positive; got (C='abc')"));
        assert_eq!(serializer.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_regressor_is_rejected() {
        let (registry, serializer) = counting_registry();
        let err = ModelAdapter::new(Box::new(LinearRegression::new()), &registry).unwrap_err();
        assert!(err.is_capability());
        assert_eq!(serializer.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_hinge_loss_is_rejected() {
        let err = ModelAdapter::new(
            Box::new(SgdClassifier::new(SgdLoss::Hinge)),
            &FlowRegistry::new(),
        )
        .unwrap_err();
        assert!(err.is_capability());
        assert!(
            err.to_string()
                .contains("probability estimates are not available for loss='hinge'")
        );
    }

    #[test]
    fn test_adapter_builds_flow() {
        let adapter =
            ModelAdapter::new(Box::new(LogisticRegression::new()), &FlowRegistry::new()).unwrap();
        assert_eq!(adapter.kind(), "logistic_regression");
        assert!(adapter.flow().parameters.contains_key("C"));
        assert!(!adapter.parameter_settings().is_empty());
        assert_eq!(adapter.fresh_estimator().kind(), "logistic_regression");
    }
}
