//! Registry mapping estimator kinds to flow serializers

use super::flow::FlowDescription;
use super::traits::Estimator;
use crate::error::FoldwiseResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Converts an estimator into a flow description
pub trait FlowSerializer: Send + Sync {
    /// Serialize `estimator`; nested components go back through `registry`
    fn serialize(
        &self,
        estimator: &dyn Estimator,
        registry: &FlowRegistry,
    ) -> FoldwiseResult<FlowDescription>;
}

/// Serializer used for kinds without a dedicated registration.
///
/// Names the flow `<prefix>.<kind>`, encodes every hyperparameter as JSON and
/// recurses into components.
#[derive(Debug, Clone)]
pub struct GenericFlowSerializer {
    prefix: String,
    external_version: String,
}

impl GenericFlowSerializer {
    pub fn new(prefix: impl Into<String>, external_version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            external_version: external_version.into(),
        }
    }
}

impl Default for GenericFlowSerializer {
    fn default() -> Self {
        Self::new(
            "foldwise.estimators",
            format!("foldwise=={}", env!("CARGO_PKG_VERSION")),
        )
    }
}

impl FlowSerializer for GenericFlowSerializer {
    fn serialize(
        &self,
        estimator: &dyn Estimator,
        registry: &FlowRegistry,
    ) -> FoldwiseResult<FlowDescription> {
        let components = estimator.components();
        let mut flow = FlowDescription::new(
            format!("{}.{}", self.prefix, estimator.kind()),
            self.external_version.clone(),
        );
        for (name, value) in estimator.params() {
            // component parameters live on the component's own flow
            if name.contains("__") {
                continue;
            }
            flow.parameters.insert(name, value.to_json());
        }
        for (identifier, component) in components {
            flow = flow.with_component(identifier, registry.serialize(component)?);
        }
        if flow.components.is_empty() {
            flow.dependencies = flow.external_version.clone();
        } else {
            let names: Vec<&str> = flow.components.values().map(|c| c.name.as_str()).collect();
            flow.name = format!("{}({})", flow.name, names.join(","));
        }
        Ok(flow)
    }
}

/// Explicit estimator-kind to serializer table
pub struct FlowRegistry {
    serializers: HashMap<String, Arc<dyn FlowSerializer>>,
    fallback: Arc<dyn FlowSerializer>,
}

impl FlowRegistry {
    /// Empty registry; every kind uses the generic serializer
    pub fn new() -> Self {
        Self {
            serializers: HashMap::new(),
            fallback: Arc::new(GenericFlowSerializer::default()),
        }
    }

    /// Register a serializer for one estimator kind
    pub fn register(&mut self, kind: impl Into<String>, serializer: Arc<dyn FlowSerializer>) {
        self.serializers.insert(kind.into(), serializer);
    }

    /// Replace the fallback serializer
    pub fn with_fallback(mut self, serializer: Arc<dyn FlowSerializer>) -> Self {
        self.fallback = serializer;
        self
    }

    /// Check if a kind has a dedicated serializer
    pub fn has_serializer(&self, kind: &str) -> bool {
        self.serializers.contains_key(kind)
    }

    /// Serializer for `kind`, falling back to the generic one
    pub fn serializer_for(&self, kind: &str) -> Arc<dyn FlowSerializer> {
        self.serializers
            .get(kind)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Serialize an estimator with its registered serializer
    pub fn serialize(&self, estimator: &dyn Estimator) -> FoldwiseResult<FlowDescription> {
        self.serializer_for(estimator.kind())
            .serialize(estimator, self)
    }

    pub fn kinds(&self) -> Vec<String> {
        self.serializers.keys().cloned().collect()
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FlowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
