//! Flow descriptions: the transmittable form of a model configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDescription {
    pub name: String,
    pub external_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter name to JSON-encoded value
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Nested flows keyed by component identifier
    #[serde(default)]
    pub components: BTreeMap<String, FlowDescription>,
    #[serde(default)]
    pub dependencies: String,
}

impl FlowDescription {
    pub fn new(name: impl Into<String>, external_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_version: external_version.into(),
            description: None,
            parameters: BTreeMap::new(),
            components: BTreeMap::new(),
            dependencies: String::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_component(mut self, identifier: impl Into<String>, flow: FlowDescription) -> Self {
        self.components.insert(identifier.into(), flow);
        self
    }

    /// Flatten into per-parameter settings, this flow first then components
    pub fn parameter_settings(&self) -> Vec<ParameterSetting> {
        let mut settings: Vec<ParameterSetting> = self
            .parameters
            .iter()
            .map(|(name, value)| ParameterSetting {
                component: self.name.clone(),
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        for component in self.components.values() {
            settings.extend(component.parameter_settings());
        }
        settings
    }
}

/// One parameter value of one flow component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSetting {
    pub component: String,
    pub name: String,
    pub value: String,
}
