//! SDK constructors and builder methods

use super::FoldwiseSdk;
use foldwise_core::config::{Config, load_config};
use foldwise_core::error::FoldwiseResult;
use foldwise_core::model::FlowRegistry;
use foldwise_core::runs::{RunExecutor, TraceGranularity};
use foldwise_core::service::{RunService, ServiceClient};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

impl FoldwiseSdk {
    /// SDK configured from the default config file and `FOLDWISE_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn new() -> FoldwiseResult<Self> {
        Self::with_config(load_config(None, HashMap::new())?)
    }

    /// SDK configured from a specific file, still honouring the environment
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> FoldwiseResult<Self> {
        Self::with_config(load_config(Some(path.as_ref()), HashMap::new())?)
    }

    /// SDK talking to the service described by `config`
    pub fn with_config(config: Config) -> FoldwiseResult<Self> {
        let service = Arc::new(ServiceClient::new(&config)?);
        Ok(Self {
            config,
            service,
            registry: FlowRegistry::default(),
            executor: RunExecutor::default(),
        })
    }

    /// Replace the remote service, e.g. with a recording double
    pub fn with_service(mut self, service: Arc<dyn RunService>) -> Self {
        self.service = service;
        self
    }

    /// Use a registry with custom flow serializers
    pub fn with_registry(mut self, registry: FlowRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_executor(mut self, executor: RunExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Shorthand for changing only the executor's trace granularity
    pub fn with_trace_granularity(mut self, granularity: TraceGranularity) -> Self {
        self.executor = self.executor.with_trace_granularity(granularity);
        self
    }
}
