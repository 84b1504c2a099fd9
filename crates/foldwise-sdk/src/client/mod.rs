//! SDK client implementation

use foldwise_core::config::Config;
use foldwise_core::model::FlowRegistry;
use foldwise_core::runs::RunExecutor;
use foldwise_core::service::RunService;
use std::sync::Arc;

mod builder;
mod execution;

/// Facade over the task service, the flow registry and the run executor.
///
/// ```no_run
/// use foldwise_sdk::{FoldwiseSdk, RunFilter};
///
/// # async fn example() -> foldwise_sdk::FoldwiseResult<()> {
/// let sdk = FoldwiseSdk::new()?;
/// let runs = sdk.list_runs(&RunFilter::new().tasks([59]).size(10)).await?;
/// for (id, summary) in runs {
///     println!("{} flow={} uploader={}", id, summary.flow_id, summary.uploader);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FoldwiseSdk {
    pub(crate) config: Config,
    pub(crate) service: Arc<dyn RunService>,
    pub(crate) registry: FlowRegistry,
    pub(crate) executor: RunExecutor,
}

impl FoldwiseSdk {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &RunExecutor {
        &self.executor
    }

    /// The service backing remote calls
    pub fn service(&self) -> &Arc<dyn RunService> {
        &self.service
    }
}

impl std::fmt::Debug for FoldwiseSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldwiseSdk")
            .field("server", &self.config.server)
            .field("registry", &self.registry)
            .field("executor", &self.executor)
            .finish()
    }
}
