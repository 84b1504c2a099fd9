//! Estimator capabilities, flow descriptions and the model adapter

pub mod adapter;
pub mod flow;
pub mod params;
pub mod registry;
pub mod traits;

pub use adapter::ModelAdapter;
pub use flow::{FlowDescription, ParameterSetting};
pub use params::{ParamMap, ParamValue};
pub use registry::{FlowRegistry, FlowSerializer, GenericFlowSerializer};
pub use traits::{Classifier, Estimator, ProbabilitySupport, Regressor, Transformer};
