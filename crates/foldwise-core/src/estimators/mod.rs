//! Reference estimators
//!
//! Small, dependency-free implementations used by the executor tests, the
//! CLI and anyone who wants a baseline. They are not tuned for accuracy.

pub mod dummy;
pub mod linear;
pub mod logistic;
pub mod math;
pub mod pipeline;
pub mod scaler;
pub mod sgd;

pub use dummy::{DummyClassifier, DummyStrategy};
pub use linear::LinearRegression;
pub use logistic::LogisticRegression;
pub use pipeline::Pipeline;
pub use scaler::StandardScaler;
pub use sgd::{SgdClassifier, SgdLoss};
