//! Client for the experiment-tracking service
//!
//! All calls go through [`RunService`]; [`ServiceClient`] is the HTTP
//! implementation. Requests are issued one at a time and never retried.

mod client;
mod errors;
mod publish;
mod tasks;
mod traits;
mod wire;

pub use client::ServiceClient;
pub use errors::{NOT_FOUND_CODES, NO_RESULTS_CODE};
pub use traits::RunService;
