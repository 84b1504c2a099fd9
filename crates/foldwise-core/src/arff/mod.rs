//! ARFF codec
//!
//! The service exchanges datasets, task splits, predictions and search traces
//! as ARFF documents. Only the dense format is supported.

mod reader;
mod value;
mod writer;

pub use reader::parse;
pub use value::{ArffDocument, ArffRow, ArffValue, Attribute, AttributeKind};
