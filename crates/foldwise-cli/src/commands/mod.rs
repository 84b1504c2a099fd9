//! Command handlers

pub mod config;
pub mod models;
pub mod run;
pub mod runs;
pub mod tasks;
