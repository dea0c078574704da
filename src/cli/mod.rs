//! Command-line interface (feature `cli`)

pub mod commands;
pub mod error;
pub mod logging;
