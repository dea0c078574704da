//! Models module for the exporter
//!
//! Defines the solution records handed over by the persistence layer and
//! the per-call export options. Nested solution fields arrive JSON-encoded
//! and are decoded on demand, best-effort.

pub mod options;
pub mod solution;

pub use options::{ExportFormat, ExportOptions, Orientation, PageSize, Quality};
pub use solution::{
    Architecture, ArchitectureComponent, ArchitectureConnection, AwsService, EncodedField, Position,
    Solution, SolutionStatus,
};
