//! VibeSolver export - multi-format export pipeline for architecture solutions
//!
//! Turns a selection of [`Solution`] records into a named, downloadable
//! payload:
//! - PDF report
//! - PNG / SVG architecture diagram
//! - JSON and YAML structured data
//! - Markdown documentation
//! - Terraform scaffold
//!
//! ```no_run
//! use vibesolver_export::{ExportFacade, ExportFormat, ExportOptions, MemoryDelivery, Solution};
//!
//! let facade = ExportFacade::new(MemoryDelivery::new());
//! let solutions = vec![Solution::new("s1", "Demo", "A static website")];
//! let result = facade.export(&solutions, &ExportOptions::new(ExportFormat::Markdown), None);
//! assert!(result.success);
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod export;
pub mod models;

pub use config::{ConfigError, ExportConfig};
#[cfg(feature = "png-export")]
pub use export::rasterize_png;
pub use export::{
    ArchitectureCanvas, Delivery, DiagramElement, DirectoryDelivery, ExportData, ExportDocument,
    ExportError, ExportFacade, ExportResult, ImageExporter, JsonExporter, MarkdownExporter,
    MemoryDelivery, PdfExporter, PdfLayout, RenderContext, RenderedExport, SolutionRenderer,
    TerraformExporter, YamlExporter, resource_type_for,
};
pub use models::{
    Architecture, ArchitectureComponent, ArchitectureConnection, AwsService, ExportFormat,
    ExportOptions, Orientation, PageSize, Position, Quality, Solution, SolutionStatus,
};
