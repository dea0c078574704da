//! Export entry point
//!
//! [`ExportFacade`] picks the renderer for the requested format, runs it,
//! hands the payload to the configured [`Delivery`] and folds the outcome
//! into an [`ExportResult`]. Failures, including renderer panics, never
//! escape as anything other than a failed result.

use super::{
    Delivery, DiagramElement, ExportError, ExportResult, ImageExporter, ImageFormat,
    JsonExporter, MarkdownExporter, PdfExporter, PdfLayout, RenderContext, RenderedExport,
    SolutionRenderer, TerraformExporter, YamlExporter,
};
use crate::models::{ExportFormat, ExportOptions, Solution};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{error, info};

/// Dispatches export calls to the format renderers
pub struct ExportFacade<D: Delivery> {
    delivery: D,
    pdf: PdfExporter,
    json: JsonExporter,
    yaml: YamlExporter,
    markdown: MarkdownExporter,
    terraform: TerraformExporter,
    image: ImageExporter,
}

impl<D: Delivery> ExportFacade<D> {
    pub fn new(delivery: D) -> Self {
        Self {
            delivery,
            pdf: PdfExporter::new(),
            json: JsonExporter::new(),
            yaml: YamlExporter::new(),
            markdown: MarkdownExporter::new(),
            terraform: TerraformExporter::default(),
            image: ImageExporter::new(),
        }
    }

    pub fn with_pdf_layout(mut self, layout: PdfLayout) -> Self {
        self.pdf = PdfExporter::with_layout(layout);
        self
    }

    pub fn with_terraform(mut self, terraform: TerraformExporter) -> Self {
        self.terraform = terraform;
        self
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Export `solutions` in the requested format and deliver the result
    ///
    /// Image formats capture `diagram` and ignore `solutions`; every other
    /// format ignores `diagram`.
    pub fn export(
        &self,
        solutions: &[Solution],
        options: &ExportOptions,
        diagram: Option<&dyn DiagramElement>,
    ) -> ExportResult {
        self.export_at(solutions, options, diagram, &RenderContext::now())
    }

    /// Like [`export`](Self::export) with an explicit export instant
    pub fn export_at(
        &self,
        solutions: &[Solution],
        options: &ExportOptions,
        diagram: Option<&dyn DiagramElement>,
        ctx: &RenderContext,
    ) -> ExportResult {
        let outcome = self
            .render(solutions, options, diagram, ctx)
            .and_then(|export| {
                self.delivery.deliver(&export)?;
                Ok(export)
            });

        match outcome {
            Ok(export) => {
                info!(
                    "Exported {} solution(s) as {} to {} ({} bytes)",
                    solutions.len(),
                    options.format,
                    export.filename,
                    export.data.len()
                );
                ExportResult::succeeded(export)
            }
            Err(e) => {
                error!("{} export failed: {}", options.format, e);
                ExportResult::failed(e.to_string())
            }
        }
    }

    /// Render without delivering
    pub fn render(
        &self,
        solutions: &[Solution],
        options: &ExportOptions,
        diagram: Option<&dyn DiagramElement>,
        ctx: &RenderContext,
    ) -> Result<RenderedExport, ExportError> {
        let format = options.format;
        if format == ExportFormat::CloudFormation {
            return Err(ExportError::UnsupportedFormat(format));
        }

        if let Some(image_format) = ImageFormat::from_export_format(format) {
            let element = diagram.ok_or(ExportError::DiagramNotFound)?;
            return guarded(|| self.image.render(element, image_format, options, ctx));
        }

        if solutions.is_empty() {
            return Err(ExportError::NoSolutions);
        }

        let renderer: &dyn SolutionRenderer = match format {
            ExportFormat::Pdf => &self.pdf,
            ExportFormat::Json => &self.json,
            ExportFormat::Yaml => &self.yaml,
            ExportFormat::Markdown => &self.markdown,
            ExportFormat::Terraform => &self.terraform,
            ExportFormat::Png | ExportFormat::Svg | ExportFormat::CloudFormation => {
                return Err(ExportError::UnsupportedFormat(format));
            }
        };
        guarded(|| renderer.render(solutions, options, ctx))
    }
}

/// Run a renderer, turning a panic into a render error
fn guarded<F>(render: F) -> Result<RenderedExport, ExportError>
where
    F: FnOnce() -> Result<RenderedExport, ExportError>,
{
    catch_unwind(AssertUnwindSafe(render)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "renderer panicked".to_string());
        Err(ExportError::RenderError(message))
    })
}
