//! PDF report exporter
//!
//! Renders a batch of solutions into a paginated PDF report. Each solution
//! starts on a fresh page with its title, description and the sections the
//! export options ask for.
//!
//! ## Layout
//!
//! Positions are tracked in millimetres from the top-left corner and
//! converted to PDF points when text is emitted. Every text block is word
//! wrapped to the printable width and advances a vertical cursor by
//! `lines x line_height`. When the next line would cross the bottom margin
//! a new page is started, so long solutions flow onto continuation pages.
//!
//! ## Output
//!
//! The document is written by hand as an uncompressed PDF 1.4 file using
//! the built-in Helvetica fonts, so no external PDF dependency is needed.

use super::{ExportError, RenderContext, RenderedExport, SolutionRenderer, format_amount};
use crate::models::{ExportFormat, ExportOptions, Solution};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Millimetres to PDF points
const MM_TO_PT: f64 = 2.83465;

/// Approximate Helvetica glyph width as a fraction of the font size
const CHAR_WIDTH_FACTOR: f64 = 0.5;

const PRODUCER: &str = "VibeSolver Export";

/// Layout parameters of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfLayout {
    /// Page margin on every side (mm)
    #[serde(default = "default_margin")]
    pub margin_mm: f64,

    /// Vertical advance per text line (mm)
    #[serde(default = "default_line_height")]
    pub line_height_mm: f64,

    /// Solution title font size (pt)
    #[serde(default = "default_title_size")]
    pub title_font_size: f64,

    /// Description font size (pt)
    #[serde(default = "default_body_size")]
    pub body_font_size: f64,

    /// Section heading font size (pt)
    #[serde(default = "default_heading_size")]
    pub heading_font_size: f64,

    /// Font size of section content (pt)
    #[serde(default = "default_detail_size")]
    pub detail_font_size: f64,

    /// Print "Page N" in the footer
    #[serde(default = "default_true")]
    pub show_page_numbers: bool,
}

fn default_margin() -> f64 {
    20.0
}

fn default_line_height() -> f64 {
    7.0
}

fn default_title_size() -> f64 {
    20.0
}

fn default_body_size() -> f64 {
    12.0
}

fn default_heading_size() -> f64 {
    14.0
}

fn default_detail_size() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            margin_mm: default_margin(),
            line_height_mm: default_line_height(),
            title_font_size: default_title_size(),
            body_font_size: default_body_size(),
            heading_font_size: default_heading_size(),
            detail_font_size: default_detail_size(),
            show_page_numbers: default_true(),
        }
    }
}

/// A rendered PDF report
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "/F1",
            Font::Bold => "/F2",
        }
    }
}

/// Cursor-driven page builder producing one content stream per page
struct PageWriter<'a> {
    layout: &'a PdfLayout,
    width_mm: f64,
    height_mm: f64,
    pages: Vec<String>,
    stream: String,
    y: f64,
}

impl<'a> PageWriter<'a> {
    fn new(layout: &'a PdfLayout, (width_mm, height_mm): (f64, f64)) -> Self {
        Self {
            layout,
            width_mm,
            height_mm,
            pages: Vec::new(),
            stream: String::new(),
            y: layout.margin_mm,
        }
    }

    fn content_bottom(&self) -> f64 {
        self.height_mm - self.layout.margin_mm
    }

    fn printable_width(&self) -> f64 {
        self.width_mm - 2.0 * self.layout.margin_mm
    }

    /// Characters that fit in `width_mm` at `font_size`
    fn chars_per_line(&self, width_mm: f64, font_size: f64) -> usize {
        let chars = (width_mm * MM_TO_PT) / (font_size * CHAR_WIDTH_FACTOR);
        (chars as usize).max(10)
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.layout.margin_mm
    }

    fn new_page(&mut self) {
        self.render_footer();
        self.pages.push(std::mem::take(&mut self.stream));
        self.y = self.layout.margin_mm;
    }

    /// Break the page if `needed_mm` would cross the bottom margin
    fn ensure_space(&mut self, needed_mm: f64) {
        if self.y + needed_mm > self.content_bottom() && !self.at_page_top() {
            debug!(
                "Page {} overflow at {:.1}mm, starting a new page",
                self.pages.len() + 1,
                self.y
            );
            self.new_page();
        }
    }

    fn advance(&mut self, mm: f64) {
        self.y += mm;
    }

    fn text_at(&mut self, font: Font, size: f64, x_mm: f64, y_mm: f64, text: &str) {
        let x_pt = x_mm * MM_TO_PT;
        let y_pt = (self.height_mm - y_mm) * MM_TO_PT;
        self.stream.push_str("BT\n");
        self.stream
            .push_str(&format!("{} {:.1} Tf\n", font.resource(), size));
        self.stream.push_str("0 0 0 rg\n");
        self.stream
            .push_str(&format!("1 0 0 1 {:.2} {:.2} Tm\n", x_pt, y_pt));
        self.stream
            .push_str(&format!("({}) Tj\n", escape_pdf_string(text)));
        self.stream.push_str("ET\n");
    }

    /// Word wrap `text` and emit it line by line, each line advancing
    /// `line_advance` millimetres
    fn paragraph(
        &mut self,
        font: Font,
        size: f64,
        indent_mm: f64,
        text: &str,
        line_advance: f64,
    ) -> usize {
        let width = self.printable_width() - 2.0 * indent_mm;
        let lines = word_wrap(text, self.chars_per_line(width, size));
        for line in &lines {
            self.ensure_space(line_advance);
            let x = self.layout.margin_mm + indent_mm;
            let y = self.y;
            self.text_at(font, size, x, y, line);
            self.advance(line_advance);
        }
        lines.len()
    }

    /// Section heading, kept together with at least two following lines
    fn heading(&mut self, text: &str) {
        let line = self.layout.line_height_mm;
        self.ensure_space(line * 3.5);
        let (x, y) = (self.layout.margin_mm, self.y);
        self.text_at(Font::Bold, self.layout.heading_font_size, x, y, text);
        self.advance(line * 1.5);
    }

    fn render_footer(&mut self) {
        let footer_y = self.height_mm - self.layout.margin_mm / 2.0;
        let page_num = self.pages.len() + 1;

        // Footer rule
        let rule_y_pt = (self.height_mm - self.layout.margin_mm * 0.75) * MM_TO_PT;
        self.stream.push_str(&format!(
            "q\n0.7 G\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            self.layout.margin_mm * MM_TO_PT,
            rule_y_pt,
            (self.width_mm - self.layout.margin_mm) * MM_TO_PT,
            rule_y_pt
        ));

        let margin = self.layout.margin_mm;
        self.text_at(Font::Regular, 8.0, margin, footer_y, "VibeSolver");
        if self.layout.show_page_numbers {
            let x = self.width_mm - margin - 15.0;
            self.text_at(Font::Regular, 8.0, x, footer_y, &format!("Page {}", page_num));
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.render_footer();
        self.pages.push(std::mem::take(&mut self.stream));
        self.pages
    }
}

/// PDF report exporter
pub struct PdfExporter {
    layout: PdfLayout,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExporter {
    /// Create a new PDF exporter with the default layout
    pub fn new() -> Self {
        Self {
            layout: PdfLayout::default(),
        }
    }

    /// Create a new PDF exporter with a custom layout
    pub fn with_layout(layout: PdfLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PdfLayout {
        &self.layout
    }

    /// Render solutions into a PDF report, one page boundary per solution
    pub fn render_document(
        &self,
        solutions: &[Solution],
        options: &ExportOptions,
        ctx: &RenderContext,
    ) -> Result<PdfExport, ExportError> {
        if solutions.is_empty() {
            return Err(ExportError::NoSolutions);
        }

        let page_dims = options.page_dimensions_mm();
        let mut writer = PageWriter::new(&self.layout, page_dims);

        for (index, solution) in solutions.iter().enumerate() {
            if index > 0 {
                writer.new_page();
            }
            self.layout_solution(&mut writer, solution, options);
        }

        let pages = writer.finish();
        let page_count = pages.len();
        let title = match solutions {
            [single] => single.title.clone(),
            _ => "VibeSolver Solutions".to_string(),
        };
        let bytes = self.create_pdf_document(&pages, page_dims, &title, ctx);

        Ok(PdfExport {
            bytes,
            filename: format!("vibesolver-solutions-{}.pdf", ctx.iso_date()),
            page_count,
        })
    }

    fn layout_solution(&self, w: &mut PageWriter<'_>, solution: &Solution, options: &ExportOptions) {
        let line = self.layout.line_height_mm;
        let detail = self.layout.detail_font_size;

        // Title
        w.paragraph(Font::Bold, self.layout.title_font_size, 0.0, &solution.title, line * 1.3);
        w.advance(line * 0.7);

        // Description
        w.paragraph(Font::Regular, self.layout.body_font_size, 0.0, &solution.description, line);
        w.advance(10.0);

        if options.include_details {
            w.heading("Solution Details");
            w.paragraph(
                Font::Regular,
                detail,
                0.0,
                &format!("Status: {}", solution.status.label()),
                line,
            );
            let cost = solution
                .cost_estimate
                .map(format_amount)
                .unwrap_or_else(|| "TBD".to_string());
            w.paragraph(
                Font::Regular,
                detail,
                0.0,
                &format!("Cost Estimate: ${}/month", cost),
                line,
            );
            w.paragraph(
                Font::Regular,
                detail,
                0.0,
                &format!("Created: {}", solution.created_at.format("%Y-%m-%d")),
                line,
            );
            w.advance(5.0);
        }

        let services = solution.services();
        if !services.is_empty() {
            w.heading("AWS Services");
            for service in &services {
                w.paragraph(Font::Bold, detail, 0.0, &format!("• {}", service.name), line);
                w.paragraph(
                    Font::Regular,
                    detail,
                    5.0,
                    &format!("Purpose: {}", service.purpose),
                    line,
                );
                w.paragraph(
                    Font::Regular,
                    detail,
                    5.0,
                    &format!("Configuration: {}", service.configuration),
                    line,
                );
                w.advance(3.0);
            }
            w.advance(5.0);
        }

        if options.include_recommendations {
            let recommendations = solution.recommendation_list();
            if !recommendations.is_empty() {
                w.heading("Recommendations");
                for (i, rec) in recommendations.iter().enumerate() {
                    w.paragraph(Font::Regular, detail, 0.0, &format!("{}. {}", i + 1, rec), line);
                    w.advance(2.0);
                }
                w.advance(3.0);
            }
        }

        if options.include_architecture {
            if let Some(architecture) = solution.architecture_graph() {
                if !architecture.components.is_empty() {
                    w.heading("Architecture");
                    for component in &architecture.components {
                        let text = if component.component_type.is_empty() {
                            format!("• {}", component.name)
                        } else {
                            format!("• {} ({})", component.name, component.component_type)
                        };
                        w.paragraph(Font::Regular, detail, 0.0, &text, line);
                    }
                    for connection in &architecture.connections {
                        let mut text = format!(
                            "{} -> {}",
                            architecture.component_name(&connection.from),
                            architecture.component_name(&connection.to)
                        );
                        if !connection.label.is_empty() {
                            text.push_str(&format!(": {}", connection.label));
                        }
                        w.paragraph(Font::Regular, detail, 5.0, &text, line);
                    }
                    w.advance(5.0);
                }
            }
        }

        if options.include_cost_analysis {
            w.heading("Cost Analysis");
            match solution.cost_estimate {
                Some(monthly) => {
                    w.paragraph(
                        Font::Regular,
                        detail,
                        0.0,
                        &format!("Estimated monthly cost: ${}", format_amount(monthly)),
                        line,
                    );
                    w.paragraph(
                        Font::Regular,
                        detail,
                        0.0,
                        &format!("Estimated annual cost: ${}", format_amount(monthly * 12.0)),
                        line,
                    );
                }
                None => {
                    w.paragraph(Font::Regular, detail, 0.0, "Cost estimate not available", line);
                }
            }
        }
    }

    /// Assemble the PDF file from per-page content streams
    fn create_pdf_document(
        &self,
        page_streams: &[String],
        (width_mm, height_mm): (f64, f64),
        title: &str,
        ctx: &RenderContext,
    ) -> Vec<u8> {
        let width_pt = width_mm * MM_TO_PT;
        let height_pt = height_mm * MM_TO_PT;
        let page_count = page_streams.len();

        let mut pdf = Vec::new();

        // PDF Header
        pdf.extend_from_slice(b"%PDF-1.4\n");
        pdf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut xref_positions: Vec<usize> = Vec::new();

        // Object 1: Catalog
        xref_positions.push(pdf.len());
        pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        // Object 2: Pages, written once all page ids are known
        let pages_obj_index = xref_positions.len();
        xref_positions.push(0);

        // Objects 3,4 for page 1; 5,6 for page 2; fonts follow the pages
        let mut page_obj_ids: Vec<usize> = Vec::new();
        let font_obj_start = 3 + (page_count * 2);

        for (page_idx, content_stream) in page_streams.iter().enumerate() {
            let page_obj_id = 3 + (page_idx * 2);
            let content_obj_id = page_obj_id + 1;
            page_obj_ids.push(page_obj_id);

            xref_positions.push(pdf.len());
            let page_obj = format!(
                "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> >> >>\nendobj\n",
                page_obj_id,
                width_pt,
                height_pt,
                content_obj_id,
                font_obj_start,
                font_obj_start + 1
            );
            pdf.extend_from_slice(page_obj.as_bytes());

            xref_positions.push(pdf.len());
            let content_obj = format!(
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                content_obj_id,
                content_stream.len(),
                content_stream
            );
            pdf.extend_from_slice(content_obj.as_bytes());
        }

        let pages_position = pdf.len();
        let kids_list: Vec<String> = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect();
        let pages_obj = format!(
            "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
            kids_list.join(" "),
            page_count
        );
        pdf.extend_from_slice(pages_obj.as_bytes());
        xref_positions[pages_obj_index] = pages_position;

        // Font objects
        xref_positions.push(pdf.len());
        let font1_obj = format!(
            "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n",
            font_obj_start
        );
        pdf.extend_from_slice(font1_obj.as_bytes());

        xref_positions.push(pdf.len());
        let font2_obj = format!(
            "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>\nendobj\n",
            font_obj_start + 1
        );
        pdf.extend_from_slice(font2_obj.as_bytes());

        // Info dictionary
        let info_obj_id = font_obj_start + 2;
        xref_positions.push(pdf.len());
        let info_obj = format!(
            "{} 0 obj\n<< /Title ({}) /Producer ({}) /Creator (VibeSolver) /CreationDate ({}) >>\nendobj\n",
            info_obj_id,
            escape_pdf_string(title),
            PRODUCER,
            ctx.exported_at.format("D:%Y%m%d%H%M%SZ")
        );
        pdf.extend_from_slice(info_obj.as_bytes());

        // Cross-reference table
        let xref_start = pdf.len();
        pdf.extend_from_slice(b"xref\n");
        pdf.extend_from_slice(format!("0 {}\n", xref_positions.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for pos in &xref_positions {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", pos).as_bytes());
        }

        // Trailer
        pdf.extend_from_slice(b"trailer\n");
        pdf.extend_from_slice(
            format!(
                "<< /Size {} /Root 1 0 R /Info {} 0 R >>\n",
                xref_positions.len() + 1,
                info_obj_id
            )
            .as_bytes(),
        );
        pdf.extend_from_slice(b"startxref\n");
        pdf.extend_from_slice(format!("{}\n", xref_start).as_bytes());
        pdf.extend_from_slice(b"%%EOF\n");

        pdf
    }
}

impl SolutionRenderer for PdfExporter {
    fn render(
        &self,
        solutions: &[Solution],
        options: &ExportOptions,
        ctx: &RenderContext,
    ) -> Result<RenderedExport, ExportError> {
        let document = self.render_document(solutions, options, ctx)?;
        Ok(RenderedExport::binary(
            document.filename,
            ExportFormat::Pdf,
            document.bytes,
        ))
    }
}

/// Escape special characters for PDF strings
fn escape_pdf_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            '\n' | '\r' | '\t' => result.push(' '),
            // WinAnsiEncoding octal codes
            '©' => result.push_str("\\251"),
            '®' => result.push_str("\\256"),
            '™' => result.push_str("\\231"),
            '•' => result.push_str("\\267"),
            '–' => result.push_str("\\226"),
            '—' => result.push_str("\\227"),
            '€' => result.push_str("\\200"),
            _ if c.is_ascii() => result.push(c),
            _ => result.push('?'),
        }
    }
    result
}

/// Word wrap text to fit within max characters per line
///
/// Words longer than a line are split. Always yields at least one line.
fn word_wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        if current_line.is_empty() {
            current_line = word;
        } else if current_line.chars().count() + 1 + word.chars().count() <= max_chars {
            current_line.push(' ');
            current_line.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current_line, word));
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
