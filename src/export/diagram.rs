//! Architecture diagram export (PNG / SVG)
//!
//! The image formats capture a rendered diagram rather than solution data.
//! Hosts hand the facade a [`DiagramElement`]; [`ArchitectureCanvas`] is the
//! built-in element that lays an [`Architecture`] graph out the way the
//! visualization draws it.
//!
//! - SVG wraps the element's XHTML markup in a `foreignObject`.
//! - PNG rasterizes the element at the quality scale on a white background
//!   (feature `png-export`).

use super::{ExportError, RenderContext, RenderedExport};
use crate::models::{Architecture, ExportFormat, ExportOptions, Solution};
use quick_xml::escape::escape;

#[cfg(feature = "png-export")]
use image::{Rgba, RgbaImage};

/// Component box size (px)
pub const NODE_WIDTH: f64 = 128.0;
pub const NODE_HEIGHT: f64 = 64.0;

/// Connection anchor relative to a component's position
const ANCHOR_OFFSET: (f64, f64) = (60.0, 30.0);

/// Minimum canvas size (px)
pub const CANVAS_HEIGHT: f64 = 384.0;
pub const MIN_CANVAS_WIDTH: f64 = 640.0;
const CANVAS_PADDING: f64 = 24.0;

const CANVAS_BACKGROUND: &str = "#F9FAFB";
const CONNECTION_COLOR: &str = "#6B7280";
const LABEL_BORDER: &str = "#E5E7EB";
const LABEL_WIDTH: f64 = 40.0;
const LABEL_HEIGHT: f64 = 16.0;
const LABEL_MAX_CHARS: usize = 8;

/// Size of a rendered element (px)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

/// A rendered visual element that can be captured as an image
pub trait DiagramElement {
    /// Current size of the element
    fn bounding_box(&self) -> BoundingBox;

    /// Serialized XHTML subtree of the element
    fn markup(&self) -> String;

    /// Rasterize at `scale` over `background`
    #[cfg(feature = "png-export")]
    fn rasterize(&self, scale: f32, background: Rgba<u8>) -> Result<RgbaImage, ExportError>;
}

/// Image output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_export_format(format: ExportFormat) -> Option<Self> {
        match format {
            ExportFormat::Png => Some(ImageFormat::Png),
            ExportFormat::Svg => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    pub fn export_format(&self) -> ExportFormat {
        match self {
            ImageFormat::Png => ExportFormat::Png,
            ImageFormat::Svg => ExportFormat::Svg,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Escape text for XHTML, dropping control characters XML 1.0 cannot carry
fn xml_text(s: &str) -> String {
    let allowed: String = s
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(allowed.as_str()).into_owned()
}

/// Fill, border and text colours of a component box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    fill: [u8; 3],
    border: [u8; 3],
    text: [u8; 3],
}

/// Colours keyed on the component type, first match wins
fn palette_for(component_type: &str) -> Palette {
    let t = component_type.to_lowercase();
    let (fill, border, text) = if t.contains("database") {
        ([0xFF, 0xED, 0xD5], [0xFD, 0xBA, 0x74], [0x9A, 0x34, 0x12])
    } else if t.contains("storage") {
        ([0xDC, 0xFC, 0xE7], [0x86, 0xEF, 0xAC], [0x16, 0x65, 0x34])
    } else if t.contains("compute") {
        ([0xDB, 0xEA, 0xFE], [0x93, 0xC5, 0xFD], [0x1E, 0x40, 0xAF])
    } else if t.contains("function") {
        ([0xF3, 0xE8, 0xFF], [0xD8, 0xB4, 0xFE], [0x6B, 0x21, 0xA8])
    } else if t.contains("gateway") {
        ([0xE0, 0xE7, 0xFF], [0xA5, 0xB4, 0xFC], [0x37, 0x30, 0xA3])
    } else if t.contains("cache") {
        ([0xFE, 0xE2, 0xE2], [0xFC, 0xA5, 0xA5], [0x99, 0x1B, 0x1B])
    } else {
        ([0xF3, 0xF4, 0xF6], [0xD1, 0xD5, 0xDB], [0x1F, 0x29, 0x37])
    };
    Palette { fill, border, text }
}

fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Shorten a connection label to fit its pill
fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_MAX_CHARS {
        let head: String = label.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

/// A connection resolved to canvas coordinates
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    start: (f64, f64),
    /// End point clipped to the border of the target box
    tip: (f64, f64),
    mid: (f64, f64),
    label: String,
}

/// Point where the line from `target` toward `source` leaves the target box
fn clip_to_box(source: (f64, f64), target: (f64, f64), bx: (f64, f64)) -> (f64, f64) {
    let (dx, dy) = (source.0 - target.0, source.1 - target.1);
    let exit = |d: f64, from: f64, low: f64, high: f64| {
        if d > 0.0 {
            (high - from) / d
        } else if d < 0.0 {
            (low - from) / d
        } else {
            f64::INFINITY
        }
    };
    let tx = exit(dx, target.0, bx.0, bx.0 + NODE_WIDTH);
    let ty = exit(dy, target.1, bx.1, bx.1 + NODE_HEIGHT);
    let t = tx.min(ty).clamp(0.0, 1.0);
    (target.0 + dx * t, target.1 + dy * t)
}

/// The architecture graph laid out on a canvas
#[derive(Debug, Clone)]
pub struct ArchitectureCanvas {
    canvas_id: String,
    architecture: Architecture,
    width: f64,
    height: f64,
}

impl ArchitectureCanvas {
    pub fn from_architecture(canvas_id: &str, architecture: Architecture) -> Self {
        let right = architecture
            .components
            .iter()
            .map(|c| c.position.x + NODE_WIDTH + CANVAS_PADDING)
            .fold(MIN_CANVAS_WIDTH, f64::max);
        let bottom = architecture
            .components
            .iter()
            .map(|c| c.position.y + NODE_HEIGHT + CANVAS_PADDING)
            .fold(CANVAS_HEIGHT, f64::max);
        Self {
            canvas_id: canvas_id.to_string(),
            architecture,
            width: right.ceil(),
            height: bottom.ceil(),
        }
    }

    /// The diagram of a solution, if it has one with at least one component
    pub fn from_solution(solution: &Solution) -> Option<Self> {
        let architecture = solution.architecture_graph()?;
        if architecture.components.is_empty() {
            return None;
        }
        Some(Self::from_architecture(&solution.id, architecture))
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Connections whose endpoints both resolve, in canvas coordinates
    fn segments(&self) -> Vec<Segment> {
        self.architecture
            .connections
            .iter()
            .filter_map(|connection| {
                let from = self.architecture.component(&connection.from)?;
                let to = self.architecture.component(&connection.to)?;
                let start = (
                    from.position.x + ANCHOR_OFFSET.0,
                    from.position.y + ANCHOR_OFFSET.1,
                );
                let end = (
                    to.position.x + ANCHOR_OFFSET.0,
                    to.position.y + ANCHOR_OFFSET.1,
                );
                Some(Segment {
                    start,
                    tip: clip_to_box(start, end, (to.position.x, to.position.y)),
                    mid: ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0),
                    label: truncate_label(&connection.label),
                })
            })
            .collect()
    }

    fn connection_svg(&self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" style=\"position:absolute;left:0;top:0;overflow:visible\">",
            self.width, self.height
        );
        svg.push_str(&format!(
            "<defs><marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"9\" refY=\"3.5\" orient=\"auto\"><polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{}\"/></marker></defs>",
            CONNECTION_COLOR
        ));
        for segment in self.segments() {
            svg.push_str(&format!(
                "<g><line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"2\" marker-end=\"url(#arrowhead)\"/>",
                segment.start.0, segment.start.1, segment.tip.0, segment.tip.1, CONNECTION_COLOR
            ));
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"8\" fill=\"white\" stroke=\"{}\"/>",
                segment.mid.0 - LABEL_WIDTH / 2.0,
                segment.mid.1 - LABEL_HEIGHT / 2.0,
                LABEL_WIDTH,
                LABEL_HEIGHT,
                LABEL_BORDER
            ));
            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#4B5563\">{}</text></g>",
                segment.mid.0,
                segment.mid.1 + 4.0,
                xml_text(&segment.label)
            ));
        }
        svg.push_str("</svg>");
        svg
    }
}

impl DiagramElement for ArchitectureCanvas {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            width: self.width,
            height: self.height,
        }
    }

    fn markup(&self) -> String {
        let mut html = format!(
            "<div xmlns=\"http://www.w3.org/1999/xhtml\" data-architecture-canvas=\"{}\" style=\"position:relative;width:{}px;height:{}px;background:{};overflow:hidden;font-family:sans-serif\">",
            xml_text(&self.canvas_id),
            self.width,
            self.height,
            CANVAS_BACKGROUND
        );
        html.push_str(&self.connection_svg());

        for component in &self.architecture.components {
            let palette = palette_for(&component.component_type);
            html.push_str(&format!(
                "<div data-component-id=\"{}\" style=\"position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;box-sizing:border-box;border:2px solid {};border-radius:8px;background:{};color:{};display:flex;align-items:center;justify-content:center;text-align:center;font-size:12px;font-weight:500\">{}</div>",
                xml_text(&component.id),
                component.position.x,
                component.position.y,
                NODE_WIDTH,
                NODE_HEIGHT,
                hex(palette.border),
                hex(palette.fill),
                hex(palette.text),
                xml_text(&component.name)
            ));
        }

        html.push_str("</div>");
        html
    }

    #[cfg(feature = "png-export")]
    fn rasterize(&self, scale: f32, background: Rgba<u8>) -> Result<RgbaImage, ExportError> {
        raster::draw_canvas(self, scale, background)
    }
}

#[cfg(feature = "png-export")]
mod raster {
    use super::*;
    use imageproc::drawing::{
        draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    };
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    /// Upper bound on rasterized pixels
    const MAX_PIXELS: u64 = 64_000_000;

    fn rgba(rgb: [u8; 3]) -> Rgba<u8> {
        Rgba([rgb[0], rgb[1], rgb[2], 255])
    }

    fn rect(x: f64, y: f64, w: f64, h: f64, scale: f64) -> Option<Rect> {
        let (w, h) = ((w * scale).round(), (h * scale).round());
        if w < 1.0 || h < 1.0 {
            return None;
        }
        Some(Rect::at((x * scale).round() as i32, (y * scale).round() as i32).of_size(w as u32, h as u32))
    }

    /// Line of the given width, drawn as parallel one-pixel segments
    fn thick_line(
        img: &mut RgbaImage,
        start: (f64, f64),
        end: (f64, f64),
        width: f64,
        color: Rgba<u8>,
    ) {
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f64::EPSILON {
            return;
        }
        let (nx, ny) = (-dy / len, dx / len);
        let passes = width.round().max(1.0) as i32;
        for i in 0..passes {
            let offset = i as f64 - (passes - 1) as f64 / 2.0;
            draw_line_segment_mut(
                img,
                ((start.0 + nx * offset) as f32, (start.1 + ny * offset) as f32),
                ((end.0 + nx * offset) as f32, (end.1 + ny * offset) as f32),
                color,
            );
        }
    }

    fn arrowhead(img: &mut RgbaImage, start: (f64, f64), tip: (f64, f64), scale: f64, color: Rgba<u8>) {
        let (dx, dy) = (tip.0 - start.0, tip.1 - start.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f64::EPSILON {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let (length, half) = (10.0 * scale, 3.5 * scale);
        let base = (tip.0 - ux * length, tip.1 - uy * length);
        let points = [
            Point::new(tip.0.round() as i32, tip.1.round() as i32),
            Point::new((base.0 - uy * half).round() as i32, (base.1 + ux * half).round() as i32),
            Point::new((base.0 + uy * half).round() as i32, (base.1 - ux * half).round() as i32),
        ];
        // Degenerate triangles are skipped
        if points[0] == points[1] || points[1] == points[2] || points[0] == points[2] {
            return;
        }
        draw_polygon_mut(img, &points, color);
    }

    pub(super) fn draw_canvas(
        canvas: &ArchitectureCanvas,
        scale: f32,
        background: Rgba<u8>,
    ) -> Result<RgbaImage, ExportError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ExportError::ImageError(format!("Invalid scale: {}", scale)));
        }
        let s = scale as f64;
        let width = (canvas.width * s).ceil() as u32;
        let height = (canvas.height * s).ceil() as u32;
        if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(ExportError::ImageError(format!(
                "Cannot rasterize a {}x{} diagram",
                width, height
            )));
        }

        let mut img = RgbaImage::from_pixel(width, height, background);
        if let Some(r) = rect(0.0, 0.0, canvas.width, canvas.height, s) {
            draw_filled_rect_mut(&mut img, r, rgba([0xF9, 0xFA, 0xFB]));
        }

        let line_color = rgba([0x6B, 0x72, 0x80]);
        for segment in canvas.segments() {
            let start = (segment.start.0 * s, segment.start.1 * s);
            let tip = (segment.tip.0 * s, segment.tip.1 * s);
            thick_line(&mut img, start, tip, 2.0 * s, line_color);
            arrowhead(&mut img, start, tip, s, line_color);

            let (x, y) = (segment.mid.0 - LABEL_WIDTH / 2.0, segment.mid.1 - LABEL_HEIGHT / 2.0);
            if let Some(r) = rect(x, y, LABEL_WIDTH, LABEL_HEIGHT, s) {
                draw_filled_rect_mut(&mut img, r, Rgba([255, 255, 255, 255]));
                draw_hollow_rect_mut(&mut img, r, rgba([0xE5, 0xE7, 0xEB]));
            }
        }

        let border_px = (2.0 * s).round().max(1.0) as i32;
        for component in &canvas.architecture.components {
            let palette = palette_for(&component.component_type);
            let (x, y) = (component.position.x, component.position.y);
            if let Some(r) = rect(x, y, NODE_WIDTH, NODE_HEIGHT, s) {
                draw_filled_rect_mut(&mut img, r, rgba(palette.fill));
                for inset in 0..border_px {
                    let w = r.width() as i32 - 2 * inset;
                    let h = r.height() as i32 - 2 * inset;
                    if w < 1 || h < 1 {
                        break;
                    }
                    let border = Rect::at(r.left() + inset, r.top() + inset).of_size(w as u32, h as u32);
                    draw_hollow_rect_mut(&mut img, border, rgba(palette.border));
                }
            }
        }

        Ok(img)
    }
}

/// Rasterize a diagram and encode it as PNG
#[cfg(feature = "png-export")]
pub fn rasterize_png(element: &dyn DiagramElement, scale: f32) -> Result<Vec<u8>, ExportError> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;

    let img = element.rasterize(scale, Rgba([255, 255, 255, 255]))?;
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), img.width(), img.height(), image::ColorType::Rgba8)
        .map_err(|e| ExportError::ImageError(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}

/// Architecture image exporter
#[derive(Debug, Default, Clone)]
pub struct ImageExporter;

impl ImageExporter {
    pub fn new() -> Self {
        Self
    }

    /// SVG document wrapping the element's markup in a `foreignObject`
    pub fn svg_document(&self, element: &dyn DiagramElement) -> String {
        let bounds = element.bounding_box();
        format!(
            "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\"><foreignObject width=\"100%\" height=\"100%\">{}</foreignObject></svg>",
            bounds.width,
            bounds.height,
            element.markup()
        )
    }

    /// Capture `element` in the requested image format
    pub fn render(
        &self,
        element: &dyn DiagramElement,
        format: ImageFormat,
        options: &ExportOptions,
        ctx: &RenderContext,
    ) -> Result<RenderedExport, ExportError> {
        let filename = ctx.timestamped_filename("vibesolver-architecture", format.extension());
        match format {
            ImageFormat::Svg => Ok(RenderedExport::text(
                filename,
                ExportFormat::Svg,
                self.svg_document(element),
            )),
            ImageFormat::Png => self.render_png(element, filename, options),
        }
    }

    #[cfg(feature = "png-export")]
    fn render_png(
        &self,
        element: &dyn DiagramElement,
        filename: String,
        options: &ExportOptions,
    ) -> Result<RenderedExport, ExportError> {
        let bytes = rasterize_png(element, options.quality.scale())?;
        Ok(RenderedExport::binary(filename, ExportFormat::Png, bytes))
    }

    #[cfg(not(feature = "png-export"))]
    fn render_png(
        &self,
        _element: &dyn DiagramElement,
        _filename: String,
        _options: &ExportOptions,
    ) -> Result<RenderedExport, ExportError> {
        Err(ExportError::ImageError(
            "PNG export requires the png-export feature".to_string(),
        ))
    }
}
