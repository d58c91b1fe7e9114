//! Renders the scene graph to PNG: the scene is written as SVG, rasterized
//! with resvg and composited over the floor plan.

use image::{imageops, ImageFormat, Rgba, RgbaImage};
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::canvas::CanvasState;
use crate::geometry::{fit_contain, Point};
use crate::scale::Scale;

pub const DEFAULT_FILE_NAME: &str = "schema.png";

const PAPER: [u8; 4] = [255, 255, 255, 255];
const CABLE: &str = "#141414";
const VERTEX: [u8; 4] = [220, 40, 40, 255];
const OUTLINE: &str = "#141414";
const SCALE_LINE: &str = "#ff0000";
const LABEL: &str = "#1e1e1e";
const PARAM_FONT_SIZE: f32 = 11.0;
const PARAM_LINE_HEIGHT: f32 = 13.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("canvas has no area ({0}x{1})")]
    EmptyCanvas(u32, u32),
    #[error("scene could not be parsed: {0}")]
    Svg(#[from] usvg::Error),
    #[error("unable to allocate a {0}x{1} pixmap")]
    Pixmap(u32, u32),
    #[error("unable to write image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy)]
pub struct ExportStyle {
    pub icon_size: f32,
    pub cable_width: f32,
    pub vertex_radius: f32,
    /// Draw the parameter card next to every icon that has parameters.
    pub show_params: bool,
}

impl Default for ExportStyle {
    fn default() -> Self {
        Self {
            icon_size: 32.0,
            cable_width: 2.0,
            vertex_radius: 4.0,
            show_params: false,
        }
    }
}

fn hex([r, g, b, _]: [u8; 4]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes the scene as an SVG document in canvas coordinates. Paint order
/// matches the editor: scale line, cables, vertices, icons, labels, cards.
pub fn build_svg(canvas: &CanvasState, scale: Option<&Scale>, size: (u32, u32), style: &ExportStyle) -> String {
    let (width, height) = size;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );

    if let Some(scale) = scale.filter(|s| s.a.is_finite() && s.b.is_finite()) {
        let _ = writeln!(
            out,
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{SCALE_LINE}\" stroke-width=\"1\" />",
            scale.a.x, scale.a.y, scale.b.x, scale.b.y
        );
    }

    let _ = writeln!(
        out,
        "<g fill=\"none\" stroke=\"{CABLE}\" stroke-width=\"{}\" stroke-linejoin=\"round\">",
        style.cable_width
    );
    for conn in canvas.connections() {
        let Some(points) = canvas.polyline(conn) else {
            continue;
        };
        if points.iter().all(|p| p.is_finite()) {
            let _ = writeln!(out, "  <polyline points=\"{}\" />", points_attr(&points));
        }
    }
    let _ = writeln!(out, "</g>");

    let _ = writeln!(out, "<g fill=\"{}\" stroke=\"#000000\" stroke-width=\"1\">", hex(VERTEX));
    for vertex in canvas.connections().iter().flat_map(|conn| &conn.vertices) {
        if vertex.is_finite() {
            let _ = writeln!(
                out,
                "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" />",
                vertex.x, vertex.y, style.vertex_radius
            );
        }
    }
    let _ = writeln!(out, "</g>");

    let icon_size = style.icon_size;
    let half = icon_size / 2.0;
    for icon in canvas.icons().iter().filter(|icon| icon.position.is_finite()) {
        let Point { x: cx, y: cy } = icon.position;
        let _ = writeln!(
            out,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{icon_size}\" height=\"{icon_size}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{OUTLINE}\" stroke-width=\"1\" />",
            cx - half,
            cy - half,
            hex(icon.element.color())
        );
        let _ = writeln!(
            out,
            "<text x=\"{cx:.1}\" y=\"{cy:.1}\" font-size=\"{:.1}\" fill=\"#ffffff\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            icon_size * 0.55,
            icon.element.icon()
        );
        if let Some(name) = icon.name() {
            let _ = writeln!(
                out,
                "<text x=\"{cx:.1}\" y=\"{:.1}\" font-size=\"11\" fill=\"{LABEL}\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
                cy + half + 2.0,
                escape_xml(name)
            );
        }

        if !style.show_params {
            continue;
        }
        let Some(params) = &icon.params else {
            continue;
        };
        let lines: Vec<String> = params
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        // Monospace advance is roughly 0.6em.
        let card_w = longest as f32 * PARAM_FONT_SIZE * 0.6 + 8.0;
        let card_h = lines.len() as f32 * PARAM_LINE_HEIGHT + 8.0;
        let (left, top) = (cx + half + 2.0, cy - half - 4.0);
        let _ = writeln!(
            out,
            "<rect x=\"{left:.1}\" y=\"{top:.1}\" width=\"{card_w:.1}\" height=\"{card_h:.1}\" rx=\"4\" ry=\"4\" fill=\"#ffffff\" stroke=\"#000000\" stroke-width=\"1\" />"
        );
        let _ = write!(
            out,
            "<text font-family=\"monospace\" font-size=\"{PARAM_FONT_SIZE}\" fill=\"#000000\" dominant-baseline=\"hanging\">"
        );
        for (row, line) in lines.iter().enumerate() {
            let _ = write!(
                out,
                "<tspan x=\"{:.1}\" y=\"{:.1}\">{}</tspan>",
                left + 4.0,
                top + 4.0 + row as f32 * PARAM_LINE_HEIGHT,
                escape_xml(line)
            );
        }
        let _ = writeln!(out, "</text>");
    }

    let _ = writeln!(out, "</svg>");
    out
}

/// Rasterizes an SVG document onto a transparent pixmap of `size`.
fn rasterize(svg: &str, size: (u32, u32)) -> Result<tiny_skia::Pixmap, ExportError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)?;
    let mut pixmap = tiny_skia::Pixmap::new(size.0, size.1).ok_or(ExportError::Pixmap(size.0, size.1))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Source-over of a premultiplied pixmap onto an opaque image.
fn composite(img: &mut RgbaImage, layer: &tiny_skia::Pixmap) {
    for (dst, src) in img.pixels_mut().zip(layer.pixels()) {
        let alpha = u16::from(src.alpha());
        if alpha == 0 {
            continue;
        }
        let keep = 255 - alpha;
        let blend = |fg: u8, bg: u8| (u16::from(fg) + (u16::from(bg) * keep + 127) / 255).min(255) as u8;
        *dst = Rgba([
            blend(src.red(), dst[0]),
            blend(src.green(), dst[1]),
            blend(src.blue(), dst[2]),
            255,
        ]);
    }
}

/// Paints the floor plan (contain-fit, top-left) and the scene on white paper.
pub fn render_scene(
    canvas: &CanvasState,
    scale: Option<&Scale>,
    background: Option<&RgbaImage>,
    size: (u32, u32),
    style: &ExportStyle,
) -> Result<RgbaImage, ExportError> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCanvas(width, height));
    }
    let mut img = RgbaImage::from_pixel(width, height, Rgba(PAPER));

    if let Some(bg) = background {
        let (w, h) = fit_contain(bg.width() as f32, bg.height() as f32, width as f32, height as f32);
        let (w, h) = (w.round() as u32, h.round() as u32);
        if w > 0 && h > 0 {
            let scaled = imageops::resize(bg, w, h, imageops::FilterType::Triangle);
            imageops::overlay(&mut img, &scaled, 0, 0);
        }
    }

    let svg = build_svg(canvas, scale, size, style);
    debug!(bytes = svg.len(), "built export scene");
    let layer = rasterize(&svg, size)?;
    composite(&mut img, &layer);
    Ok(img)
}

pub fn export_png(path: &Path, image: &RgbaImage) -> Result<(), ExportError> {
    image.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "exported schema image");
    Ok(())
}
