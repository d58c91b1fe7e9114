//! Floor-plan backgrounds: first page of a PDF rendered through PDFium, or a
//! plain raster image.

use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const PDFIUM_ENV: &str = "WIREPLAN_PDFIUM_LIB";

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("local PDFium binary not found. Place PDFium next to the app or set WIREPLAN_PDFIUM_LIB")]
    LibraryNotFound,
    #[error("PDF renderer unavailable: {0}")]
    Bind(#[source] PdfiumError),
    #[error("PDF load failed: {0}")]
    Load(#[source] PdfiumError),
    #[error("PDF page read failed: {0}")]
    Page(#[source] PdfiumError),
    #[error("PDF render failed: {0}")]
    Render(#[source] PdfiumError),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
pub struct Background {
    pub source_name: String,
    pub image: RgbaImage,
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Resolves the PDFium shared library: explicit override, then the
/// environment, then the executable's directory.
pub fn pdfium_library_path(configured: Option<&Path>) -> Option<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(PDFIUM_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let mut candidate = std::env::current_exe().ok()?;
            candidate.pop();
            let file = if cfg!(target_os = "windows") {
                "pdfium.dll"
            } else if cfg!(target_os = "macos") {
                "libpdfium.dylib"
            } else {
                "libpdfium.so"
            };
            candidate.push(file);
            candidate.exists().then_some(candidate)
        })
}

pub fn render_pdf_first_page(
    bytes: Vec<u8>,
    target_width: u16,
    library: Option<&Path>,
) -> Result<RgbaImage, BackgroundError> {
    let path = pdfium_library_path(library).ok_or(BackgroundError::LibraryNotFound)?;
    debug!(library = %path.display(), "binding PDFium");
    let bindings = Pdfium::bind_to_library(path).map_err(BackgroundError::Bind)?;
    let pdfium = Pdfium::new(bindings);
    let document = pdfium
        .load_pdf_from_byte_vec(bytes, None)
        .map_err(BackgroundError::Load)?;
    let page = document.pages().get(0).map_err(BackgroundError::Page)?;
    let render = page
        .render_with_config(
            &PdfRenderConfig::new()
                .set_target_width(i32::from(target_width.max(400)))
                .render_form_data(true),
        )
        .map_err(BackgroundError::Render)?;
    Ok(render.as_image().to_rgba8())
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, BackgroundError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Loads a background from file contents, sniffing PDF by its magic bytes.
pub fn load_background(
    source_name: &str,
    bytes: Vec<u8>,
    target_width: u16,
    library: Option<&Path>,
) -> Result<Background, BackgroundError> {
    let image = if is_pdf(&bytes) {
        render_pdf_first_page(bytes, target_width, library)?
    } else {
        decode_image(&bytes)?
    };
    info!(
        source = source_name,
        width = image.width(),
        height = image.height(),
        "loaded background"
    );
    Ok(Background {
        source_name: source_name.to_string(),
        image,
    })
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "background".to_string())
}
