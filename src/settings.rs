use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::export::{ExportStyle, DEFAULT_FILE_NAME};

/// Target pixel width for rendering PDF backgrounds.
pub const PDF_RENDER_WIDTH: RangeInclusive<u16> = 400..=8000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub accent_color: [u8; 4],
    pub ui_scale: f32,
    pub show_grid: bool,
    pub icon_size: f32,
    pub pdf_render_width: u16,
    pub export_file_name: String,
    pub pdfium_library: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            accent_color: [168, 196, 84, 255],
            ui_scale: 1.0,
            show_grid: true,
            icon_size: 32.0,
            pdf_render_width: 1600,
            export_file_name: DEFAULT_FILE_NAME.to_string(),
            pdfium_library: None,
        }
    }
}

impl AppSettings {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "wireplan").map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Missing file means defaults; anything else unreadable is an error.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings: Self = serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.sanitized())
    }

    /// Loads from the platform config dir, falling back to defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!("{err}; using default settings");
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let payload = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, payload).map_err(io_err)
    }

    fn sanitized(mut self) -> Self {
        self.ui_scale = self.ui_scale.clamp(0.8, 1.5);
        self.pdf_render_width = self
            .pdf_render_width
            .clamp(*PDF_RENDER_WIDTH.start(), *PDF_RENDER_WIDTH.end());
        self.icon_size = self.icon_size.clamp(16.0, 96.0);
        if self.export_file_name.trim().is_empty() {
            self.export_file_name = DEFAULT_FILE_NAME.to_string();
        }
        self
    }

    pub fn export_style(&self) -> ExportStyle {
        ExportStyle {
            icon_size: self.icon_size,
            ..ExportStyle::default()
        }
    }
}
