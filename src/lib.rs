//! Schematic layout editor for smart-home wiring: place devices on a floor
//! plan, draw cables between them, calibrate a scale and total cable length
//! per circuit group.

pub mod app;
pub mod background;
pub mod canvas;
pub mod export;
pub mod geometry;
pub mod lengths;
pub mod model;
pub mod params;
pub mod scale;
pub mod settings;

pub use app::WireplanApp;
pub use canvas::{CanvasError, CanvasState};
pub use geometry::Point;
pub use lengths::{aggregate, LengthReport, LengthUnit};
pub use model::{Connection, ConnectionId, ElementType, Icon, IconId};
pub use params::{IconParams, ParamError, ParamForm};
pub use scale::{Scale, ScaleCalibrator, ScaleError};
pub use settings::AppSettings;
