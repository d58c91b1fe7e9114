//! Pixel-to-meter calibration from a user-drawn reference line.

use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::Point;

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("distance must be a positive number of meters, got {0}")]
    InvalidDistance(f32),
    #[error("reference line has zero length")]
    DegenerateReference,
    #[error("no reference line is waiting for a distance")]
    NothingPending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub a: Point,
    pub b: Point,
    pub pixels_per_meter: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CalibrationStep {
    #[default]
    Idle,
    /// Click flow: A is set; the next click only resets the cycle, the one
    /// after sets B.
    Anchored { a: Point, cycle_reset: bool },
    /// Drag flow: A is set, `preview` follows the pointer.
    Dragging { a: Point, preview: Option<Point> },
    /// Both points known; the distance dialog is open.
    AwaitingDistance { a: Point, b: Point },
}

#[derive(Debug, Default)]
pub struct ScaleCalibrator {
    active: bool,
    step: CalibrationStep,
    scale: Option<Scale>,
}

impl ScaleCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    pub fn scale(&self) -> Option<Scale> {
        self.scale
    }

    pub fn pixels_per_meter(&self) -> Option<f32> {
        self.scale.map(|s| s.pixels_per_meter)
    }

    pub fn dialog_open(&self) -> bool {
        matches!(self.step, CalibrationStep::AwaitingDistance { .. })
    }

    /// Segment to draw while calibrating, if any.
    pub fn preview_line(&self) -> Option<(Point, Point)> {
        match self.step {
            CalibrationStep::Dragging { a, preview: Some(p) } => Some((a, p)),
            CalibrationStep::AwaitingDistance { a, b } => Some((a, b)),
            _ => None,
        }
    }

    /// Enters scale mode, or cancels it and drops any in-progress points.
    pub fn toggle_mode(&mut self) {
        if self.active {
            self.cancel();
        } else {
            self.active = true;
            self.step = CalibrationStep::Idle;
            debug!("scale mode on");
        }
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.step = CalibrationStep::Idle;
        debug!("scale mode cancelled");
    }

    pub fn click(&mut self, p: Point) {
        if !self.active {
            return;
        }
        self.step = match self.step {
            CalibrationStep::Idle => CalibrationStep::Anchored {
                a: p,
                cycle_reset: false,
            },
            CalibrationStep::Anchored {
                a,
                cycle_reset: false,
            } => CalibrationStep::Anchored {
                a,
                cycle_reset: true,
            },
            CalibrationStep::Anchored { a, cycle_reset: true } | CalibrationStep::Dragging { a, .. } => {
                self.open_dialog(a, p)
            }
            pending @ CalibrationStep::AwaitingDistance { .. } => pending,
        };
    }

    pub fn press(&mut self, p: Point) {
        if self.active && matches!(self.step, CalibrationStep::Idle) {
            self.step = CalibrationStep::Dragging { a: p, preview: None };
        }
    }

    pub fn motion(&mut self, p: Point) {
        if let CalibrationStep::Dragging { preview, .. } = &mut self.step {
            *preview = Some(p);
        }
    }

    pub fn release(&mut self, p: Point) {
        if let CalibrationStep::Dragging { a, .. } = self.step {
            self.step = self.open_dialog(a, p);
        }
    }

    fn open_dialog(&mut self, a: Point, b: Point) -> CalibrationStep {
        self.active = false;
        debug!(?a, ?b, "reference line drawn");
        CalibrationStep::AwaitingDistance { a, b }
    }

    /// Turns the pending reference line into a scale. A new calibration
    /// replaces whatever scale was set before.
    pub fn confirm(&mut self, meters: f32) -> Result<f32, ScaleError> {
        let CalibrationStep::AwaitingDistance { a, b } = self.step else {
            return Err(ScaleError::NothingPending);
        };
        if !meters.is_finite() || meters <= 0.0 {
            return Err(ScaleError::InvalidDistance(meters));
        }
        let pixels = a.distance(b);
        if pixels <= f32::EPSILON {
            return Err(ScaleError::DegenerateReference);
        }
        let pixels_per_meter = pixels / meters;
        self.scale = Some(Scale {
            a,
            b,
            pixels_per_meter,
        });
        self.step = CalibrationStep::Idle;
        self.active = false;
        info!(pixels, meters, pixels_per_meter, "scale calibrated");
        Ok(pixels_per_meter)
    }

    pub fn dismiss_dialog(&mut self) {
        if self.dialog_open() {
            self.step = CalibrationStep::Idle;
        }
    }

    pub fn to_meters(&self, pixels: f64) -> Option<f64> {
        self.pixels_per_meter()
            .map(|ppm| pixels / f64::from(ppm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn click_flow_needs_three_clicks() {
        let mut cal = ScaleCalibrator::new();
        cal.toggle_mode();
        cal.click(Point::new(0.0, 0.0));
        cal.click(Point::new(40.0, 0.0));
        assert!(!cal.dialog_open());
        cal.click(Point::new(100.0, 0.0));
        assert!(cal.dialog_open());
        assert!(!cal.is_active());
        assert_eq!(cal.confirm(2.0), Ok(50.0));
        assert_eq!(cal.pixels_per_meter(), Some(50.0));
    }

    #[test]
    fn drag_flow_tracks_preview() {
        let mut cal = ScaleCalibrator::new();
        cal.toggle_mode();
        cal.press(Point::new(10.0, 10.0));
        cal.motion(Point::new(20.0, 10.0));
        assert_eq!(
            cal.preview_line(),
            Some((Point::new(10.0, 10.0), Point::new(20.0, 10.0)))
        );
        cal.release(Point::new(10.0, 40.0));
        assert!(cal.dialog_open());
        assert_relative_eq!(cal.confirm(3.0).unwrap(), 10.0);
    }

    #[test]
    fn click_while_dragging_sets_second_point() {
        let mut cal = ScaleCalibrator::new();
        cal.toggle_mode();
        cal.press(Point::new(0.0, 0.0));
        cal.click(Point::new(0.0, 5.0));
        assert_eq!(
            cal.step(),
            CalibrationStep::AwaitingDistance {
                a: Point::new(0.0, 0.0),
                b: Point::new(0.0, 5.0)
            }
        );
    }

    #[test]
    fn cancel_discards_points() {
        let mut cal = ScaleCalibrator::new();
        cal.toggle_mode();
        cal.click(Point::new(0.0, 0.0));
        cal.toggle_mode();
        assert!(!cal.is_active());
        assert_eq!(cal.step(), CalibrationStep::Idle);
        cal.click(Point::new(5.0, 5.0));
        assert_eq!(cal.step(), CalibrationStep::Idle);
    }

    #[test]
    fn confirm_rejects_bad_input() {
        let mut cal = ScaleCalibrator::new();
        assert_eq!(cal.confirm(1.0), Err(ScaleError::NothingPending));

        cal.toggle_mode();
        cal.press(Point::new(5.0, 5.0));
        cal.release(Point::new(5.0, 5.0));
        assert_eq!(cal.confirm(0.0), Err(ScaleError::InvalidDistance(0.0)));
        assert!(matches!(cal.confirm(f32::NAN), Err(ScaleError::InvalidDistance(_))));
        assert_eq!(cal.confirm(1.0), Err(ScaleError::DegenerateReference));
        assert!(cal.dialog_open());
        cal.dismiss_dialog();
        assert_eq!(cal.scale(), None);
    }

    #[test]
    fn recalibration_overwrites() {
        let mut cal = ScaleCalibrator::new();
        for (len, meters) in [(100.0, 2.0), (100.0, 4.0)] {
            cal.toggle_mode();
            cal.press(Point::new(0.0, 0.0));
            cal.release(Point::new(len, 0.0));
            cal.confirm(meters).unwrap();
        }
        assert_eq!(cal.pixels_per_meter(), Some(25.0));
        assert_relative_eq!(cal.to_meters(50.0).unwrap(), 2.0);
    }
}
