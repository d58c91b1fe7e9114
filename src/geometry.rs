//! Plain canvas-space geometry shared by the scene graph, the length
//! aggregator and the raster exporter.

use itertools::Itertools;

/// A position in canvas-local pixels, origin at the top-left of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for egui::Pos2 {
    fn from(p: Point) -> Self {
        egui::pos2(p.x, p.y)
    }
}

impl From<egui::Pos2> for Point {
    fn from(p: egui::Pos2) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Sum of segment lengths along `p0 -> p1 -> ... -> pn`.
///
/// Segments touching a non-finite coordinate contribute nothing instead of
/// poisoning the whole sum.
pub fn polyline_length(points: &[Point]) -> f64 {
    points
        .iter()
        .tuple_windows()
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| f64::from(a.distance(*b)))
        .sum()
}

pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + abx * t, a.y + aby * t))
}

/// Scales `src` to fit inside `dst` keeping its aspect ratio.
pub fn fit_contain(src_w: f32, src_h: f32, dst_w: f32, dst_h: f32) -> (f32, f32) {
    if src_w <= 0.0 || src_h <= 0.0 {
        return (0.0, 0.0);
    }
    let factor = (dst_w / src_w).min(dst_h / src_h);
    (src_w * factor, src_h * factor)
}
