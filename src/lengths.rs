//! Cable length totals per circuit group.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use crate::canvas::CanvasState;
use crate::geometry::polyline_length;
use crate::scale::Scale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Pixels,
    Meters,
}

impl LengthUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Pixels => "px",
            LengthUnit::Meters => "m",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LengthReport {
    pub unit: LengthUnit,
    pub groups: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group: &'a str,
    length: String,
    unit: &'static str,
}

impl LengthReport {
    pub fn total(&self) -> f64 {
        self.groups.values().sum()
    }

    pub fn get(&self, group: &str) -> Option<f64> {
        self.groups.get(group).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        for (group, length) in &self.groups {
            out.serialize(CsvRow {
                group,
                length: format!("{length:.2}"),
                unit: self.unit.suffix(),
            })?;
        }
        out.flush()?;
        Ok(())
    }
}

impl fmt::Display for LengthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return writeln!(f, "No grouped connections.");
        }
        for (group, length) in &self.groups {
            writeln!(f, "Group {group}: {length:.2} {}", self.unit.suffix())?;
        }
        Ok(())
    }
}

/// Sums every connection whose two endpoints carry the same non-empty group.
/// Totals are in meters once a scale is set, otherwise in pixels.
pub fn aggregate(canvas: &CanvasState, scale: Option<&Scale>) -> LengthReport {
    let mut groups: BTreeMap<String, f64> = BTreeMap::new();

    for conn in canvas.connections() {
        let (Some(from), Some(to)) = (canvas.icon(&conn.from), canvas.icon(&conn.to)) else {
            continue;
        };
        let group = match (from.group(), to.group()) {
            (Some(a), Some(b)) if a == b => a,
            _ => continue,
        };
        let Some(points) = canvas.polyline(conn) else {
            continue;
        };
        *groups.entry(group.to_string()).or_default() += polyline_length(&points);
    }

    match scale {
        Some(scale) => {
            let ppm = f64::from(scale.pixels_per_meter);
            groups.values_mut().for_each(|length| *length /= ppm);
            LengthReport {
                unit: LengthUnit::Meters,
                groups,
            }
        }
        None => LengthReport {
            unit: LengthUnit::Pixels,
            groups,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{ElementType, IconId};
    use crate::params::ParamForm;
    use approx::assert_relative_eq;

    fn grouped_icon(canvas: &mut CanvasState, x: f32, y: f32, group: &str) -> IconId {
        let id = canvas.place_icon(ElementType::Bulb, Point::new(x, y));
        let mut form = ParamForm::new(ElementType::Bulb);
        form.group = group.to_string();
        canvas.commit_params(&id, form.validate().unwrap()).unwrap();
        id
    }

    fn connect(canvas: &mut CanvasState, a: &IconId, b: &IconId) {
        canvas.click_icon(a);
        canvas.click_icon(b);
    }

    #[test]
    fn groups_sum_in_pixels_without_scale() {
        let mut canvas = CanvasState::new();
        let a = grouped_icon(&mut canvas, 0.0, 0.0, "A");
        let b = grouped_icon(&mut canvas, 30.0, 0.0, "A");
        let c = grouped_icon(&mut canvas, 30.0, 40.0, "A");
        connect(&mut canvas, &a, &b);
        connect(&mut canvas, &b, &c);

        let report = aggregate(&canvas, None);
        assert_eq!(report.unit, LengthUnit::Pixels);
        assert_relative_eq!(report.get("A").unwrap(), 70.0);
        assert_eq!(report.to_string(), "Group A: 70.00 px\n");
    }

    #[test]
    fn mixed_or_missing_groups_are_ignored() {
        let mut canvas = CanvasState::new();
        let a = grouped_icon(&mut canvas, 0.0, 0.0, "A");
        let b = grouped_icon(&mut canvas, 10.0, 0.0, "B");
        let blank = grouped_icon(&mut canvas, 20.0, 0.0, "");
        let bare = canvas.place_icon(ElementType::Switch, Point::new(30.0, 0.0));
        connect(&mut canvas, &a, &b);
        connect(&mut canvas, &blank, &blank);
        connect(&mut canvas, &bare, &a);

        let report = aggregate(&canvas, None);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "No grouped connections.\n");
    }

    #[test]
    fn bends_count_toward_length() {
        let mut canvas = CanvasState::new();
        let a = grouped_icon(&mut canvas, 0.0, 0.0, "K1");
        let b = grouped_icon(&mut canvas, 60.0, 0.0, "K1");
        connect(&mut canvas, &a, &b);
        let conn = canvas.connections()[0].id;
        canvas.insert_vertex(conn, Point::new(0.0, 40.0)).unwrap();
        canvas.insert_vertex(conn, Point::new(60.0, 40.0)).unwrap();

        assert_relative_eq!(aggregate(&canvas, None).get("K1").unwrap(), 140.0);
    }

    #[test]
    fn scale_converts_to_meters() {
        let mut canvas = CanvasState::new();
        let a = grouped_icon(&mut canvas, 0.0, 0.0, "A");
        let b = grouped_icon(&mut canvas, 100.0, 0.0, "A");
        connect(&mut canvas, &a, &b);
        let scale = Scale {
            a: Point::new(0.0, 0.0),
            b: Point::new(100.0, 0.0),
            pixels_per_meter: 50.0,
        };

        let report = aggregate(&canvas, Some(&scale));
        assert_eq!(report.unit, LengthUnit::Meters);
        assert_eq!(report.to_string(), "Group A: 2.00 m\n");
    }

    #[test]
    fn csv_lists_each_group() {
        let report = LengthReport {
            unit: LengthUnit::Meters,
            groups: BTreeMap::from([("A".to_string(), 2.0), ("B".to_string(), 12.346)]),
        };
        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "group,length,unit\nA,2.00,m\nB,12.35,m\n"
        );
        assert_relative_eq!(report.total(), 14.346);
    }
}
