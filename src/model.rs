use std::fmt;
use strum::{AsRefStr, EnumIter};

use crate::geometry::Point;
use crate::params::IconParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, AsRefStr)]
pub enum ElementType {
    #[strum(serialize = "bulb")]
    Bulb,
    #[strum(serialize = "sensor")]
    Sensor,
    #[strum(serialize = "switch")]
    Switch,
    #[strum(serialize = "mainPanel")]
    MainPanel,
}

impl ElementType {
    pub fn label(self) -> &'static str {
        match self {
            ElementType::Bulb => "Bulb",
            ElementType::Sensor => "Sensor",
            ElementType::Switch => "Switch",
            ElementType::MainPanel => "Main panel",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ElementType::Bulb => "💡",
            ElementType::Sensor => "📡",
            ElementType::Switch => "🔘",
            ElementType::MainPanel => "🗄",
        }
    }

    /// Fill colour used both on screen and in exported images.
    pub fn color(self) -> [u8; 4] {
        match self {
            ElementType::Bulb => [232, 196, 72, 255],
            ElementType::Sensor => [86, 156, 214, 255],
            ElementType::Switch => [122, 202, 137, 255],
            ElementType::MainPanel => [189, 86, 92, 255],
        }
    }
}

/// `<type>-<unix millis>`, optionally suffixed when two drops share a
/// millisecond.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IconId(String);

impl IconId {
    pub fn new(element: ElementType, millis: i64, collision: u32) -> Self {
        if collision == 0 {
            Self(format!("{}-{millis}", element.as_ref()))
        } else {
            Self(format!("{}-{millis}-{collision}", element.as_ref()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IconId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub id: IconId,
    pub element: ElementType,
    /// Anchor point where cables attach; the icon is drawn centred on it.
    pub position: Point,
    pub params: Option<IconParams>,
}

impl Icon {
    pub fn group(&self) -> Option<&str> {
        self.params.as_ref().and_then(IconParams::group)
    }

    pub fn name(&self) -> Option<&str> {
        self.params
            .as_ref()
            .map(IconParams::name)
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cable between two icons. Endpoints are unordered for grouping purposes;
/// `vertices` keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: IconId,
    pub to: IconId,
    pub vertices: Vec<Point>,
}

impl Connection {
    pub fn touches(&self, icon: &IconId) -> bool {
        &self.from == icon || &self.to == icon
    }

    pub fn joins(&self, a: &IconId, b: &IconId) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn ids_carry_the_element_tag() {
        assert_eq!(IconId::new(ElementType::MainPanel, 1700, 0).as_str(), "mainPanel-1700");
        assert_eq!(IconId::new(ElementType::Bulb, 1700, 2).as_str(), "bulb-1700-2");
    }

    #[test]
    fn palette_lists_every_element() {
        let labels: Vec<_> = ElementType::iter().map(ElementType::label).collect();
        assert_eq!(labels, ["Bulb", "Sensor", "Switch", "Main panel"]);
    }

    #[test]
    fn joins_ignores_direction() {
        let conn = Connection {
            id: ConnectionId(1),
            from: IconId::from("bulb-1"),
            to: IconId::from("switch-2"),
            vertices: vec![],
        };
        assert!(conn.joins(&IconId::from("switch-2"), &IconId::from("bulb-1")));
        assert!(conn.touches(&IconId::from("bulb-1")));
        assert!(!conn.touches(&IconId::from("sensor-3")));
    }
}
