//! Typed parameter records for placed icons and the text form they are
//! entered through.

use strum::EnumIter;
use thiserror::Error;

use crate::model::ElementType;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{field} must be a non-negative number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
pub enum BulbInterface {
    #[default]
    Pwm,
    Tw,
    Rgb,
    Triac,
    Dali,
    Dmx,
    Relay,
}

impl BulbInterface {
    pub fn label(self) -> &'static str {
        match self {
            BulbInterface::Pwm => "PWM",
            BulbInterface::Tw => "TW",
            BulbInterface::Rgb => "RGB",
            BulbInterface::Triac => "TRIAC",
            BulbInterface::Dali => "DALI",
            BulbInterface::Dmx => "DMX",
            BulbInterface::Relay => "RELAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
pub enum SensorKind {
    #[default]
    Motion,
    Temperature,
    Illuminance,
    AirQuality,
    MagneticContact,
}

impl SensorKind {
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Motion => "Motion",
            SensorKind::Temperature => "Temperature",
            SensorKind::Illuminance => "Illuminance",
            SensorKind::AirQuality => "Air quality",
            SensorKind::MagneticContact => "Magnetic contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
pub enum SensorInterface {
    #[default]
    Di,
    Rs485,
    Ai,
    OneWire,
}

impl SensorInterface {
    pub fn label(self) -> &'static str {
        match self {
            SensorInterface::Di => "DI",
            SensorInterface::Rs485 => "RS485",
            SensorInterface::Ai => "AI",
            SensorInterface::OneWire => "1-wire",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
pub enum SwitchInterface {
    #[default]
    Di,
    OneWire,
}

impl SwitchInterface {
    pub fn label(self) -> &'static str {
        match self {
            SwitchInterface::Di => "DI",
            SwitchInterface::OneWire => "1-wire",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulbParams {
    pub name: String,
    pub power_a: Option<f32>,
    pub voltage_v: Option<f32>,
    pub interface: BulbInterface,
    pub cable_drop_m: Option<f32>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorParams {
    pub name: String,
    pub kind: SensorKind,
    pub supply: String,
    pub interface: SensorInterface,
    pub cable_drop_m: Option<f32>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwitchParams {
    pub name: String,
    pub interface: SwitchInterface,
    pub cable_drop_m: Option<f32>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MainPanelParams {
    pub name: String,
    pub cable_drop_m: Option<f32>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IconParams {
    Bulb(BulbParams),
    Sensor(SensorParams),
    Switch(SwitchParams),
    MainPanel(MainPanelParams),
}

impl IconParams {
    pub fn element(&self) -> ElementType {
        match self {
            IconParams::Bulb(_) => ElementType::Bulb,
            IconParams::Sensor(_) => ElementType::Sensor,
            IconParams::Switch(_) => ElementType::Switch,
            IconParams::MainPanel(_) => ElementType::MainPanel,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            IconParams::Bulb(p) => &p.name,
            IconParams::Sensor(p) => &p.name,
            IconParams::Switch(p) => &p.name,
            IconParams::MainPanel(p) => &p.name,
        }
    }

    /// Circuit label; blank labels count as no group.
    pub fn group(&self) -> Option<&str> {
        let group = match self {
            IconParams::Bulb(p) => &p.group,
            IconParams::Sensor(p) => &p.group,
            IconParams::Switch(p) => &p.group,
            IconParams::MainPanel(p) => &p.group,
        };
        group.as_deref().map(str::trim).filter(|g| !g.is_empty())
    }

    /// Key/value pairs shown next to an icon when parameters are visible.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![("name", self.name().to_string())];
        match self {
            IconParams::Bulb(p) => {
                push_number(&mut out, "power, A", p.power_a);
                push_number(&mut out, "voltage, V", p.voltage_v);
                out.push(("interface", p.interface.label().to_string()));
                push_number(&mut out, "cable drop, m", p.cable_drop_m);
            }
            IconParams::Sensor(p) => {
                out.push(("type", p.kind.label().to_string()));
                if !p.supply.is_empty() {
                    out.push(("supply", p.supply.clone()));
                }
                out.push(("interface", p.interface.label().to_string()));
                push_number(&mut out, "cable drop, m", p.cable_drop_m);
            }
            IconParams::Switch(p) => {
                out.push(("interface", p.interface.label().to_string()));
                push_number(&mut out, "cable drop, m", p.cable_drop_m);
            }
            IconParams::MainPanel(p) => {
                push_number(&mut out, "cable drop, m", p.cable_drop_m);
            }
        }
        if let Some(group) = self.group() {
            out.push(("group", group.to_string()));
        }
        out
    }
}

fn push_number(out: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<f32>) {
    if let Some(value) = value {
        out.push((key, value.to_string()));
    }
}

/// Raw form contents, exactly as typed. Only [`ParamForm::validate`] turns it
/// into an [`IconParams`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParamForm {
    pub element: ElementType,
    pub name: String,
    pub group: String,
    pub power: String,
    pub voltage: String,
    pub supply: String,
    pub cable: String,
    pub bulb_interface: BulbInterface,
    pub sensor_kind: SensorKind,
    pub sensor_interface: SensorInterface,
    pub switch_interface: SwitchInterface,
}

impl ParamForm {
    pub fn new(element: ElementType) -> Self {
        Self {
            element,
            name: String::new(),
            group: String::new(),
            power: String::new(),
            voltage: String::new(),
            supply: String::new(),
            cable: String::new(),
            bulb_interface: BulbInterface::default(),
            sensor_kind: SensorKind::default(),
            sensor_interface: SensorInterface::default(),
            switch_interface: SwitchInterface::default(),
        }
    }

    pub fn from_params(params: &IconParams) -> Self {
        let mut form = Self::new(params.element());
        form.name = params.name().to_string();
        form.group = params.group().unwrap_or_default().to_string();
        let cable = match params {
            IconParams::Bulb(p) => {
                form.power = format_number(p.power_a);
                form.voltage = format_number(p.voltage_v);
                form.bulb_interface = p.interface;
                p.cable_drop_m
            }
            IconParams::Sensor(p) => {
                form.sensor_kind = p.kind;
                form.supply = p.supply.clone();
                form.sensor_interface = p.interface;
                p.cable_drop_m
            }
            IconParams::Switch(p) => {
                form.switch_interface = p.interface;
                p.cable_drop_m
            }
            IconParams::MainPanel(p) => p.cable_drop_m,
        };
        form.cable = format_number(cable);
        form
    }

    pub fn validate(&self) -> Result<IconParams, ParamError> {
        let name = self.name.trim().to_string();
        let group = Some(self.group.trim().to_string()).filter(|g| !g.is_empty());
        let cable_drop_m = parse_number("cable drop", &self.cable)?;

        let params = match self.element {
            ElementType::Bulb => IconParams::Bulb(BulbParams {
                name,
                power_a: parse_number("power", &self.power)?,
                voltage_v: parse_number("voltage", &self.voltage)?,
                interface: self.bulb_interface,
                cable_drop_m,
                group,
            }),
            ElementType::Sensor => IconParams::Sensor(SensorParams {
                name,
                kind: self.sensor_kind,
                supply: self.supply.trim().to_string(),
                interface: self.sensor_interface,
                cable_drop_m,
                group,
            }),
            ElementType::Switch => IconParams::Switch(SwitchParams {
                name,
                interface: self.switch_interface,
                cable_drop_m,
                group,
            }),
            ElementType::MainPanel => IconParams::MainPanel(MainPanelParams {
                name,
                cable_drop_m,
                group,
            }),
        };
        Ok(params)
    }
}

fn format_number(value: Option<f32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_number(field: &'static str, raw: &str) -> Result<Option<f32>, ParamError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.replace(',', ".").parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(ParamError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulb_form_parses_numbers() {
        let mut form = ParamForm::new(ElementType::Bulb);
        form.name = " Hall light ".into();
        form.power = "0,5".into();
        form.voltage = "24".into();
        form.group = "A".into();
        form.bulb_interface = BulbInterface::Dali;

        let IconParams::Bulb(bulb) = form.validate().unwrap() else {
            panic!("expected bulb params");
        };
        assert_eq!(bulb.name, "Hall light");
        assert_eq!(bulb.power_a, Some(0.5));
        assert_eq!(bulb.voltage_v, Some(24.0));
        assert_eq!(bulb.cable_drop_m, None);
        assert_eq!(bulb.interface, BulbInterface::Dali);
        assert_eq!(bulb.group.as_deref(), Some("A"));
    }

    #[test]
    fn bad_number_names_the_field() {
        let mut form = ParamForm::new(ElementType::Switch);
        form.cable = "three".into();
        assert_eq!(
            form.validate(),
            Err(ParamError::InvalidNumber {
                field: "cable drop",
                value: "three".into()
            })
        );

        let mut form = ParamForm::new(ElementType::Bulb);
        form.voltage = "-12".into();
        assert!(matches!(
            form.validate(),
            Err(ParamError::InvalidNumber { field: "voltage", .. })
        ));
    }

    #[test]
    fn blank_group_is_no_group() {
        let mut form = ParamForm::new(ElementType::MainPanel);
        form.group = "   ".into();
        let params = form.validate().unwrap();
        assert_eq!(params.group(), None);
        assert_eq!(params.element(), ElementType::MainPanel);
    }

    #[test]
    fn form_prefills_from_existing_params() {
        let params = IconParams::Sensor(SensorParams {
            name: "Door".into(),
            kind: SensorKind::MagneticContact,
            supply: "12V".into(),
            interface: SensorInterface::OneWire,
            cable_drop_m: Some(1.5),
            group: Some("B".into()),
        });
        let form = ParamForm::from_params(&params);
        assert_eq!(form.cable, "1.5");
        assert_eq!(form.group, "B");
        assert_eq!(form.validate().unwrap(), params);
    }

    #[test]
    fn entries_skip_unset_numbers() {
        let params = IconParams::Bulb(BulbParams {
            name: "Lamp".into(),
            voltage_v: Some(230.0),
            group: Some("K1".into()),
            ..Default::default()
        });
        let keys: Vec<_> = params.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["name", "voltage, V", "interface", "group"]);
    }
}
