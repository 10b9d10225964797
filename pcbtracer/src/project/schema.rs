//! Drawing Primitive Records
//!
//! These are the records produced by the drawing layer and persisted in the
//! project file. The connectivity engine only reads them; it never mutates a
//! snapshot it was handed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::options::NetlistOptions;

/// Point identifier assigned by the drawing layer.
///
/// Two primitives carrying the same identifier are the same electrical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

impl PointId {
    /// Parse a component pin connection string.
    ///
    /// Returns `None` for empty, non-numeric and non-positive values, which
    /// all mean "unconnected".
    pub fn parse_connection(raw: &str) -> Option<Self> {
        let value: i64 = raw.trim().parse().ok()?;
        if value > 0 {
            Some(PointId(value as u64))
        } else {
            None
        }
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PointId {
    fn from(value: u64) -> Self {
        PointId(value)
    }
}

/// Kind of a drawn stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeType {
    Via,
    Pad,
    Trace,
}

impl fmt::Display for StrokeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrokeType::Via => write!(f, "via"),
            StrokeType::Pad => write!(f, "pad"),
            StrokeType::Trace => write!(f, "trace"),
        }
    }
}

/// A vertex of a stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,

    /// Point identifier; absent for vertices the drawing layer never bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PointId>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, id: None }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(PointId(id));
        self
    }
}

fn default_layer() -> String {
    "top".to_string()
}

/// A via, pad or trace polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: String,

    #[serde(rename = "type")]
    pub stroke_type: StrokeType,

    #[serde(default)]
    pub points: Vec<StrokePoint>,

    #[serde(default = "default_layer")]
    pub layer: String,
}

impl Stroke {
    pub fn new(id: impl Into<String>, stroke_type: StrokeType) -> Self {
        Self {
            id: id.into(),
            stroke_type,
            points: Vec::new(),
            layer: default_layer(),
        }
    }

    /// Single-point via stroke
    pub fn via(id: impl Into<String>, point_id: u64, x: f64, y: f64) -> Self {
        Self::new(id, StrokeType::Via).with_point(StrokePoint::new(x, y).with_id(point_id))
    }

    /// Single-point pad stroke
    pub fn pad(id: impl Into<String>, point_id: u64, x: f64, y: f64) -> Self {
        Self::new(id, StrokeType::Pad).with_point(StrokePoint::new(x, y).with_id(point_id))
    }

    /// Trace polyline through the given `(point_id, x, y)` vertices
    pub fn trace(id: impl Into<String>, vertices: &[(u64, f64, f64)]) -> Self {
        let mut stroke = Self::new(id, StrokeType::Trace);
        for &(point_id, x, y) in vertices {
            stroke.points.push(StrokePoint::new(x, y).with_id(point_id));
        }
        stroke
    }

    pub fn with_point(mut self, point: StrokePoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn is_trace(&self) -> bool {
        self.stroke_type == StrokeType::Trace
    }

    /// The point that anchors a via or pad; only the first point counts
    pub fn anchor(&self) -> Option<&StrokePoint> {
        self.points.first()
    }
}

/// A placed component with its pin connection table.
///
/// Only `id`, `component_type`, `pin_count` and `pin_connections` drive
/// connectivity. Type-specific attributes (resistance, voltage, ...) land in
/// `attributes` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,

    #[serde(default)]
    pub component_type: String,

    /// Display designator such as `R1`; falls back to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designator: Option<String>,

    #[serde(default)]
    pub pin_count: usize,

    /// One entry per pin: a decimal point id, empty, or null
    #[serde(default)]
    pub pin_connections: Vec<Option<String>>,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,

    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Component {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            designator: None,
            pin_count: 0,
            pin_connections: Vec::new(),
            x: 0.0,
            y: 0.0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_designator(mut self, designator: impl Into<String>) -> Self {
        self.designator = Some(designator.into());
        self
    }

    /// Set the pin table; `pin_count` follows the number of entries
    pub fn with_pins(mut self, connections: &[&str]) -> Self {
        self.pin_connections = connections.iter().map(|c| Some(c.to_string())).collect();
        self.pin_count = connections.len();
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn display_designator(&self) -> &str {
        self.designator
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// A power symbol dropped on a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSymbol {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_id: Option<PointId>,

    pub power_bus_id: String,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,
}

impl PowerSymbol {
    pub fn new(id: impl Into<String>, point_id: u64, power_bus_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            point_id: Some(PointId(point_id)),
            power_bus_id: power_bus_id.into(),
            x: 0.0,
            y: 0.0,
        }
    }
}

/// A ground symbol dropped on a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundSymbol {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_id: Option<PointId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_bus_id: Option<String>,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,
}

impl GroundSymbol {
    pub fn new(id: impl Into<String>, point_id: u64) -> Self {
        Self {
            id: id.into(),
            point_id: Some(PointId(point_id)),
            ground_bus_id: None,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn on_bus(mut self, ground_bus_id: impl Into<String>) -> Self {
        self.ground_bus_id = Some(ground_bus_id.into());
        self
    }
}

/// A named power rail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBus {
    pub id: String,
    pub name: String,

    /// Voltage as typed by the user, e.g. `+3.3V` or `12 VDC`
    #[serde(default)]
    pub voltage: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PowerBus {
    pub fn new(id: impl Into<String>, name: impl Into<String>, voltage: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            voltage: voltage.into(),
            color: None,
        }
    }
}

/// A named ground rail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundBus {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl GroundBus {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

/// Everything the drawing layer hands to the engine, as one owned value.
///
/// This is also the shape of the persisted project file; keys the engine
/// does not know are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSnapshot {
    #[serde(alias = "drawingStrokes")]
    pub strokes: Vec<Stroke>,
    pub components: Vec<Component>,
    pub power_symbols: Vec<PowerSymbol>,
    pub ground_symbols: Vec<GroundSymbol>,
    pub power_buses: Vec<PowerBus>,
    pub ground_buses: Vec<GroundBus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<NetlistOptions>,
}

impl ProjectSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrowed view used for a single rebuild
    pub fn drawing_state(&self) -> DrawingState<'_> {
        DrawingState {
            strokes: &self.strokes,
            components: &self.components,
            power_symbols: &self.power_symbols,
            ground_symbols: &self.ground_symbols,
            power_buses: &self.power_buses,
            ground_buses: &self.ground_buses,
        }
    }

    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn add_power_symbol(&mut self, symbol: PowerSymbol) {
        self.power_symbols.push(symbol);
    }

    pub fn add_ground_symbol(&mut self, symbol: GroundSymbol) {
        self.ground_symbols.push(symbol);
    }

    pub fn add_power_bus(&mut self, bus: PowerBus) {
        self.power_buses.push(bus);
    }

    pub fn add_ground_bus(&mut self, bus: GroundBus) {
        self.ground_buses.push(bus);
    }
}

/// Read-only view over the input collections of one rebuild
#[derive(Debug, Clone, Copy)]
pub struct DrawingState<'a> {
    pub strokes: &'a [Stroke],
    pub components: &'a [Component],
    pub power_symbols: &'a [PowerSymbol],
    pub ground_symbols: &'a [GroundSymbol],
    pub power_buses: &'a [PowerBus],
    pub ground_buses: &'a [GroundBus],
}
