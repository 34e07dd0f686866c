use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::{AttributeEdit, NodeFunction};
use crate::geometry::{BBox, Point};
use crate::orientation::Orientation;
use crate::transform::InstanceDelta;

/// Unique node instance identifier.
pub type NodeId = Uuid;

/// A typed value stored under a variable key on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VarValue {
    Int(i64),
    Double(f64),
    Text(String),
    Doubles(Vec<f64>),
}

impl VarValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VarValue::Int(v) => Some(*v as f64),
            VarValue::Double(v) => Some(*v),
            VarValue::Text(s) => crate::text::parse_number(s),
            VarValue::Doubles(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            VarValue::Int(v) => Some(*v),
            VarValue::Double(v) => Some(v.round() as i64),
            VarValue::Text(s) => s.trim().parse().ok(),
            VarValue::Doubles(_) => None,
        }
    }

    /// The value as it appears in an edit field.
    pub fn to_text(&self) -> String {
        match self {
            VarValue::Int(v) => v.to_string(),
            VarValue::Double(v) => crate::text::format_number(*v),
            VarValue::Text(s) => s.clone(),
            VarValue::Doubles(vs) => vs
                .iter()
                .map(|v| crate::text::format_number(*v))
                .collect::<Vec<_>>()
                .join(" / "),
        }
    }
}

/// Inset of a primitive's visible extent from its full bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeOffset {
    pub low_x: f64,
    pub high_x: f64,
    pub low_y: f64,
    pub high_y: f64,
}

impl SizeOffset {
    pub fn x(&self) -> f64 {
        self.low_x + self.high_x
    }

    pub fn y(&self) -> f64 {
        self.low_y + self.high_y
    }
}

/// The prototype a node is an instance of. Its function is what decides which
/// specialized attributes the node carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProto {
    pub name: String,
    pub function: NodeFunction,
    #[serde(default)]
    pub size_offset: SizeOffset,
}

impl NodeProto {
    pub fn new(name: &str, function: NodeFunction) -> Self {
        Self {
            name: name.to_string(),
            function,
            size_offset: SizeOffset::default(),
        }
    }

    pub fn with_size_offset(mut self, offset: SizeOffset) -> Self {
        self.size_offset = offset;
        self
    }
}

/// A placed circuit element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstance {
    pub id: NodeId,
    pub name: String,
    pub proto: NodeProto,
    /// Anchor (center) of the node.
    pub anchor: Point,
    /// Full size in the node's native (unrotated) frame.
    pub x_size: f64,
    pub y_size: f64,
    pub orientation: Orientation,
    /// Explicit outline in absolute coordinates, replacing the default box.
    pub outline: Option<Vec<Point>>,
    pub variables: BTreeMap<String, VarValue>,
    /// Technology-specific bits (port characteristic of global nets).
    pub tech_bits: u32,
    /// Locked nodes refuse every modification.
    pub locked: bool,
}

impl NodeInstance {
    pub fn new(name: &str, proto: NodeProto, anchor: Point, x_size: f64, y_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            proto,
            anchor,
            x_size,
            y_size,
            orientation: Orientation::identity(),
            outline: None,
            variables: BTreeMap::new(),
            tech_bits: 0,
            locked: false,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_outline(mut self, outline: Vec<Point>) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn with_var(mut self, key: &str, value: VarValue) -> Self {
        self.variables.insert(key.to_string(), value);
        self
    }

    pub fn function(&self) -> &NodeFunction {
        &self.proto.function
    }

    pub fn var(&self, key: &str) -> Option<&VarValue> {
        self.variables.get(key)
    }

    pub fn var_f64(&self, key: &str) -> Option<f64> {
        self.var(key).and_then(VarValue::as_f64)
    }

    /// Size the user sees: the native size minus the prototype's offsets.
    pub fn visible_size(&self) -> (f64, f64) {
        let so = &self.proto.size_offset;
        (self.x_size - so.x(), self.y_size - so.y())
    }

    /// Bounding box in absolute coordinates.
    pub fn bbox(&self) -> BBox {
        if let Some(bb) = self.outline.as_deref().and_then(BBox::from_points) {
            return bb;
        }
        let (w, h) = if self.orientation.is_odd_quarter_turn() {
            (self.y_size, self.x_size)
        } else {
            (self.x_size, self.y_size)
        };
        BBox::centered(self.anchor, w, h)
    }

    /// Move, resize and reorient in place. An existing outline travels with
    /// the anchor.
    pub fn modify(&mut self, delta: &InstanceDelta) {
        self.anchor = self.anchor.translate(delta.dx, delta.dy);
        if let Some(outline) = &mut self.outline {
            for p in outline.iter_mut() {
                *p = p.translate(delta.dx, delta.dy);
            }
        }
        self.x_size += delta.d_width;
        self.y_size += delta.d_height;
        self.orientation = delta.d_orient.concatenate(&self.orientation);
    }

    /// Replace the outline wholesale and resize the node to enclose it.
    pub fn replace_outline(&mut self, outline: Vec<Point>) {
        if let Some(bb) = BBox::from_points(&outline) {
            let (w, h) = if self.orientation.is_odd_quarter_turn() {
                (bb.height(), bb.width())
            } else {
                (bb.width(), bb.height())
            };
            self.x_size = w;
            self.y_size = h;
        }
        self.outline = Some(outline);
    }

    pub fn apply_attribute(&mut self, edit: &AttributeEdit) {
        match edit {
            AttributeEdit::Set { key, value } => {
                self.variables.insert(key.clone(), value.clone());
            }
            AttributeEdit::Delete { key } => {
                self.variables.remove(key);
            }
            AttributeEdit::TechBits(bits) => self.tech_bits = *bits,
        }
    }
}
