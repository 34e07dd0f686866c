//! Engineering size models of transistors, resistors and capacitors.
//!
//! For these nodes the two size fields carry a width and a length rather than
//! a raw bounding box. The model decides what those numbers mean: variables
//! on the node, or a box derived from them.

use serde::{Deserialize, Serialize};

use crate::attributes::{keys, AttributeEdit};
use crate::node::{NodeInstance, VarValue};
use crate::settings::EditorSettings;
use crate::text::{format_number, parse_number, parse_or};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SizeModel {
    /// Schematic symbol: the box never changes, width and length are
    /// annotations stored as variables.
    Schematic,
    /// Serpentine layout transistor: the gate path fixes the width, only the
    /// length can be edited. The box never changes.
    Serpentine,
    /// Box is `(width + x_offset, length + y_offset)` in the native frame.
    Scaled { x_offset: f64, y_offset: f64 },
}

/// What a size model made of the width and length fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelSize {
    /// Target native size; `None` keeps the box as it is.
    pub native: Option<(f64, f64)>,
    pub attributes: Vec<AttributeEdit>,
}

impl SizeModel {
    pub fn width_editable(&self) -> bool {
        !matches!(self, SizeModel::Serpentine)
    }

    /// Width and length as displayed in the size fields.
    pub fn load(&self, node: &NodeInstance) -> (String, String) {
        match self {
            SizeModel::Scaled { x_offset, y_offset } => (
                format_number(node.x_size - x_offset),
                format_number(node.y_size - y_offset),
            ),
            SizeModel::Schematic | SizeModel::Serpentine => {
                let (vx, vy) = node.visible_size();
                let shown = |key: &str, fallback: f64| {
                    node.var(key)
                        .map(VarValue::to_text)
                        .unwrap_or_else(|| format_number(fallback))
                };
                (shown(keys::WIDTH, vx), shown(keys::LENGTH, vy))
            }
        }
    }

    /// Resolve edited width and length text. `None` means the field was not
    /// edited.
    pub fn resolve(
        &self,
        node: &NodeInstance,
        width: Option<&str>,
        length: Option<&str>,
        settings: &EditorSettings,
    ) -> ModelSize {
        match self {
            SizeModel::Schematic => ModelSize {
                native: None,
                attributes: [(keys::WIDTH, width), (keys::LENGTH, length)]
                    .into_iter()
                    .filter_map(|(key, text)| annotation(key, text?, node, settings))
                    .collect(),
            },
            SizeModel::Serpentine => {
                let attributes = length
                    .and_then(|text| match parse_number(text) {
                        Some(v) => Some(AttributeEdit::set(keys::LENGTH, VarValue::Double(v))),
                        None => {
                            log::debug!("serpentine length {text:?} ignored");
                            None
                        }
                    })
                    .into_iter()
                    .collect();
                ModelSize {
                    native: None,
                    attributes,
                }
            }
            SizeModel::Scaled { x_offset, y_offset } => {
                let w = width.map_or(node.x_size - x_offset, |t| {
                    parse_or(t, node.x_size - x_offset)
                });
                let l = length.map_or(node.y_size - y_offset, |t| {
                    parse_or(t, node.y_size - y_offset)
                });
                ModelSize {
                    native: Some((w + x_offset, l + y_offset)),
                    attributes: Vec::new(),
                }
            }
        }
    }
}

/// Schematic width/length: numbers are stored as doubles, anything else as
/// text so expressions survive.
fn annotation(
    key: &str,
    text: &str,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Option<AttributeEdit> {
    let text = text.trim();
    if settings.is_default_text(text) {
        return node.var(key).map(|_| AttributeEdit::delete(key));
    }
    let value = match text.parse::<f64>() {
        Ok(v) => VarValue::Double(v),
        Err(_) => VarValue::Text(text.to_string()),
    };
    Some(AttributeEdit::set(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{NodeFunction, TransistorKind};
    use crate::geometry::Point;
    use crate::node::NodeProto;

    fn transistor(model: SizeModel, x: f64, y: f64) -> NodeInstance {
        NodeInstance::new(
            "m1",
            NodeProto::new(
                "nmos",
                NodeFunction::Transistor {
                    kind: TransistorKind::NMos,
                    model,
                },
            ),
            Point::new(0.0, 0.0),
            x,
            y,
        )
    }

    #[test]
    fn test_scaled_box_from_width_and_length() {
        let model = SizeModel::Scaled {
            x_offset: 3.0,
            y_offset: 2.0,
        };
        let node = transistor(model.clone(), 6.0, 4.0);
        assert_eq!(model.load(&node), ("3".to_string(), "2".to_string()));
        let size = model.resolve(&node, Some("5"), None, &EditorSettings::default());
        assert_eq!(size.native, Some((8.0, 4.0)));
        assert!(size.attributes.is_empty());
    }

    #[test]
    fn test_schematic_keeps_box() {
        let model = SizeModel::Schematic;
        let node = transistor(model.clone(), 4.0, 4.0);
        let size = model.resolve(&node, Some("2.5"), Some("W/2"), &EditorSettings::default());
        assert_eq!(size.native, None);
        assert_eq!(
            size.attributes,
            vec![
                AttributeEdit::set(keys::WIDTH, VarValue::Double(2.5)),
                AttributeEdit::set(keys::LENGTH, VarValue::Text("W/2".into())),
            ]
        );
    }

    #[test]
    fn test_serpentine_length_only() {
        let model = SizeModel::Serpentine;
        assert!(!model.width_editable());
        let node = transistor(model.clone(), 4.0, 4.0);
        let size = model.resolve(&node, None, Some("7"), &EditorSettings::default());
        assert_eq!(size.native, None);
        assert_eq!(
            size.attributes,
            vec![AttributeEdit::set(keys::LENGTH, VarValue::Double(7.0))]
        );
    }
}
