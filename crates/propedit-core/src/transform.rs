//! Turns edited placement fields into one geometric delta.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::node::NodeInstance;
use crate::orientation::{Orientation, FULL_TURN};
use crate::settings::EditorSettings;
use crate::sizing::ModelSize;

/// Relative change applied to a node in one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceDelta {
    pub dx: f64,
    pub dy: f64,
    /// Change of the native X size.
    pub d_width: f64,
    /// Change of the native Y size.
    pub d_height: f64,
    /// Applied after the current orientation.
    pub d_orient: Orientation,
}

impl InstanceDelta {
    pub fn none() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            d_width: 0.0,
            d_height: 0.0,
            d_orient: Orientation::identity(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.dx == 0.0
            && self.dy == 0.0
            && self.d_width == 0.0
            && self.d_height == 0.0
            && self.d_orient.is_identity()
    }
}

impl Default for InstanceDelta {
    fn default() -> Self {
        Self::none()
    }
}

/// Placement values as shown in the property fields.
///
/// Sizes are visible sizes in the displayed frame: for a node turned by an
/// odd quarter turn the displayed X size is the native Y size, and the
/// mirror flags are exchanged along with the axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub x_size: f64,
    pub y_size: f64,
    /// Tenths of a degree.
    pub rotation: i32,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl Placement {
    pub fn of(node: &NodeInstance) -> Self {
        let o = node.orientation;
        let (vx, vy) = node.visible_size();
        if o.is_odd_quarter_turn() {
            Self {
                x: node.anchor.x,
                y: node.anchor.y,
                x_size: vy,
                y_size: vx,
                rotation: o.angle(),
                mirror_x: o.mirror_y(),
                mirror_y: o.mirror_x(),
            }
        } else {
            Self {
                x: node.anchor.x,
                y: node.anchor.y,
                x_size: vx,
                y_size: vy,
                rotation: o.angle(),
                mirror_x: o.mirror_x(),
                mirror_y: o.mirror_y(),
            }
        }
    }

    /// Displayed axes are exchanged with the native ones.
    pub fn swaps_xy(&self) -> bool {
        self.rotation.rem_euclid(FULL_TURN / 2) == FULL_TURN / 4
    }
}

/// Result of reconciling placement fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub delta: InstanceDelta,
    /// New absolute outline, when the node has one and it was reshaped.
    pub outline: Option<Vec<Point>>,
}

pub struct TransformReconciler<'a> {
    settings: &'a EditorSettings,
}

impl<'a> TransformReconciler<'a> {
    pub fn new(settings: &'a EditorSettings) -> Self {
        Self { settings }
    }

    fn step(&self, from: f64, to: f64) -> f64 {
        if self.settings.nearly_equal(from, to) {
            0.0
        } else {
            self.settings.round(to - from)
        }
    }

    fn ratio(&self, from: f64, to: f64) -> f64 {
        if from.abs() <= self.settings.epsilon || self.settings.nearly_equal(from, to) {
            1.0
        } else {
            to / from
        }
    }

    /// Orientation change from the stored orientation to the one typed in.
    pub fn orientation_delta(
        &self,
        initial: &Placement,
        current: &Placement,
        stored: &Orientation,
    ) -> Orientation {
        if initial.rotation == current.rotation
            && initial.mirror_x == current.mirror_x
            && initial.mirror_y == current.mirror_y
        {
            return Orientation::identity();
        }
        let (mx, my) = if initial.swaps_xy() {
            (current.mirror_y, current.mirror_x)
        } else {
            (current.mirror_x, current.mirror_y)
        };
        let target = Orientation::from_parts(current.rotation, mx, my);
        target.concatenate(&stored.inverse())
    }

    /// Compute the delta taking `node` from `initial` to `current`.
    ///
    /// With a size model the model's box replaces the size fields. With an
    /// outline the reshaping is carried by the new outline and the delta
    /// keeps only the translation. Outline points are turned by the whole
    /// orientation delta, mirroring included, so the outline stays aligned
    /// with the node's new pose.
    pub fn reconcile(
        &self,
        node: &NodeInstance,
        initial: &Placement,
        current: &Placement,
        model: Option<&ModelSize>,
    ) -> TransformOutcome {
        let dx = self.step(initial.x, current.x);
        let dy = self.step(initial.y, current.y);
        let d_orient = self.orientation_delta(initial, current, &node.orientation);

        if let Some(outline) = node.outline.as_deref() {
            let sx = self.ratio(initial.x_size, current.x_size);
            let sy = self.ratio(initial.y_size, current.y_size);
            let reshaped = sx != 1.0 || sy != 1.0 || !d_orient.is_identity();
            let outline = reshaped.then(|| {
                let anchor = Point::new(node.anchor.x + dx, node.anchor.y + dy);
                outline
                    .iter()
                    .map(|p| {
                        let rel = d_orient.apply(&p.relative_to(&node.anchor).scale(sx, sy));
                        rel.translate(anchor.x, anchor.y)
                    })
                    .collect()
            });
            return TransformOutcome {
                delta: InstanceDelta {
                    dx,
                    dy,
                    ..InstanceDelta::none()
                },
                outline,
            };
        }

        let (d_width, d_height) = match model {
            Some(ModelSize {
                native: Some((w, h)),
                ..
            }) => (self.step(node.x_size, *w), self.step(node.y_size, *h)),
            Some(_) => (0.0, 0.0),
            None => {
                let (iw, ih, cw, ch) = if initial.swaps_xy() {
                    (initial.y_size, initial.x_size, current.y_size, current.x_size)
                } else {
                    (initial.x_size, initial.y_size, current.x_size, current.y_size)
                };
                (self.step(iw, cw), self.step(ih, ch))
            }
        };

        TransformOutcome {
            delta: InstanceDelta {
                dx,
                dy,
                d_width,
                d_height,
                d_orient,
            },
            outline: None,
        }
    }
}
