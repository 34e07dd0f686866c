//! Rotation and mirroring of placed node instances.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Tenths of a degree in a full turn.
pub const FULL_TURN: i32 = 3600;

/// Rotation (tenths of a degree, counter-clockwise) plus independent
/// horizontal and vertical mirror flags.
///
/// A point is mirrored first and then rotated about the anchor. Mirroring in
/// both X and Y is the same pose as a half turn, so two orientations compare
/// equal whenever they move every point to the same place.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Orientation {
    angle: i32,
    mirror_x: bool,
    mirror_y: bool,
}

fn wrap(angle: i32) -> i32 {
    angle.rem_euclid(FULL_TURN)
}

impl Orientation {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_parts(angle: i32, mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            angle: wrap(angle),
            mirror_x,
            mirror_y,
        }
    }

    pub fn rotation(angle: i32) -> Self {
        Self::from_parts(angle, false, false)
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn mirror_x(&self) -> bool {
        self.mirror_x
    }

    pub fn mirror_y(&self) -> bool {
        self.mirror_y
    }

    /// Fold mirror-Y into mirror-X plus a half turn.
    fn canonical(&self) -> (i32, bool) {
        if self.mirror_y {
            (wrap(self.angle + FULL_TURN / 2), !self.mirror_x)
        } else {
            (self.angle, self.mirror_x)
        }
    }

    pub fn is_identity(&self) -> bool {
        self.canonical() == (0, false)
    }

    /// True for 90 and 270 degrees, where the displayed X extent is the
    /// node's native Y extent.
    pub fn is_odd_quarter_turn(&self) -> bool {
        self.angle % (FULL_TURN / 2) == FULL_TURN / 4
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn concatenate(&self, other: &Orientation) -> Orientation {
        let (a1, m1) = self.canonical();
        let (a2, m2) = other.canonical();
        let angle = if m1 { a1 - a2 } else { a1 + a2 };
        Orientation::from_parts(angle, m1 != m2, false)
    }

    pub fn inverse(&self) -> Orientation {
        let (angle, mirrored) = self.canonical();
        if mirrored {
            // a reflection followed by a rotation is its own inverse
            Orientation::from_parts(angle, true, false)
        } else {
            Orientation::from_parts(-angle, false, false)
        }
    }

    /// Transform a point given relative to the anchor.
    pub fn apply(&self, p: &Point) -> Point {
        let mut x = if self.mirror_x { -p.x } else { p.x };
        let mut y = if self.mirror_y { -p.y } else { p.y };
        match self.angle {
            0 => {}
            900 => (x, y) = (-y, x),
            1800 => (x, y) = (-x, -y),
            2700 => (x, y) = (y, -x),
            tenths => {
                let rad = (tenths as f64 / 10.0).to_radians();
                let (sin, cos) = rad.sin_cos();
                (x, y) = (x * cos - y * sin, x * sin + y * cos);
            }
        }
        Point::new(x, y)
    }
}

impl PartialEq for Orientation {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.angle as f64 / 10.0)?;
        if self.mirror_x {
            write!(f, " MX")?;
        }
        if self.mirror_y {
            write!(f, " MY")?;
        }
        Ok(())
    }
}
