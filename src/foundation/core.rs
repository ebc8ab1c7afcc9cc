pub use kurbo::{Affine, Point};

/// Rotation about a pivot point, in degrees (clockwise in a y-down space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    /// Angle in degrees.
    pub degrees: f64,
    /// Pivot in draw-target coordinates.
    pub pivot: Point,
}

impl Rotation {
    /// Rotation of `degrees` about `(px, py)`.
    pub fn new(degrees: f64, px: f64, py: f64) -> Self {
        Self {
            degrees,
            pivot: Point::new(px, py),
        }
    }

    /// Equivalent affine transform.
    pub fn to_affine(self) -> Affine {
        Affine::rotate_about(self.degrees.to_radians(), self.pivot)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as a byte array in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
