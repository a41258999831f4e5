use crate::domain::catalog::{Rgb, RingColor};
use std::f64::consts::TAU;
use std::time::Duration;

/// Radians per second while auto-rotating.
pub const AUTO_ROTATE_SPEED: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialPalette {
    pub base: Rgb,
    pub circuit: Rgb,
    pub display: Rgb,
}

impl MaterialPalette {
    pub fn for_color(color: RingColor) -> Self {
        let circuit = match color {
            RingColor::Black => Rgb::new(0x22, 0x22, 0x22),
            RingColor::Green => Rgb::new(0x15, 0x80, 0x3d),
            RingColor::Blue => Rgb::new(0x1e, 0x40, 0xaf),
        };
        Self {
            base: color.finish(),
            circuit,
            display: Rgb::new(0, 0, 0),
        }
    }
}

/// State of the 3D ring model in the hero section.
#[derive(Debug, Clone, PartialEq)]
pub struct RingViewer {
    color: RingColor,
    auto_rotate: bool,
    rotation_y: f64,
}

impl RingViewer {
    pub fn new(color: RingColor) -> Self {
        Self {
            color,
            auto_rotate: true,
            rotation_y: 0.0,
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if self.auto_rotate {
            self.rotation_y = (self.rotation_y + AUTO_ROTATE_SPEED * elapsed.as_secs_f64()).rem_euclid(TAU);
        }
    }

    /// Manual drag; stops auto rotation like grabbing the model does.
    pub fn rotate_by(&mut self, radians: f64) {
        self.auto_rotate = false;
        self.rotation_y = (self.rotation_y + radians).rem_euclid(TAU);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn set_color(&mut self, color: RingColor) {
        self.color = color;
    }

    pub fn color(&self) -> RingColor {
        self.color
    }

    pub fn rotation(&self) -> f64 {
        self.rotation_y
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn palette(&self) -> MaterialPalette {
        MaterialPalette::for_color(self.color)
    }
}
