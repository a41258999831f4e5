use crate::domain::catalog::Rgb;
use crate::domain::ports::Surface;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgb,
        alpha: f64,
    },
}

/// Headless surface that records what a frame would draw.
///
/// `clear` drops the previous frame's commands, so the list always holds the
/// latest frame only; the counters cover the surface's whole life.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
    clears: u64,
    total_fills: u64,
}

impl DrawList {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn total_fills(&self) -> u64 {
        self.total_fills
    }

    /// Fills of the latest frame that land on the visible surface.
    pub fn visible_fills(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| match command {
                DrawCommand::FillCircle { x, y, .. } => {
                    (0.0..=self.width).contains(x) && (0.0..=self.height).contains(y)
                }
            })
            .count()
    }
}

impl Surface for DrawList {
    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64) {
        self.commands.push(DrawCommand::FillCircle {
            x,
            y,
            radius,
            color,
            alpha,
        });
        self.total_fills += 1;
    }
}
