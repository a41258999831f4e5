//! Ambient particle field behind the page.
//!
//! A batch of slow particles drifts over the viewport and bounces off its
//! edges. The batch is tinted with the theme of the selected ring color and is
//! rebuilt whenever that theme changes.

use crate::domain::catalog::Rgb;
use crate::domain::ports::Surface;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Viewports at most this wide get the small batch.
pub const NARROW_VIEWPORT_WIDTH: f64 = 768.0;
pub const NARROW_PARTICLE_COUNT: usize = 30;
pub const WIDE_PARTICLE_COUNT: usize = 60;
/// Upper bound of |dx| and |dy|, in logical pixels per frame.
pub const MAX_SPEED: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn particle_budget(&self) -> usize {
        if self.width <= NARROW_VIEWPORT_WIDTH {
            NARROW_PARTICLE_COUNT
        } else {
            WIDE_PARTICLE_COUNT
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub radius: f64,
    pub opacity: f64,
}

/// Axes whose velocity was inverted during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reflection {
    pub x: bool,
    pub y: bool,
}

impl Particle {
    fn random<R: Rng>(rng: &mut R, viewport: Viewport) -> Self {
        Self {
            x: rng.gen::<f64>() * viewport.width,
            y: rng.gen::<f64>() * viewport.height,
            dx: (rng.gen::<f64>() - 0.5) * 2.0 * MAX_SPEED,
            dy: (rng.gen::<f64>() - 0.5) * 2.0 * MAX_SPEED,
            radius: rng.gen::<f64>() * 2.0 + 0.5,
            opacity: rng.gen::<f64>() * 0.5 + 0.1,
        }
    }

    /// Moves by one frame, then reflects any axis that is out of bounds and
    /// still heading outward. Positions are never clamped.
    pub fn step(&mut self, viewport: Viewport) -> Reflection {
        self.x += self.dx;
        self.y += self.dy;

        let reflection = Reflection {
            x: (self.x < 0.0 && self.dx < 0.0) || (self.x > viewport.width && self.dx > 0.0),
            y: (self.y < 0.0 && self.dy < 0.0) || (self.y > viewport.height && self.dy > 0.0),
        };

        if reflection.x {
            self.dx = -self.dx;
        }
        if reflection.y {
            self.dy = -self.dy;
        }
        reflection
    }
}

/// One batch of particles sharing a theme color.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    theme: Rgb,
}

impl ParticleField {
    pub fn spawn<R: Rng>(rng: &mut R, viewport: Viewport, theme: Rgb) -> Self {
        let particles = (0..viewport.particle_budget())
            .map(|_| Particle::random(rng, viewport))
            .collect();
        Self { particles, theme }
    }

    pub fn theme(&self) -> Rgb {
        self.theme
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn step(&mut self, viewport: Viewport) {
        for particle in &mut self.particles {
            particle.step(viewport);
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for particle in &self.particles {
            surface.fill_circle(particle.x, particle.y, particle.radius, self.theme, particle.opacity);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundState {
    Unmounted,
    Active,
    Released,
}

/// The background component: owns its surface and the current batch.
///
/// Once [`teardown`](Self::teardown) has run the instance is spent; it never
/// touches the surface again and cannot be mounted a second time.
pub struct AnimatedBackground<S: Surface> {
    surface: S,
    viewport: Viewport,
    field: Option<ParticleField>,
    state: BackgroundState,
    rng: StdRng,
    frames: u64,
}

impl<S: Surface> AnimatedBackground<S> {
    pub fn new(surface: S) -> Self {
        Self::with_rng(surface, StdRng::from_entropy())
    }

    pub fn with_seed(surface: S, seed: u64) -> Self {
        Self::with_rng(surface, StdRng::seed_from_u64(seed))
    }

    fn with_rng(surface: S, rng: StdRng) -> Self {
        Self {
            surface,
            viewport: Viewport::new(0.0, 0.0),
            field: None,
            state: BackgroundState::Unmounted,
            rng,
            frames: 0,
        }
    }

    pub fn mount(&mut self, viewport: Viewport, theme: Rgb) -> bool {
        if self.state != BackgroundState::Unmounted {
            tracing::warn!("Particle background mounted twice; ignoring");
            return false;
        }

        self.viewport = viewport;
        self.surface.resize(viewport.width, viewport.height);
        self.field = Some(ParticleField::spawn(&mut self.rng, viewport, theme));
        self.state = BackgroundState::Active;
        tracing::debug!(
            "Particle background mounted: {}x{}, {} particles, {}",
            viewport.width,
            viewport.height,
            viewport.particle_budget(),
            theme
        );
        true
    }

    /// Returns true when the batch was replaced. The same theme keeps the
    /// current batch.
    pub fn set_theme(&mut self, theme: Rgb) -> bool {
        if self.state != BackgroundState::Active {
            return false;
        }
        if self.field.as_ref().map(ParticleField::theme) == Some(theme) {
            return false;
        }

        self.field = Some(ParticleField::spawn(&mut self.rng, self.viewport, theme));
        tracing::debug!("Particle background re-themed to {}", theme);
        true
    }

    /// Resizes the surface; particles keep their state and may sit off-surface
    /// until they drift back.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.state != BackgroundState::Active {
            return;
        }
        self.viewport = viewport;
        self.surface.resize(viewport.width, viewport.height);
    }

    /// Advances and draws one frame. Returns false once released.
    pub fn frame(&mut self) -> bool {
        if self.state != BackgroundState::Active {
            return false;
        }
        let Some(field) = self.field.as_mut() else {
            return false;
        };

        self.surface.clear();
        field.step(self.viewport);
        field.draw(&mut self.surface);
        self.frames += 1;
        true
    }

    pub fn teardown(&mut self) {
        if self.state == BackgroundState::Released {
            return;
        }
        self.field = None;
        self.state = BackgroundState::Released;
        tracing::debug!("Particle background released after {} frames", self.frames);
    }

    pub fn state(&self) -> BackgroundState {
        self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn theme(&self) -> Option<Rgb> {
        self.field.as_ref().map(ParticleField::theme)
    }

    pub fn particles(&self) -> &[Particle] {
        self.field.as_ref().map(ParticleField::particles).unwrap_or(&[])
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
