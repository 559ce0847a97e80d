//! Platform-agnostic render commands.
//!
//! Simulations never touch a graphics context. Each frame they produce a
//! list of [`RenderCommand`]s in canvas pixel space (origin top-left, y
//! growing downward) and a [`Painter`] turns that list into pixels: the
//! HTML canvas in the browser host, a ratatui canvas in the terminal host,
//! or a [`RecordingPainter`] in tests and headless runs.

pub mod readout;

use serde::{Deserialize, Serialize};

use crate::error::LabResult;

pub use readout::Readout;

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// CSS color string (`#rrggbb` when opaque, `rgba(...)` otherwise).
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                f64::from(self.a) / 255.0
            )
        }
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    // Lab palette
    pub const BACKGROUND: Self = Self::rgb(15, 23, 42);
    pub const GRID: Self = Self::rgb(51, 65, 85);
    pub const ROD: Self = Self::rgb(203, 213, 225);
    pub const BOB: Self = Self::rgb(59, 130, 246);
    pub const GROUND: Self = Self::rgb(34, 197, 94);
    pub const PROJECTILE: Self = Self::rgb(239, 68, 68);
    pub const TRAIL: Self = Self::new(239, 68, 68, 128);
    pub const WAVE: Self = Self::rgb(168, 85, 247);
    pub const LABEL: Self = Self::rgb(226, 232, 240);
}

/// Platform-agnostic render command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole surface.
    Clear { color: Color },

    /// Draw a line segment.
    DrawLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },

    /// Draw a circle.
    DrawCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        filled: bool,
    },

    /// Draw a connected series of points.
    DrawPolyline {
        points: Vec<(f64, f64)>,
        color: Color,
        width: f64,
    },

    /// Draw text label.
    DrawText {
        x: f64,
        y: f64,
        text: String,
        color: Color,
    },
}

/// Fixed-size drawing surface in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
        }
    }
}

impl Surface {
    /// Largest accepted side, in pixels.
    pub const MAX_SIDE: f64 = 8192.0;

    /// Create a surface of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal centre.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    /// Vertical centre.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Whether a point lies on the surface.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

/// Something that turns render commands into pixels.
pub trait Painter {
    /// Paint one complete frame.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Paint` if the host surface rejects a command.
    fn paint(&mut self, commands: &[RenderCommand]) -> LabResult<()>;
}

/// Painter that keeps the last frame it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingPainter {
    frames_painted: u64,
    last: Vec<RenderCommand>,
}

impl RecordingPainter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames painted.
    #[must_use]
    pub const fn frames_painted(&self) -> u64 {
        self.frames_painted
    }

    /// Commands of the last painted frame.
    #[must_use]
    pub fn last_frame(&self) -> &[RenderCommand] {
        &self.last
    }

    /// Text of every label in the last frame.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.last
            .iter()
            .filter_map(|cmd| match cmd {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn paint(&mut self, commands: &[RenderCommand]) -> LabResult<()> {
        self.last = commands.to_vec();
        self.frames_painted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css_opaque() {
        assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
    }

    #[test]
    fn test_color_css_translucent() {
        assert_eq!(Color::new(0, 0, 0, 0).to_css(), "rgba(0, 0, 0, 0.000)");
    }

    #[test]
    fn test_surface_default_and_center() {
        let surface = Surface::default();
        assert!((surface.center_x() - 400.0).abs() < f64::EPSILON);
        assert!((surface.center_y() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_surface_contains() {
        let surface = Surface::new(100.0, 50.0);
        assert!(surface.contains(0.0, 0.0));
        assert!(surface.contains(100.0, 50.0));
        assert!(!surface.contains(-1.0, 10.0));
        assert!(!surface.contains(10.0, 51.0));
    }

    #[test]
    fn test_recording_painter_keeps_last_frame() {
        let mut painter = RecordingPainter::new();
        painter
            .paint(&[RenderCommand::Clear {
                color: Color::BLACK,
            }])
            .expect("paint");
        painter
            .paint(&[RenderCommand::DrawText {
                x: 1.0,
                y: 2.0,
                text: "θ = 45.0°".to_string(),
                color: Color::LABEL,
            }])
            .expect("paint");

        assert_eq!(painter.frames_painted(), 2);
        assert_eq!(painter.last_frame().len(), 1);
        assert_eq!(painter.labels(), vec!["θ = 45.0°"]);
    }

    #[test]
    fn test_render_command_serialization() {
        let cmd = RenderCommand::DrawCircle {
            x: 1.0,
            y: 2.0,
            radius: 3.0,
            color: Color::BOB,
            filled: true,
        };
        let json = serde_json::to_string(&cmd).expect("serialize");
        assert!(json.contains("DrawCircle"));
    }
}
