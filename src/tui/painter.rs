//! Render commands on a ratatui canvas.
//!
//! Canvas pixels grow downward; ratatui's canvas grows upward. The painter
//! flips y against the surface height and keeps the canvas bounds equal to
//! the surface, so one pixel maps to one canvas unit.

use ratatui::style::{Color as TermColor, Style};
use ratatui::text::Span;
use ratatui::widgets::canvas::{Circle, Context, Line as CanvasLine};

use crate::error::LabResult;
use crate::render::{Color, Painter, RenderCommand, Surface};

/// Shape ready to draw on a ratatui canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum TermShape {
    /// Line segment.
    Line(CanvasLine),
    /// Circle outline (the canvas has no fill).
    Circle(Circle),
    /// Text anchored at its left edge.
    Label {
        x: f64,
        y: f64,
        text: String,
        color: TermColor,
    },
}

/// Converts render commands into canvas shapes.
#[derive(Debug, Clone, Default)]
pub struct TerminalPainter {
    surface: Surface,
    shapes: Vec<TermShape>,
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb(color.r, color.g, color.b)
}

impl TerminalPainter {
    /// Painter for a surface of the given size.
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            shapes: Vec::new(),
        }
    }

    /// Canvas x bounds.
    #[must_use]
    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, self.surface.width]
    }

    /// Canvas y bounds.
    #[must_use]
    pub fn y_bounds(&self) -> [f64; 2] {
        [0.0, self.surface.height]
    }

    /// Shapes of the last painted frame.
    #[must_use]
    pub fn shapes(&self) -> &[TermShape] {
        &self.shapes
    }

    fn flip(&self, y: f64) -> f64 {
        self.surface.height - y
    }

    fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color) -> TermShape {
        TermShape::Line(CanvasLine::new(
            x1,
            self.flip(y1),
            x2,
            self.flip(y2),
            term_color(color),
        ))
    }

    /// Draw the last painted frame.
    pub fn draw(&self, ctx: &mut Context<'_>) {
        for shape in &self.shapes {
            match shape {
                TermShape::Line(line) => ctx.draw(line),
                TermShape::Circle(circle) => ctx.draw(circle),
                TermShape::Label { x, y, text, color } => {
                    ctx.print(*x, *y, Span::styled(text.clone(), Style::default().fg(*color)));
                }
            }
        }
    }
}

impl Painter for TerminalPainter {
    fn paint(&mut self, commands: &[RenderCommand]) -> LabResult<()> {
        let mut shapes = Vec::with_capacity(commands.len());
        for command in commands {
            match command {
                // Terminal background stays as is
                RenderCommand::Clear { .. } => {}
                RenderCommand::DrawLine {
                    x1, y1, x2, y2, color, ..
                } => shapes.push(self.line(*x1, *y1, *x2, *y2, *color)),
                RenderCommand::DrawCircle {
                    x, y, radius, color, ..
                } => shapes.push(TermShape::Circle(Circle {
                    x: *x,
                    y: self.flip(*y),
                    radius: *radius,
                    color: term_color(*color),
                })),
                RenderCommand::DrawPolyline { points, color, .. } => {
                    shapes.extend(
                        points
                            .windows(2)
                            .map(|w| self.line(w[0].0, w[0].1, w[1].0, w[1].1, *color)),
                    );
                }
                RenderCommand::DrawText { x, y, text, color } => shapes.push(TermShape::Label {
                    x: *x,
                    y: self.flip(*y),
                    text: text.clone(),
                    color: term_color(*color),
                }),
            }
        }
        self.shapes = shapes;
        Ok(())
    }
}
