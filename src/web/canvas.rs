//! Canvas 2D painter.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{LabError, LabResult};
use crate::render::{Painter, RenderCommand};

/// Paints render commands onto an HTML canvas.
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasPainter {
    /// Bind to a canvas's 2D context.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Paint` if the canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement) -> LabResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| LabError::paint(format!("{e:?}")))?
            .ok_or_else(|| LabError::paint("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| LabError::paint("unexpected context type"))?;
        Ok(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }

    fn draw(&self, command: &RenderCommand) -> LabResult<()> {
        let ctx = &self.ctx;
        match command {
            RenderCommand::Clear { color } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(0.0, 0.0, self.width, self.height);
            }
            RenderCommand::DrawLine {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(*x1, *y1);
                ctx.line_to(*x2, *y2);
                ctx.stroke();
            }
            RenderCommand::DrawCircle {
                x,
                y,
                radius,
                color,
                filled,
            } => {
                ctx.begin_path();
                ctx.arc(*x, *y, *radius, 0.0, TAU)
                    .map_err(|e| LabError::paint(format!("{e:?}")))?;
                if *filled {
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.fill();
                } else {
                    ctx.set_stroke_style_str(&color.to_css());
                    ctx.stroke();
                }
            }
            RenderCommand::DrawPolyline {
                points,
                color,
                width,
            } => {
                let Some((&(x0, y0), rest)) = points.split_first() else {
                    return Ok(());
                };
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(x0, y0);
                for &(x, y) in rest {
                    ctx.line_to(x, y);
                }
                ctx.stroke();
            }
            RenderCommand::DrawText { x, y, text, color } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.set_font("14px monospace");
                ctx.fill_text(text, *x, *y)
                    .map_err(|e| LabError::paint(format!("{e:?}")))?;
            }
        }
        Ok(())
    }
}

impl Painter for CanvasPainter {
    fn paint(&mut self, commands: &[RenderCommand]) -> LabResult<()> {
        for command in commands {
            self.draw(command)?;
        }
        Ok(())
    }
}
