//! Canvas 2D surface for the browser

use anyhow::{Context, anyhow};
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;

fn css(color: [f32; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

/// Draws logical world units onto a canvas, scaled to its pixel size
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    world_width: f32,
    world_height: f32,
}

impl CanvasSurface {
    pub fn new(
        canvas: HtmlCanvasElement,
        world_width: f32,
        world_height: f32,
    ) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow!("getContext failed: {:?}", e))?
            .context("canvas has no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("2d context has an unexpected type"))?;
        Ok(Self {
            canvas,
            ctx,
            world_width,
            world_height,
        })
    }

    /// Match the backing store to the displayed size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width.max(1));
        self.canvas.set_height(height.max(1));
        log::info!("Canvas resized to {}x{}", width, height);
    }

    /// Map world units onto the current canvas pixels. Call once per frame.
    pub fn begin_frame(&self) {
        let sx = self.canvas.width() as f64 / self.world_width as f64;
        let sy = self.canvas.height() as f64 / self.world_height as f64;
        let _ = self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0);
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, color: [f32; 4]) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(0.0, 0.0, self.world_width as f64, self.world_height as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: [f32; 4]) {
        if radius <= 0.0 {
            return;
        }
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.begin_path();
        let _ = self.ctx.arc(x as f64, y as f64, radius as f64, 0.0, TAU);
        self.ctx.fill();
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: [f32; 4]) {
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(x1 as f64, y1 as f64);
        self.ctx.line_to(x2 as f64, y2 as f64);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: [f32; 4]) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.set_font(&format!("bold {}px monospace", size.round()));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}
