//! Software raster surface: an RGBA8 pixel buffer executing paint commands.

use crate::error::{Error, Result};
use crate::rendering::paint::{DrawSurface, PaintCommand, Rgba};
use crate::rendering::Screenshot;

/// A pixel-backed [`DrawSurface`] with PNG export.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        (self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3])
    }

    /// Clip a possibly-negative-span rectangle to the pixel grid.
    fn clip(&self, x: f64, y: f64, width: f64, height: f64) -> Option<(u32, u32, u32, u32)> {
        let (mut x, mut y, mut w, mut h) = (x, y, width, height);
        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }
        let x0 = x.round().max(0.0) as i64;
        let y0 = y.round().max(0.0) as i64;
        let x1 = ((x + w).round() as i64).min(self.width as i64);
        let y1 = ((y + h).round() as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn fill(&mut self, x: f64, y: f64, width: f64, height: f64, rgba: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let i = ((py as usize) * (self.width as usize) + (px as usize)) * 4;
                blend_over(&mut self.pixels[i..i + 4], rgba);
            }
        }
    }

    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        for py in y0..y1 {
            let row = (py as usize) * (self.width as usize);
            for px in x0..x1 {
                let i = (row + px as usize) * 4;
                self.pixels[i..i + 4].fill(0);
            }
        }
    }

    /// Stroke centered on the rectangle edges, drawn as four bands.
    fn stroke(&mut self, x: f64, y: f64, width: f64, height: f64, line_width: f64, rgba: Rgba) {
        let (mut x, mut y, mut w, mut h) = (x, y, width, height);
        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }
        let half = line_width / 2.0;
        // Top and bottom bands span the full outer width; side bands fill
        // the remaining rows so corners are painted exactly once.
        self.fill(x - half, y - half, w + line_width, line_width, rgba);
        self.fill(x - half, y + h - half, w + line_width, line_width, rgba);
        self.fill(x - half, y + half, line_width, h - line_width, rgba);
        self.fill(x + w - half, y + half, line_width, h - line_width, rgba);
    }

    /// Blend another RGBA buffer over this one. `offset_x`/`offset_y` give
    /// the position of the source origin relative to this surface (capture
    /// uses negative scroll offsets to crop the page-sized mask).
    pub fn blend_rgba(
        &mut self,
        src_width: u32,
        src_height: u32,
        src_pixels: &[u8],
        offset_x: i64,
        offset_y: i64,
    ) {
        for sy in 0..src_height as i64 {
            let dy = sy + offset_y;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src_width as i64 {
                let dx = sx + offset_x;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                let si = ((sy as usize) * (src_width as usize) + (sx as usize)) * 4;
                let di = ((dy as usize) * (self.width as usize) + (dx as usize)) * 4;
                let src = (
                    src_pixels[si],
                    src_pixels[si + 1],
                    src_pixels[si + 2],
                    src_pixels[si + 3],
                );
                blend_over(&mut self.pixels[di..di + 4], src);
            }
        }
    }

    /// Encode the buffer as PNG bytes.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| Error::RenderError("pixel buffer does not match dimensions".into()))?;
        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, image::ImageOutputFormat::Png)
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
        Ok(buf)
    }

    pub fn to_screenshot(&self) -> Result<Screenshot> {
        Ok(Screenshot {
            width: self.width,
            height: self.height,
            png_data: self.png_bytes()?,
        })
    }
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
    }

    fn apply(&mut self, cmd: &PaintCommand) {
        match *cmd {
            PaintCommand::Reset { rgba } => {
                self.pixels.fill(0);
                self.fill(0.0, 0.0, self.width as f64, self.height as f64, rgba);
            }
            PaintCommand::FillRect { x, y, width, height, rgba } => {
                self.fill(x, y, width, height, rgba)
            }
            PaintCommand::ClearRect { x, y, width, height } => self.clear(x, y, width, height),
            PaintCommand::StrokeRect { x, y, width, height, line_width, rgba } => {
                self.stroke(x, y, width, height, line_width, rgba)
            }
        }
    }

    fn snapshot_rgba(&self) -> Option<(u32, u32, Vec<u8>)> {
        Some((self.width, self.height, self.pixels.clone()))
    }
}

/// Straight-alpha source-over compositing on a single pixel.
fn blend_over(dst: &mut [u8], src: Rgba) {
    let (sr, sg, sb, sa) = (src.0 as u32, src.1 as u32, src.2 as u32, src.3 as u32);
    if sa == 255 {
        dst[0] = src.0;
        dst[1] = src.1;
        dst[2] = src.2;
        dst[3] = src.3;
        return;
    }
    if sa == 0 {
        return;
    }
    let da = dst[3] as u32;
    let inv = 255 - sa;
    let out_a = sa + da * inv / 255;
    if out_a == 0 {
        dst.fill(0);
        return;
    }
    let blend_channel = |s: u32, d: u32| -> u8 {
        ((s * sa + d * da * inv / 255) / out_a) as u8
    };
    dst[0] = blend_channel(sr, dst[0] as u32);
    dst[1] = blend_channel(sg, dst[1] as u32);
    dst[2] = blend_channel(sb, dst[2] as u32);
    dst[3] = out_a as u8;
}
