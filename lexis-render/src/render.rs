use crate::error::{RenderError, Result};
use crate::layout::{Viewport, line_centers, wrap_text};
use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use bytemuck::{cast_slice, cast_slice_mut};
use lexis_cache::{intern_text, text_count};
use lexis_core::{Frame, SetupForm, Trial};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{Color, Pixmap};

/// Mid-grey, opaque.
pub const BACKGROUND: [u8; 4] = [128, 128, 128, 255];
pub const TEXT_COLOR: Color = Color::WHITE;

pub const FIXATION_PX: f32 = 60.0;
pub const LABEL_PX: f32 = 40.0;
pub const WORD_PX: f32 = 60.0;
pub const TARGET_POS: (f32, f32) = (0.0, 200.0);
pub const WORD_POS: [(f32, f32); 3] = [(-300.0, -200.0), (0.0, -200.0), (300.0, -200.0)];

const FORM_TITLE_PX: f32 = 30.0;
const FORM_FIELD_PX: f32 = 25.0;
const FORM_HINT_PX: f32 = 20.0;
const FORM_HINT: &str = "Enter: OK    Escape: Cancel";

/// Rendered text keyed by intern id and pixel size
struct TextCache {
    map: HashMap<(usize, u32), Arc<Pixmap>>,
}

impl TextCache {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, font: &FontVec, text: &str, size_px: f32) -> Option<Arc<Pixmap>> {
        let key = (intern_text(text), size_px.to_bits());
        if let Some(p) = self.map.get(&key) {
            return Some(Arc::clone(p));
        }
        let pm = Arc::new(render_text_pixmap(text, size_px, font, TEXT_COLOR)?);
        self.map.insert(key, Arc::clone(&pm));
        Some(pm)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

/// Rasterizes one line of text into a tight, premultiplied pixmap.
///
/// Returns `None` for text without visible glyphs.
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font_size: f32,
    font: &F,
    color: Color,
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // Layout with baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }
    if outlines.is_empty() {
        return None;
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;

    let stride = w as usize * 4;
    let dst = pm.data_mut();
    let rgba = color.to_color_u8();
    let cu = [rgba.red(), rgba.green(), rgba.blue(), rgba.alpha()];

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize * 4;

            // Premultiplied source over whatever neighbouring glyphs left here
            let a = (cov * cu[3] as f32 / 255.0).clamp(0.0, 1.0);
            let inv = 1.0 - a;
            for c in 0..3 {
                let src = cu[c] as f32 * a;
                dst[i + c] = (src + dst[i + c] as f32 * inv).min(255.0) as u8;
            }
            dst[i + 3] = (a * 255.0 + dst[i + 3] as f32 * inv).min(255.0) as u8;
        });
    }

    Some(pm)
}

/// Advance width of a single line at `size_px`
pub fn text_width<F: Font>(font: &F, size_px: f32, text: &str) -> f32 {
    let sf = font.as_scaled(PxScale::from(size_px));
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = sf.glyph_id(ch);
        if let Some(p) = prev {
            width += sf.kern(p, id);
        }
        width += sf.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Software renderer drawing session frames onto an opaque RGBA canvas.
pub struct SkiaRenderer {
    viewport: Viewport,
    font: FontVec,
    text_cache: TextCache,
    canvas: Pixmap,
    clear_buffer: Vec<u8>,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontVec) -> Result<Self> {
        let (canvas, clear_buffer) = blank_canvas(width, height)?;
        Ok(Self {
            viewport: Viewport::new(width, height),
            font,
            text_cache: TextCache::new(),
            canvas,
            clear_buffer,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let (canvas, clear_buffer) = blank_canvas(width, height)?;
        self.canvas = canvas;
        self.clear_buffer = clear_buffer;
        self.viewport = Viewport::new(width, height);
        // Every cached pixmap was rasterized at the old scale.
        self.text_cache.clear();
        debug!("Canvas resized to {width}x{height} (scale {:.3})", self.viewport.scale);
        Ok(())
    }

    /// Rasterizes every word the given trials will show.
    pub fn prepare<'a>(&mut self, trials: impl IntoIterator<Item = &'a Trial>) {
        let label_px = self.viewport.text_px(LABEL_PX);
        let word_px = self.viewport.text_px(WORD_PX);
        for trial in trials {
            let mut texts = trial.texts();
            if let Some(label) = texts.next() {
                self.text_cache.get_or_render(&self.font, label, label_px);
            }
            for word in texts {
                self.text_cache.get_or_render(&self.font, word, word_px);
            }
        }
        self.text_cache
            .get_or_render(&self.font, "+", self.viewport.text_px(FIXATION_PX));
        debug!(
            "Prepared {} text pixmaps ({} distinct texts interned)",
            self.text_cache.len(),
            text_count()
        );
    }

    /// Draws `frame` and copies the canvas into `frame_buffer` (RGBA8).
    pub fn render_frame(&mut self, frame: &Frame<'_>, frame_buffer: &mut [u8]) -> Result<()> {
        let expected = self.clear_buffer.len();
        if frame_buffer.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: frame_buffer.len(),
            });
        }

        self.canvas.data_mut().copy_from_slice(&self.clear_buffer);
        match frame {
            Frame::Setup(form) => self.draw_setup(form),
            Frame::Message { text, size } => self.draw_paragraph(text, *size, 0.0),
            Frame::Fixation => self.draw_text("+", FIXATION_PX, (0.0, 0.0)),
            Frame::Stimulus(trial) => self.draw_stimulus(trial),
            Frame::Blank => {}
        }
        frame_buffer.copy_from_slice(self.canvas.data());
        Ok(())
    }

    fn draw_stimulus(&mut self, trial: &Trial) {
        self.draw_text(trial.stimulus_label(), LABEL_PX, (0.0, 0.0));
        self.draw_text(&trial.target, WORD_PX, TARGET_POS);
        for (word, pos) in trial.words.iter().zip(WORD_POS) {
            self.draw_text(word, WORD_PX, pos);
        }
    }

    fn draw_setup(&mut self, form: &SetupForm) {
        self.draw_text(&form.title, FORM_TITLE_PX, (0.0, 200.0));
        for (row, (label, value)) in form.fields().into_iter().enumerate() {
            let y = 80.0 - row as f32 * 60.0;
            let line = if label == "Participant ID" {
                format!("{label}: {value}_")
            } else {
                format!("{label}: {value}")
            };
            self.draw_text(&line, FORM_FIELD_PX, (0.0, y));
        }
        self.draw_text(FORM_HINT, FORM_HINT_PX, (0.0, -200.0));
    }

    /// Wrapped, centred multi-line text around layout height `y`
    fn draw_paragraph(&mut self, text: &str, size: f32, y: f32) {
        let size_px = self.viewport.text_px(size);
        let font = &self.font;
        let lines = wrap_text(text, self.viewport.wrap_width(), |line| {
            text_width(font, size_px, line)
        });
        let sf = self.font.as_scaled(PxScale::from(size_px));
        let line_height = sf.height() + sf.line_gap();
        let (cx, cy) = self.viewport.to_screen((0.0, y));
        for (line, center_y) in lines.iter().zip(line_centers(lines.len(), line_height, cy)) {
            if !line.is_empty() {
                self.blit_text(line, size_px, (cx, center_y));
            }
        }
    }

    fn draw_text(&mut self, text: &str, size: f32, pos: (f32, f32)) {
        let size_px = self.viewport.text_px(size);
        let center = self.viewport.to_screen(pos);
        self.blit_text(text, size_px, center);
    }

    /// Blends a cached text pixmap centred on `pos` (pixels)
    fn blit_text(&mut self, text: &str, size_px: f32, pos: (f32, f32)) {
        let Some(pm) = self.text_cache.get_or_render(&self.font, text, size_px) else {
            return;
        };
        let (w, h) = (pm.width() as usize, pm.height() as usize);
        let (cw, ch) = (self.canvas.width() as usize, self.canvas.height() as usize);

        let x = (pos.0 - w as f32 * 0.5).round() as i32;
        let y = (pos.1 - h as f32 * 0.5).round() as i32;

        // Cull fully off-screen
        if x + w as i32 <= 0 || y + h as i32 <= 0 || x >= cw as i32 || y >= ch as i32 {
            return;
        }

        let dst_x = x.max(0) as usize;
        let dst_y = y.max(0) as usize;
        let src_x = (-x).max(0) as usize;
        let src_y = (-y).max(0) as usize;
        let copy_w = (w - src_x).min(cw - dst_x);
        let copy_h = (h - src_y).min(ch - dst_y);

        let src_u32: &[u32] = cast_slice(pm.data());
        let dst_u32: &mut [u32] = cast_slice_mut(self.canvas.data_mut());

        for row in 0..copy_h {
            let src_row = (src_y + row) * w + src_x;
            let dst_row = (dst_y + row) * cw + dst_x;
            for i in 0..copy_w {
                let s = src_u32[src_row + i];
                let sa = s >> 24;
                if sa == 0 {
                    continue;
                }
                if sa == 255 {
                    dst_u32[dst_row + i] = s;
                    continue;
                }
                dst_u32[dst_row + i] = blend_over(s, dst_u32[dst_row + i]);
            }
        }
    }
}

/// Premultiplied source-over on little-endian RGBA words
fn blend_over(s: u32, d: u32) -> u32 {
    let inv = 255 - (s >> 24);
    let mut out = 0u32;
    for shift in [0, 8, 16, 24] {
        let sc = (s >> shift) & 0xFF;
        let dc = (d >> shift) & 0xFF;
        let c = (sc + (dc * inv + 127) / 255).min(255);
        out |= c << shift;
    }
    out
}

fn blank_canvas(width: u32, height: u32) -> Result<(Pixmap, Vec<u8>)> {
    let canvas = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
    let clear_buffer: Vec<u8> = BACKGROUND
        .into_iter()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    Ok((canvas, clear_buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_keeps_opaque_background_opaque() {
        let bg = u32::from_le_bytes(BACKGROUND);
        // Half-covered white, premultiplied
        let src = u32::from_le_bytes([128, 128, 128, 128]);
        let out = blend_over(src, bg).to_le_bytes();
        assert_eq!(out[3], 255);
        assert!(out[0] > BACKGROUND[0]);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn transparent_source_leaves_destination() {
        let bg = u32::from_le_bytes(BACKGROUND);
        assert_eq!(blend_over(0, bg), bg);
    }

    #[test]
    fn canvas_starts_grey() {
        let (canvas, clear) = blank_canvas(4, 3).unwrap();
        assert_eq!(canvas.width(), 4);
        assert_eq!(clear.len(), 4 * 3 * 4);
        assert!(clear.chunks(4).all(|px| px == BACKGROUND));
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        assert!(matches!(
            blank_canvas(0, 10),
            Err(RenderError::Canvas { width: 0, height: 10 })
        ));
    }

    #[test]
    fn stimulus_layout_fits_the_reference_window() {
        let vp = Viewport::new(1024, 768);
        for pos in WORD_POS.iter().chain([&TARGET_POS]) {
            let (x, y) = vp.to_screen(*pos);
            assert!((0.0..1024.0).contains(&x));
            assert!((0.0..768.0).contains(&y));
        }
    }
}
