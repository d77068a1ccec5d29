/// Window size the stimulus coordinates are authored for.
pub const REFERENCE_SIZE: (f32, f32) = (1024.0, 768.0);

/// Share of the window width text may occupy before wrapping.
pub const WRAP_FRACTION: f32 = 0.8;

/// Maps centre-origin, y-up layout units onto window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let scale = (width as f32 / REFERENCE_SIZE.0).min(height as f32 / REFERENCE_SIZE.1);
        Self {
            width,
            height,
            scale,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn to_screen(&self, pos: (f32, f32)) -> (f32, f32) {
        let (cx, cy) = self.center();
        (cx + pos.0 * self.scale, cy - pos.1 * self.scale)
    }

    /// Pixel size for a text height given in layout units
    pub fn text_px(&self, size: f32) -> f32 {
        (size * self.scale).max(1.0)
    }

    pub fn wrap_width(&self) -> f32 {
        self.width as f32 * WRAP_FRACTION
    }
}

/// Splits on newlines, then greedily wraps words to `max_width`.
///
/// Empty input lines are kept so paragraph spacing survives. A single word
/// wider than `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        lines.push(line);
    }
    lines
}

/// Vertical centres for `count` lines of `line_height`, stacked around `center_y`.
pub fn line_centers(count: usize, line_height: f32, center_y: f32) -> Vec<f32> {
    let top = center_y - line_height * count as f32 / 2.0;
    (0..count)
        .map(|i| top + line_height * (i as f32 + 0.5))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn reference_window_is_unscaled() {
        let vp = Viewport::new(1024, 768);
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.to_screen((0.0, 0.0)), (512.0, 384.0));
        assert_eq!(vp.to_screen((0.0, 200.0)), (512.0, 184.0));
        assert_eq!(vp.to_screen((-300.0, -200.0)), (212.0, 584.0));
    }

    #[test]
    fn larger_window_scales_uniformly() {
        let vp = Viewport::new(2048, 2000);
        assert_eq!(vp.scale, 2.0);
        assert_eq!(vp.to_screen((300.0, -200.0)), (1624.0, 1400.0));
        assert_eq!(vp.text_px(60.0), 120.0);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("one two three four", 9.0, chars);
        assert_eq!(lines, ["one two", "three", "four"]);
    }

    #[test]
    fn keeps_blank_lines() {
        let lines = wrap_text("Welcome!\n\n\nGo", 100.0, chars);
        assert_eq!(lines, ["Welcome!", "", "", "Go"]);
    }

    #[test]
    fn long_word_stands_alone() {
        let lines = wrap_text("a extraordinarily b", 5.0, chars);
        assert_eq!(lines, ["a", "extraordinarily", "b"]);
    }

    #[test]
    fn lines_stack_around_centre() {
        assert_eq!(line_centers(1, 10.0, 50.0), [50.0]);
        assert_eq!(line_centers(3, 10.0, 50.0), [40.0, 50.0, 60.0]);
    }
}
