mod error;
mod font;
mod layout;
mod render;

pub use ab_glyph::FontVec;
pub use error::{RenderError, Result};
pub use font::{FALLBACK_FONTS, load_font};
pub use layout::{Viewport, WRAP_FRACTION, line_centers, wrap_text};
pub use render::{
    BACKGROUND, FIXATION_PX, LABEL_PX, SkiaRenderer, TARGET_POS, WORD_POS, WORD_PX,
    render_text_pixmap, text_width,
};
