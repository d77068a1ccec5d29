use crate::error::{RenderError, Result};
use ab_glyph::FontVec;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Checked in order when no font is configured.
pub const FALLBACK_FONTS: &[&str] = &[
    "assets/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the configured font, or the first fallback that parses.
pub fn load_font(configured: Option<&Path>) -> Result<(PathBuf, FontVec)> {
    if let Some(path) = configured {
        let font = read_font(path)?;
        info!("Font: {}", path.display());
        return Ok((path.to_path_buf(), font));
    }

    let mut tried = Vec::with_capacity(FALLBACK_FONTS.len());
    for candidate in FALLBACK_FONTS.iter().map(PathBuf::from) {
        if candidate.is_file() {
            match read_font(&candidate) {
                Ok(font) => {
                    info!("Font: {}", candidate.display());
                    return Ok((candidate, font));
                }
                Err(err) => debug!("Skipping font: {err}"),
            }
        }
        tried.push(candidate);
    }
    Err(RenderError::FontNotFound { tried })
}

fn read_font(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path).map_err(|source| RenderError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| RenderError::FontParse {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn configured_path_must_exist() {
        let path = env::temp_dir().join("lexis-no-such-font.ttf");
        let err = load_font(Some(&path)).unwrap_err();
        assert!(matches!(err, RenderError::FontRead { .. }));
    }

    #[test]
    fn garbage_is_not_a_font() {
        let path = env::temp_dir().join(format!("lexis-garbage-{}.ttf", std::process::id()));
        fs::write(&path, b"definitely not a font").unwrap();
        let err = load_font(Some(&path)).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, RenderError::FontParse { .. }), "{err}");
    }
}
