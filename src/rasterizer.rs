//
// Copyright 2023-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//

//! The glyph rasterizer seam consumed by [`crate::GlyphCache`].

#[cfg(feature = "rasterizer")]
use std::collections::HashMap;
#[cfg(feature = "rasterizer")]
use std::fs::File;
#[cfg(feature = "rasterizer")]
use std::io::{Error, ErrorKind, Read};

use crate::GlyphBitmap;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
/// Placement metrics reported alongside a glyph bitmap, in pixels.
pub struct GlyphMetrics {
    /// Bitmap width.
    pub bitmap_width: i32,
    /// Bitmap height.
    pub bitmap_height: i32,
    /// Horizontal pen advance.
    pub advance_width: i32,
    /// Vertical pen advance (0 for horizontal layouts).
    pub advance_height: i32,
    /// Distance from the pen position to the bitmap's left edge.
    pub bearing_x: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    pub bearing_y: i32,
}

/// Bitmap plus metrics for one (face, size, codepoint).
#[derive(Clone, Debug, Default)]
pub struct RasterizedGlyph {
    /// Coverage mask; may be empty (`0×0`) for blank glyphs such as space.
    pub bitmap: GlyphBitmap,
    /// Metrics of the glyph.
    pub metrics: GlyphMetrics,
}

#[derive(Copy, Clone, Debug, PartialEq)]
/// Vertical metrics of a face at one pixel size.
pub struct LineMetrics {
    /// Distance from the top of a line to its baseline.
    pub ascent: i32,
    /// Distance between consecutive baselines.
    pub line_height: i32,
}

/// Turns (face alias, pixel size, codepoint) into coverage bitmaps.
pub trait GlyphRasterizer {
    /// Opens the font file at `path` and registers it under `alias`.
    fn open_face(&mut self, path: &str, alias: &str) -> std::io::Result<()>;

    /// Rasterizes one codepoint, or `None` when the face is unknown or the codepoint is
    /// not a valid scalar value.
    fn create_bitmap(&mut self, alias: &str, size: i32, code: u32, antialias: bool) -> Option<RasterizedGlyph>;

    /// Line metrics of a face at `size`. The default derives them from the size alone.
    fn line_metrics(&mut self, _alias: &str, size: i32) -> Option<LineMetrics> {
        Some(LineMetrics { ascent: (size * 4 + 2) / 5, line_height: size })
    }
}

/// [`GlyphRasterizer`] backed by `fontdue`.
#[cfg(feature = "rasterizer")]
#[derive(Default)]
pub struct FontdueRasterizer {
    faces: HashMap<String, fontdue::Font>,
}

#[cfg(feature = "rasterizer")]
impl FontdueRasterizer {
    /// Creates a rasterizer without any face.
    pub fn new() -> Self { Self::default() }

    /// Registers a face from in-memory font data.
    pub fn add_face_bytes(&mut self, alias: &str, data: Vec<u8>) -> std::io::Result<()> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|error| Error::new(ErrorKind::InvalidData, format!("{}", error)))?;
        self.faces.insert(alias.to_string(), font);
        Ok(())
    }
}

#[cfg(feature = "rasterizer")]
impl GlyphRasterizer for FontdueRasterizer {
    fn open_face(&mut self, path: &str, alias: &str) -> std::io::Result<()> {
        let mut data = Vec::new();
        File::open(path)
            .map_err(|e| Error::new(e.kind(), format!("Cannot open font file '{}': {}", path, e)))?
            .read_to_end(&mut data)
            .map_err(|e| Error::new(e.kind(), format!("Cannot read font file '{}': {}", path, e)))?;
        self.add_face_bytes(alias, data)
    }

    fn create_bitmap(&mut self, alias: &str, size: i32, code: u32, antialias: bool) -> Option<RasterizedGlyph> {
        let font = self.faces.get(alias)?;
        let ch = char::from_u32(code)?;
        let (metrics, mut coverage) = font.rasterize(ch, size as f32);
        if !antialias {
            for c in coverage.iter_mut() {
                *c = if *c >= 0x80 { 0xFF } else { 0 };
            }
        }
        Some(RasterizedGlyph {
            bitmap: GlyphBitmap { width: metrics.width as i32, height: metrics.height as i32, coverage },
            metrics: GlyphMetrics {
                bitmap_width: metrics.width as i32,
                bitmap_height: metrics.height as i32,
                advance_width: metrics.advance_width.round() as i32,
                advance_height: metrics.advance_height.round() as i32,
                bearing_x: metrics.xmin,
                bearing_y: metrics.ymin + metrics.height as i32,
            },
        })
    }

    fn line_metrics(&mut self, alias: &str, size: i32) -> Option<LineMetrics> {
        let font = self.faces.get(alias)?;
        match font.horizontal_line_metrics(size as f32) {
            Some(m) => Some(LineMetrics { ascent: m.ascent.round() as i32, line_height: m.new_line_size.round() as i32 }),
            None => Some(LineMetrics { ascent: (size * 4 + 2) / 5, line_height: size }),
        }
    }
}

#[cfg(all(test, feature = "rasterizer"))]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_an_error() {
        let mut r = FontdueRasterizer::new();
        let err = r.open_face("/nonexistent/face.ttf", "ui").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(r.create_bitmap("ui", 16, 'A' as u32, true).is_none());
    }

    #[test]
    fn garbage_font_data_is_rejected() {
        let mut r = FontdueRasterizer::new();
        assert!(r.add_face_bytes("ui", vec![0, 1, 2, 3]).is_err());
    }
}
