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

#[cfg(feature = "png_source")]
use png::{BitDepth, ColorType, Decoder, Transformations};
#[cfg(feature = "png_source")]
use std::io::Cursor;
use std::io::Error;
use std::io::ErrorKind;

use crate::*;

/// Decoded image the atlas can sample from.
pub trait PixelSource {
    /// Size of the image in pixels.
    fn size(&self) -> Dimensioni;
    /// Color at `(x, y)`; callers stay within `size()`.
    fn pixel(&self, x: i32, y: i32) -> Color4b;
}

/// Owned RGBA image.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: i32,
    height: i32,
    pixels: Vec<Color4b>,
}

impl Bitmap {
    /// Creates a bitmap filled with transparent black.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self { width, height, pixels: vec![Color4b::default(); (width * height) as usize] }
    }

    /// Wraps already decoded pixels, rejecting a buffer of the wrong length.
    pub fn from_pixels(width: i32, height: i32, pixels: Vec<Color4b>) -> std::io::Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "Image dimensions must be positive"));
        }
        if pixels.len() != (width * height) as usize {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Expected {} pixels, found {}", width * height, pixels.len()),
            ));
        }
        Ok(Self { width, height, pixels })
    }

    /// Builds a bitmap by evaluating `f` for every pixel.
    pub fn from_fn<F: FnMut(i32, i32) -> Color4b>(width: i32, height: i32, mut f: F) -> Self {
        let mut bitmap = Self::new(width, height);
        for y in 0..bitmap.height {
            for x in 0..bitmap.width {
                bitmap.pixels[(x + y * bitmap.width) as usize] = f(x, y);
            }
        }
        bitmap
    }

    /// Overwrites a single pixel; out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, c: Color4b) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.pixels[(x + y * self.width) as usize] = c;
        }
    }

    /// Borrow the pixels in row-major order.
    pub fn pixels(&self) -> &[Color4b] { &self.pixels }
}

impl PixelSource for Bitmap {
    fn size(&self) -> Dimensioni { Dimensioni::new(self.width, self.height) }

    fn pixel(&self, x: i32, y: i32) -> Color4b { self.pixels[(x + y * self.width) as usize] }
}

/// Coverage mask produced by a glyph rasterizer. Sampled as white with the coverage as alpha.
#[derive(Clone, Debug, Default)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// One coverage byte per pixel, row-major.
    pub coverage: Vec<u8>,
}

impl PixelSource for GlyphBitmap {
    fn size(&self) -> Dimensioni { Dimensioni::new(self.width, self.height) }

    fn pixel(&self, x: i32, y: i32) -> Color4b { color4b(0xFF, 0xFF, 0xFF, self.coverage[(x + y * self.width) as usize]) }
}

/// Describes image bytes that can be turned into a [`Bitmap`].
#[derive(Copy, Clone)]
pub enum ImageSource<'a> {
    /// Raw RGBA pixels laid out as width × height × 4 bytes.
    Raw {
        /// Width in pixels.
        width: i32,
        /// Height in pixels.
        height: i32,
        /// Pixel buffer in RGBA8888 format.
        pixels: &'a [u8],
    },
    #[cfg(feature = "png_source")]
    /// PNG-compressed byte slice (requires the `png_source` feature).
    /// Grayscale and RGB images are expanded to opaque RGBA (alpha = 255).
    Png {
        /// Compressed PNG payload.
        bytes: &'a [u8],
    },
}

/// Decodes image data into a [`Bitmap`] according to `source`.
pub fn load_image_bytes(source: ImageSource) -> std::io::Result<Bitmap> {
    match source {
        ImageSource::Raw { width, height, pixels } => {
            if width <= 0 || height <= 0 {
                return Err(Error::new(ErrorKind::Other, "Image dimensions must be positive"));
            }
            let expected = width as usize * height as usize * 4;
            if pixels.len() != expected {
                return Err(Error::new(
                    ErrorKind::Other,
                    format!("Expected {} RGBA bytes, found {}", expected, pixels.len()),
                ));
            }
            let colors = pixels.chunks_exact(4).map(|c| color4b(c[0], c[1], c[2], c[3])).collect();
            Bitmap::from_pixels(width, height, colors)
        }
        #[cfg(feature = "png_source")]
        ImageSource::Png { bytes } => decode_png(bytes),
    }
}

#[cfg(feature = "png_source")]
fn decode_png(bytes: &[u8]) -> std::io::Result<Bitmap> {
    let mut decoder = Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| Error::new(ErrorKind::Other, format!("PNG decode error: {}", e)))?;
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| Error::new(ErrorKind::Other, "PNG decoder did not report output size"))?;
    let mut data = vec![0; buf_size];
    let info = reader.next_frame(&mut data)?;

    if info.bit_depth != BitDepth::Eight {
        return Err(Error::new(ErrorKind::Other, format!("Unsupported PNG bit depth: {:?}", info.bit_depth)));
    }

    let channels = match info.color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        // palettes are expanded by normalize_to_color8
        ColorType::Indexed => return Err(Error::new(ErrorKind::Other, "Indexed PNGs are not supported")),
    };

    let width = info.width as usize;
    let mut pixels = Vec::with_capacity(width * info.height as usize);
    for line in data.chunks(info.line_size).take(info.height as usize) {
        for px in line.chunks_exact(channels).take(width) {
            pixels.push(match px {
                [v] => color4b(*v, *v, *v, 0xFF),
                [v, a] => color4b(*v, *v, *v, *a),
                [r, g, b] => color4b(*r, *g, *b, 0xFF),
                [r, g, b, a] => color4b(*r, *g, *b, *a),
                _ => Color4b::default(),
            });
        }
    }
    Bitmap::from_pixels(info.width as i32, info.height as i32, pixels)
}

/// Copies `area` of `source` into a tightly packed buffer of `format` texels, adding `pad`
/// pixels on every side. Padding samples are clamped to `clamp`, so a padded chunk of a
/// larger image picks up its real neighbours while the image border is replicated.
pub(crate) fn extract_region(source: &dyn PixelSource, area: Recti, clamp: Recti, pad: i32, format: PixelFormat) -> Vec<u8> {
    let out_w = area.width + 2 * pad;
    let out_h = area.height + 2 * pad;
    let mut out = Vec::with_capacity((out_w * out_h) as usize * format.bytes_per_pixel());
    let max_x = clamp.x + clamp.width - 1;
    let max_y = clamp.y + clamp.height - 1;
    for y in 0..out_h {
        let sy = (area.y + y - pad).clamp(clamp.y, max_y);
        for x in 0..out_w {
            let sx = (area.x + x - pad).clamp(clamp.x, max_x);
            let c = source.pixel(sx, sy);
            match format {
                PixelFormat::Rgba8 => out.extend_from_slice(&[c.x, c.y, c.z, c.w]),
                PixelFormat::Alpha8 => out.push(c.w),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: i32, height: i32) -> Bitmap { Bitmap::from_fn(width, height, |x, y| color4b(x as u8, y as u8, 0, 255)) }

    #[test]
    fn raw_source_round_trips_dimensions() {
        let bytes = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let bitmap = load_image_bytes(ImageSource::Raw { width: 2, height: 1, pixels: &bytes }).unwrap();
        assert_eq!(bitmap.size().width, 2);
        let p = bitmap.pixel(1, 0);
        assert_eq!((p.x, p.y, p.z, p.w), (5, 6, 7, 8));
    }

    #[test]
    fn raw_source_rejects_short_buffers() {
        assert!(load_image_bytes(ImageSource::Raw { width: 2, height: 2, pixels: &[0; 15] }).is_err());
        assert!(load_image_bytes(ImageSource::Raw { width: 0, height: 2, pixels: &[] }).is_err());
    }

    #[test]
    fn padded_region_samples_neighbours_and_clamps() {
        let src = numbered(8, 8);
        let whole = rect(0, 0, 8, 8);
        let out = extract_region(&src, rect(2, 0, 2, 2), whole, 1, PixelFormat::Rgba8);
        // 4x4 texels, first row clamps to y = 0, first column reads x = 1
        assert_eq!(out.len(), 4 * 4 * 4);
        assert_eq!((out[0], out[1]), (1, 0));
        assert_eq!((out[12], out[13]), (4, 0));
        let last = out.len() - 4;
        assert_eq!((out[last], out[last + 1]), (4, 2));
    }

    #[test]
    fn region_clamps_to_cell_bounds() {
        let src = numbered(8, 8);
        let cell = rect(2, 2, 3, 3);
        let out = extract_region(&src, cell, cell, 1, PixelFormat::Alpha8);
        assert_eq!(out.len(), 25);
        let rgba = extract_region(&src, cell, cell, 1, PixelFormat::Rgba8);
        // top-left padding replicates the cell corner, not the pixel outside the cell
        assert_eq!((rgba[0], rgba[1]), (2, 2));
        assert_eq!((rgba[4 * 24], rgba[4 * 24 + 1]), (4, 4));
    }

    #[test]
    fn glyph_bitmap_is_white_with_coverage_alpha() {
        let glyph = GlyphBitmap { width: 2, height: 1, coverage: vec![0, 200] };
        let p = glyph.pixel(1, 0);
        assert_eq!((p.x, p.y, p.z, p.w), (255, 255, 255, 200));
    }

    #[cfg(feature = "png_source")]
    #[test]
    fn png_decode_error_returns_err() {
        assert!(load_image_bytes(ImageSource::Png { bytes: &[] }).is_err());
    }

    #[cfg(feature = "png_source")]
    #[test]
    fn png_decode_rgb_expands_alpha() {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, 1, 1);
            encoder.set_color(ColorType::Rgb);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30]).unwrap();
        }
        let bitmap = load_image_bytes(ImageSource::Png { bytes: &buffer }).unwrap();
        let p = bitmap.pixel(0, 0);
        assert_eq!((bitmap.size().width, bitmap.size().height), (1, 1));
        assert_eq!((p.x, p.y, p.z, p.w), (10, 20, 30, 0xFF));
    }
}
