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

//! CPU-side [`Renderer`] that keeps page textures in memory and records every quad.
//! Useful for headless tools, golden-image exports and tests.

use std::collections::HashMap;

use crate::*;

/// Texture held by a [`MemoryRenderer`].
#[derive(Clone, Debug)]
pub struct MemoryTexture {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Texel layout of `pixels`.
    pub format: PixelFormat,
    /// Row-major texel bytes.
    pub pixels: Vec<u8>,
}

impl MemoryTexture {
    /// Returns the texel at `(x, y)` expanded to RGBA.
    pub fn texel(&self, x: i32, y: i32) -> Color4b {
        let bpp = self.format.bytes_per_pixel();
        let i = (x + y * self.width) as usize * bpp;
        match self.format {
            PixelFormat::Rgba8 => color4b(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]),
            PixelFormat::Alpha8 => color4b(0xFF, 0xFF, 0xFF, self.pixels[i]),
        }
    }
}

/// A quad recorded by [`MemoryRenderer`].
#[derive(Copy, Clone, Debug)]
pub struct DrawCall {
    /// Bound texture, `None` for solid fills.
    pub texture: Option<TextureId>,
    /// Quad corners, clockwise from the top-left.
    pub vertices: [Vertex; 4],
    /// Requested filtering.
    pub linear: bool,
}

impl DrawCall {
    /// Screen rectangle spanned by the quad.
    pub fn bounds(&self) -> Recti {
        let p0 = self.vertices[0].position();
        let p2 = self.vertices[2].position();
        rect(p0.x as i32, p0.y as i32, (p2.x - p0.x) as i32, (p2.y - p0.y) as i32)
    }
}

/// Headless renderer.
#[derive(Default)]
pub struct MemoryRenderer {
    next_texture_id: u32,
    textures: HashMap<TextureId, MemoryTexture>,
    draw_calls: Vec<DrawCall>,
    uploads: usize,
}

impl MemoryRenderer {
    /// Creates an empty renderer.
    pub fn new() -> Self { Self { next_texture_id: 1, ..Self::default() } }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize { self.textures.len() }

    /// Looks up a live texture.
    pub fn texture(&self, id: TextureId) -> Option<&MemoryTexture> { self.textures.get(&id) }

    /// Quads drawn since the last [`MemoryRenderer::clear_draw_calls`].
    pub fn draw_calls(&self) -> &[DrawCall] { &self.draw_calls }

    /// Forgets the recorded quads.
    pub fn clear_draw_calls(&mut self) { self.draw_calls.clear() }

    /// Number of sub-image uploads performed so far.
    pub fn upload_count(&self) -> usize { self.uploads }

    /// Encodes a texture as PNG (alpha textures are expanded to white RGBA).
    #[cfg(feature = "png_source")]
    pub fn texture_png_bytes(&self, id: TextureId) -> std::io::Result<Vec<u8>> {
        let tex = self
            .textures
            .get(&id)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, format!("no texture {}", id.raw())))?;
        let mut rgba = Vec::with_capacity((tex.width * tex.height * 4) as usize);
        for y in 0..tex.height {
            for x in 0..tex.width {
                let c = tex.texel(x, y);
                rgba.extend_from_slice(&[c.x, c.y, c.z, c.w]);
            }
        }
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, tex.width as _, tex.height as _);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(rgba.as_slice())?;
        }
        Ok(bytes)
    }
}

impl Renderer for MemoryRenderer {
    fn create_texture(&mut self, width: i32, height: i32, format: PixelFormat) -> TextureId {
        let id = TextureId::new(self.next_texture_id.max(1));
        self.next_texture_id = id.raw() + 1;
        let len = (width.max(0) * height.max(0)) as usize * format.bytes_per_pixel();
        self.textures.insert(id, MemoryTexture { width, height, format, pixels: vec![0; len] });
        id
    }

    fn upload_sub_image(&mut self, id: TextureId, region: Recti, format: PixelFormat, pixels: &[u8]) {
        let tex = match self.textures.get_mut(&id) {
            Some(tex) => tex,
            None => {
                log::warn!("upload to unknown texture {}", id.raw());
                return;
            }
        };
        debug_assert_eq!(tex.format, format);
        let bpp = format.bytes_per_pixel();
        let row = region.width.max(0) as usize * bpp;
        for y in 0..region.height.max(0) {
            let ty = region.y + y;
            if ty < 0 || ty >= tex.height || region.x < 0 || region.x + region.width > tex.width {
                continue;
            }
            let src = &pixels[y as usize * row..(y as usize + 1) * row];
            let start = (region.x + ty * tex.width) as usize * bpp;
            tex.pixels[start..start + row].copy_from_slice(src);
        }
        self.uploads += 1;
    }

    fn draw_quad(&mut self, id: TextureId, vertices: [Vertex; 4], linear: bool) {
        self.draw_calls.push(DrawCall { texture: Some(id), vertices, linear });
    }

    fn fill_quad(&mut self, vertices: [Vertex; 4]) {
        self.draw_calls.push(DrawCall { texture: None, vertices, linear: false });
    }

    fn delete_textures(&mut self, ids: &[TextureId]) {
        for id in ids {
            self.textures.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_land_in_the_region() {
        let mut r = MemoryRenderer::new();
        let id = r.create_texture(4, 4, PixelFormat::Alpha8);
        r.upload_sub_image(id, rect(1, 2, 2, 1), PixelFormat::Alpha8, &[7, 9]);
        let tex = r.texture(id).unwrap();
        assert_eq!(tex.pixels[1 + 2 * 4], 7);
        assert_eq!(tex.pixels[2 + 2 * 4], 9);
        assert_eq!(tex.texel(2, 2).w, 9);
        assert_eq!(r.upload_count(), 1);
    }

    #[test]
    fn ids_are_unique_and_deletable() {
        let mut r = MemoryRenderer::new();
        let a = r.create_texture(1, 1, PixelFormat::Rgba8);
        let b = r.create_texture(1, 1, PixelFormat::Rgba8);
        assert_ne!(a, b);
        r.delete_textures(&[a, b]);
        assert_eq!(r.texture_count(), 0);
    }
}
