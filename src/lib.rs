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

#![deny(missing_docs)]
//! `sprite-atlas` packs decoded sprites and rasterized glyphs into a small number of
//! block-allocated GPU texture pages and caches the placements, so repeated draws only
//! emit textured quads against already uploaded pixels.
//!
//! The crate is renderer-agnostic: a backend implements [`Renderer`] (texture creation,
//! sub-image upload, quad submission) and shares it through a [`RendererHandle`] with any
//! number of [`AtlasPageSet`] and [`GlyphCache`] instances.

use std::sync::{Arc, RwLock};

mod block_page;
mod config;
mod error;
mod glyph_cache;
mod memory_renderer;
mod page_set;
mod pixel_source;
mod quad;
mod rasterizer;
mod tile;
mod utf8;

pub use block_page::*;
pub use config::*;
pub use error::*;
pub use glyph_cache::*;
pub use memory_renderer::*;
pub use page_set::*;
pub use pixel_source::*;
pub use quad::Vertex;
pub use rasterizer::*;
pub use rs_math3d::*;
pub use tile::*;
pub use utf8::Utf8Codes;

use bitflags::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Handle referencing a renderer-owned texture.
pub struct TextureId(u32);

impl TextureId {
    /// Wraps a backend-specific texture name.
    pub fn new(raw: u32) -> Self { Self(raw) }

    /// Returns the raw numeric identifier stored inside the handle.
    pub fn raw(self) -> u32 { self.0 }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Pixel layout of an atlas page texture.
pub enum PixelFormat {
    /// Four bytes per pixel, RGBA order.
    Rgba8,
    /// One coverage byte per pixel.
    Alpha8,
}

impl PixelFormat {
    /// Number of bytes a single texel occupies.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Alpha8 => 1,
        }
    }
}

/// GPU primitives the atlas engine drives.
///
/// Every call happens on the thread owning the GPU context; implementations are not
/// expected to be re-entrant.
pub trait Renderer {
    /// Creates an uninitialized texture and returns its handle.
    fn create_texture(&mut self, width: i32, height: i32, format: PixelFormat) -> TextureId;
    /// Uploads `pixels` (tightly packed, `format` layout) into `region` of the texture.
    fn upload_sub_image(&mut self, id: TextureId, region: Recti, format: PixelFormat, pixels: &[u8]);
    /// Binds the texture and draws one textured quad.
    fn draw_quad(&mut self, id: TextureId, vertices: [Vertex; 4], linear: bool);
    /// Draws one untextured, vertex-colored quad.
    fn fill_quad(&mut self, vertices: [Vertex; 4]);
    /// Releases a batch of textures.
    fn delete_textures(&mut self, ids: &[TextureId]);
}

/// Thread-safe handle that shares ownership of a [`Renderer`].
pub struct RendererHandle<R: Renderer> {
    handle: Arc<RwLock<R>>,
}

// derive(Clone) would require R: Clone
impl<R: Renderer> Clone for RendererHandle<R> {
    fn clone(&self) -> Self { Self { handle: self.handle.clone() } }
}

impl<R: Renderer> RendererHandle<R> {
    /// Wraps a renderer inside an [`Arc<RwLock<...>>`] so it can be shared.
    pub fn new(renderer: R) -> Self { Self { handle: Arc::new(RwLock::new(renderer)) } }

    /// Executes the provided closure with a shared reference to the renderer.
    pub fn scope<Res, F: FnOnce(&R) -> Res>(&self, f: F) -> Res {
        match self.handle.read() {
            Ok(guard) => f(&*guard),
            // a panic while drawing leaves texture state intact, keep going
            Err(poisoned) => f(&*poisoned.into_inner()),
        }
    }

    /// Executes the provided closure with a mutable reference to the renderer.
    pub fn scope_mut<Res, F: FnOnce(&mut R) -> Res>(&self, f: F) -> Res {
        match self.handle.write() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
/// Simple RGBA color stored with 8-bit components.
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white, the neutral tint for sprite draws.
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    /// Opaque black.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
}

impl From<Color> for Color4b {
    fn from(c: Color) -> Self { color4b(c.r, c.g, c.b, c.a) }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Mirroring applied when a sprite is drawn.
    pub struct DrawAttribute : u32 {
        /// Mirror around the vertical axis.
        const FLIP_H = 1;
        /// Mirror around the horizontal axis.
        const FLIP_V = 2;
        /// Both axes mirrored.
        const FLIP_HV = Self::FLIP_H.bits() | Self::FLIP_V.bits();
        /// Drawn as installed.
        const NORMAL = 0;
    }
}

impl DrawAttribute {
    /// Returns `true` when the horizontal axis is mirrored.
    pub fn is_flip_h(&self) -> bool { self.intersects(Self::FLIP_H) }
    /// Returns `true` when the vertical axis is mirrored.
    pub fn is_flip_v(&self) -> bool { self.intersects(Self::FLIP_V) }
}

/// Convenience constructor for [`Vec2i`].
pub fn vec2(x: i32, y: i32) -> Vec2i { Vec2i { x, y } }

/// Convenience constructor for [`Recti`].
pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Recti { Recti { x, y, width: w, height: h } }

/// Convenience constructor for [`Dimensioni`].
pub fn dim(width: i32, height: i32) -> Dimensioni { Dimensioni::new(width, height) }

/// Convenience constructor for [`Color`].
pub fn color(r: u8, g: u8, b: u8, a: u8) -> Color { Color { r, g, b, a } }

/// Expands (or shrinks) a rectangle uniformly on all sides.
pub fn expand_rect(r: Recti, n: i32) -> Recti { rect(r.x - n, r.y - n, r.width + n * 2, r.height + n * 2) }
