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

use crate::PixelFormat;

/// Edge length, in pixels, of one occupancy block of a [`crate::BlockPage`].
pub const BLOCK_SIZE: i32 = 16;

/// Default width and height of an atlas page in pixels.
pub const DEFAULT_PAGE_SIZE: i32 = 256;

/// Pixels reserved around each tile of a split or sliced sprite (one per side).
pub const TILE_PADDING: i32 = 1;

/// Describes the pages an [`crate::AtlasPageSet`] creates.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AtlasConfig {
    /// Width of every page texture.
    pub page_width: i32,
    /// Height of every page texture.
    pub page_height: i32,
    /// Texel format shared by all pages of the set.
    pub format: PixelFormat,
    /// Pixels subtracted from the page size when an oversized source is cut into chunks.
    /// Must leave room for the tile padding on both sides.
    pub spillover_margin: i32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_SIZE,
            page_height: DEFAULT_PAGE_SIZE,
            format: PixelFormat::Rgba8,
            spillover_margin: 2 * TILE_PADDING,
        }
    }
}

impl AtlasConfig {
    /// Largest chunk of an oversized source placed on a single page.
    pub(crate) fn chunk_width(&self) -> i32 { (self.page_width - self.spillover_margin.max(2 * TILE_PADDING)).max(1) }

    pub(crate) fn chunk_height(&self) -> i32 { (self.page_height - self.spillover_margin.max(2 * TILE_PADDING)).max(1) }
}

/// Tuning of a [`crate::GlyphCache`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GlyphCacheConfig {
    /// Pixel size a freshly installed face starts with.
    pub default_size: i32,
    /// Smallest glyph page edge.
    pub min_page_size: i32,
    /// Largest glyph page edge.
    pub max_page_size: i32,
    /// Glyph rows a page should hold; page edge grows with the glyph height.
    pub glyphs_per_page_edge: i32,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self {
        Self {
            default_size: 24,
            min_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 2048,
            glyphs_per_page_edge: 8,
        }
    }
}

impl GlyphCacheConfig {
    /// Page edge used for glyphs of the given pixel height: a power of two between
    /// `min_page_size` and `max_page_size`.
    pub fn page_size_for(&self, glyph_height: i32) -> i32 {
        let wanted = (glyph_height.max(1) as u32).saturating_mul(self.glyphs_per_page_edge.max(1) as u32);
        let size = wanted.checked_next_power_of_two().unwrap_or(u32::MAX).min(i32::MAX as u32) as i32;
        size.clamp(self.min_page_size, self.max_page_size.max(self.min_page_size))
    }
}
