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

use crate::*;

/// Where an uploaded bitmap lives: page texture plus pixel rectangle inside it.
#[derive(Copy, Clone, Debug)]
pub struct Placement {
    /// Texture of the page holding the pixels (owned by the page, not by the placement).
    pub texture: TextureId,
    /// Index of the page inside its pool.
    pub page: usize,
    /// Page size, used to normalize texture coordinates.
    pub page_size: Dimensioni,
    /// Pixel rectangle inside the page.
    pub rect: Recti,
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle of a sprite registered in an [`AtlasPageSet`]. Index 0 is never handed out.
pub struct SpriteId(usize);

impl SpriteId {
    /// The reserved, never valid handle.
    pub const INVALID: SpriteId = SpriteId(0);

    /// Returns the table index this handle refers to.
    pub fn raw(self) -> usize { self.0 }

    /// Returns `false` for the reserved index 0.
    pub fn is_valid(self) -> bool { self.0 != 0 }

    pub(crate) fn from_index(index: usize) -> Self { Self(index) }
}

impl Into<u32> for SpriteId {
    fn into(self) -> u32 { self.0 as _ }
}

/// One placed piece of a sprite.
#[derive(Copy, Clone, Debug)]
pub struct Tile {
    /// Page placement of the uploaded pixels (padding excluded).
    pub placement: Placement,
    /// Size drawn on screen; differs from the placement size for stretched 9-slice cells.
    pub draw_size: Dimensioni,
    /// Distance from the sprite's top-left corner to this tile.
    pub offset_positive: Vec2i,
    /// Distance from this tile's bottom-right corner to the sprite's bottom-right corner.
    pub offset_negative: Vec2i,
    /// Logical size of the whole sprite.
    pub master_size: Dimensioni,
    /// Cell columns of the 9-slice grid, 0 for plain sprites.
    pub grid_columns: i32,
    /// Cell rows of the 9-slice grid, 0 for plain sprites.
    pub grid_rows: i32,
    /// Column of this cell inside the grid.
    pub cell_column: i32,
    /// Row of this cell inside the grid.
    pub cell_row: i32,
    /// Fixed corner cell size of a 9-slice sprite.
    pub grid: Dimensioni,
    /// Set on tiles created by [`AtlasPageSet::install_sliced`].
    pub is_extended_frame: bool,
}

impl Tile {
    pub(crate) fn plain(placement: Placement, offset: Vec2i, master_size: Dimensioni) -> Self {
        let draw_size = Dimensioni::new(placement.rect.width, placement.rect.height);
        Self {
            placement,
            draw_size,
            offset_positive: offset,
            offset_negative: vec2(
                master_size.width - (offset.x + draw_size.width),
                master_size.height - (offset.y + draw_size.height),
            ),
            master_size,
            grid_columns: 0,
            grid_rows: 0,
            cell_column: 0,
            cell_row: 0,
            grid: Dimensioni::new(0, 0),
            is_extended_frame: false,
        }
    }

    /// Texture of the page holding this tile.
    pub fn texture(&self) -> TextureId { self.placement.texture }

    /// Top-left corner of the tile inside its page.
    pub fn tile_origin(&self) -> Vec2i { vec2(self.placement.rect.x, self.placement.rect.y) }

    /// Size of the tile inside its page.
    pub fn tile_size(&self) -> Dimensioni { Dimensioni::new(self.placement.rect.width, self.placement.rect.height) }

    /// Sprite-local rectangle covered by the tile when drawn unflipped.
    pub fn local_rect(&self) -> Recti {
        rect(self.offset_positive.x, self.offset_positive.y, self.draw_size.width, self.draw_size.height)
    }

    /// Sprite-local rectangle covered by the tile under the given mirroring.
    pub fn local_rect_for(&self, attribute: DrawAttribute) -> Recti {
        let x = if attribute.is_flip_h() { self.offset_negative.x } else { self.offset_positive.x };
        let y = if attribute.is_flip_v() { self.offset_negative.y } else { self.offset_positive.y };
        rect(x, y, self.draw_size.width, self.draw_size.height)
    }
}

/// Table entry of a registered sprite: the arena indices of its tiles in traversal order.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpriteEntry {
    pub tiles: smallvec::SmallVec<[usize; 9]>,
}
