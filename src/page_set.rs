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

//! Sprite registration on top of block-allocated pages.
//!
//! A sprite that fits a page becomes a single tile. Larger sources are cut into
//! page-sized chunks scanned left-to-right, top-to-bottom, and resizable frames are cut
//! into a 3×3 grid whose corners keep their size when the frame is stretched.

use smallvec::SmallVec;

use crate::pixel_source::extract_region;
use crate::quad::{clip_rect, textured_quad};
use crate::tile::SpriteEntry;
use crate::*;

/// Owns a growable set of pages of one pixel format and the sprites placed on them.
pub struct AtlasPageSet<R: Renderer> {
    renderer: RendererHandle<R>,
    config: AtlasConfig,
    pool: PagePool,
    tiles: Vec<Tile>,
    sprites: Vec<SpriteEntry>,
    tint: Color4b,
}

/// Splits `total` pixels into up to three spans: fixed `grid` corners and a stretched middle.
/// Returns `(offset, length)` pairs.
fn frame_spans(total: i32, grid: i32, cells: i32) -> SmallVec<[(i32, i32); 3]> {
    let mut spans = SmallVec::new();
    if cells == 3 {
        let total = total.max(2 * grid);
        spans.push((0, grid));
        spans.push((grid, total - 2 * grid));
        spans.push((total - grid, grid));
    } else {
        spans.push((0, total));
    }
    spans
}

fn frame_size(size: Dimensioni, source: Dimensioni) -> Dimensioni {
    Dimensioni::new(
        if size.width > 0 { size.width } else { source.width },
        if size.height > 0 { size.height } else { source.height },
    )
}

impl<R: Renderer> AtlasPageSet<R> {
    /// Creates an empty set with default 256×256 RGBA pages.
    pub fn new(renderer: RendererHandle<R>) -> Self { Self::with_config(renderer, AtlasConfig::default()) }

    /// Creates an empty set whose pages follow `config`.
    pub fn with_config(renderer: RendererHandle<R>, config: AtlasConfig) -> Self {
        Self {
            renderer,
            config,
            pool: PagePool::new(config.page_width, config.page_height, config.format),
            tiles: Vec::new(),
            sprites: vec![SpriteEntry::default()],
            tint: Color::WHITE.into(),
        }
    }

    /// Configuration the set was created with.
    pub fn config(&self) -> AtlasConfig { self.config }

    /// Returns a clone of the underlying renderer handle.
    pub fn renderer_handle(&self) -> RendererHandle<R> { self.renderer.clone() }

    /// Pages created so far, oldest first.
    pub fn pages(&self) -> &[BlockPage] { self.pool.pages() }

    /// Number of pages created so far.
    pub fn page_count(&self) -> usize { self.pool.page_count() }

    /// Number of live sprites.
    pub fn sprite_count(&self) -> usize { self.sprites.len() - 1 }

    /// Vertex color applied to subsequent draws.
    pub fn set_tint(&mut self, color: Color) { self.tint = color.into(); }

    fn entry(&self, id: SpriteId) -> Option<&SpriteEntry> {
        if !id.is_valid() {
            return None;
        }
        self.sprites.get(id.raw()).filter(|e| !e.tiles.is_empty())
    }

    /// Tiles of a sprite in traversal order, or `None` for an unknown handle.
    pub fn sprite(&self, id: SpriteId) -> Option<impl Iterator<Item = &Tile> + '_> {
        let entry = self.entry(id)?;
        Some(entry.tiles.iter().map(move |i| &self.tiles[*i]))
    }

    /// Logical size of a sprite, or `None` for an unknown handle.
    pub fn try_get_size(&self, id: SpriteId) -> Option<Dimensioni> {
        let entry = self.entry(id)?;
        Some(self.tiles[entry.tiles[0]].master_size)
    }

    /// Logical size of a sprite; an unknown handle reports `0×0`.
    pub fn get_size(&self, id: SpriteId) -> Dimensioni { self.try_get_size(id).unwrap_or(Dimensioni::new(0, 0)) }

    fn place(&mut self, width: i32, height: i32, pixels: &[u8]) -> Result<Placement, AtlasError> {
        let pool = &mut self.pool;
        self.renderer
            .scope_mut(|r| pool.place(r, width, height, pixels))
            .ok_or(AtlasError::CellTooLarge {
                width,
                height,
                page_width: self.config.page_width,
                page_height: self.config.page_height,
            })
    }

    fn register(&mut self, tiles: Vec<Tile>) -> SpriteId {
        let first = self.tiles.len();
        self.tiles.extend(tiles);
        let entry = SpriteEntry { tiles: (first..self.tiles.len()).collect() };
        self.sprites.push(entry);
        SpriteId::from_index(self.sprites.len() - 1)
    }

    /// Uploads `source` and returns the handle of the new sprite.
    ///
    /// Sources larger than a page are split into several tiles, each padded with one pixel
    /// of its real neighbourhood so filtered draws show no seams.
    pub fn install(&mut self, source: &dyn PixelSource) -> Result<SpriteId, AtlasError> {
        let size = source.size();
        if size.width <= 0 || size.height <= 0 {
            return Err(AtlasError::EmptySource { width: size.width, height: size.height });
        }
        let whole = rect(0, 0, size.width, size.height);
        let format = self.config.format;

        if !self.pool.exceeds_page(size.width, size.height) {
            let pixels = extract_region(source, whole, whole, 0, format);
            let placement = self.place(size.width, size.height, &pixels)?;
            return Ok(self.register(vec![Tile::plain(placement, vec2(0, 0), size)]));
        }

        let chunk_w = self.config.chunk_width();
        let chunk_h = self.config.chunk_height();
        // every chunk must fit with its padding before anything is placed
        if self.pool.exceeds_page(chunk_w + 2 * TILE_PADDING, chunk_h + 2 * TILE_PADDING) {
            return Err(AtlasError::CellTooLarge {
                width: chunk_w + 2 * TILE_PADDING,
                height: chunk_h + 2 * TILE_PADDING,
                page_width: self.config.page_width,
                page_height: self.config.page_height,
            });
        }
        let mut tiles = Vec::new();
        for cy in (0..size.height).step_by(chunk_h as usize) {
            for cx in (0..size.width).step_by(chunk_w as usize) {
                let area = rect(cx, cy, chunk_w.min(size.width - cx), chunk_h.min(size.height - cy));
                let pixels = extract_region(source, area, whole, TILE_PADDING, format);
                let mut placement = self.place(area.width + 2 * TILE_PADDING, area.height + 2 * TILE_PADDING, &pixels)?;
                placement.rect = expand_rect(placement.rect, -TILE_PADDING);
                tiles.push(Tile::plain(placement, vec2(cx, cy), size));
            }
        }
        log::debug!("split {}x{} source into {} tiles", size.width, size.height, tiles.len());
        Ok(self.register(tiles))
    }

    /// Uploads `source` as a resizable frame drawn at `size`, sliced by `grid` corner cells.
    ///
    /// An axis shorter than three grid cells is kept as one cell; if neither axis can be
    /// sliced the source is rejected. A non-positive `size` axis takes the source extent.
    pub fn install_sliced(&mut self, source: &dyn PixelSource, size: Dimensioni, grid: Dimensioni) -> Result<SpriteId, AtlasError> {
        let src = source.size();
        if src.width <= 0 || src.height <= 0 {
            return Err(AtlasError::EmptySource { width: src.width, height: src.height });
        }
        let columns = if grid.width > 0 && src.width >= 3 * grid.width { 3 } else { 1 };
        let rows = if grid.height > 0 && src.height >= 3 * grid.height { 3 } else { 1 };
        if columns == 1 && rows == 1 {
            return Err(AtlasError::SliceTooSmall {
                width: src.width,
                height: src.height,
                grid_width: grid.width,
                grid_height: grid.height,
            });
        }

        let col_spans = frame_spans(src.width, grid.width, columns);
        let row_spans = frame_spans(src.height, grid.height, rows);
        for &(_, w) in &col_spans {
            for &(_, h) in &row_spans {
                if self.pool.exceeds_page(w + 2 * TILE_PADDING, h + 2 * TILE_PADDING) {
                    return Err(AtlasError::CellTooLarge {
                        width: w + 2 * TILE_PADDING,
                        height: h + 2 * TILE_PADDING,
                        page_width: self.config.page_width,
                        page_height: self.config.page_height,
                    });
                }
            }
        }

        let format = self.config.format;
        let mut tiles = Vec::with_capacity(9);
        for (row, &(y, h)) in row_spans.iter().enumerate() {
            for (column, &(x, w)) in col_spans.iter().enumerate() {
                let cell = rect(x, y, w, h);
                let pixels = extract_region(source, cell, cell, TILE_PADDING, format);
                let mut placement = self.place(w + 2 * TILE_PADDING, h + 2 * TILE_PADDING, &pixels)?;
                placement.rect = expand_rect(placement.rect, -TILE_PADDING);
                let mut tile = Tile::plain(placement, vec2(x, y), src);
                tile.grid_columns = columns;
                tile.grid_rows = rows;
                tile.cell_column = column as i32;
                tile.cell_row = row as i32;
                tile.grid = grid;
                tile.is_extended_frame = true;
                tiles.push(tile);
            }
        }

        let size = frame_size(size, src);
        for tile in &mut tiles {
            Self::layout_cell(tile, size);
        }
        Ok(self.register(tiles))
    }

    fn layout_cell(tile: &mut Tile, size: Dimensioni) {
        let (x, w) = frame_spans(size.width, tile.grid.width, tile.grid_columns)[tile.cell_column as usize];
        let (y, h) = frame_spans(size.height, tile.grid.height, tile.grid_rows)[tile.cell_row as usize];
        let master = Dimensioni::new(
            if tile.grid_columns == 3 { size.width.max(2 * tile.grid.width) } else { size.width },
            if tile.grid_rows == 3 { size.height.max(2 * tile.grid.height) } else { size.height },
        );
        tile.offset_positive = vec2(x, y);
        tile.draw_size = Dimensioni::new(w, h);
        tile.offset_negative = vec2(master.width - (x + w), master.height - (y + h));
        tile.master_size = master;
    }

    /// Re-lays a sliced frame out at `size`, keeping its corner cells at the grid size.
    /// A non-positive `size` axis takes the source extent, as in
    /// [`AtlasPageSet::install_sliced`]. Returns `false` for handles that were not created
    /// by it.
    pub fn resize(&mut self, id: SpriteId, size: Dimensioni) -> bool {
        let indices = match self.entry(id) {
            Some(entry) => entry.tiles.clone(),
            None => return false,
        };
        let head = &self.tiles[indices[0]];
        if !head.is_extended_frame || head.grid_columns <= 0 || head.grid_rows <= 0 {
            return false;
        }
        // cells are stored row-major, so the first row and column span the source
        let columns = head.grid_columns as usize;
        let source = Dimensioni::new(
            indices.iter().take(columns).map(|&i| self.tiles[i].placement.rect.width).sum(),
            indices.iter().step_by(columns).map(|&i| self.tiles[i].placement.rect.height).sum(),
        );
        let size = frame_size(size, source);
        for &index in &indices {
            Self::layout_cell(&mut self.tiles[index], size);
        }
        true
    }

    /// Draws a sprite with its top-left corner at `pos`.
    pub fn draw(&self, id: SpriteId, attribute: DrawAttribute, pos: Vec2i, linear: bool) {
        let Some(entry) = self.entry(id) else {
            return;
        };
        let tint = self.tint;
        let tiles = &self.tiles;
        self.renderer.scope_mut(|r| {
            for &index in &entry.tiles {
                let tile = &tiles[index];
                let local = tile.local_rect_for(attribute);
                if local.width <= 0 || local.height <= 0 {
                    continue;
                }
                let dst = rect(pos.x + local.x, pos.y + local.y, local.width, local.height);
                let quad = textured_quad(dst, tile.placement.rect, tile.placement.page_size, tint, attribute);
                r.draw_quad(tile.texture(), quad, linear);
            }
        });
    }

    /// Draws the part of a sprite inside the sprite-local region
    /// `(region_offset, region_size)`, placing the region's top-left corner at `pos`.
    pub fn draw_sub(
        &self,
        id: SpriteId,
        attribute: DrawAttribute,
        pos: Vec2i,
        region_offset: Vec2i,
        region_size: Dimensioni,
        linear: bool,
    ) {
        let Some(entry) = self.entry(id) else {
            return;
        };
        let region = rect(region_offset.x, region_offset.y, region_size.width, region_size.height);
        if region.width <= 0 || region.height <= 0 {
            return;
        }
        let tint = self.tint;
        let tiles = &self.tiles;
        self.renderer.scope_mut(|r| {
            for &index in &entry.tiles {
                let tile = &tiles[index];
                let Some((local, src)) = clip_rect(tile.local_rect(), tile.placement.rect, region) else {
                    continue;
                };
                let x = if attribute.is_flip_h() {
                    region.x + region.width - (local.x + local.width)
                } else {
                    local.x - region.x
                };
                let y = if attribute.is_flip_v() {
                    region.y + region.height - (local.y + local.height)
                } else {
                    local.y - region.y
                };
                let dst = rect(pos.x + x, pos.y + y, local.width, local.height);
                let quad = textured_quad(dst, src, tile.placement.page_size, tint, attribute);
                r.draw_quad(tile.texture(), quad, linear);
            }
        });
    }

    /// Deletes every page texture in one batch, drops all tiles and invalidates all handles.
    pub fn destroy(&mut self) {
        let pool = &mut self.pool;
        self.renderer.scope_mut(|r| pool.release(r));
        self.tiles.clear();
        self.sprites.truncate(1);
    }
}

impl<R: Renderer> Drop for AtlasPageSet<R> {
    fn drop(&mut self) { self.destroy(); }
}
