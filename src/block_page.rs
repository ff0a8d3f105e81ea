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

//! Fixed-size texture pages carved into 16×16 blocks.
//!
//! A page hands out block-aligned rectangles with a row-major first-fit scan and never
//! frees them. Callers that rely on repeatable layouts (visual regression tests of UI
//! skins) depend on this exact tie-break: the top-most, then left-most free position wins.

use crate::*;

/// One texture page plus its block occupancy bitmap.
#[derive(Clone, Debug)]
pub struct BlockPage {
    texture: TextureId,
    width: i32,
    height: i32,
    block_width: i32,
    block_height: i32,
    occupancy: Vec<u64>,
    free_blocks: i32,
}

fn blocks_for(pixels: i32) -> i32 { pixels / BLOCK_SIZE + (pixels % BLOCK_SIZE != 0) as i32 }

impl BlockPage {
    /// Wraps a freshly created texture of `width`×`height` pixels.
    pub fn new(texture: TextureId, width: i32, height: i32) -> Self {
        let block_width = blocks_for(width.max(0));
        let block_height = blocks_for(height.max(0));
        let bits = (block_width * block_height) as usize;
        Self {
            texture,
            width,
            height,
            block_width,
            block_height,
            occupancy: vec![0; (bits + 63) / 64],
            free_blocks: block_width * block_height,
        }
    }

    /// Texture backing this page.
    pub fn texture(&self) -> TextureId { self.texture }

    /// Page size in pixels.
    pub fn dimension(&self) -> Dimensioni { Dimensioni::new(self.width, self.height) }

    /// Page size in blocks.
    pub fn block_dimension(&self) -> Dimensioni { Dimensioni::new(self.block_width, self.block_height) }

    /// Blocks not handed out yet.
    pub fn free_blocks(&self) -> i32 { self.free_blocks }

    /// Returns `true` once every block has been allocated.
    pub fn is_full(&self) -> bool { self.free_blocks <= 0 }

    /// Returns `true` if the block at `(bx, by)` is taken.
    pub fn is_occupied(&self, bx: i32, by: i32) -> bool {
        if bx < 0 || by < 0 || bx >= self.block_width || by >= self.block_height {
            return false;
        }
        let bit = (bx + by * self.block_width) as usize;
        self.occupancy[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    fn occupy(&mut self, bx: i32, by: i32) {
        let bit = (bx + by * self.block_width) as usize;
        self.occupancy[bit / 64] |= 1u64 << (bit % 64);
    }

    fn is_free(&self, bx: i32, by: i32, bw: i32, bh: i32) -> bool {
        for y in by..by + bh {
            for x in bx..bx + bw {
                if self.is_occupied(x, y) {
                    return false;
                }
            }
        }
        true
    }

    /// Reserves a `width`×`height` pixel area and returns its pixel-space origin, which is
    /// always a multiple of [`BLOCK_SIZE`]. Returns `None` when the request is degenerate or
    /// no free block rectangle is large enough; the page is left untouched in that case.
    pub fn allocate(&mut self, width: i32, height: i32) -> Option<Vec2i> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let bw = blocks_for(width);
        let bh = blocks_for(height);
        if bw > self.block_width || bh > self.block_height || bw * bh > self.free_blocks {
            return None;
        }

        for by in 0..=self.block_height - bh {
            for bx in 0..=self.block_width - bw {
                if !self.is_free(bx, by, bw, bh) {
                    continue;
                }
                for y in by..by + bh {
                    for x in bx..bx + bw {
                        self.occupy(x, y);
                    }
                }
                self.free_blocks -= bw * bh;
                return Some(vec2(bx * BLOCK_SIZE, by * BLOCK_SIZE));
            }
        }
        None
    }
}

/// A growable list of equally sized pages sharing one pixel format.
///
/// New pages are only created when no existing page accepts a request; the most recently
/// created page is probed first, older non-full pages after it.
#[derive(Clone, Debug)]
pub struct PagePool {
    page_width: i32,
    page_height: i32,
    format: PixelFormat,
    pages: Vec<BlockPage>,
}

impl PagePool {
    /// Creates an empty pool whose pages will be `page_width`×`page_height` texels.
    pub fn new(page_width: i32, page_height: i32, format: PixelFormat) -> Self {
        Self { page_width, page_height, format, pages: Vec::new() }
    }

    /// Pages created so far, oldest first.
    pub fn pages(&self) -> &[BlockPage] { &self.pages }

    /// Number of pages created so far.
    pub fn page_count(&self) -> usize { self.pages.len() }

    /// Size of every page in the pool.
    pub fn page_dimension(&self) -> Dimensioni { Dimensioni::new(self.page_width, self.page_height) }

    /// Texel format of every page in the pool.
    pub fn format(&self) -> PixelFormat { self.format }

    /// Returns `true` when a request of this size can never be satisfied by one page.
    pub fn exceeds_page(&self, width: i32, height: i32) -> bool { width > self.page_width || height > self.page_height }

    /// Finds room for a `width`×`height` area, creating a page through `renderer` when
    /// every existing page is exhausted. Returns the page index and the pixel rectangle.
    pub fn allocate<R: Renderer>(&mut self, renderer: &mut R, width: i32, height: i32) -> Option<(usize, Recti)> {
        if width <= 0 || height <= 0 || self.exceeds_page(width, height) {
            return None;
        }

        for index in (0..self.pages.len()).rev() {
            let page = &mut self.pages[index];
            if page.is_full() {
                continue;
            }
            if let Some(origin) = page.allocate(width, height) {
                return Some((index, rect(origin.x, origin.y, width, height)));
            }
        }

        let texture = renderer.create_texture(self.page_width, self.page_height, self.format);
        log::debug!(
            "created atlas page #{} ({}x{}, {:?}) as texture {}",
            self.pages.len(),
            self.page_width,
            self.page_height,
            self.format,
            texture.raw()
        );
        let mut page = BlockPage::new(texture, self.page_width, self.page_height);
        let origin = page.allocate(width, height)?;
        self.pages.push(page);
        Some((self.pages.len() - 1, rect(origin.x, origin.y, width, height)))
    }

    /// Allocates room for `pixels` and uploads them in one step.
    pub fn place<R: Renderer>(&mut self, renderer: &mut R, width: i32, height: i32, pixels: &[u8]) -> Option<Placement> {
        let (page, area) = self.allocate(renderer, width, height)?;
        let texture = self.pages[page].texture();
        renderer.upload_sub_image(texture, area, self.format, pixels);
        Some(Placement {
            texture,
            page,
            page_size: self.page_dimension(),
            rect: area,
        })
    }

    /// Deletes every page texture in a single batch and forgets the pages.
    pub fn release<R: Renderer>(&mut self, renderer: &mut R) {
        if self.pages.is_empty() {
            return;
        }
        let ids: Vec<TextureId> = self.pages.iter().map(|p| p.texture()).collect();
        log::debug!("deleting {} atlas page(s)", ids.len());
        renderer.delete_textures(&ids);
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn page() -> BlockPage { BlockPage::new(TextureId::new(1), 256, 256) }

    fn block_rect(origin: Vec2i, w: i32, h: i32) -> (i32, i32, i32, i32) {
        (origin.x / BLOCK_SIZE, origin.y / BLOCK_SIZE, blocks_for(w), blocks_for(h))
    }

    fn overlaps(a: (i32, i32, i32, i32), b: (i32, i32, i32, i32)) -> bool {
        a.0 < b.0 + b.2 && b.0 < a.0 + a.2 && a.1 < b.1 + b.3 && b.1 < a.1 + a.3
    }

    #[test]
    fn block_counts_round_up() {
        let p = BlockPage::new(TextureId::new(1), 250, 17);
        assert_eq!(p.block_dimension().width, 16);
        assert_eq!(p.block_dimension().height, 2);
        assert_eq!(p.free_blocks(), 32);
    }

    #[test]
    fn first_fit_is_row_major() {
        let mut p = page();
        let a = p.allocate(20, 10).unwrap();
        let b = p.allocate(16, 16).unwrap();
        let c = p.allocate(100, 40).unwrap();
        assert_eq!((a.x, a.y), (0, 0));
        assert_eq!((b.x, b.y), (32, 0));
        assert_eq!((c.x, c.y), (48, 0));
        assert_eq!(p.free_blocks(), 256 - 2 - 1 - 7 * 3);
    }

    #[test]
    fn degenerate_or_oversized_requests_fail() {
        let mut p = page();
        assert!(p.allocate(0, 10).is_none());
        assert!(p.allocate(10, -1).is_none());
        assert!(p.allocate(257, 16).is_none());
        assert_eq!(p.free_blocks(), 256);
    }

    #[test]
    fn huge_requests_fail_without_touching_the_page() {
        let mut p = page();
        assert!(p.allocate(i32::MAX, 16).is_none());
        assert!(p.allocate(16, i32::MAX).is_none());
        assert!(p.allocate(i32::MAX, i32::MAX).is_none());
        assert_eq!(p.free_blocks(), 256);
        assert!(!p.is_occupied(0, 0));
        assert_eq!(blocks_for(i32::MAX), i32::MAX / BLOCK_SIZE + 1);
    }

    #[test]
    fn sixteen_quarter_tiles_fill_the_page() {
        let mut p = page();
        for i in 0..16 {
            let origin = p.allocate(64, 64).unwrap();
            assert_eq!((origin.x, origin.y), ((i % 4) * 64, (i / 4) * 64));
        }
        assert_eq!(p.free_blocks(), 0);
        assert!(p.is_full());
        assert!(p.allocate(1, 1).is_none());
        assert!(p.allocate(64, 64).is_none());
    }

    #[test]
    fn failed_scan_leaves_page_untouched() {
        let mut p = page();
        p.allocate(256, 128).unwrap();
        p.allocate(128, 128).unwrap();
        let before = p.free_blocks();
        assert!(p.allocate(200, 64).is_none());
        assert_eq!(p.free_blocks(), before);
        assert!(!p.is_occupied(10, 10));
        let origin = p.allocate(128, 128).unwrap();
        assert_eq!((origin.x, origin.y), (128, 128));
        assert!(p.is_full());
    }

    #[test]
    fn random_allocations_never_overlap() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..8 {
            let mut p = page();
            let mut placed = Vec::new();
            for _ in 0..200 {
                let w = rng.random_range(1..=96);
                let h = rng.random_range(1..=96);
                if let Some(origin) = p.allocate(w, h) {
                    assert_eq!(origin.x % BLOCK_SIZE, 0);
                    assert_eq!(origin.y % BLOCK_SIZE, 0);
                    assert!(origin.x + w <= 256 && origin.y + h <= 256);
                    let r = block_rect(origin, w, h);
                    for other in &placed {
                        assert!(!overlaps(r, *other), "{:?} overlaps {:?}", r, other);
                    }
                    placed.push(r);
                }
            }
            let used: i32 = placed.iter().map(|r| r.2 * r.3).sum();
            assert_eq!(p.free_blocks(), 256 - used);
        }
    }

    #[test]
    fn pool_spills_to_new_pages_and_reuses_older_ones() {
        let mut renderer = MemoryRenderer::new();
        let mut pool = PagePool::new(256, 256, PixelFormat::Rgba8);

        let (p0, r0) = pool.allocate(&mut renderer, 256, 192).unwrap();
        let (p1, r1) = pool.allocate(&mut renderer, 256, 128).unwrap();
        assert_eq!((p0, p1), (0, 1));
        assert_eq!((r0.y, r1.y), (0, 0));

        // newest page is probed first
        let (p2, r2) = pool.allocate(&mut renderer, 64, 64).unwrap();
        assert_eq!((p2, r2.x, r2.y), (1, 0, 128));

        let (p3, r3) = pool.allocate(&mut renderer, 256, 64).unwrap();
        assert_eq!((p3, r3.y), (1, 192));
        // now only page 0 can hold another 256x64 strip
        let (p4, r4) = pool.allocate(&mut renderer, 256, 64).unwrap();
        assert_eq!((p4, r4.y), (0, 192));
        assert_eq!(pool.page_count(), 2);
        assert!(pool.allocate(&mut renderer, 257, 1).is_none());
        assert_eq!(renderer.texture_count(), 2);

        pool.release(&mut renderer);
        assert_eq!(pool.page_count(), 0);
        assert_eq!(renderer.texture_count(), 0);
    }
}
