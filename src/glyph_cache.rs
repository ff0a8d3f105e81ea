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

//! Lazily rasterized glyphs packed into block-allocated pages, plus the text measuring
//! and drawing helpers built on them.

use std::collections::{BTreeMap, HashMap};

use crate::pixel_source::extract_region;
use crate::quad::{clip_rect_mirrored, solid_quad, textured_quad};
use crate::*;

const FIRST_ASCII: u32 = 0x20;
const LAST_ASCII: u32 = 0x7E;

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Per-face rendering switches.
    pub struct FaceFlags : u32 {
        /// Advance by each glyph's own width instead of the fixed column width.
        const PROPORTIONAL = 1;
        /// Keep fractional coverage instead of thresholding it.
        const ANTIALIAS = 2;
        /// Centre glyphs inside their column in monospace mode.
        const CENTER_JUSTIFY = 4;
    }
}

impl Default for FaceFlags {
    fn default() -> Self { Self::PROPORTIONAL | Self::ANTIALIAS }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Cache key of one glyph within a face: pixel size in the high half, codepoint in the low.
pub struct GlyphKey(u64);

impl GlyphKey {
    /// Key of `code` rendered at `size` pixels.
    pub fn new(size: i32, code: u32) -> Self { Self(((size as u32 as u64) << 32) | code as u64) }

    /// Pixel size part of the key.
    pub fn size(self) -> i32 { (self.0 >> 32) as i32 }

    /// Codepoint part of the key.
    pub fn code(self) -> u32 { self.0 as u32 }
}

#[derive(Copy, Clone, Debug)]
struct GlyphEntry {
    // absent for blank or failed glyphs
    placement: Option<Placement>,
    metrics: GlyphMetrics,
}

struct FaceState {
    alias: String,
    size: i32,
    spacing: i32,
    flags: FaceFlags,
    glyphs: HashMap<GlyphKey, GlyphEntry>,
    fixed_widths: BTreeMap<i32, i32>,
    line_metrics: BTreeMap<i32, LineMetrics>,
}

impl FaceState {
    fn new(alias: &str, size: i32) -> Self {
        Self {
            alias: alias.to_string(),
            size,
            spacing: 0,
            flags: FaceFlags::default(),
            glyphs: HashMap::new(),
            fixed_widths: BTreeMap::new(),
            line_metrics: BTreeMap::new(),
        }
    }
}

/// Glyph cache for every face installed through one rasterizer.
///
/// Glyphs are rasterized the first time they are measured or drawn and uploaded into
/// pages whose edge grows with the glyph height, so small and large sizes don't share
/// pages. Measuring therefore needs `&mut self` as well.
pub struct GlyphCache<R: Renderer, F: GlyphRasterizer> {
    renderer: RendererHandle<R>,
    rasterizer: F,
    config: GlyphCacheConfig,
    faces: Vec<FaceState>,
    active: Option<usize>,
    // `None` marks a push made without an active face
    saved_faces: Vec<Option<(usize, i32)>>,
    pools: BTreeMap<i32, PagePool>,
    fore: Color,
    back: Color,
    background: bool,
    swap_colors: bool,
    clip: Option<Recti>,
    flip: DrawAttribute,
}

impl<R: Renderer, F: GlyphRasterizer> GlyphCache<R, F> {
    /// Creates an empty cache with the default configuration.
    pub fn new(renderer: RendererHandle<R>, rasterizer: F) -> Self { Self::with_config(renderer, rasterizer, GlyphCacheConfig::default()) }

    /// Creates an empty cache.
    pub fn with_config(renderer: RendererHandle<R>, rasterizer: F, config: GlyphCacheConfig) -> Self {
        Self {
            renderer,
            rasterizer,
            config,
            faces: Vec::new(),
            active: None,
            saved_faces: Vec::new(),
            pools: BTreeMap::new(),
            fore: Color::WHITE,
            back: Color::BLACK,
            background: false,
            swap_colors: false,
            clip: None,
            flip: DrawAttribute::NORMAL,
        }
    }

    /// Returns a clone of the renderer handle shared with this cache.
    pub fn renderer_handle(&self) -> RendererHandle<R> { self.renderer.clone() }

    /// Returns the rasterizer.
    pub fn rasterizer(&self) -> &F { &self.rasterizer }

    /// Opens the font at `path` and registers it as `alias`. The first installed face
    /// becomes the active one. Installing an alias again reopens it and drops the glyphs
    /// cached for it.
    pub fn install_font_type(&mut self, path: &str, alias: &str) -> bool {
        if let Err(error) = self.rasterizer.open_face(path, alias) {
            log::warn!("cannot install face '{}' from '{}': {}", alias, path, error);
            return false;
        }
        let face = FaceState::new(alias, self.config.default_size);
        match self.faces.iter().position(|f| f.alias == alias) {
            Some(index) => self.faces[index] = face,
            None => self.faces.push(face),
        }
        if self.active.is_none() {
            self.active = Some(self.faces.len() - 1);
        }
        true
    }

    /// Makes `alias` the active face.
    pub fn set_font_type(&mut self, alias: &str) -> bool {
        match self.faces.iter().position(|f| f.alias == alias) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => {
                log::warn!("unknown face '{}'", alias);
                false
            }
        }
    }

    /// Alias of the active face.
    pub fn font_type(&self) -> Option<&str> { self.face().map(|f| f.alias.as_str()) }

    /// Sets the pixel size of the active face. The first time a size is used, the
    /// printable ASCII range is rasterized to find the monospace column width.
    pub fn set_font_size(&mut self, size: i32) {
        if size <= 0 {
            return;
        }
        if let Some(face) = self.face_mut() {
            face.size = size;
            self.fixed_width();
        }
    }

    /// Pixel size of the active face, 0 without a face.
    pub fn font_size(&self) -> i32 { self.face().map_or(0, |f| f.size) }

    /// Saves the active face and its size. Every push is matched by one
    /// [`GlyphCache::pop_font_face`], even when no face is active.
    pub fn push_font_face(&mut self) {
        let saved = self.active.map(|index| (index, self.faces[index].size));
        self.saved_faces.push(saved);
    }

    /// Restores the face and size saved by the matching [`GlyphCache::push_font_face`].
    /// A push made without an active face restores nothing. Returns `false` when the
    /// stack is empty.
    pub fn pop_font_face(&mut self) -> bool {
        match self.saved_faces.pop() {
            Some(Some((index, size))) => {
                self.active = Some(index);
                self.set_font_size(size);
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Extra pixels added after every glyph by the text helpers.
    pub fn set_spacing(&mut self, spacing: i32) {
        if let Some(face) = self.face_mut() {
            face.spacing = spacing;
        }
    }

    /// Spacing of the active face.
    pub fn spacing(&self) -> i32 { self.face().map_or(0, |f| f.spacing) }

    /// Switches between proportional and monospace advances.
    pub fn set_proportional(&mut self, on: bool) { self.set_flag(FaceFlags::PROPORTIONAL, on) }

    /// Affects glyphs rasterized from now on; glyphs already cached keep their coverage.
    pub fn set_antialias(&mut self, on: bool) { self.set_flag(FaceFlags::ANTIALIAS, on) }

    /// Centres monospace glyphs inside their column.
    pub fn set_center_justify(&mut self, on: bool) { self.set_flag(FaceFlags::CENTER_JUSTIFY, on) }

    /// Flags of the active face.
    pub fn face_flags(&self) -> FaceFlags { self.face().map_or(FaceFlags::empty(), |f| f.flags) }

    /// Glyph and background colours.
    pub fn set_colors(&mut self, fore: Color, back: Color) {
        self.fore = fore;
        self.back = back;
    }

    /// Fills each glyph cell with the background colour before drawing the glyph.
    pub fn set_background(&mut self, on: bool) { self.background = on }

    /// Exchanges glyph and background colours when drawing.
    pub fn set_swap_colors(&mut self, on: bool) { self.swap_colors = on }

    /// Restricts drawing to `clip`.
    pub fn set_clip(&mut self, clip: Recti) { self.clip = Some(clip) }

    /// Removes the clip rectangle.
    pub fn reset_clip(&mut self) { self.clip = None }

    /// Mirrors every glyph drawn from now on.
    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) {
        let mut flip = DrawAttribute::NORMAL;
        flip.set(DrawAttribute::FLIP_H, horizontal);
        flip.set(DrawAttribute::FLIP_V, vertical);
        self.flip = flip;
    }

    /// Distance between consecutive lines at the active size.
    pub fn line_height(&mut self) -> i32 { self.line_metrics().line_height }

    /// Advance of `code` at the active size, without spacing. Printable ASCII advances by
    /// the column width in monospace mode.
    pub fn get_width(&mut self, code: u32) -> i32 {
        if self.is_monospaced(code) {
            return self.fixed_width();
        }
        self.glyph(code).map_or(0, |g| g.metrics.advance_width)
    }

    /// Width of the widest line of `text`.
    pub fn get_width_text<T: AsRef<[u8]>>(&mut self, text: T) -> i32 { self.walk(None, text.as_ref(), 0).width }

    /// Width of the widest line and total height of `text`.
    pub fn get_size<T: AsRef<[u8]>>(&mut self, text: T) -> Dimensioni { self.walk(None, text.as_ref(), 0) }

    /// Draws one glyph with the top of its line at `pos` and returns its advance.
    pub fn draw(&mut self, pos: Vec2i, code: u32) -> i32 {
        let Some(entry) = self.glyph(code) else {
            return 0;
        };
        let advance = self.get_width(code);
        let line = self.line_metrics();

        let mut x = pos.x + entry.metrics.bearing_x;
        if self.is_monospaced(code) && self.face_flags().contains(FaceFlags::CENTER_JUSTIFY) {
            x += (advance - entry.metrics.advance_width) / 2;
        }
        let y = pos.y + line.ascent - entry.metrics.bearing_y;

        let (fore, back) = if self.swap_colors { (self.back, self.fore) } else { (self.fore, self.back) };
        let clip = self.clip;
        let flip = self.flip;
        let cell = rect(pos.x, pos.y, advance, line.line_height);
        let background = self.background;
        self.renderer.scope_mut(|r| {
            if background {
                let area = match clip {
                    Some(c) => cell.intersect(&c),
                    None => Some(cell),
                };
                if let Some(area) = area.filter(|a| a.width > 0 && a.height > 0) {
                    r.fill_quad(solid_quad(area, back.into()));
                }
            }
            if let Some(p) = entry.placement {
                let dst = rect(x, y, p.rect.width, p.rect.height);
                let clipped = match clip {
                    Some(c) => clip_rect_mirrored(dst, p.rect, c, flip),
                    None => Some((dst, p.rect)),
                };
                if let Some((dst, src)) = clipped {
                    r.draw_quad(p.texture, textured_quad(dst, src, p.page_size, fore.into(), flip), false);
                }
            }
        });
        advance
    }

    /// Draws `text` with its first line's top-left corner at `pos` and returns the widest
    /// line advance. A positive `line_limit` wraps lines before they grow past it.
    pub fn draw_text<T: AsRef<[u8]>>(&mut self, pos: Vec2i, text: T, line_limit: i32) -> i32 { self.walk(Some(pos), text.as_ref(), line_limit).width }

    /// Number of glyphs cached over all faces and sizes.
    pub fn cached_glyph_count(&self) -> usize { self.faces.iter().map(|f| f.glyphs.len()).sum() }

    /// Number of glyph pages over all height classes.
    pub fn page_count(&self) -> usize { self.pools.values().map(|p| p.page_count()).sum() }

    /// Releases every glyph page and forgets all cached glyphs. Faces stay installed.
    pub fn destroy(&mut self) {
        let pools = &mut self.pools;
        self.renderer.scope_mut(|r| {
            for pool in pools.values_mut() {
                pool.release(r);
            }
        });
        self.pools.clear();
        for face in &mut self.faces {
            face.glyphs.clear();
        }
    }

    fn face(&self) -> Option<&FaceState> { self.active.map(|i| &self.faces[i]) }

    fn face_mut(&mut self) -> Option<&mut FaceState> { self.active.map(|i| &mut self.faces[i]) }

    fn set_flag(&mut self, flag: FaceFlags, on: bool) {
        if let Some(face) = self.face_mut() {
            face.flags.set(flag, on);
        }
    }

    fn is_monospaced(&self, code: u32) -> bool {
        (FIRST_ASCII..=LAST_ASCII).contains(&code) && !self.face_flags().contains(FaceFlags::PROPORTIONAL) && self.face().is_some()
    }

    /// Widest printable ASCII advance at the active size, computed once per size.
    fn fixed_width(&mut self) -> i32 {
        let Some(index) = self.active else {
            return 0;
        };
        let size = self.faces[index].size;
        if let Some(&width) = self.faces[index].fixed_widths.get(&size) {
            return width;
        }

        let proportional = self.faces[index].flags.contains(FaceFlags::PROPORTIONAL);
        self.faces[index].flags.insert(FaceFlags::PROPORTIONAL);
        let widest = (FIRST_ASCII..=LAST_ASCII).map(|code| self.get_width(code)).max().unwrap_or(0);
        self.faces[index].flags.set(FaceFlags::PROPORTIONAL, proportional);

        self.faces[index].fixed_widths.insert(size, widest);
        widest
    }

    fn line_metrics(&mut self) -> LineMetrics {
        let Some(index) = self.active else {
            return LineMetrics { ascent: 0, line_height: 0 };
        };
        let face = &mut self.faces[index];
        if let Some(metrics) = face.line_metrics.get(&face.size) {
            return *metrics;
        }
        let metrics = self
            .rasterizer
            .line_metrics(&face.alias, face.size)
            .unwrap_or(LineMetrics { ascent: face.size, line_height: face.size });
        face.line_metrics.insert(face.size, metrics);
        metrics
    }

    /// Cached glyph of the active face, rasterizing and uploading it on a miss.
    fn glyph(&mut self, code: u32) -> Option<GlyphEntry> {
        let index = self.active?;
        let face = &mut self.faces[index];
        let key = GlyphKey::new(face.size, code);
        if let Some(entry) = face.glyphs.get(&key) {
            return Some(*entry);
        }

        let antialias = face.flags.contains(FaceFlags::ANTIALIAS);
        let entry = match self.rasterizer.create_bitmap(&face.alias, face.size, code, antialias) {
            Some(glyph) => GlyphEntry {
                placement: Self::upload(&self.renderer, &mut self.pools, &self.config, &glyph, code),
                metrics: glyph.metrics,
            },
            None => {
                log::warn!("face '{}' cannot rasterize U+{:04X} at {}px", face.alias, code, face.size);
                GlyphEntry { placement: None, metrics: GlyphMetrics::default() }
            }
        };
        face.glyphs.insert(key, entry);
        Some(entry)
    }

    fn upload(
        renderer: &RendererHandle<R>,
        pools: &mut BTreeMap<i32, PagePool>,
        config: &GlyphCacheConfig,
        glyph: &RasterizedGlyph,
        code: u32,
    ) -> Option<Placement> {
        let size = glyph.bitmap.size();
        if size.width <= 0 || size.height <= 0 {
            return None;
        }
        if glyph.bitmap.coverage.len() < (size.width * size.height) as usize {
            log::warn!("short coverage buffer for U+{:04X}", code);
            return None;
        }

        let edge = config.page_size_for(size.height);
        let pool = pools.entry(edge).or_insert_with(|| PagePool::new(edge, edge, PixelFormat::Rgba8));
        if pool.exceeds_page(size.width, size.height) {
            log::warn!("glyph U+{:04X} ({}x{}) does not fit a {}px page", code, size.width, size.height, edge);
            return None;
        }
        let area = rect(0, 0, size.width, size.height);
        let pixels = extract_region(&glyph.bitmap, area, area, 0, PixelFormat::Rgba8);
        renderer.scope_mut(|r| pool.place(r, size.width, size.height, &pixels))
    }

    /// Lays out `text` line by line, drawing it when `origin` is given. Returns the widest
    /// line and the total height.
    fn walk(&mut self, origin: Option<Vec2i>, text: &[u8], line_limit: i32) -> Dimensioni {
        let line_height = self.line_height();
        let spacing = self.spacing();
        let mut pen = vec2(0, 0);
        let mut widest = 0;
        let mut any = false;

        for code in Utf8Codes::new(text) {
            any = true;
            match code {
                0x0A => {
                    widest = widest.max(pen.x);
                    pen = vec2(0, pen.y + line_height);
                    continue;
                }
                0x0D => continue,
                _ => {}
            }

            let advance = self.get_width(code) + spacing;
            if line_limit > 0 && pen.x > 0 && pen.x + advance > line_limit {
                widest = widest.max(pen.x);
                pen = vec2(0, pen.y + line_height);
            }
            if let Some(origin) = origin {
                self.draw(vec2(origin.x + pen.x, origin.y + pen.y), code);
            }
            pen.x += advance;
        }

        if !any {
            return Dimensioni::new(0, 0);
        }
        Dimensioni::new(widest.max(pen.x), pen.y + line_height)
    }
}

impl<R: Renderer, F: GlyphRasterizer> Drop for GlyphCache<R, F> {
    fn drop(&mut self) { self.destroy() }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic rasterizer: glyph width depends on the codepoint, U+FFFF always fails.
    #[derive(Default)]
    struct ScriptedRasterizer {
        faces: Vec<String>,
        calls: usize,
        antialias: Vec<(u32, bool)>,
    }

    fn advance_for(size: i32, code: u32) -> i32 {
        if code == ' ' as u32 { size / 3 } else { size / 2 + (code % 4) as i32 }
    }

    impl GlyphRasterizer for ScriptedRasterizer {
        fn open_face(&mut self, path: &str, alias: &str) -> std::io::Result<()> {
            if path.starts_with("missing") {
                return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such face"));
            }
            self.faces.push(alias.to_string());
            Ok(())
        }

        fn create_bitmap(&mut self, alias: &str, size: i32, code: u32, antialias: bool) -> Option<RasterizedGlyph> {
            self.calls += 1;
            self.antialias.push((code, antialias));
            if code == 0xFFFF || !self.faces.iter().any(|f| f == alias) {
                return None;
            }
            let advance = advance_for(size, code);
            let (w, h) = if code == ' ' as u32 { (0, 0) } else { (advance - 1, size * 3 / 4) };
            Some(RasterizedGlyph {
                bitmap: GlyphBitmap { width: w, height: h, coverage: vec![0xFF; (w * h) as usize] },
                metrics: GlyphMetrics {
                    bitmap_width: w,
                    bitmap_height: h,
                    advance_width: advance,
                    advance_height: 0,
                    bearing_x: 1,
                    bearing_y: h,
                },
            })
        }
    }

    type Cache = GlyphCache<MemoryRenderer, ScriptedRasterizer>;

    fn cache() -> Cache {
        let mut cache = GlyphCache::new(RendererHandle::new(MemoryRenderer::new()), ScriptedRasterizer::default());
        assert!(cache.install_font_type("fonts/mono.ttf", "mono"));
        cache.set_font_size(16);
        cache
    }

    fn calls(cache: &Cache) -> Vec<DrawCall> { cache.renderer_handle().scope(|r| r.draw_calls().to_vec()) }

    fn tuple(r: Recti) -> (i32, i32, i32, i32) { (r.x, r.y, r.width, r.height) }

    #[test]
    fn first_size_use_rasterizes_printable_ascii_once() {
        let mut cache = cache();
        assert_eq!(cache.rasterizer().calls, 95);
        assert_eq!(cache.cached_glyph_count(), 95);

        assert_eq!(cache.get_width('A' as u32), advance_for(16, 'A' as u32));
        cache.draw(vec2(0, 0), 'A' as u32);
        cache.set_font_size(16);
        assert_eq!(cache.rasterizer().calls, 95);

        cache.get_width(0xE9);
        cache.get_width(0xE9);
        assert_eq!(cache.rasterizer().calls, 96);
    }

    #[test]
    fn fixed_width_is_widest_ascii_advance() {
        let mut cache = cache();
        let widest = (0x20..=0x7E).map(|c| cache.get_width(c)).max().unwrap();
        assert_eq!(widest, advance_for(16, 'C' as u32));

        cache.set_proportional(false);
        assert_eq!(cache.get_width('i' as u32), widest);
        assert_eq!(cache.get_width(' ' as u32), widest);
        assert_eq!(cache.get_width_text("abc"), 3 * widest);
        assert!(!cache.face_flags().contains(FaceFlags::PROPORTIONAL));

        // a new size keeps the monospace flag after its measuring pass
        cache.set_font_size(20);
        assert!(!cache.face_flags().contains(FaceFlags::PROPORTIONAL));
        assert_eq!(cache.get_width('a' as u32), advance_for(20, 'C' as u32));
    }

    #[test]
    fn text_measurement_decodes_utf8() {
        let mut cache = cache();
        assert_eq!(cache.get_width_text("é"), advance_for(16, 0xE9));
        assert_eq!(cache.get_width_text([0xC3, b'A']), advance_for(16, 'A' as u32));
        assert_eq!(cache.get_width_text([0xFF, 0xC0, 0xAF]), 0);
    }

    #[test]
    fn newline_starts_a_new_line() {
        let mut cache = cache();
        let w = |c: char| advance_for(16, c as u32);
        let size = cache.get_size("ab\ncde");
        assert_eq!((size.width, size.height), ((w('a') + w('b')).max(w('c') + w('d') + w('e')), 32));
        let empty = cache.get_size("");
        assert_eq!((empty.width, empty.height), (0, 0));
    }

    #[test]
    fn spacing_is_added_per_glyph() {
        let mut cache = cache();
        let plain = cache.get_width_text("ab");
        cache.set_spacing(3);
        assert_eq!(cache.get_width_text("ab"), plain + 6);
        assert_eq!(cache.get_width('a' as u32), advance_for(16, 'a' as u32));
    }

    #[test]
    fn draw_places_glyph_below_ascent() {
        let mut cache = cache();
        let advance = cache.draw(vec2(10, 20), 'A' as u32);
        assert_eq!(advance, advance_for(16, 'A' as u32));

        let drawn = calls(&cache);
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].texture.is_some());
        // ascent 13 from the default line metrics, glyph 12 tall
        let h = 12;
        assert_eq!(tuple(drawn[0].bounds()), (11, 20 + 13 - h, advance - 1, h));
    }

    #[test]
    fn blank_glyphs_draw_nothing_but_advance() {
        let mut cache = cache();
        assert_eq!(cache.draw(vec2(0, 0), ' ' as u32), advance_for(16, ' ' as u32));
        assert!(calls(&cache).is_empty());
    }

    #[test]
    fn clipping_trims_or_skips_glyphs() {
        let mut cache = cache();
        cache.set_clip(rect(100, 100, 10, 10));
        assert_eq!(cache.draw(vec2(0, 0), 'A' as u32), advance_for(16, 'A' as u32));
        assert!(calls(&cache).is_empty());

        cache.set_clip(rect(0, 0, 5, 100));
        cache.draw(vec2(0, 0), 'A' as u32);
        let drawn = calls(&cache);
        assert_eq!(drawn.len(), 1);
        assert_eq!(tuple(drawn[0].bounds()).2, 4);

        cache.reset_clip();
        cache.renderer_handle().scope_mut(|r| r.clear_draw_calls());
        cache.draw(vec2(0, 0), 'A' as u32);
        assert_eq!(tuple(calls(&cache)[0].bounds()).2, advance_for(16, 'A' as u32) - 1);
    }

    #[test]
    fn background_uses_swapped_colours() {
        let mut cache = cache();
        let fore = color(200, 10, 10, 255);
        let back = color(10, 10, 200, 255);
        cache.set_colors(fore, back);
        cache.set_background(true);
        cache.draw(vec2(0, 0), 'A' as u32);

        let drawn = calls(&cache);
        assert_eq!(drawn.len(), 2);
        assert!(drawn[0].texture.is_none());
        assert_eq!(tuple(drawn[0].bounds()), (0, 0, advance_for(16, 'A' as u32), 16));
        assert_eq!(drawn[0].vertices[0].color().z, 200);
        assert_eq!(drawn[1].vertices[0].color().x, 200);

        cache.renderer_handle().scope_mut(|r| r.clear_draw_calls());
        cache.set_swap_colors(true);
        cache.draw(vec2(0, 0), 'A' as u32);
        let drawn = calls(&cache);
        assert_eq!(drawn[0].vertices[0].color().x, 200);
        assert_eq!(drawn[1].vertices[0].color().z, 200);
    }

    #[test]
    fn flip_swaps_texture_coordinates() {
        let mut cache = cache();
        cache.draw(vec2(0, 0), 'A' as u32);
        cache.set_flip(true, false);
        cache.draw(vec2(0, 0), 'A' as u32);
        let drawn = calls(&cache);
        let (normal, flipped) = (drawn[0].vertices[0].tex_coord(), drawn[1].vertices[0].tex_coord());
        assert_eq!(flipped.x, drawn[0].vertices[1].tex_coord().x);
        assert_eq!(flipped.y, normal.y);
    }

    #[test]
    fn draw_text_wraps_at_line_limit() {
        let mut cache = cache();
        let w = advance_for(16, 'a' as u32);
        let widest = cache.draw_text(vec2(0, 0), "aaaa", 2 * w + 1);
        assert_eq!(widest, 2 * w);

        let drawn = calls(&cache);
        assert_eq!(drawn.len(), 4);
        let tops: Vec<i32> = drawn.iter().map(|d| d.bounds().y).collect();
        assert_eq!(tops[0], tops[1]);
        assert_eq!(tops[2], tops[0] + 16);
        assert_eq!(drawn[2].bounds().x, 1);
    }

    #[test]
    fn push_and_pop_restore_face_and_size() {
        let mut cache = cache();
        assert!(cache.install_font_type("fonts/serif.ttf", "serif"));
        assert_eq!(cache.font_type(), Some("mono"));

        cache.push_font_face();
        assert!(cache.set_font_type("serif"));
        cache.set_font_size(30);
        assert_eq!((cache.font_type(), cache.font_size()), (Some("serif"), 30));

        assert!(cache.pop_font_face());
        assert_eq!((cache.font_type(), cache.font_size()), (Some("mono"), 16));
        assert!(!cache.pop_font_face());
    }

    #[test]
    fn push_without_a_face_stays_balanced() {
        let mut cache = GlyphCache::new(RendererHandle::new(MemoryRenderer::new()), ScriptedRasterizer::default());
        cache.push_font_face();
        assert!(cache.install_font_type("fonts/mono.ttf", "mono"));
        cache.set_font_size(16);
        cache.push_font_face();
        cache.set_font_size(30);

        assert!(cache.pop_font_face());
        assert_eq!((cache.font_type(), cache.font_size()), (Some("mono"), 16));
        // the first push had nothing to save
        assert!(cache.pop_font_face());
        assert_eq!((cache.font_type(), cache.font_size()), (Some("mono"), 16));
        assert!(!cache.pop_font_face());
    }

    #[test]
    fn antialias_flag_reaches_the_rasterizer() {
        let mut cache = cache();
        assert!(cache.rasterizer().antialias.iter().all(|&(_, on)| on));

        cache.set_antialias(false);
        assert!(!cache.face_flags().contains(FaceFlags::ANTIALIAS));
        cache.get_width(0xE9);
        assert_eq!(cache.rasterizer().antialias.last(), Some(&(0xE9, false)));

        // cached glyphs keep the coverage they were rasterized with
        let before = cache.rasterizer().calls;
        cache.draw(vec2(0, 0), 'A' as u32);
        assert_eq!(cache.rasterizer().calls, before);
    }

    #[test]
    fn center_justify_centres_monospace_glyphs() {
        let mut cache = cache();
        cache.set_proportional(false);
        let column = cache.get_width('d' as u32);
        assert_eq!(column, 11);

        // 'd' advances 8 and is drawn one pixel right of the pen
        assert_eq!(cache.draw(vec2(0, 0), 'd' as u32), column);
        cache.set_center_justify(true);
        assert_eq!(cache.draw(vec2(0, 0), 'd' as u32), column);
        cache.set_proportional(true);
        cache.draw(vec2(0, 0), 'd' as u32);

        let xs: Vec<i32> = calls(&cache).iter().map(|c| c.bounds().x).collect();
        assert_eq!(xs, vec![1, 1 + (11 - 8) / 2, 1]);
    }

    #[test]
    fn unknown_faces_are_rejected() {
        let mut cache = GlyphCache::new(RendererHandle::new(MemoryRenderer::new()), ScriptedRasterizer::default());
        assert!(!cache.install_font_type("missing.ttf", "ui"));
        assert!(!cache.set_font_type("ui"));
        assert_eq!(cache.draw(vec2(0, 0), 'A' as u32), 0);
        assert_eq!(cache.get_width_text("abc"), 0);
        assert!(calls(&cache).is_empty());
    }

    #[test]
    fn rasterizer_failure_is_cached_with_zero_advance() {
        let mut cache = cache();
        let before = cache.rasterizer().calls;
        assert_eq!(cache.draw(vec2(0, 0), 0xFFFF), 0);
        assert_eq!(cache.get_width(0xFFFF), 0);
        assert_eq!(cache.rasterizer().calls, before + 1);
        assert!(calls(&cache).is_empty());
    }

    #[test]
    fn glyph_pages_are_split_by_height_class() {
        let mut cache = cache();
        assert_eq!(cache.page_count(), 1);
        cache.set_font_size(64);
        assert_eq!(cache.page_count(), 2);

        let renderer = cache.renderer_handle();
        assert_eq!(renderer.scope(|r| r.texture_count()), 2);
        cache.destroy();
        assert_eq!(renderer.scope(|r| r.texture_count()), 0);
        assert_eq!(cache.cached_glyph_count(), 0);
        assert_eq!(cache.page_count(), 0);
    }

    #[test]
    fn glyph_keys_keep_size_and_code_apart() {
        let key = GlyphKey::new(16, 0x1F600);
        assert_eq!((key.size(), key.code()), (16, 0x1F600));
        assert_ne!(GlyphKey::new(17, 0x41), GlyphKey::new(16, 0x10041));
    }
}
