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

#[derive(Default, Copy, Clone, Debug)]
#[repr(C)]
/// Vertex handed to the [`Renderer`].
pub struct Vertex {
    pos: Vec2f,
    tex: Vec2f,
    color: Color4b,
}

impl Vertex {
    /// Creates a vertex with the provided position, texture coordinate, and color.
    pub fn new(pos: Vec2f, tex: Vec2f, color: Color4b) -> Self { Self { pos, tex, color } }

    /// Returns the position of the vertex in screen space.
    pub fn position(&self) -> Vec2f { self.pos }

    /// Returns the normalized texture coordinates associated with the vertex.
    pub fn tex_coord(&self) -> Vec2f { self.tex }

    /// Returns the vertex color.
    pub fn color(&self) -> Color4b { self.color }
}

/// Computes the clipped destination/source rectangles for rendering, or `None` when
/// `dst_r` lies completely outside `clip_r`.
pub(crate) fn clip_rect(dst_r: Recti, src_r: Recti, clip_r: Recti) -> Option<(Recti, Recti)> {
    match dst_r.intersect(&clip_r) {
        Some(r) if r.width == dst_r.width && r.height == dst_r.height => Some((dst_r, src_r)),
        Some(r) if r.width > 0 && r.height > 0 => {
            let dw = dst_r.width as f32;
            let dh = dst_r.height as f32;
            let tx = (r.x - dst_r.x) as f32 / dw;
            let ty = (r.y - dst_r.y) as f32 / dh;
            let tw = (r.x + r.width - dst_r.x) as f32 / dw;
            let th = (r.y + r.height - dst_r.y) as f32 / dh;

            let sx = src_r.x as f32;
            let sy = src_r.y as f32;
            let sw = src_r.width as f32;
            let sh = src_r.height as f32;

            let x0 = (sx + tx * sw).round();
            let y0 = (sy + ty * sh).round();
            let x1 = (sx + tw * sw).round();
            let y1 = (sy + th * sh).round();
            Some((r, Recti::new(x0 as _, y0 as _, (x1 - x0) as _, (y1 - y0) as _)))
        }
        _ => None,
    }
}

/// Like [`clip_rect`] for a quad whose texture is mirrored: the clipped part of the
/// destination keeps showing the matching part of the mirrored source.
pub(crate) fn clip_rect_mirrored(dst_r: Recti, src_r: Recti, clip_r: Recti, attribute: DrawAttribute) -> Option<(Recti, Recti)> {
    let (dst, mut src) = clip_rect(dst_r, src_r, clip_r)?;
    if attribute.is_flip_h() {
        src.x = 2 * src_r.x + src_r.width - src.x - src.width;
    }
    if attribute.is_flip_v() {
        src.y = 2 * src_r.y + src_r.height - src.y - src.height;
    }
    Some((dst, src))
}

/// Builds the four vertices (clockwise from top-left) of a quad covering `dst` that samples
/// `src` of a `page`-sized texture, with texture coordinates swapped per `attribute`.
pub(crate) fn textured_quad(dst: Recti, src: Recti, page: Dimensioni, color: Color4b, attribute: DrawAttribute) -> [Vertex; 4] {
    let pw = page.width.max(1) as f32;
    let ph = page.height.max(1) as f32;
    let mut u0 = src.x as f32 / pw;
    let mut v0 = src.y as f32 / ph;
    let mut u1 = (src.x + src.width) as f32 / pw;
    let mut v1 = (src.y + src.height) as f32 / ph;
    if attribute.is_flip_h() {
        std::mem::swap(&mut u0, &mut u1);
    }
    if attribute.is_flip_v() {
        std::mem::swap(&mut v0, &mut v1);
    }

    let x0 = dst.x as f32;
    let y0 = dst.y as f32;
    let x1 = (dst.x + dst.width) as f32;
    let y1 = (dst.y + dst.height) as f32;
    [
        Vertex::new(Vec2f::new(x0, y0), Vec2f::new(u0, v0), color),
        Vertex::new(Vec2f::new(x1, y0), Vec2f::new(u1, v0), color),
        Vertex::new(Vec2f::new(x1, y1), Vec2f::new(u1, v1), color),
        Vertex::new(Vec2f::new(x0, y1), Vec2f::new(u0, v1), color),
    ]
}

/// Untextured quad covering `dst`.
pub(crate) fn solid_quad(dst: Recti, color: Color4b) -> [Vertex; 4] {
    textured_quad(dst, rect(0, 0, 0, 0), Dimensioni::new(1, 1), color, DrawAttribute::NORMAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rect_eq(actual: Recti, expected: Recti) {
        assert_eq!(
            (actual.x, actual.y, actual.width, actual.height),
            (expected.x, expected.y, expected.width, expected.height)
        );
    }

    #[test]
    fn clip_rect_passthrough() {
        let dst = Recti::new(0, 0, 10, 10);
        let src = Recti::new(5, 5, 10, 10);
        let (d, s) = clip_rect(dst, src, Recti::new(0, 0, 20, 20)).unwrap();
        assert_rect_eq(d, dst);
        assert_rect_eq(s, src);
    }

    #[test]
    fn clip_rect_partial_scales_source() {
        let dst = Recti::new(0, 0, 100, 100);
        let src = Recti::new(0, 0, 50, 50);
        let (d, s) = clip_rect(dst, src, Recti::new(20, 20, 40, 40)).unwrap();
        assert_rect_eq(d, Recti::new(20, 20, 40, 40));
        assert_rect_eq(s, Recti::new(10, 10, 20, 20));
    }

    #[test]
    fn clip_rect_disjoint() {
        let dst = Recti::new(0, 0, 10, 10);
        assert!(clip_rect(dst, dst, Recti::new(50, 50, 10, 10)).is_none());
    }

    #[test]
    fn mirrored_clip_takes_opposite_source_side() {
        let dst = Recti::new(0, 0, 10, 10);
        let src = Recti::new(100, 0, 10, 10);
        let (d, s) = clip_rect_mirrored(dst, src, Recti::new(0, 0, 4, 10), DrawAttribute::FLIP_H).unwrap();
        assert_rect_eq(d, Recti::new(0, 0, 4, 10));
        assert_rect_eq(s, Recti::new(106, 0, 4, 10));
    }

    #[test]
    fn quad_texcoords_swap_on_flip() {
        let dst = rect(10, 20, 16, 8);
        let src = rect(64, 32, 16, 8);
        let page = Dimensioni::new(128, 128);
        let white = color4b(255, 255, 255, 255);

        let plain = textured_quad(dst, src, page, white, DrawAttribute::NORMAL);
        assert_eq!((plain[0].position().x, plain[0].position().y), (10.0, 20.0));
        assert_eq!((plain[2].position().x, plain[2].position().y), (26.0, 28.0));
        assert_eq!((plain[0].tex_coord().x, plain[0].tex_coord().y), (0.5, 0.25));
        assert_eq!((plain[2].tex_coord().x, plain[2].tex_coord().y), (0.625, 0.3125));

        let both = textured_quad(dst, src, page, white, DrawAttribute::FLIP_HV);
        assert_eq!((both[0].tex_coord().x, both[0].tex_coord().y), (0.625, 0.3125));
        assert_eq!((both[2].tex_coord().x, both[2].tex_coord().y), (0.5, 0.25));
    }
}
