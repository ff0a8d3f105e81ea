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

use thiserror::Error;

/// Reasons a sprite cannot be registered in an [`crate::AtlasPageSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AtlasError {
    /// The pixel source has a zero or negative dimension.
    #[error("pixel source is empty ({width}x{height})")]
    EmptySource {
        /// Reported source width.
        width: i32,
        /// Reported source height.
        height: i32,
    },
    /// Neither axis of a 9-slice source is large enough to hold three cells.
    #[error("{width}x{height} source cannot be sliced with a {grid_width}x{grid_height} grid")]
    SliceTooSmall {
        /// Source width.
        width: i32,
        /// Source height.
        height: i32,
        /// Corner cell width.
        grid_width: i32,
        /// Corner cell height.
        grid_height: i32,
    },
    /// A single cell (plus padding) exceeds the page dimensions.
    #[error("cell of {width}x{height} does not fit a {page_width}x{page_height} page")]
    CellTooLarge {
        /// Cell width including padding.
        width: i32,
        /// Cell height including padding.
        height: i32,
        /// Page width.
        page_width: i32,
        /// Page height.
        page_height: i32,
    },
}
