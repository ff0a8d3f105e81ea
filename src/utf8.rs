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

/// Iterator decoding UTF-8 bytes into codepoints.
///
/// Malformed input never panics: a truncated or interrupted sequence, a stray
/// continuation byte, an overlong encoding, a surrogate or a value above U+10FFFF is
/// dropped silently and decoding resumes at the next byte.
pub struct Utf8Codes<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Utf8Codes<'a> {
    /// Decodes `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self { Self { bytes, pos: 0 } }
}

impl<'a> From<&'a str> for Utf8Codes<'a> {
    fn from(text: &'a str) -> Self { Self::new(text.as_bytes()) }
}

// smallest value each sequence length may encode
const MIN_CODE: [u32; 5] = [0, 0, 0x80, 0x800, 0x10000];

impl Iterator for Utf8Codes<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        'outer: while self.pos < self.bytes.len() {
            let lead = self.bytes[self.pos];
            self.pos += 1;
            let (expected, mut code) = if lead < 0x80 {
                return Some(lead as u32);
            } else if lead & 0xE0 == 0xC0 {
                (2, (lead & 0x1F) as u32)
            } else if lead & 0xF0 == 0xE0 {
                (3, (lead & 0x0F) as u32)
            } else if lead & 0xF8 == 0xF0 {
                (4, (lead & 0x07) as u32)
            } else {
                continue;
            };

            for _ in 1..expected {
                match self.bytes.get(self.pos) {
                    Some(&byte) if byte & 0xC0 == 0x80 => {
                        code = (code << 6) | (byte & 0x3F) as u32;
                        self.pos += 1;
                    }
                    // the interrupting byte starts the next sequence
                    _ => continue 'outer,
                }
            }

            if code < MIN_CODE[expected] || code > 0x10FFFF || (0xD800..=0xDFFF).contains(&code) {
                continue;
            }
            return Some(code);
        }
        None
    }
}
