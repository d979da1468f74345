/*
    Copyright (C) 2026 the restable authors

    Permission is hereby granted, free of charge, to any person obtaining
    a copy of this software and associated documentation files (the
    "Software"), to deal in the Software without restriction, including
    without limitation the rights to use, copy, modify, merge, publish,
    distribute, sublicense, and/or sell copies of the Software, and to
    permit persons to whom the Software is furnished to do so, subject to
    the following conditions:

    The above copyright notice and this permission notice shall be
    included in all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
    EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
    MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
    NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
    BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
    ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
    CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

// Chunk layouts are based off of https://android.googlesource.com/platform/frameworks/base/+/master/libs/androidfw/include/androidfw/ResourceTypes.h

pub mod chunk;
pub mod ids;
pub mod json;
pub mod package;
pub mod reference;
pub mod resolver;
pub mod stream;
pub mod string_pool;
pub mod table;
pub mod value;

/// Align an offset to a certain boundary
///
/// # Arguments
///
/// * `pos` - position to align
/// * `alignment` - number of bytes to align the position to
///
/// # Returns
///
/// The next position which is aligned to the specified boundary
pub fn align(pos: u64, alignment: u64) -> u64 {
    let remaining = pos % alignment;
    if remaining == 0 {
        return pos;
    }

    pos + (alignment - remaining)
}
