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

// Everything here is based off of Res_value in
// https://android.googlesource.com/platform/frameworks/base/+/master/libs/androidfw/include/androidfw/ResourceTypes.h

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinWrite};

use crate::{
    ids::ResTableRef,
    stream::{Readable, StreamError, StreamResult, Writeable},
};

/// Representation of a value in a resource, supplying type information.
#[binrw]
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ResValue {
    /// Number of bytes in this structure.
    #[br(temp)]
    #[bw(calc = 8)]
    #[br(assert(size == 8))]
    size: u16,

    /// Always set to 0.
    #[br(temp)]
    #[bw(calc = 0)]
    #[br(assert(res0 == 0))]
    res0: u8,

    /// The data for this item, as interpreted according to the leading type
    /// byte.
    pub data: ResValueData,
}

impl ResValue {
    pub fn new(data: ResValueData) -> Self {
        Self { data }
    }

    /// Wire size of a Res_value structure.
    pub fn byte_len() -> usize {
        8
    }
}

#[derive(Debug, BinRead, BinWrite, PartialEq, Copy, Clone)]
pub enum ResNullData {
    #[brw(magic(0u32))]
    Undefined,
    #[brw(magic(1u32))]
    Empty,
}

#[derive(Debug, BinRead, BinWrite, PartialEq, Copy, Clone)]
pub enum ResValueData {
    /// The 'data' is either 0 or 1, specifying this resource is either
    /// undefined or empty, respectively.
    #[brw(magic(0x00u8))]
    Null(ResNullData),
    /// The 'data' holds a ResTable_ref, a reference to another resource table
    /// entry.
    #[brw(magic(0x01u8))]
    Reference(ResTableRef),
    /// The 'data' holds an attribute resource identifier.
    #[brw(magic(0x02u8))]
    Attribute(u32),
    /// The 'data' holds an index into the containing resource table's global
    /// value string pool.
    #[brw(magic(0x03u8))]
    String(u32),
    /// The 'data' holds a single-precision floating point number.
    #[brw(magic(0x04u8))]
    Float(f32),
    /// The 'data' holds a complex number encoding a dimension value, such as
    /// "100in".
    #[brw(magic(0x05u8))]
    Dimension(u32),
    /// The 'data' holds a complex number encoding a fraction of a container.
    #[brw(magic(0x06u8))]
    Fraction(u32),
    /// The 'data' holds a dynamic ResTable_ref which needs to be resolved
    /// before it can be used like a plain Reference.
    #[brw(magic(0x07u8))]
    DynamicReference(ResTableRef),
    /// The 'data' is a raw integer value of the form n..n.
    #[brw(magic(0x10u8))]
    IntDec(u32),
    /// The 'data' is a raw integer value of the form 0xn..n.
    #[brw(magic(0x11u8))]
    IntHex(u32),
    /// The 'data' is either 0 or 1, for input "false" or "true" respectively.
    #[brw(magic(0x12u8))]
    IntBoolean(u32),
    /// Any other value type, kept verbatim so unhandled types survive a
    /// round trip (colors, dynamic attributes, ...).
    Other { data_type: u8, data: u32 },
}

impl ResValueData {
    /// The string pool index, if this value references the table string pool.
    pub fn string_index(&self) -> Option<u32> {
        match self {
            ResValueData::String(index) => Some(*index),
            _ => None,
        }
    }

    /// The resource id, if this value is a reference to another entry.
    pub fn reference(&self) -> Option<ResTableRef> {
        match self {
            ResValueData::Reference(r) | ResValueData::DynamicReference(r) => Some(*r),
            _ => None,
        }
    }
}

impl Readable for ResValue {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        let pos = reader.stream_position()?;
        Self::read_le(reader)
            .map_err(|e| StreamError::new_string_context(e, pos, "read ResValue"))
    }
}

impl Writeable for ResValue {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        let pos = writer.stream_position()?;
        self.write_le(writer)
            .map_err(|e| StreamError::new_string_context(e, pos, "write ResValue"))
    }
}

/// Maps a staged (non-finalized) resource id to its finalized resource id.
#[derive(Debug, BinRead, BinWrite, PartialEq, Copy, Clone)]
pub struct StagedAliasEntry {
    /// The compile-time staged resource id to rewrite.
    pub staged_res_id: u32,

    /// The finalized resource id the staged id should be rewritten to.
    pub finalized_res_id: u32,
}

impl Readable for StagedAliasEntry {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        let pos = reader.stream_position()?;
        Self::read_le(reader)
            .map_err(|e| StreamError::new_string_context(e, pos, "read StagedAliasEntry"))
    }
}

impl Writeable for StagedAliasEntry {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        let pos = writer.stream_position()?;
        self.write_le(writer)
            .map_err(|e| StreamError::new_string_context(e, pos, "write StagedAliasEntry"))
    }
}
