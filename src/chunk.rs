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

use std::io::{Read, Seek, SeekFrom, Write};

use crate::stream::{
    NewResultCtx, Readable, ReadableNoOptions, StreamError, StreamResult, VecReadable, VecWritable,
    Writeable, WriteableNoOptions,
};

/// Number of bytes in a chunk header: type tag + header size + total size.
pub const CHUNK_HEADER_LEN: u32 = 8;

/// Chunk type tags understood by this crate. Every other tag is carried
/// through as [`ChunkType::Unknown`] so the chunk survives a round trip
/// untouched.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ChunkType {
    Null,
    StringPool,
    Table,
    TablePackage,
    TableType,
    TableTypeSpec,
    StagedAlias,
    Unknown(u16),
}

impl From<u16> for ChunkType {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => ChunkType::Null,
            0x0001 => ChunkType::StringPool,
            0x0002 => ChunkType::Table,
            0x0200 => ChunkType::TablePackage,
            0x0201 => ChunkType::TableType,
            0x0202 => ChunkType::TableTypeSpec,
            0x0206 => ChunkType::StagedAlias,
            other => ChunkType::Unknown(other),
        }
    }
}

impl From<ChunkType> for u16 {
    fn from(value: ChunkType) -> Self {
        match value {
            ChunkType::Null => 0x0000,
            ChunkType::StringPool => 0x0001,
            ChunkType::Table => 0x0002,
            ChunkType::TablePackage => 0x0200,
            ChunkType::TableType => 0x0201,
            ChunkType::TableTypeSpec => 0x0202,
            ChunkType::StagedAlias => 0x0206,
            ChunkType::Unknown(other) => other,
        }
    }
}

/// Header that appears at the front of every chunk in a resource table.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ChunkHeader {
    /// Type identifier for this chunk. The meaning of this value depends on
    /// the containing chunk.
    pub chunk_type: ChunkType,

    /// Size of the chunk header (in bytes). Adding this value to the address
    /// of the chunk allows you to find its associated data (if any).
    pub header_size: u16,

    /// Total size of this chunk (in bytes), header and child chunks included.
    /// Adding this value to the chunk start allows you to completely skip its
    /// contents.
    pub size: u32,
}

impl ChunkHeader {
    pub fn new(chunk_type: ChunkType, header_size: u16, size: u32) -> Self {
        Self {
            chunk_type,
            header_size,
            size,
        }
    }
}

impl Readable for ChunkHeader {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        let tag = u16::read_no_opts(reader).add_context(|| "read type tag for ChunkHeader")?;
        let header_size =
            u16::read_no_opts(reader).add_context(|| "read header_size for ChunkHeader")?;
        let size = u32::read_no_opts(reader).add_context(|| "read size for ChunkHeader")?;

        if (size as u64) < CHUNK_HEADER_LEN as u64 || (header_size as u32) > size {
            return Err(StreamError::new_string_context(
                format!(
                    "invalid chunk sizes: header_size {} size {}",
                    header_size, size
                ),
                reader.stream_position()?,
                "validate sizes for ChunkHeader",
            ));
        }

        Ok(Self {
            chunk_type: tag.into(),
            header_size,
            size,
        })
    }
}

impl Writeable for ChunkHeader {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        let tag: u16 = self.chunk_type.into();
        tag.write_no_opts(writer)
            .add_context(|| "write type tag for ChunkHeader")?;
        self.header_size
            .write_no_opts(writer)
            .add_context(|| "write header_size for ChunkHeader")?;
        self.size
            .write_no_opts(writer)
            .add_context(|| "write size for ChunkHeader")
    }
}

/// A chunk this crate does not interpret, held as its original bytes (header
/// included) so re-serialization reproduces the input exactly.
#[derive(Debug, PartialEq, Clone)]
pub struct RawChunk {
    pub bytes: Vec<u8>,
}

impl RawChunk {
    /// The type tag of the preserved chunk.
    pub fn chunk_type(&self) -> ChunkType {
        let tag = u16::from_le_bytes([self.bytes[0], self.bytes[1]]);
        tag.into()
    }

    pub fn byte_len(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Capture a whole chunk whose header was already consumed. `start` is
    /// the stream position the header began at.
    pub fn capture<R: Read + Seek>(
        reader: &mut R,
        header: &ChunkHeader,
        start: u64,
    ) -> StreamResult<Self> {
        reader.seek(SeekFrom::Start(start))?;
        let bytes = <Vec<u8>>::read_vec(reader, header.size as usize)
            .add_context(|| "read bytes for RawChunk")?;
        Ok(Self { bytes })
    }
}

impl Writeable for RawChunk {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        self.bytes
            .write_vec(writer)
            .add_context(|| "write bytes for RawChunk")
    }
}
