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

use std::{
    collections::{HashMap, HashSet},
    io::{Read, Seek, SeekFrom, Write},
};

use crate::{
    align,
    chunk::{ChunkHeader, ChunkType, CHUNK_HEADER_LEN},
    stream::{
        NewResultCtx, Readable, ReadableNoOptions, ResultCtx, StreamError, StreamResult,
        VecReadable, VecWritable, Writeable, WriteableNoOptions,
    },
};

/// Marks the end of a span array in the style data.
const SPAN_END: u32 = 0xffff_ffff;

/// Wire size of the string pool header fields, chunk header included.
const POOL_HEADER_LEN: u32 = CHUNK_HEADER_LEN + 20;

#[derive(Debug, PartialEq, Default, Copy, Clone)]
pub struct StringPoolFlags {
    pub flags: u32,
}

impl StringPoolFlags {
    /// If set, the string index is sorted by the string values (based on
    /// strcmp16()).
    pub fn sorted(&self) -> bool {
        self.flags & (1 << 0) != 0
    }

    /// String pool is encoded in UTF-8.
    pub fn utf8(&self) -> bool {
        self.flags & (1 << 8) != 0
    }

    /// Create new StringPoolFlags from separate sorted and utf8 boolean flags.
    pub fn new(sorted: bool, utf8: bool) -> Self {
        Self {
            flags: (sorted as u32) | ((utf8 as u32) << 8),
        }
    }
}

/// This structure defines a span of style information associated with a
/// string in the pool. Spans are opaque metadata here, only carried through.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct StyleSpan {
    /// Pool index of the span name (the XML tag that defined it).
    pub name: u32,
    /// The first character in the string that this span applies to.
    pub first_char: u32,
    /// The last character in the string that this span applies to.
    pub last_char: u32,
}

impl Readable for StyleSpan {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        Ok(Self {
            name: u32::read_no_opts(reader).add_context(|| "read name for StyleSpan")?,
            first_char: u32::read_no_opts(reader)
                .add_context(|| "read first_char for StyleSpan")?,
            last_char: u32::read_no_opts(reader).add_context(|| "read last_char for StyleSpan")?,
        })
    }
}

impl Writeable for StyleSpan {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        self.name
            .write_no_opts(writer)
            .add_context(|| "write name for StyleSpan")?;
        self.first_char
            .write_no_opts(writer)
            .add_context(|| "write first_char for StyleSpan")?;
        self.last_char
            .write_no_opts(writer)
            .add_context(|| "write last_char for StyleSpan")
    }
}

/// One slot in a string pool: the text plus any style spans attached to it.
/// The slot index is the identity other chunks refer to.
#[derive(Debug, PartialEq, Clone)]
pub struct StringItem {
    text: String,
    spans: Vec<StyleSpan>,
}

impl StringItem {
    pub fn new(text: String) -> Self {
        Self {
            text,
            spans: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    pub fn is_styled(&self) -> bool {
        !self.spans.is_empty()
    }
}

/// A deduplicating table of strings referenced by index from elsewhere in the
/// resource table.
///
/// On the wire this is an array of u32 offsets into the string data (relative
/// to strings_start) followed by the concatenated UTF-8 or UTF-16 strings. If
/// any string carries style spans, a second offset array points into the
/// style data at styles_start; each style entry is a span array terminated by
/// 0xffffffff.
#[derive(Debug, PartialEq, Clone)]
pub struct StringPool {
    flags: StringPoolFlags,
    items: Vec<StringItem>,
    dedup: HashMap<String, u32>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StringPool {
    pub fn new(utf8: bool) -> Self {
        Self {
            flags: StringPoolFlags::new(false, utf8),
            items: Vec::new(),
            dedup: HashMap::new(),
        }
    }

    pub fn flags(&self) -> StringPoolFlags {
        self.flags
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&StringItem> {
        self.items.get(index as usize)
    }

    pub fn string(&self, index: u32) -> Option<&str> {
        self.get(index).map(StringItem::text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StringItem> {
        self.items.iter()
    }

    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(StringItem::text)
    }

    /// Index of `text` if it is already pooled.
    pub fn find(&self, text: &str) -> Option<u32> {
        self.dedup.get(text).copied()
    }

    /// Deduplicating insert: requesting the same text twice returns the same
    /// slot index.
    pub fn get_or_create(&mut self, text: &str) -> u32 {
        if let Some(index) = self.dedup.get(text) {
            return *index;
        }
        let index = self.items.len() as u32;
        self.items.push(StringItem::new(text.to_string()));
        self.dedup.insert(text.to_string(), index);
        index
    }

    /// In-place mutation of a slot. The slot keeps its index so existing
    /// referrers stay valid. Returns false if the index is out of range.
    pub fn set(&mut self, index: u32, text: &str) -> bool {
        let Some(item) = self.items.get_mut(index as usize) else {
            return false;
        };
        if item.text == text {
            return true;
        }
        let old = std::mem::replace(&mut item.text, text.to_string());
        if self.dedup.get(&old) == Some(&index) {
            self.dedup.remove(&old);
        }
        self.dedup.entry(text.to_string()).or_insert(index);
        true
    }

    /// Attach style spans to a slot. Returns false if the index is out of
    /// range. Span `name` fields are pool indices themselves.
    pub fn set_spans(&mut self, index: u32, spans: Vec<StyleSpan>) -> bool {
        let Some(item) = self.items.get_mut(index as usize) else {
            return false;
        };
        item.spans = spans;
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.dedup.clear();
    }

    /// Drop every slot that is neither in `used` nor styled nor named by a
    /// style span, compacting the pool. Span names reference pool slots by
    /// index and are rewritten through the remap here. Returns the old-index
    /// to new-index remap of the surviving slots if anything was removed;
    /// the caller is responsible for rewriting its own references through
    /// the remap.
    pub fn retain_used(&mut self, used: &HashSet<u32>) -> Option<HashMap<u32, u32>> {
        let mut keep: Vec<bool> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| used.contains(&(i as u32)) || item.is_styled())
            .collect();
        for item in &self.items {
            for span in &item.spans {
                if let Some(slot) = keep.get_mut(span.name as usize) {
                    *slot = true;
                }
            }
        }
        if keep.iter().all(|k| *k) {
            return None;
        }

        let mut remap = HashMap::new();
        let mut kept = Vec::with_capacity(used.len());
        for (i, item) in self.items.drain(..).enumerate() {
            if keep[i] {
                remap.insert(i as u32, kept.len() as u32);
                kept.push(item);
            }
        }
        self.items = kept;

        for item in &mut self.items {
            for span in &mut item.spans {
                if let Some(new) = remap.get(&span.name) {
                    span.name = *new;
                }
            }
        }

        self.dedup.clear();
        for (i, item) in self.items.iter().enumerate() {
            self.dedup.entry(item.text.clone()).or_insert(i as u32);
        }

        Some(remap)
    }

    fn item_byte_len(&self, item: &StringItem) -> u32 {
        if self.flags.utf8() {
            let char_count = item.text.chars().count();
            let byte_count = item.text.len();
            let mut size = 1 + 1 + byte_count + 1;
            if char_count >= 0x80 {
                size += 1;
            }
            if byte_count >= 0x80 {
                size += 1;
            }
            size as u32
        } else {
            let units = item.text.encode_utf16().count();
            let mut size = 2 + units * 2 + 2;
            if units >= 0x8000 {
                size += 2;
            }
            size as u32
        }
    }

    fn layout(&self) -> PoolLayout {
        let string_count = self.items.len() as u32;
        let style_count = self.style_count();

        let strings_start = POOL_HEADER_LEN + 4 * string_count + 4 * style_count;
        let strings_bytes: u32 = self.items.iter().map(|i| self.item_byte_len(i)).sum();

        if style_count == 0 {
            let total = align((strings_start + strings_bytes) as u64, 4) as u32;
            return PoolLayout {
                string_count,
                style_count,
                strings_start,
                styles_start: 0,
                total,
            };
        }

        let styles_start = align((strings_start + strings_bytes) as u64, 4) as u32;
        let styles_bytes: u32 = self
            .items
            .iter()
            .take(style_count as usize)
            .map(|i| 12 * i.spans.len() as u32 + 4)
            .sum();
        PoolLayout {
            string_count,
            style_count,
            strings_start,
            styles_start,
            total: styles_start + styles_bytes,
        }
    }

    /// Styled slots must form a prefix of the pool on the wire; the style
    /// array covers every slot up to the last styled one.
    fn style_count(&self) -> u32 {
        self.items
            .iter()
            .rposition(StringItem::is_styled)
            .map(|i| i as u32 + 1)
            .unwrap_or(0)
    }

    /// Total chunk size in bytes, header included.
    pub fn byte_len(&self) -> u32 {
        self.layout().total
    }

    /// Write the whole string pool chunk, header included.
    pub fn write_chunk<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()> {
        let start = writer.stream_position()?;
        let layout = self.layout();

        let header = ChunkHeader::new(ChunkType::StringPool, POOL_HEADER_LEN as u16, layout.total);
        header
            .write_no_opts(writer)
            .add_context(|| "write header for StringPool")?;

        layout
            .string_count
            .write_no_opts(writer)
            .add_context(|| "write string_count for StringPool")?;
        layout
            .style_count
            .write_no_opts(writer)
            .add_context(|| "write style_count for StringPool")?;
        self.flags
            .flags
            .write_no_opts(writer)
            .add_context(|| "write flags for StringPool")?;
        layout
            .strings_start
            .write_no_opts(writer)
            .add_context(|| "write strings_start for StringPool")?;
        layout
            .styles_start
            .write_no_opts(writer)
            .add_context(|| "write styles_start for StringPool")?;

        let mut offset: u32 = 0;
        for item in &self.items {
            offset
                .write_no_opts(writer)
                .add_context(|| "write string offset for StringPool")?;
            offset += self.item_byte_len(item);
        }

        let mut offset: u32 = 0;
        for item in self.items.iter().take(layout.style_count as usize) {
            offset
                .write_no_opts(writer)
                .add_context(|| "write style offset for StringPool")?;
            offset += 12 * item.spans.len() as u32 + 4;
        }

        for item in &self.items {
            if self.flags.utf8() {
                write_pool_string8(writer, &item.text)
                    .add_context(|| "write utf8 string for StringPool")?;
            } else {
                write_pool_string16(writer, &item.text)
                    .add_context(|| "write utf16 string for StringPool")?;
            }
        }

        pad_to(writer, start, 4).add_context(|| "pad strings for StringPool")?;

        for item in self.items.iter().take(layout.style_count as usize) {
            item.spans
                .write_vec(writer)
                .add_context(|| "write spans for StringPool")?;
            SPAN_END
                .write_no_opts(writer)
                .add_context(|| "write span terminator for StringPool")?;
        }

        Ok(())
    }

    /// Read a whole string pool chunk starting at the current position. The
    /// chunk must carry the string pool type tag.
    pub fn read_chunk<R: Read + Seek>(reader: &mut R) -> StreamResult<Self> {
        let start = reader.stream_position()?;
        let header = ChunkHeader::read_no_opts(reader).add_context(|| "read header for StringPool")?;
        if header.chunk_type != ChunkType::StringPool {
            return Err(StreamError::new_string_context(
                format!("invalid chunk type {:?}, expected StringPool", header.chunk_type),
                start,
                "validate chunk type for StringPool",
            ));
        }
        Self::read_body(reader, start, &header)
    }

    /// Read the pool fields after the chunk header. `start` is the position
    /// the chunk header began at.
    pub fn read_body<R: Read + Seek>(
        reader: &mut R,
        start: u64,
        header: &ChunkHeader,
    ) -> StreamResult<Self> {
        let string_count =
            u32::read_no_opts(reader).add_context(|| "read string_count for StringPool")?;
        let style_count =
            u32::read_no_opts(reader).add_context(|| "read style_count for StringPool")?;
        let flags = StringPoolFlags {
            flags: u32::read_no_opts(reader).add_context(|| "read flags for StringPool")?,
        };
        let strings_start =
            u32::read_no_opts(reader).add_context(|| "read strings_start for StringPool")?;
        let styles_start =
            u32::read_no_opts(reader).add_context(|| "read styles_start for StringPool")?;

        let string_offsets = <Vec<u32>>::read_vec(reader, string_count as usize)
            .add_context(|| "read string offsets for StringPool")?;
        let style_offsets = <Vec<u32>>::read_vec(reader, style_count as usize)
            .add_context(|| "read style offsets for StringPool")?;

        let mut items = Vec::with_capacity(string_count as usize);
        for offset in &string_offsets {
            reader
                .seek(SeekFrom::Start(start + strings_start as u64 + *offset as u64))
                .stream_context(|| format!("seek to string at offset {offset} for StringPool"))?;
            let text = if flags.utf8() {
                read_pool_string8(reader).add_context(|| "read utf8 string for StringPool")?
            } else {
                read_pool_string16(reader).add_context(|| "read utf16 string for StringPool")?
            };
            items.push(StringItem::new(text));
        }

        for (i, offset) in style_offsets.iter().enumerate() {
            reader
                .seek(SeekFrom::Start(start + styles_start as u64 + *offset as u64))
                .stream_context(|| format!("seek to style at offset {offset} for StringPool"))?;
            let mut spans = Vec::new();
            loop {
                let name = u32::read_no_opts(reader)
                    .add_context(|| "read span name for StringPool")?;
                if name == SPAN_END {
                    break;
                }
                let first_char = u32::read_no_opts(reader)
                    .add_context(|| "read span first_char for StringPool")?;
                let last_char = u32::read_no_opts(reader)
                    .add_context(|| "read span last_char for StringPool")?;
                spans.push(StyleSpan {
                    name,
                    first_char,
                    last_char,
                });
            }
            items[i].spans = spans;
        }

        reader.seek(SeekFrom::Start(start + header.size as u64))?;

        let mut dedup = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            dedup.entry(item.text.clone()).or_insert(i as u32);
        }

        Ok(Self {
            flags,
            items,
            dedup,
        })
    }
}

#[derive(Debug, Copy, Clone)]
struct PoolLayout {
    string_count: u32,
    style_count: u32,
    strings_start: u32,
    styles_start: u32,
    total: u32,
}

fn pad_to<W: Write + Seek>(writer: &mut W, chunk_start: u64, alignment: u64) -> StreamResult<()> {
    let pos = writer.stream_position()?;
    let aligned = chunk_start + align(pos - chunk_start, alignment);
    if aligned > pos {
        let padding = vec![0u8; (aligned - pos) as usize];
        padding.write_vec(writer)?;
    }
    Ok(())
}

/// Strings in UTF-8 format carry two encoded lengths, the character count
/// then the byte count. Each is 1 byte, or 2 bytes with the high bit of the
/// first set for lengths of 0x80 and up (maximum 0x7fff).
pub fn read_pool_string8<R: Read + Seek>(reader: &mut R) -> StreamResult<String> {
    let _char_count = read_length8(reader).add_context(|| "read char count for pool string8")?;
    let byte_count = read_length8(reader).add_context(|| "read byte count for pool string8")?;

    let data = <Vec<u8>>::read_vec(reader, byte_count as usize)
        .add_context(|| "read encoded data for pool string8")?;

    let pos = reader.stream_position()?;
    let null = u8::read_no_opts(reader).add_context(|| "read null byte for pool string8")?;
    if null != 0 {
        return Err(StreamError::new_string_context(
            format!("invalid null value {}, expected 0", null),
            pos,
            "validate null byte for pool string8",
        ));
    }

    String::from_utf8(data)
        .map_err(|e| StreamError::new_string_context(e, pos, "decode utf8 for pool string8"))
}

pub fn write_pool_string8<W: Write + Seek>(writer: &mut W, string: &str) -> StreamResult<()> {
    write_length8(writer, string.chars().count())
        .add_context(|| "write char count for pool string8")?;
    write_length8(writer, string.len()).add_context(|| "write byte count for pool string8")?;

    string
        .as_bytes()
        .to_vec()
        .write_vec(writer)
        .add_context(|| "write encoded data for pool string8")?;

    let null: u8 = 0;
    null.write_no_opts(writer)
        .add_context(|| "write null byte for pool string8")
}

/// Strings in UTF-16 format carry one encoded length in code units. It is a
/// single u16, or two u16s with the high bit of the first set for lengths of
/// 0x8000 and up.
pub fn read_pool_string16<R: Read + Seek>(reader: &mut R) -> StreamResult<String> {
    let units = read_length16(reader).add_context(|| "read length for pool string16")?;

    let data = <Vec<u16>>::read_vec(reader, units as usize)
        .add_context(|| "read encoded data for pool string16")?;

    let pos = reader.stream_position()?;
    let null = u16::read_no_opts(reader).add_context(|| "read null for pool string16")?;
    if null != 0 {
        return Err(StreamError::new_string_context(
            format!("invalid null value {}, expected 0", null),
            pos,
            "validate null for pool string16",
        ));
    }

    String::from_utf16(&data)
        .map_err(|e| StreamError::new_string_context(e, pos, "decode utf16 for pool string16"))
}

pub fn write_pool_string16<W: Write + Seek>(writer: &mut W, string: &str) -> StreamResult<()> {
    let data: Vec<u16> = string.encode_utf16().collect();
    write_length16(writer, data.len()).add_context(|| "write length for pool string16")?;
    data.write_vec(writer)
        .add_context(|| "write encoded data for pool string16")?;

    let null: u16 = 0;
    null.write_no_opts(writer)
        .add_context(|| "write null for pool string16")
}

fn read_length8<R: Read + Seek>(reader: &mut R) -> StreamResult<u32> {
    let first = u8::read_no_opts(reader)?;
    if first & 0x80 == 0 {
        return Ok(first as u32);
    }
    let second = u8::read_no_opts(reader)?;
    Ok((((first as u32) & 0x7f) << 8) | second as u32)
}

fn write_length8<W: Write + Seek>(writer: &mut W, length: usize) -> StreamResult<()> {
    if length >= 0x80 {
        (((length >> 8) | 0x80) as u8).write_no_opts(writer)?;
        ((length & 0xff) as u8).write_no_opts(writer)?;
    } else {
        (length as u8).write_no_opts(writer)?;
    }
    Ok(())
}

fn read_length16<R: Read + Seek>(reader: &mut R) -> StreamResult<u32> {
    let first = u16::read_no_opts(reader)?;
    if first & 0x8000 == 0 {
        return Ok(first as u32);
    }
    let second = u16::read_no_opts(reader)?;
    Ok((((first as u32) & 0x7fff) << 16) | second as u32)
}

fn write_length16<W: Write + Seek>(writer: &mut W, length: usize) -> StreamResult<()> {
    if length >= 0x8000 {
        (((length >> 16) | 0x8000) as u16).write_no_opts(writer)?;
        ((length & 0xffff) as u16).write_no_opts(writer)?;
    } else {
        (length as u16).write_no_opts(writer)?;
    }
    Ok(())
}
