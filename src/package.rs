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

// Chunk layouts are based off of ResTable_package, ResTable_type and
// ResTable_entry in
// https://android.googlesource.com/platform/frameworks/base/+/master/libs/androidfw/include/androidfw/ResourceTypes.h

use std::{
    collections::{HashMap, HashSet},
    io::{Read, Seek, SeekFrom, Write},
};

use crate::{
    chunk::{ChunkHeader, ChunkType, RawChunk, CHUNK_HEADER_LEN},
    ids::{is_package_id, ResTableRef},
    stream::{
        read_utf16_fixed_string, write_utf16_fixed_string, NewResultCtx, Readable,
        ReadableNoOptions, StreamError, StreamResult, VecReadable, VecWritable, Writeable,
        WriteableNoOptions,
    },
    string_pool::StringPool,
    value::{ResValue, StagedAliasEntry},
};

/// Capacity of the fixed UTF-16 package name field, in code units.
pub const PACKAGE_NAME_LEN: usize = 128;

/// Wire size of the package chunk header: chunk header, id, name field and
/// five u32 offset/count fields.
const PACKAGE_HEADER_LEN: u32 = CHUNK_HEADER_LEN + 4 + (PACKAGE_NAME_LEN as u32) * 2 + 20;

/// Wire size of the type chunk header before the config block.
const TYPE_HEADER_LEN: u32 = CHUNK_HEADER_LEN + 12;

/// Offset array value marking a slot with no entry.
const NO_ENTRY: u32 = 0xffff_ffff;

/// If set in an entry's flags, the entry is a bag holding a parent reference
/// and a map of name/value pairs instead of a single Res_value.
pub const ENTRY_FLAG_COMPLEX: u16 = 0x0001;

/// A ResTable_config block. The contents are not interpreted here; equality
/// on the raw bytes is all the table needs to tell variants apart.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Config {
    data: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        // 28 byte zeroed config, the minimum aapt emits
        Self { data: vec![0; 24] }
    }
}

impl Config {
    pub fn is_default(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }

    pub fn byte_len(&self) -> u32 {
        4 + self.data.len() as u32
    }
}

impl Readable for Config {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        let pos = reader.stream_position()?;
        let size = u32::read_no_opts(reader).add_context(|| "read size for Config")?;
        if size < 4 {
            return Err(StreamError::new_string_context(
                format!("invalid config size {}, expected at least 4", size),
                pos,
                "validate size for Config",
            ));
        }
        let data = <Vec<u8>>::read_vec(reader, (size - 4) as usize)
            .add_context(|| "read data for Config")?;
        Ok(Self { data })
    }
}

impl Writeable for Config {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        self.byte_len()
            .write_no_opts(writer)
            .add_context(|| "write size for Config")?;
        self.data
            .write_vec(writer)
            .add_context(|| "write data for Config")
    }
}

/// One name/value pair inside a bag entry.
#[derive(Debug, PartialEq, Clone)]
pub struct MapEntry {
    pub name: ResTableRef,
    pub value: ResValue,
}

/// Payload of an entry: a single scalar value, or a bag with a parent
/// reference and a map of name/value pairs.
#[derive(Debug, PartialEq, Clone)]
pub enum EntryValue {
    Scalar(ResValue),
    Bag {
        parent: ResTableRef,
        map: Vec<MapEntry>,
    },
}

/// One resource value record in a type block. The slot position inside the
/// type block is the entry id.
#[derive(Debug, PartialEq, Clone)]
pub struct Entry {
    pub flags: u16,
    /// Index into the package's key name pool.
    pub key: u32,
    pub value: EntryValue,
}

impl Entry {
    pub fn scalar(key: u32, value: ResValue) -> Self {
        Self {
            flags: 0,
            key,
            value: EntryValue::Scalar(value),
        }
    }

    pub fn byte_len(&self) -> u32 {
        match &self.value {
            EntryValue::Scalar(_) => 8 + ResValue::byte_len() as u32,
            EntryValue::Bag { map, .. } => 16 + 12 * map.len() as u32,
        }
    }
}

impl Readable for Entry {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        let pos = reader.stream_position()?;
        let size = u16::read_no_opts(reader).add_context(|| "read size for Entry")?;
        let flags = u16::read_no_opts(reader).add_context(|| "read flags for Entry")?;
        let key = u32::read_no_opts(reader).add_context(|| "read key for Entry")?;

        let value = if flags & ENTRY_FLAG_COMPLEX != 0 {
            if size != 16 {
                return Err(StreamError::new_string_context(
                    format!("invalid bag entry size {}, expected 16", size),
                    pos,
                    "validate size for Entry",
                ));
            }
            let parent = u32::read_no_opts(reader)
                .add_context(|| "read parent for Entry")?
                .into();
            let count = u32::read_no_opts(reader).add_context(|| "read count for Entry")?;
            let mut map = Vec::with_capacity(count as usize);
            for i in 0..count {
                let name = u32::read_no_opts(reader)
                    .add_context(|| format!("read name for map entry {i}"))?
                    .into();
                let value = ResValue::read_no_opts(reader)
                    .add_context(|| format!("read value for map entry {i}"))?;
                map.push(MapEntry { name, value });
            }
            EntryValue::Bag { parent, map }
        } else {
            if size != 8 {
                return Err(StreamError::new_string_context(
                    format!("invalid scalar entry size {}, expected 8", size),
                    pos,
                    "validate size for Entry",
                ));
            }
            EntryValue::Scalar(
                ResValue::read_no_opts(reader).add_context(|| "read value for Entry")?,
            )
        };

        Ok(Self { flags, key, value })
    }
}

impl Writeable for Entry {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        match &self.value {
            EntryValue::Scalar(value) => {
                8u16.write_no_opts(writer)
                    .add_context(|| "write size for Entry")?;
                self.flags
                    .write_no_opts(writer)
                    .add_context(|| "write flags for Entry")?;
                self.key
                    .write_no_opts(writer)
                    .add_context(|| "write key for Entry")?;
                value
                    .write_no_opts(writer)
                    .add_context(|| "write value for Entry")
            }
            EntryValue::Bag { parent, map } => {
                16u16
                    .write_no_opts(writer)
                    .add_context(|| "write size for Entry")?;
                (self.flags | ENTRY_FLAG_COMPLEX)
                    .write_no_opts(writer)
                    .add_context(|| "write flags for Entry")?;
                self.key
                    .write_no_opts(writer)
                    .add_context(|| "write key for Entry")?;
                u32::from(*parent)
                    .write_no_opts(writer)
                    .add_context(|| "write parent for Entry")?;
                (map.len() as u32)
                    .write_no_opts(writer)
                    .add_context(|| "write count for Entry")?;
                for (i, pair) in map.iter().enumerate() {
                    u32::from(pair.name)
                        .write_no_opts(writer)
                        .add_context(|| format!("write name for map entry {i}"))?;
                    pair.value
                        .write_no_opts(writer)
                        .add_context(|| format!("write value for map entry {i}"))?;
                }
                Ok(())
            }
        }
    }
}

/// A ResTable_type chunk: the entries of one type under one configuration.
/// Slot index is the entry id; empty slots are placeholders carrying no
/// bytes beyond their NO_ENTRY offset.
#[derive(Debug, PartialEq, Clone)]
pub struct TypeBlock {
    pub type_id: u8,
    pub config: Config,
    pub entries: Vec<Option<Entry>>,
}

impl TypeBlock {
    pub fn new(type_id: u8, config: Config) -> Self {
        Self {
            type_id,
            config,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, entry_id: u16) -> Option<&Entry> {
        self.entries.get(entry_id as usize)?.as_ref()
    }

    pub fn entry_mut(&mut self, entry_id: u16) -> Option<&mut Entry> {
        self.entries.get_mut(entry_id as usize)?.as_mut()
    }

    fn header_len(&self) -> u32 {
        TYPE_HEADER_LEN + self.config.byte_len()
    }

    pub fn byte_len(&self) -> u32 {
        let entries: u32 = self
            .entries
            .iter()
            .flatten()
            .map(|entry| entry.byte_len())
            .sum();
        self.header_len() + 4 * self.entries.len() as u32 + entries
    }

    /// Read the body of a type chunk whose header was already consumed.
    pub fn read_body<R: Read + Seek>(
        reader: &mut R,
        start: u64,
        header: &ChunkHeader,
    ) -> StreamResult<Self> {
        let pos = reader.stream_position()?;
        let type_id = u8::read_no_opts(reader).add_context(|| "read type_id for TypeBlock")?;
        let flags = u8::read_no_opts(reader).add_context(|| "read flags for TypeBlock")?;
        if flags != 0 {
            // sparse and offset16 encodings are not handled
            return Err(StreamError::new_string_context(
                format!("unsupported type chunk flags 0x{:02x}", flags),
                pos,
                "validate flags for TypeBlock",
            ));
        }
        let _reserved = u16::read_no_opts(reader).add_context(|| "read reserved for TypeBlock")?;
        let entry_count =
            u32::read_no_opts(reader).add_context(|| "read entry_count for TypeBlock")?;
        let entries_start =
            u32::read_no_opts(reader).add_context(|| "read entries_start for TypeBlock")?;
        let config = Config::read_no_opts(reader).add_context(|| "read config for TypeBlock")?;

        reader.seek(SeekFrom::Start(start + header.header_size as u64))?;
        let offsets = <Vec<u32>>::read_vec(reader, entry_count as usize)
            .add_context(|| "read offsets for TypeBlock")?;

        let mut entries = Vec::with_capacity(entry_count as usize);
        for (i, offset) in offsets.iter().enumerate() {
            if *offset == NO_ENTRY {
                entries.push(None);
                continue;
            }
            reader.seek(SeekFrom::Start(start + entries_start as u64 + *offset as u64))?;
            let entry = Entry::read_no_opts(reader)
                .add_context(|| format!("read entry {i} for TypeBlock"))?;
            entries.push(Some(entry));
        }

        reader.seek(SeekFrom::Start(start + header.size as u64))?;

        Ok(Self {
            type_id,
            config,
            entries,
        })
    }

    pub fn write_chunk<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()> {
        let header = ChunkHeader::new(
            ChunkType::TableType,
            self.header_len() as u16,
            self.byte_len(),
        );
        header
            .write_no_opts(writer)
            .add_context(|| "write header for TypeBlock")?;
        self.type_id
            .write_no_opts(writer)
            .add_context(|| "write type_id for TypeBlock")?;
        0u8.write_no_opts(writer)
            .add_context(|| "write flags for TypeBlock")?;
        0u16.write_no_opts(writer)
            .add_context(|| "write reserved for TypeBlock")?;
        (self.entries.len() as u32)
            .write_no_opts(writer)
            .add_context(|| "write entry_count for TypeBlock")?;
        (self.header_len() + 4 * self.entries.len() as u32)
            .write_no_opts(writer)
            .add_context(|| "write entries_start for TypeBlock")?;
        self.config
            .write_no_opts(writer)
            .add_context(|| "write config for TypeBlock")?;

        let mut offset: u32 = 0;
        for entry in &self.entries {
            match entry {
                Some(entry) => {
                    offset
                        .write_no_opts(writer)
                        .add_context(|| "write offset for TypeBlock")?;
                    offset += entry.byte_len();
                }
                None => {
                    NO_ENTRY
                        .write_no_opts(writer)
                        .add_context(|| "write empty offset for TypeBlock")?;
                }
            }
        }

        for (i, entry) in self.entries.iter().flatten().enumerate() {
            entry
                .write_no_opts(writer)
                .add_context(|| format!("write entry {i} for TypeBlock"))?;
        }

        Ok(())
    }
}

/// A ResTable_staged_alias chunk: staged resource ids and the finalized ids
/// they should be looked up as when the staged id misses.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct StagedAliasChunk {
    pub entries: Vec<StagedAliasEntry>,
}

impl StagedAliasChunk {
    pub fn byte_len(&self) -> u32 {
        CHUNK_HEADER_LEN + 4 + 8 * self.entries.len() as u32
    }

    pub fn read_body<R: Read + Seek>(reader: &mut R) -> StreamResult<Self> {
        let count =
            u32::read_no_opts(reader).add_context(|| "read count for StagedAliasChunk")?;
        let entries = <Vec<StagedAliasEntry>>::read_vec(reader, count as usize)
            .add_context(|| "read entries for StagedAliasChunk")?;
        Ok(Self { entries })
    }

    pub fn write_chunk<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()> {
        let header = ChunkHeader::new(
            ChunkType::StagedAlias,
            (CHUNK_HEADER_LEN + 4) as u16,
            self.byte_len(),
        );
        header
            .write_no_opts(writer)
            .add_context(|| "write header for StagedAliasChunk")?;
        (self.entries.len() as u32)
            .write_no_opts(writer)
            .add_context(|| "write count for StagedAliasChunk")?;
        self.entries
            .write_vec(writer)
            .add_context(|| "write entries for StagedAliasChunk")
    }
}

/// Child chunks of a package, kept in stream order. Type specs, libraries
/// and overlayables are carried opaquely in `Unknown`.
#[derive(Debug, PartialEq, Clone)]
pub enum PackageChild {
    Type(TypeBlock),
    StagedAlias(StagedAliasChunk),
    Unknown(RawChunk),
}

impl PackageChild {
    pub fn byte_len(&self) -> u32 {
        match self {
            PackageChild::Type(block) => block.byte_len(),
            PackageChild::StagedAlias(chunk) => chunk.byte_len(),
            PackageChild::Unknown(raw) => raw.byte_len(),
        }
    }
}

/// All configuration variants of one logical resource, as a borrow view.
#[derive(Debug)]
pub struct ResourceEntry<'a> {
    pub resource_id: ResTableRef,
    pub entry_name: Option<&'a str>,
    pub variants: Vec<(&'a Config, &'a Entry)>,
}

/// A ResTable_package chunk: a numbered, named group of typed resource
/// entries with its own type name and key name pools.
#[derive(Debug, PartialEq, Clone)]
pub struct Package {
    id: u8,
    name: String,
    pub type_strings: StringPool,
    pub key_strings: StringPool,
    pub children: Vec<PackageChild>,
    // preserved header fields this crate does not interpret
    last_public_type: u32,
    last_public_key: u32,
    type_id_offset: u32,
}

impl Package {
    pub fn new(id: u8, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            type_strings: StringPool::new(true),
            key_strings: StringPool::new(true),
            children: Vec::new(),
            last_public_type: 0,
            last_public_key: 0,
            type_id_offset: 0,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn set_id(&mut self, id: u8) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes only the name field. Rewriting reference strings that mention
    /// the old name is a table level concern, see
    /// [`crate::table::ResourceTable::rename_package`].
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// True when nothing in this package would produce bytes worth keeping:
    /// no entries, no staged aliases, no preserved unknown chunks.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|child| match child {
            PackageChild::Type(block) => block.entries.iter().all(Option::is_none),
            PackageChild::StagedAlias(chunk) => chunk.entries.is_empty(),
            PackageChild::Unknown(_) => false,
        })
    }

    /// Structural similarity used by framework containment checks: same id,
    /// same name and the same number of type blocks.
    pub fn is_similar_to(&self, other: &Package) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.type_blocks().count() == other.type_blocks().count()
    }

    pub fn type_blocks(&self) -> impl Iterator<Item = &TypeBlock> {
        self.children.iter().filter_map(|child| match child {
            PackageChild::Type(block) => Some(block),
            _ => None,
        })
    }

    pub fn type_blocks_mut(&mut self) -> impl Iterator<Item = &mut TypeBlock> {
        self.children.iter_mut().filter_map(|child| match child {
            PackageChild::Type(block) => Some(block),
            _ => None,
        })
    }

    pub fn staged_aliases(&self) -> impl Iterator<Item = &StagedAliasEntry> {
        self.children
            .iter()
            .filter_map(|child| match child {
                PackageChild::StagedAlias(chunk) => Some(chunk.entries.iter()),
                _ => None,
            })
            .flatten()
    }

    /// Name of a type id through the type name pool. Type ids are one based.
    pub fn type_name(&self, type_id: u8) -> Option<&str> {
        if type_id == 0 {
            return None;
        }
        self.type_strings.string(type_id as u32 - 1)
    }

    pub fn type_id_of(&self, type_name: &str) -> Option<u8> {
        let index = self.type_strings.find(type_name)?;
        u8::try_from(index + 1).ok()
    }

    pub fn key_name(&self, key: u32) -> Option<&str> {
        self.key_strings.string(key)
    }

    /// All config variants of `(type_id, entry_id)`, in child order.
    pub fn entry_variants(&self, type_id: u8, entry_id: u16) -> Vec<(&Config, &Entry)> {
        self.type_blocks()
            .filter(|block| block.type_id == type_id)
            .filter_map(|block| block.entry(entry_id).map(|entry| (&block.config, entry)))
            .collect()
    }

    /// Aggregated view of one logical resource, or None when no config
    /// variant carries an entry at this position.
    pub fn resource_entry(&self, type_id: u8, entry_id: u16) -> Option<ResourceEntry<'_>> {
        let variants = self.entry_variants(type_id, entry_id);
        if variants.is_empty() {
            return None;
        }
        let entry_name = variants.first().and_then(|(_, entry)| self.key_name(entry.key));
        Some(ResourceEntry {
            resource_id: ResTableRef::new(self.id, type_id, entry_id),
            entry_name,
            variants,
        })
    }

    /// Numeric position of a named resource, searching every config variant
    /// of the named type for an entry keyed by `entry_name`.
    pub fn entry_position(&self, type_name: &str, entry_name: &str) -> Option<(u8, u16)> {
        let type_id = self.type_id_of(type_name)?;
        let key = self.key_strings.find(entry_name)?;
        for block in self.type_blocks() {
            if block.type_id != type_id {
                continue;
            }
            for (entry_id, entry) in block.entries.iter().enumerate() {
                if let Some(entry) = entry {
                    if entry.key == key {
                        return Some((type_id, entry_id as u16));
                    }
                }
            }
        }
        None
    }

    pub fn resource_id_of(&self, type_name: &str, entry_name: &str) -> Option<ResTableRef> {
        let (type_id, entry_id) = self.entry_position(type_name, entry_name)?;
        Some(ResTableRef::new(self.id, type_id, entry_id))
    }

    /// Every distinct resource id this package defines, in type block order.
    pub fn resource_refs(&self) -> impl Iterator<Item = ResTableRef> + '_ {
        let mut seen = HashSet::new();
        self.type_blocks()
            .flat_map(move |block| {
                block
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.is_some())
                    .map(|(entry_id, _)| {
                        ResTableRef::new(self.id, block.type_id, entry_id as u16)
                    })
                    .collect::<Vec<_>>()
            })
            .filter(move |id| seen.insert(*id))
    }

    fn default_type_block_mut(&mut self, type_id: u8) -> &mut TypeBlock {
        let position = self.children.iter().position(|child| {
            matches!(child, PackageChild::Type(block)
                if block.type_id == type_id && block.config.is_default())
        });
        let index = match position {
            Some(index) => index,
            None => {
                self.children
                    .push(PackageChild::Type(TypeBlock::new(type_id, Config::default())));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            PackageChild::Type(block) => block,
            _ => unreachable!("index points at a type block"),
        }
    }

    /// Create an entry under the default config, allocating the type and key
    /// names as needed. An existing entry with the same type and key is
    /// overwritten in place so its resource id stays stable.
    pub fn add_entry(&mut self, type_name: &str, entry_name: &str, value: EntryValue) -> ResTableRef {
        if let Some((type_id, entry_id)) = self.entry_position(type_name, entry_name) {
            if let Some(block) = self
                .type_blocks_mut()
                .find(|block| block.type_id == type_id && block.entry(entry_id).is_some())
            {
                if let Some(entry) = block.entry_mut(entry_id) {
                    entry.value = value;
                }
            }
            return ResTableRef::new(self.id, type_id, entry_id);
        }

        let type_index = self.type_strings.get_or_create(type_name);
        let type_id = (type_index + 1) as u8;
        let key = self.key_strings.get_or_create(entry_name);
        let id = self.id;
        let block = self.default_type_block_mut(type_id);
        let entry_id = block.entries.len() as u16;
        block.entries.push(Some(Entry {
            flags: 0,
            key,
            value,
        }));
        ResTableRef::new(id, type_id, entry_id)
    }

    /// Collect every table pool index referenced by a value in this package.
    pub fn collect_used_strings(&self, used: &mut HashSet<u32>) {
        let mut visit = |value: &ResValue| {
            if let Some(index) = value.data.string_index() {
                used.insert(index);
            }
        };
        for block in self.type_blocks() {
            for entry in block.entries.iter().flatten() {
                match &entry.value {
                    EntryValue::Scalar(value) => visit(value),
                    EntryValue::Bag { map, .. } => {
                        for pair in map {
                            visit(&pair.value);
                        }
                    }
                }
            }
        }
    }

    /// Rewrite table pool indices after the pool compacted itself.
    pub fn remap_strings(&mut self, remap: &HashMap<u32, u32>) {
        let remap_value = |value: &mut ResValue| {
            if let crate::value::ResValueData::String(index) = &mut value.data {
                if let Some(new) = remap.get(index) {
                    *index = *new;
                }
            }
        };
        for block in self.type_blocks_mut() {
            for entry in block.entries.iter_mut().flatten() {
                match &mut entry.value {
                    EntryValue::Scalar(value) => remap_value(value),
                    EntryValue::Bag { map, .. } => {
                        for pair in map {
                            remap_value(&mut pair.value);
                        }
                    }
                }
            }
        }
    }

    pub fn byte_len(&self) -> u32 {
        let children: u32 = self.children.iter().map(PackageChild::byte_len).sum();
        PACKAGE_HEADER_LEN + self.type_strings.byte_len() + self.key_strings.byte_len() + children
    }

    /// Read the body of a package chunk whose header was already consumed.
    pub fn read_body<R: Read + Seek>(
        reader: &mut R,
        start: u64,
        header: &ChunkHeader,
    ) -> StreamResult<Self> {
        let pos = reader.stream_position()?;
        let id_raw = u32::read_no_opts(reader).add_context(|| "read id for Package")?;
        if !is_package_id(id_raw) {
            return Err(StreamError::new_string_context(
                format!("invalid package id 0x{:x}, expected 1-255", id_raw),
                pos,
                "validate id for Package",
            ));
        }
        let name = read_utf16_fixed_string(reader, PACKAGE_NAME_LEN)
            .add_context(|| "read name for Package")?;
        let type_strings_offset =
            u32::read_no_opts(reader).add_context(|| "read type strings offset for Package")?;
        let last_public_type =
            u32::read_no_opts(reader).add_context(|| "read last public type for Package")?;
        let key_strings_offset =
            u32::read_no_opts(reader).add_context(|| "read key strings offset for Package")?;
        let last_public_key =
            u32::read_no_opts(reader).add_context(|| "read last public key for Package")?;
        let type_id_offset =
            u32::read_no_opts(reader).add_context(|| "read type id offset for Package")?;

        let type_strings = if type_strings_offset != 0 {
            reader.seek(SeekFrom::Start(start + type_strings_offset as u64))?;
            StringPool::read_chunk(reader).add_context(|| "read type strings for Package")?
        } else {
            StringPool::new(true)
        };
        let key_strings = if key_strings_offset != 0 {
            reader.seek(SeekFrom::Start(start + key_strings_offset as u64))?;
            StringPool::read_chunk(reader).add_context(|| "read key strings for Package")?
        } else {
            StringPool::new(true)
        };

        let end = start + header.size as u64;
        let mut children = Vec::new();
        loop {
            let pos = reader.stream_position()?;
            if pos + CHUNK_HEADER_LEN as u64 > end {
                break;
            }
            let child_header = ChunkHeader::read_no_opts(reader)
                .add_context(|| "read child header for Package")?;
            match child_header.chunk_type {
                ChunkType::TableType => {
                    let block = TypeBlock::read_body(reader, pos, &child_header)
                        .add_context(|| "read type block for Package")?;
                    children.push(PackageChild::Type(block));
                }
                ChunkType::StagedAlias => {
                    let chunk = StagedAliasChunk::read_body(reader)
                        .add_context(|| "read staged alias for Package")?;
                    reader.seek(SeekFrom::Start(pos + child_header.size as u64))?;
                    children.push(PackageChild::StagedAlias(chunk));
                }
                _ => {
                    let raw = RawChunk::capture(reader, &child_header, pos)
                        .add_context(|| "read unknown chunk for Package")?;
                    children.push(PackageChild::Unknown(raw));
                }
            }
        }
        reader.seek(SeekFrom::Start(end))?;

        tracing::debug!(
            id = id_raw,
            name = %name,
            children = children.len(),
            "read package"
        );

        Ok(Self {
            id: id_raw as u8,
            name,
            type_strings,
            key_strings,
            children,
            last_public_type,
            last_public_key,
            type_id_offset,
        })
    }

    /// Write the whole package chunk. The type name pool always directly
    /// follows the header and the key name pool follows it.
    pub fn write_chunk<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()> {
        let header = ChunkHeader::new(
            ChunkType::TablePackage,
            PACKAGE_HEADER_LEN as u16,
            self.byte_len(),
        );
        header
            .write_no_opts(writer)
            .add_context(|| "write header for Package")?;
        (self.id as u32)
            .write_no_opts(writer)
            .add_context(|| "write id for Package")?;
        write_utf16_fixed_string(writer, &self.name, PACKAGE_NAME_LEN)
            .add_context(|| "write name for Package")?;
        PACKAGE_HEADER_LEN
            .write_no_opts(writer)
            .add_context(|| "write type strings offset for Package")?;
        self.last_public_type
            .write_no_opts(writer)
            .add_context(|| "write last public type for Package")?;
        (PACKAGE_HEADER_LEN + self.type_strings.byte_len())
            .write_no_opts(writer)
            .add_context(|| "write key strings offset for Package")?;
        self.last_public_key
            .write_no_opts(writer)
            .add_context(|| "write last public key for Package")?;
        self.type_id_offset
            .write_no_opts(writer)
            .add_context(|| "write type id offset for Package")?;

        self.type_strings
            .write_chunk(writer)
            .add_context(|| "write type strings for Package")?;
        self.key_strings
            .write_chunk(writer)
            .add_context(|| "write key strings for Package")?;

        for child in &self.children {
            match child {
                PackageChild::Type(block) => block
                    .write_chunk(writer)
                    .add_context(|| "write type block for Package")?,
                PackageChild::StagedAlias(chunk) => chunk
                    .write_chunk(writer)
                    .add_context(|| "write staged alias for Package")?,
                PackageChild::Unknown(raw) => raw
                    .write_no_opts(writer)
                    .add_context(|| "write unknown chunk for Package")?,
            }
        }

        Ok(())
    }
}
