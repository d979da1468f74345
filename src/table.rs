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

// The table chunk layout is based off of ResTable_header in
// https://android.googlesource.com/platform/frameworks/base/+/master/libs/androidfw/include/androidfw/ResourceTypes.h

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
    rc::Rc,
};

use thiserror::Error;

use crate::{
    chunk::{ChunkHeader, ChunkType, RawChunk, CHUNK_HEADER_LEN},
    ids::ResTableRef,
    package::{Config, Package, ResourceEntry},
    reference::{resolve_chained, rewrite_package_references},
    resolver::{ReferenceResolver, ResolvedEntry},
    stream::{available, NewResultCtx, ReadableNoOptions, StreamError, WriteableNoOptions},
    string_pool::StringPool,
};

/// Wire size of the table chunk header: chunk header plus the package count.
const TABLE_HEADER_LEN: u32 = CHUNK_HEADER_LEN + 4;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid root chunk type 0x{0:04x}, expected a resource table")]
    InvalidRootChunk(u16),
    #[error("table is in the null state and cannot be written")]
    NullTable,
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type TableResult<T> = Result<T, TableError>;

/// A whole ARSC resource table: the shared string pool, the packages, and
/// everything layered on top of them (package name aliases, linked framework
/// tables, staged alias redirection and the reference resolver).
///
/// Framework links are shared immutable tables; this table never mutates a
/// framework it links to.
#[derive(Debug, Default)]
pub struct ResourceTable {
    pub string_pool: StringPool,
    packages: Vec<Package>,
    frameworks: Vec<Rc<ResourceTable>>,
    resolver: Option<ReferenceResolver>,
    aliases: HashMap<String, String>,
    current_package: Option<u8>,
    /// Placeholder for the empty state, never serialized.
    placeholder: Option<Package>,
    null: bool,
    /// Unrecognized top level chunks, re-emitted verbatim after the
    /// packages.
    trailing: Vec<RawChunk>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table in the null state: it answers lookups with absence and
    /// refuses to serialize. Reading an empty byte source produces this.
    pub fn create_empty() -> Self {
        Self {
            placeholder: Some(Package::new(0, "")),
            null: true,
            ..Self::default()
        }
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn is_empty(&self) -> bool {
        self.null || (self.packages.is_empty() && self.trailing.is_empty())
    }

    pub fn is_multi_package(&self) -> bool {
        self.packages.len() > 1
    }

    /// A single package named "android" with id 1 marks a framework table.
    pub fn is_android(&self) -> bool {
        matches!(self.packages.as_slice(), [package]
            if package.id() == 1 && package.name() == "android")
    }

    pub fn clear(&mut self) {
        self.string_pool.clear();
        self.packages.clear();
        self.frameworks.clear();
        self.resolver = None;
        self.aliases.clear();
        self.current_package = None;
        self.trailing.clear();
    }

    // ---- packages ----

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn packages_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.iter_mut()
    }

    pub fn package_by_id(&self, id: u8) -> Option<&Package> {
        self.packages.iter().find(|package| package.id() == id)
    }

    pub fn package_by_id_mut(&mut self, id: u8) -> Option<&mut Package> {
        self.packages.iter_mut().find(|package| package.id() == id)
    }

    /// Find a package by name, resolving the name through the alias map
    /// first so stale names keep working after a rename.
    pub fn package_by_name<'a>(&'a self, name: &'a str) -> Option<&'a Package> {
        let resolved = self.resolve_alias(name);
        self.packages.iter().find(|package| package.name() == resolved)
    }

    /// Append a new package at the next slot. Leaves the null state.
    pub fn new_package(&mut self, id: u8, name: &str) -> &mut Package {
        tracing::debug!(id, name, "creating package");
        self.null = false;
        self.placeholder = None;
        self.packages.push(Package::new(id, name));
        let index = self.packages.len() - 1;
        &mut self.packages[index]
    }

    /// Package identity is the (id, name) pair: an existing id with a
    /// different name gets a fresh package, never a merge. A missing name
    /// matches on id alone.
    pub fn get_or_create_package(&mut self, id: u8, name: Option<&str>) -> &mut Package {
        let position = match name {
            None => self.packages.iter().position(|p| p.id() == id),
            Some(name) => self
                .packages
                .iter()
                .position(|p| p.id() == id && p.name() == name),
        };
        match position {
            Some(index) => &mut self.packages[index],
            None => self.new_package(id, name.unwrap_or("")),
        }
    }

    /// The context package when one is set, else the first package, else
    /// the empty state placeholder.
    pub fn pick_one(&self) -> Option<&Package> {
        self.current_package
            .and_then(|id| self.package_by_id(id))
            .or_else(|| self.packages.first())
            .or(self.placeholder.as_ref())
    }

    pub fn set_current_package(&mut self, id: Option<u8>) {
        self.current_package = id;
    }

    pub fn current_package(&self) -> Option<&Package> {
        self.current_package.and_then(|id| self.package_by_id(id))
    }

    pub fn sort_packages(&mut self) {
        self.packages.sort_by_key(Package::id);
    }

    /// All packages, the context package (if any) first and excluded from
    /// the remainder.
    pub fn packages_from(&self, context: Option<u8>) -> impl Iterator<Item = &Package> {
        let first = context.and_then(|id| self.package_by_id(id));
        first.into_iter().chain(
            self.packages
                .iter()
                .filter(move |package| Some(package.id()) != context),
        )
    }

    // ---- frameworks ----

    pub fn frameworks(&self) -> &[Rc<ResourceTable>] {
        &self.frameworks
    }

    /// Link a framework table unless it is structurally already present.
    /// Returns whether the link was added.
    pub fn add_framework(&mut self, framework: Rc<ResourceTable>) -> bool {
        if self.contains_framework(&framework) {
            return false;
        }
        self.frameworks.push(framework);
        true
    }

    pub fn remove_framework(&mut self, framework: &ResourceTable) -> bool {
        let before = self.frameworks.len();
        self.frameworks
            .retain(|linked| !std::ptr::eq(Rc::as_ptr(linked), framework));
        before != self.frameworks.len()
    }

    /// True when `other` is structurally equal to this table or to any
    /// transitively linked framework.
    pub fn contains_framework(&self, other: &ResourceTable) -> bool {
        self.is_similar_to(other)
            || self
                .frameworks
                .iter()
                .any(|linked| linked.contains_framework(other))
    }

    /// Structural equality: same package count and pairwise similar
    /// packages. Not identity.
    pub fn is_similar_to(&self, other: &ResourceTable) -> bool {
        self.packages.len() == other.packages.len()
            && self
                .packages
                .iter()
                .zip(other.packages.iter())
                .all(|(a, b)| a.is_similar_to(b))
    }

    // ---- alias engine ----

    /// Register that `old` is a historical name for `new`. Chains collapse
    /// eagerly: the target is resolved through the live map first and any
    /// alias currently pointing at `old` is repointed, so lookups never walk
    /// more than necessary. Self and cycle forming aliases are ignored.
    /// Returns whether the alias was stored.
    pub fn add_alias(&mut self, old: &str, new: &str) -> bool {
        if old.is_empty() || new.is_empty() || old == new {
            return false;
        }
        let resolved = self.resolve_alias(new).to_string();
        if resolved == old {
            return false;
        }
        for target in self.aliases.values_mut() {
            if target == old {
                *target = resolved.clone();
            }
        }
        tracing::debug!(old, new = %resolved, "registering package alias");
        self.aliases.insert(old.to_string(), resolved);
        true
    }

    pub fn remove_alias(&mut self, old: &str) -> bool {
        self.aliases.remove(old).is_some()
    }

    pub fn clear_aliases(&mut self) {
        self.aliases.clear();
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Walk the alias map from `name` to its terminal target. Never fails;
    /// an unaliased name comes back unchanged.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        resolve_chained(&self.aliases, name)
    }

    // ---- rename engine ----

    /// Rename every package whose name resolves to a different target under
    /// `map`, registering each pair as an alias for future lookups. With
    /// `update_references` set, one pass over the string pool rewrites the
    /// package segment of every reference string through the same map.
    /// Returns the number of packages renamed.
    pub fn rename_packages(
        &mut self,
        map: &HashMap<String, String>,
        update_references: bool,
    ) -> usize {
        let normalized: HashMap<String, String> = map
            .iter()
            .filter(|(old, new)| !old.is_empty() && !new.is_empty() && old != new)
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect();
        if normalized.is_empty() {
            return 0;
        }

        for (old, new) in &normalized {
            self.add_alias(old, new);
        }

        let mut renamed = 0;
        for package in &mut self.packages {
            let resolved = resolve_chained(&normalized, package.name());
            if resolved != package.name() {
                let resolved = resolved.to_string();
                tracing::debug!(old = package.name(), new = %resolved, "renaming package");
                package.set_name(&resolved);
                renamed += 1;
            }
        }

        if update_references {
            let rewritten = rewrite_package_references(&mut self.string_pool, &normalized);
            tracing::debug!(renamed, rewritten, "rename pass finished");
        }
        renamed
    }

    /// Single pair form of [`rename_packages`](Self::rename_packages).
    pub fn rename_package(&mut self, old: &str, new: &str, update_references: bool) -> bool {
        let map = HashMap::from([(old.to_string(), new.to_string())]);
        self.rename_packages(&map, update_references) > 0
    }

    // ---- resolution engine ----

    /// Look a resource up by numeric id: local packages first (context
    /// package leading), then every linked framework transitively. When the
    /// direct lookup misses and the id has a staged alias mapping to a
    /// different id, the search is retried once with the remapped id.
    pub fn resource(&self, id: ResTableRef) -> Option<ResourceEntry<'_>> {
        if let Some(entry) = self.search_resource(id) {
            return Some(entry);
        }
        let remapped = self.resolve_staged_alias(id)?;
        if remapped == id {
            return None;
        }
        self.search_resource(remapped)
    }

    fn search_resource(&self, id: ResTableRef) -> Option<ResourceEntry<'_>> {
        if let Some(entry) = self.local_resource(id) {
            return Some(entry);
        }
        self.frameworks
            .iter()
            .find_map(|framework| framework.search_resource(id))
    }

    /// Numeric lookup restricted to this table's own packages.
    pub fn local_resource(&self, id: ResTableRef) -> Option<ResourceEntry<'_>> {
        self.packages_from(self.current_package)
            .filter(|package| package.id() == id.package_index)
            .find_map(|package| package.resource_entry(id.type_index, id.entry_index))
    }

    /// Look a resource up by names. The package name passes through alias
    /// resolution first; staged alias fallback does not apply here.
    pub fn resource_by_name<'a>(
        &'a self,
        package_name: &'a str,
        type_name: &str,
        entry_name: &str,
    ) -> Option<ResourceEntry<'a>> {
        let id = self.resolve_resource_id(package_name, type_name, entry_name)?;
        self.resource(id)
    }

    /// Resolve a (package, type, name) triple to its numeric id, searching
    /// local packages then frameworks.
    pub fn resolve_resource_id<'a>(
        &'a self,
        package_name: &'a str,
        type_name: &str,
        entry_name: &str,
    ) -> Option<ResTableRef> {
        let resolved = self.resolve_alias(package_name);
        for package in self.packages_from(self.current_package) {
            if package.name() != resolved {
                continue;
            }
            if let Some(id) = package.resource_id_of(type_name, entry_name) {
                return Some(id);
            }
        }
        self.frameworks
            .iter()
            .find_map(|framework| framework.resolve_resource_id(resolved, type_name, entry_name))
    }

    /// Staged to finalized id redirection, searching the staged alias
    /// chunks of every local package.
    pub fn resolve_staged_alias(&self, id: ResTableRef) -> Option<ResTableRef> {
        let staged: u32 = id.into();
        self.packages
            .iter()
            .flat_map(Package::staged_aliases)
            .find(|alias| alias.staged_res_id == staged)
            .map(|alias| alias.finalized_res_id.into())
    }

    // ---- reference resolver ----

    /// Resolve a reference chain to its terminal entries, optionally
    /// filtered. The resolver is created on first use and kept until
    /// [`discard_resolver`](Self::discard_resolver); it does not track
    /// later edits.
    pub fn resolve_reference(
        &mut self,
        id: ResTableRef,
        filter: Option<&dyn Fn(&ResolvedEntry) -> bool>,
    ) -> Vec<ResolvedEntry> {
        let resolver = self.resolver.take().unwrap_or_default();
        let results = resolver.resolve(self, id, None, filter);
        self.resolver = Some(resolver);
        results
    }

    /// Like [`resolve_reference`](Self::resolve_reference) but keeping only
    /// the variants whose config equals `config`.
    pub fn resolve_reference_with_config(
        &mut self,
        id: ResTableRef,
        config: &Config,
    ) -> Vec<ResolvedEntry> {
        let resolver = self.resolver.take().unwrap_or_default();
        let results = resolver.resolve(self, id, Some(config), None);
        self.resolver = Some(resolver);
        results
    }

    pub fn discard_resolver(&mut self) {
        self.resolver = None;
    }

    // ---- string pool maintenance ----

    /// Garbage collect pool slots no entry value references, rewriting the
    /// surviving references to their new indices. Returns whether anything
    /// was removed.
    pub fn remove_unused_strings(&mut self) -> bool {
        let mut used = HashSet::new();
        for package in &self.packages {
            package.collect_used_strings(&mut used);
        }
        let Some(remap) = self.string_pool.retain_used(&used) else {
            return false;
        };
        for package in &mut self.packages {
            package.remap_strings(&remap);
        }
        tracing::debug!(remaining = self.string_pool.len(), "removed unused strings");
        true
    }

    // ---- serialization ----

    /// Read a table from a byte source. An empty source yields the null
    /// state; a non-table root tag is a hard error.
    pub fn read<R: Read + Seek>(reader: &mut R) -> TableResult<Self> {
        if available(reader)? == 0 {
            tracing::debug!("empty source, creating null table");
            return Ok(Self::create_empty());
        }

        let start = reader.stream_position()?;
        let header = ChunkHeader::read_no_opts(reader).add_context(|| "read table header")?;
        if header.chunk_type != ChunkType::Table {
            return Err(TableError::InvalidRootChunk(header.chunk_type.into()));
        }
        let package_count =
            u32::read_no_opts(reader).add_context(|| "read package count")?;
        reader.seek(SeekFrom::Start(start + header.header_size as u64))?;

        let mut table = Self::new();
        let end = start + header.size as u64;
        loop {
            let pos = reader.stream_position()?;
            if pos + CHUNK_HEADER_LEN as u64 > end {
                break;
            }
            let child_header =
                ChunkHeader::read_no_opts(reader).add_context(|| "read child chunk header")?;
            match child_header.chunk_type {
                ChunkType::StringPool => {
                    table.string_pool = StringPool::read_body(reader, pos, &child_header)
                        .add_context(|| "read table string pool")?;
                }
                ChunkType::TablePackage => {
                    let package = Package::read_body(reader, pos, &child_header)
                        .add_context(|| "read package")?;
                    table.packages.push(package);
                }
                _ => {
                    let raw = RawChunk::capture(reader, &child_header, pos)
                        .add_context(|| "read unknown table chunk")?;
                    table.trailing.push(raw);
                }
            }
        }

        tracing::debug!(
            declared = package_count,
            read = table.packages.len(),
            strings = table.string_pool.len(),
            "read resource table"
        );
        Ok(table)
    }

    pub fn from_bytes(bytes: &[u8]) -> TableResult<Self> {
        Self::read(&mut Cursor::new(bytes))
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> TableResult<Self> {
        let mut file = File::open(path)?;
        Self::read(&mut file)
    }

    /// Drop packages that would serialize to nothing. The empty state
    /// placeholder lives outside the package array and is never written.
    fn on_pre_refresh(&mut self) {
        let before = self.packages.len();
        self.packages.retain(|package| !package.is_empty());
        if before != self.packages.len() {
            tracing::debug!(dropped = before - self.packages.len(), "dropped empty packages");
        }
    }

    /// Recompute the serialized size bottom-up. Runs unconditionally so a
    /// refresh with no structural change is a no-op with the same result.
    pub fn refresh(&mut self) -> u32 {
        self.on_pre_refresh();
        self.byte_len()
    }

    pub fn byte_len(&self) -> u32 {
        let packages: u32 = self.packages.iter().map(Package::byte_len).sum();
        let trailing: u32 = self.trailing.iter().map(RawChunk::byte_len).sum();
        TABLE_HEADER_LEN + self.string_pool.byte_len() + packages + trailing
    }

    /// Refresh, then write the whole table. Returns the number of bytes
    /// written. Writing a null table is an error.
    pub fn write<W: Write + Seek>(&mut self, writer: &mut W) -> TableResult<u64> {
        if self.null {
            return Err(TableError::NullTable);
        }
        let size = self.refresh();

        let header = ChunkHeader::new(ChunkType::Table, TABLE_HEADER_LEN as u16, size);
        header
            .write_no_opts(writer)
            .add_context(|| "write table header")?;
        (self.packages.len() as u32)
            .write_no_opts(writer)
            .add_context(|| "write package count")?;
        self.string_pool
            .write_chunk(writer)
            .add_context(|| "write table string pool")?;
        for package in &self.packages {
            package.write_chunk(writer).add_context(|| "write package")?;
        }
        for raw in &self.trailing {
            raw.write_no_opts(writer)
                .add_context(|| "write unknown table chunk")?;
        }
        Ok(size as u64)
    }

    /// Serialize to an in-memory buffer, best effort: a failure partway
    /// through is logged and swallowed, and whatever bytes were produced
    /// before it are returned. Use [`write`](Self::write) or
    /// [`write_to_file`](Self::write_to_file) when the failure matters.
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        if let Err(e) = self.write(&mut cursor) {
            tracing::warn!(error = %e, "in-memory serialization failed, returning partial bytes");
        }
        cursor.into_inner()
    }

    pub fn write_to_file<P: AsRef<Path>>(&mut self, path: P) -> TableResult<u64> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }
}
