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

use std::collections::HashSet;

use crate::{
    ids::ResTableRef,
    package::{Config, Entry, EntryValue},
    table::ResourceTable,
};

/// An entry a reference chain terminated at, detached from the table so the
/// caller can hold results across later mutations.
#[derive(Debug, PartialEq, Clone)]
pub struct ResolvedEntry {
    pub resource_id: ResTableRef,
    pub config: Config,
    pub entry: Entry,
}

/// Follows reference valued entries through a table until they terminate in
/// concrete values. Constructed lazily by the table on first use and cached
/// there; it is not invalidated by table edits, callers discard it
/// themselves after structural changes.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    max_chain: usize,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self { max_chain: 32 }
    }
}

impl ReferenceResolver {
    pub fn new(max_chain: usize) -> Self {
        Self { max_chain }
    }

    /// Resolve `id` to every matching terminal entry across all config
    /// variants, optionally constrained to one config and filtered by a
    /// predicate. A chain revisiting an id or exceeding the chain cap stops
    /// silently with whatever was collected so far.
    pub fn resolve(
        &self,
        table: &ResourceTable,
        id: ResTableRef,
        config: Option<&Config>,
        filter: Option<&dyn Fn(&ResolvedEntry) -> bool>,
    ) -> Vec<ResolvedEntry> {
        let mut results = Vec::new();
        let mut visited: HashSet<u32> = HashSet::new();
        let mut current = id;

        loop {
            if visited.len() >= self.max_chain || !visited.insert(current.into()) {
                tracing::debug!(id = %id, at = %current, "reference chain guard hit");
                break;
            }
            let Some(resource) = table.resource(current) else {
                break;
            };

            let mut next = None;
            for (variant_config, entry) in &resource.variants {
                if let Some(want) = config {
                    if *variant_config != want {
                        continue;
                    }
                }
                if let EntryValue::Scalar(value) = &entry.value {
                    if let Some(target) = value.data.reference() {
                        next.get_or_insert(target);
                        continue;
                    }
                }
                let resolved = ResolvedEntry {
                    resource_id: resource.resource_id,
                    config: (*variant_config).clone(),
                    entry: (*entry).clone(),
                };
                if filter.map_or(true, |keep| keep(&resolved)) {
                    results.push(resolved);
                }
            }

            match next {
                Some(target) => current = target,
                None => break,
            }
        }

        results
    }
}
