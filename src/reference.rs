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
    fmt::Display,
    str::FromStr,
};

use crate::string_pool::StringPool;

/// Leading character of a reference string: `@` for a resource reference,
/// `?` for an attribute reference.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ReferencePrefix {
    Resource,
    Attribute,
}

impl ReferencePrefix {
    pub fn as_char(self) -> char {
        match self {
            ReferencePrefix::Resource => '@',
            ReferencePrefix::Attribute => '?',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(ReferencePrefix::Resource),
            '?' => Some(ReferencePrefix::Attribute),
            _ => None,
        }
    }
}

/// A parsed pool string of the form `prefix(package:)?type/name`.
///
/// Parsing and formatting are exact inverses for well formed input, which is
/// what lets the rename pass rebuild a string without touching anything but
/// its package segment.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReferenceString {
    pub prefix: ReferencePrefix,
    pub package: Option<String>,
    pub type_name: String,
    pub entry_name: String,
}

impl ReferenceString {
    pub fn new(
        prefix: ReferencePrefix,
        package: Option<String>,
        type_name: String,
        entry_name: String,
    ) -> Self {
        Self {
            prefix,
            package,
            type_name,
            entry_name,
        }
    }

    /// Cheap pre-filter used before attempting a full parse. Most pool
    /// strings are plain text; this rejects them without allocating.
    pub fn looks_like_reference(text: &str) -> bool {
        if text.len() < 4 {
            return false;
        }
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if ReferencePrefix::from_char(first).is_none() {
            return false;
        }
        text.contains(':') || text.contains('/')
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseReferenceError;

impl FromStr for ReferenceString {
    type Err = ParseReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let prefix = chars
            .next()
            .and_then(ReferencePrefix::from_char)
            .ok_or(ParseReferenceError)?;
        let rest = &s[1..];

        let (package, rest) = match rest.split_once(':') {
            Some((package, rest)) => {
                if package.is_empty() {
                    return Err(ParseReferenceError);
                }
                (Some(package.to_string()), rest)
            }
            None => (None, rest),
        };

        let (type_name, entry_name) = rest.split_once('/').ok_or(ParseReferenceError)?;
        if type_name.is_empty() || entry_name.is_empty() {
            return Err(ParseReferenceError);
        }

        Ok(Self {
            prefix,
            package,
            type_name: type_name.to_string(),
            entry_name: entry_name.to_string(),
        })
    }
}

impl Display for ReferenceString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix.as_char())?;
        if let Some(package) = &self.package {
            write!(f, "{package}:")?;
        }
        write!(f, "{}/{}", self.type_name, self.entry_name)
    }
}

/// Follow `name` through `map` until the next hop is absent, maps to itself,
/// or has already been visited. Never fails; an unmapped name comes back
/// unchanged.
pub(crate) fn resolve_chained<'a>(map: &'a HashMap<String, String>, name: &'a str) -> &'a str {
    let mut current = name;
    let mut visited: HashSet<&str> = HashSet::new();
    while let Some(next) = map.get(current) {
        if next == current || !visited.insert(current) {
            break;
        }
        current = next;
    }
    current
}

/// One pass over the pool rewriting the package segment of every reference
/// string through `map`. Strings that are not references, fail to parse, or
/// carry no package segment are skipped; a string is only rebuilt when the
/// resolved package actually differs. Returns the number of strings changed.
pub fn rewrite_package_references(pool: &mut StringPool, map: &HashMap<String, String>) -> usize {
    let mut changes: Vec<(u32, String)> = Vec::new();

    for index in 0..pool.len() as u32 {
        let Some(text) = pool.string(index) else {
            continue;
        };
        if !ReferenceString::looks_like_reference(text) {
            continue;
        }
        let Ok(mut reference) = text.parse::<ReferenceString>() else {
            continue;
        };
        let Some(package) = reference.package.as_deref() else {
            continue;
        };
        let resolved = resolve_chained(map, package);
        if resolved == package {
            continue;
        }
        reference.package = Some(resolved.to_string());
        changes.push((index, reference.to_string()));
    }

    for (index, text) in &changes {
        tracing::trace!(index, %text, "rewriting reference string");
        pool.set(*index, text);
    }
    changes.len()
}
