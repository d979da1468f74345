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

// Everything here is based off of the ResTable_ref layout in
// https://android.googlesource.com/platform/frameworks/base/+/master/libs/androidfw/include/androidfw/ResourceTypes.h

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use binrw::{BinRead, BinWrite};

/// This is a reference to a unique entry (a ResTable_entry structure) in a
/// resource table. The value is structured as 0xpptteeee, where pp is the
/// package index, tt is the type index in that package, and eeee is the entry
/// index in that type. The package and type values start at 1 for the first
/// item, to help catch cases where they have not been supplied.
#[derive(Debug, BinRead, BinWrite, PartialEq, Eq, Hash, Copy, Clone)]
pub struct ResTableRef {
    pub entry_index: u16,
    pub type_index: u8,
    pub package_index: u8,
}

impl ResTableRef {
    pub fn new(package_index: u8, type_index: u8, entry_index: u16) -> Self {
        Self {
            entry_index,
            type_index,
            package_index,
        }
    }
}

impl Display for ResTableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@0x{:08x}", <ResTableRef as Into<u32>>::into(*self))
    }
}

impl From<ResTableRef> for u32 {
    fn from(value: ResTableRef) -> Self {
        (value.entry_index as u32)
            + ((value.type_index as u32) << 16)
            + ((value.package_index as u32) << 24)
    }
}

impl From<u32> for ResTableRef {
    fn from(value: u32) -> Self {
        Self {
            package_index: (value >> 24) as u8, // as u8 does & 0xff
            type_index: (value >> 16) as u8,    // as u8 does & 0xff
            entry_index: value as u16,          // as u16 does & 0xffff
        }
    }
}

/// A value is a valid resource id iff both its package id bits and its type
/// id bits are nonzero. The entry id bits are unconstrained, 0 and 0xffff
/// are both fine.
pub fn is_resource_id(value: u32) -> bool {
    let package_id = (value >> 24) & 0xff;
    let type_id = (value >> 16) & 0xff;
    package_id != 0 && type_id != 0
}

/// A value is a valid package id iff it is nonzero and fits in 8 bits.
/// Values that need more than one byte (0x100 and up) are not package ids.
pub fn is_package_id(value: u32) -> bool {
    value != 0 && value <= 0xff
}

#[derive(Debug)]
pub enum ParseResTableRefError {
    Int(ParseIntError),
    InvalidStartChar,
}

impl FromStr for ResTableRef {
    type Err = ParseResTableRefError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first = s
            .chars()
            .next()
            .ok_or(ParseResTableRefError::InvalidStartChar)?;
        if first != '@' {
            return Err(ParseResTableRefError::InvalidStartChar);
        }
        let rest: String = s.chars().skip(1).collect();

        let val: u32 = match rest.strip_prefix("0x") {
            Some(hex) => u32::from_str_radix(hex, 16).map_err(ParseResTableRefError::Int)?,
            None => rest.parse().map_err(ParseResTableRefError::Int)?,
        };

        Ok(val.into())
    }
}
