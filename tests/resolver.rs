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

use restable::{
    package::{Config, EntryValue},
    table::ResourceTable,
    value::{ResValue, ResValueData},
};

fn scalar(data: ResValueData) -> EntryValue {
    EntryValue::Scalar(ResValue::new(data))
}

#[test]
fn test_resolve_direct_value() {
    let mut table = ResourceTable::new();
    let id = table
        .new_package(0x7f, "com.example.app")
        .add_entry("color", "base", scalar(ResValueData::IntHex(0xff00ff00)));

    let resolved = table.resolve_reference(id, None);

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].resource_id, id);
    assert_eq!(
        resolved[0].entry.value,
        EntryValue::Scalar(ResValue::new(ResValueData::IntHex(0xff00ff00)))
    );
}

#[test]
fn test_resolve_follows_reference_chain() {
    let mut table = ResourceTable::new();
    let package = table.new_package(0x7f, "com.example.app");
    let base = package.add_entry("color", "base", scalar(ResValueData::IntHex(0xff00ff00)));
    let middle = package.add_entry("color", "middle", scalar(ResValueData::Reference(base)));
    let top = package.add_entry("color", "top", scalar(ResValueData::Reference(middle)));

    let resolved = table.resolve_reference(top, None);

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].resource_id, base);
    assert_eq!(
        resolved[0].entry.value,
        EntryValue::Scalar(ResValue::new(ResValueData::IntHex(0xff00ff00)))
    );
}

#[test]
fn test_resolve_cycle_stops() {
    let mut table = ResourceTable::new();
    let package = table.new_package(0x7f, "com.example.app");
    // two entries referencing each other
    let a = package.resource_id_of("color", "a");
    assert!(a.is_none());
    let a = package.add_entry("color", "a", scalar(ResValueData::IntDec(0)));
    let b = package.add_entry("color", "b", scalar(ResValueData::Reference(a)));
    if let Some(block) = package.type_blocks_mut().next() {
        if let Some(entry) = block.entry_mut(a.entry_index) {
            entry.value = scalar(ResValueData::Reference(b));
        }
    }

    let resolved = table.resolve_reference(a, None);
    assert!(resolved.is_empty());
}

#[test]
fn test_resolve_missing_id() {
    let mut table = ResourceTable::new();
    table.new_package(0x7f, "com.example.app");

    let resolved = table.resolve_reference(0x7f010000.into(), None);
    assert!(resolved.is_empty());
}

#[test]
fn test_resolve_with_filter() {
    let mut table = ResourceTable::new();
    let package = table.new_package(0x7f, "com.example.app");
    let id = package.add_entry("integer", "answer", scalar(ResValueData::IntDec(42)));

    let keep = |_: &restable::resolver::ResolvedEntry| false;
    let resolved = table.resolve_reference(id, Some(&keep));
    assert!(resolved.is_empty());

    let keep = |_: &restable::resolver::ResolvedEntry| true;
    let resolved = table.resolve_reference(id, Some(&keep));
    assert_eq!(resolved.len(), 1);
}

#[test]
fn test_resolve_with_config() {
    let mut table = ResourceTable::new();
    let package = table.new_package(0x7f, "com.example.app");
    let id = package.add_entry("integer", "answer", scalar(ResValueData::IntDec(42)));

    // entries created through the builder live under the default config
    let resolved = table.resolve_reference_with_config(id, &Config::default());
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].config, Config::default());
}

#[test]
fn test_resolver_is_cached_until_discarded() {
    let mut table = ResourceTable::new();
    let id = table
        .new_package(0x7f, "com.example.app")
        .add_entry("integer", "answer", scalar(ResValueData::IntDec(42)));

    assert_eq!(table.resolve_reference(id, None).len(), 1);
    table.discard_resolver();
    assert_eq!(table.resolve_reference(id, None).len(), 1);
}
