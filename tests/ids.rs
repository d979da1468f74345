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

use std::io::Cursor;

use binrw::{BinReaderExt, BinWriterExt};
use restable::ids::{is_package_id, is_resource_id, ResTableRef};

#[test]
fn test_read_res_table_ref() {
    let mut reader = Cursor::new(b"\xcd\xab\x01\x7f");
    let value: ResTableRef = reader.read_le().unwrap();

    assert_eq!(value.package_index, 0x7f);
    assert_eq!(value.type_index, 0x01);
    assert_eq!(value.entry_index, 0xabcd);
}

#[test]
fn test_write_res_table_ref() {
    let mut writer = Cursor::new(Vec::new());
    writer.write_le(&ResTableRef::new(0x7f, 0x02, 0x0010)).unwrap();

    assert_eq!(writer.into_inner(), b"\x10\x00\x02\x7f");
}

#[test]
fn test_res_table_ref_int_round_trip() {
    let value: u32 = 0x7f02abcd;
    let reference = ResTableRef::from(value);

    assert_eq!(reference, ResTableRef::new(0x7f, 0x02, 0xabcd));
    assert_eq!(u32::from(reference), value);
}

#[test]
fn test_res_table_ref_display() {
    let reference = ResTableRef::new(0x7f, 0x01, 0x0000);
    assert_eq!(reference.to_string(), "@0x7f010000");
}

#[test]
fn test_is_resource_id_valid() {
    assert!(is_resource_id(0x0101ffff));
    assert!(is_resource_id(0x01010000));
    assert!(is_resource_id(0x7f020001));
}

#[test]
fn test_is_resource_id_invalid() {
    assert!(!is_resource_id(0x7f00ffff));
    assert!(!is_resource_id(0x00ff0000));
    assert!(!is_resource_id(0x00ffffff));
    assert!(!is_resource_id(0x0000ffff));
    assert!(!is_resource_id(0xff000000));
    assert!(!is_resource_id(0x0));
}

#[test]
fn test_is_package_id_valid() {
    assert!(is_package_id(0x01));
    assert!(is_package_id(0x11));
    assert!(is_package_id(0xff));
}

#[test]
fn test_is_package_id_invalid() {
    assert!(!is_package_id(0x00));
    assert!(!is_package_id(0xfff));
    assert!(!is_package_id(0xffff));
    assert!(!is_package_id(0xfffff));
    assert!(!is_package_id(0xffffff));
    assert!(!is_package_id(0xffffffff));
}
