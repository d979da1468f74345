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
    collections::HashSet,
    io::Cursor,
};

use restable::string_pool::{
    read_pool_string16, read_pool_string8, write_pool_string16, write_pool_string8, StringPool,
    StringPoolFlags, StyleSpan,
};

#[test]
fn test_string_pool_flags_from_int() {
    let value = StringPoolFlags { flags: 0 };
    assert!(!value.sorted());
    assert!(!value.utf8());

    let value = StringPoolFlags { flags: 1 };
    assert!(value.sorted());
    assert!(!value.utf8());

    let value = StringPoolFlags { flags: 0x100 };
    assert!(!value.sorted());
    assert!(value.utf8());

    let value = StringPoolFlags { flags: 0x101 };
    assert!(value.sorted());
    assert!(value.utf8());
}

#[test]
fn test_string_pool_flags_to_int() {
    assert_eq!(StringPoolFlags::new(false, false).flags, 0x0);
    assert_eq!(StringPoolFlags::new(true, false).flags, 0x1);
    assert_eq!(StringPoolFlags::new(false, true).flags, 0x100);
    assert_eq!(StringPoolFlags::new(true, true).flags, 0x101);
}

#[test]
fn test_read_pool_string8_normal() {
    let mut reader = Cursor::new(b"\x0d\x0dHello, World!\x00");
    let value = read_pool_string8(&mut reader).unwrap();

    assert_eq!(value, "Hello, World!");
}

#[test]
fn test_write_pool_string8_normal() {
    let mut writer = Cursor::new(Vec::new());
    write_pool_string8(&mut writer, "Hello, World!").unwrap();

    assert_eq!(writer.into_inner(), b"\x0d\x0dHello, World!\x00");
}

#[test]
fn test_read_pool_string8_long_length() {
    // 0x80 or more characters moves the length into two bytes with the
    // high bit of the first set
    let text = "a".repeat(0x85);
    let mut data: Vec<u8> = vec![0x80, 0x85, 0x80, 0x85];
    data.extend_from_slice(text.as_bytes());
    data.push(0);

    let mut reader = Cursor::new(data);
    let value = read_pool_string8(&mut reader).unwrap();

    assert_eq!(value, text);
}

#[test]
fn test_write_pool_string8_long_length() {
    let text = "a".repeat(0x85);
    let mut writer = Cursor::new(Vec::new());
    write_pool_string8(&mut writer, &text).unwrap();

    let data = writer.into_inner();
    assert_eq!(&data[..4], b"\x80\x85\x80\x85");
    assert_eq!(data.len(), 4 + 0x85 + 1);
}

#[test]
fn test_read_pool_string8_invalid_null() {
    let mut reader = Cursor::new(b"\x02\x02hi\x05");
    assert!(read_pool_string8(&mut reader).is_err());
}

#[test]
fn test_read_pool_string16_normal() {
    let mut reader = Cursor::new(b"\x02\x00H\x00i\x00\x00\x00");
    let value = read_pool_string16(&mut reader).unwrap();

    assert_eq!(value, "Hi");
}

#[test]
fn test_write_pool_string16_normal() {
    let mut writer = Cursor::new(Vec::new());
    write_pool_string16(&mut writer, "Hi").unwrap();

    assert_eq!(writer.into_inner(), b"\x02\x00H\x00i\x00\x00\x00");
}

#[test]
fn test_write_empty_pool_chunk() {
    let pool = StringPool::new(true);
    let mut writer = Cursor::new(Vec::new());
    pool.write_chunk(&mut writer).unwrap();
    let data = writer.into_inner();

    assert_eq!(
        data,
        b"\x01\x00\x1c\x00\x1c\x00\x00\x00\
          \x00\x00\x00\x00\x00\x00\x00\x00\
          \x00\x01\x00\x00\x1c\x00\x00\x00\
          \x00\x00\x00\x00"
    );
    assert_eq!(pool.byte_len() as usize, data.len());
}

#[test]
fn test_pool_chunk_round_trip() {
    let mut pool = StringPool::new(true);
    pool.get_or_create("app_name");
    pool.get_or_create("@com.example.app:color/primary");
    pool.get_or_create("hello");

    let mut writer = Cursor::new(Vec::new());
    pool.write_chunk(&mut writer).unwrap();
    let data = writer.into_inner();
    assert_eq!(pool.byte_len() as usize, data.len());

    let read = StringPool::read_chunk(&mut Cursor::new(data)).unwrap();
    assert_eq!(read, pool);
}

#[test]
fn test_pool_chunk_round_trip_utf16() {
    let mut pool = StringPool::new(false);
    pool.get_or_create("héllo wörld");
    pool.get_or_create("plain");

    let mut writer = Cursor::new(Vec::new());
    pool.write_chunk(&mut writer).unwrap();
    let data = writer.into_inner();
    assert_eq!(pool.byte_len() as usize, data.len());

    let read = StringPool::read_chunk(&mut Cursor::new(data)).unwrap();
    assert_eq!(read.string(0), Some("héllo wörld"));
    assert_eq!(read.string(1), Some("plain"));
    assert!(!read.flags().utf8());
}

#[test]
fn test_get_or_create_dedups() {
    let mut pool = StringPool::new(true);
    let first = pool.get_or_create("same");
    let second = pool.get_or_create("same");
    let other = pool.get_or_create("other");

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_set_preserves_slot_index() {
    let mut pool = StringPool::new(true);
    let index = pool.get_or_create("before");
    pool.get_or_create("other");

    assert!(pool.set(index, "after"));
    assert_eq!(pool.string(index), Some("after"));
    assert_eq!(pool.find("after"), Some(index));
    assert_eq!(pool.find("before"), None);
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_set_out_of_range() {
    let mut pool = StringPool::new(true);
    assert!(!pool.set(5, "nope"));
}

#[test]
fn test_retain_used_compacts_and_remaps() {
    let mut pool = StringPool::new(true);
    let a = pool.get_or_create("a");
    let b = pool.get_or_create("b");
    let c = pool.get_or_create("c");

    let used = HashSet::from([a, c]);
    let remap = pool.retain_used(&used).unwrap();

    assert_eq!(pool.len(), 2);
    assert_eq!(remap.get(&a), Some(&0));
    assert_eq!(remap.get(&c), Some(&1));
    assert_eq!(remap.get(&b), None);
    assert_eq!(pool.string(0), Some("a"));
    assert_eq!(pool.string(1), Some("c"));
}

#[test]
fn test_styled_pool_chunk_round_trip() {
    let mut pool = StringPool::new(true);
    let styled = pool.get_or_create("<b>bold</b> text");
    let tag = pool.get_or_create("b");
    pool.get_or_create("plain");
    assert!(pool.set_spans(
        styled,
        vec![StyleSpan {
            name: tag,
            first_char: 0,
            last_char: 3,
        }],
    ));

    let mut writer = Cursor::new(Vec::new());
    pool.write_chunk(&mut writer).unwrap();
    let data = writer.into_inner();
    assert_eq!(pool.byte_len() as usize, data.len());

    let read = StringPool::read_chunk(&mut Cursor::new(data)).unwrap();
    assert_eq!(read, pool);
    let spans = read.get(styled).unwrap().spans();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, tag);
    assert_eq!(spans[0].first_char, 0);
    assert_eq!(spans[0].last_char, 3);
}

#[test]
fn test_retain_used_keeps_span_names() {
    let mut pool = StringPool::new(true);
    let used = pool.get_or_create("used");
    pool.get_or_create("junk");
    let tag = pool.get_or_create("b");
    let styled = pool.get_or_create("<b>bold</b>");
    pool.set_spans(
        styled,
        vec![StyleSpan {
            name: tag,
            first_char: 0,
            last_char: 3,
        }],
    );

    let remap = pool.retain_used(&HashSet::from([used])).unwrap();

    // only "junk" goes away; the span's tag name slot is a referrer too
    assert_eq!(pool.len(), 3);
    assert_eq!(remap.get(&tag), Some(&1));
    let span = &pool.get(remap[&styled]).unwrap().spans()[0];
    assert_eq!(pool.string(span.name), Some("b"));
}

#[test]
fn test_retain_used_remaps_span_names() {
    let mut pool = StringPool::new(true);
    pool.get_or_create("junk_a");
    pool.get_or_create("junk_b");
    let tag = pool.get_or_create("i");
    let styled = pool.get_or_create("<i>ital</i>");
    pool.set_spans(
        styled,
        vec![StyleSpan {
            name: tag,
            first_char: 0,
            last_char: 3,
        }],
    );

    let remap = pool.retain_used(&HashSet::new()).unwrap();

    assert_eq!(pool.len(), 2);
    let span = &pool.get(remap[&styled]).unwrap().spans()[0];
    assert_eq!(span.name, remap[&tag]);
    assert_eq!(pool.string(span.name), Some("i"));
}

#[test]
fn test_retain_used_no_op() {
    let mut pool = StringPool::new(true);
    let a = pool.get_or_create("a");

    assert!(pool.retain_used(&HashSet::from([a])).is_none());
    assert_eq!(pool.len(), 1);
}
