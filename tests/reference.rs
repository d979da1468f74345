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

use std::collections::HashMap;

use restable::{
    reference::{rewrite_package_references, ReferencePrefix, ReferenceString},
    string_pool::StringPool,
};

#[test]
fn test_parse_resource_reference() {
    let value: ReferenceString = "@com.example.app:color/primary".parse().unwrap();

    assert_eq!(value.prefix, ReferencePrefix::Resource);
    assert_eq!(value.package.as_deref(), Some("com.example.app"));
    assert_eq!(value.type_name, "color");
    assert_eq!(value.entry_name, "primary");
}

#[test]
fn test_parse_attribute_reference() {
    let value: ReferenceString = "?android:attr/textColor".parse().unwrap();

    assert_eq!(value.prefix, ReferencePrefix::Attribute);
    assert_eq!(value.package.as_deref(), Some("android"));
    assert_eq!(value.type_name, "attr");
    assert_eq!(value.entry_name, "textColor");
}

#[test]
fn test_parse_reference_without_package() {
    let value: ReferenceString = "@color/primary".parse().unwrap();

    assert_eq!(value.package, None);
    assert_eq!(value.type_name, "color");
    assert_eq!(value.entry_name, "primary");
}

#[test]
fn test_parse_invalid_references() {
    assert!("color/primary".parse::<ReferenceString>().is_err());
    assert!("@color".parse::<ReferenceString>().is_err());
    assert!("@:color/primary".parse::<ReferenceString>().is_err());
    assert!("@pkg:/primary".parse::<ReferenceString>().is_err());
    assert!("@pkg:color/".parse::<ReferenceString>().is_err());
    assert!("".parse::<ReferenceString>().is_err());
}

#[test]
fn test_format_is_parse_inverse() {
    for text in [
        "@com.example.app:color/primary",
        "?android:attr/textColor",
        "@color/primary",
    ] {
        let value: ReferenceString = text.parse().unwrap();
        assert_eq!(value.to_string(), text);
    }
}

#[test]
fn test_looks_like_reference() {
    assert!(ReferenceString::looks_like_reference(
        "@com.example.app:color/primary"
    ));
    assert!(ReferenceString::looks_like_reference("?a:b/c"));
    assert!(!ReferenceString::looks_like_reference("@a/"));
    assert!(!ReferenceString::looks_like_reference("normal string"));
    assert!(!ReferenceString::looks_like_reference("@noseparator"));
}

#[test]
fn test_rewrite_package_references() {
    let mut pool = StringPool::new(true);
    let renamed = pool.get_or_create("@com.example.app:color/primary");
    let attr = pool.get_or_create("?com.example.app:attr/theme");
    let plain = pool.get_or_create("normal string");
    let android = pool.get_or_create("@android:color/white");
    let no_package = pool.get_or_create("@color/primary");

    let map = HashMap::from([(
        "com.example.app".to_string(),
        "com.example.app.modified".to_string(),
    )]);
    let changed = rewrite_package_references(&mut pool, &map);

    assert_eq!(changed, 2);
    assert_eq!(
        pool.string(renamed),
        Some("@com.example.app.modified:color/primary")
    );
    assert_eq!(
        pool.string(attr),
        Some("?com.example.app.modified:attr/theme")
    );
    assert_eq!(pool.string(plain), Some("normal string"));
    assert_eq!(pool.string(android), Some("@android:color/white"));
    assert_eq!(pool.string(no_package), Some("@color/primary"));
}

#[test]
fn test_rewrite_follows_chains() {
    let mut pool = StringPool::new(true);
    let index = pool.get_or_create("@a:color/primary");

    let map = HashMap::from([
        ("a".to_string(), "b".to_string()),
        ("b".to_string(), "c".to_string()),
    ]);
    rewrite_package_references(&mut pool, &map);

    assert_eq!(pool.string(index), Some("@c:color/primary"));
}
