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
    ids::ResTableRef,
    json::{TableJson, ValueJson},
    package::{EntryValue, MapEntry},
    table::ResourceTable,
    value::{ResValue, ResValueData},
};

fn scalar(data: ResValueData) -> EntryValue {
    EntryValue::Scalar(ResValue::new(data))
}

fn example_table() -> ResourceTable {
    let mut table = ResourceTable::new();
    let index = table.string_pool.get_or_create("Example");
    let package = table.new_package(0x7f, "com.example.app");
    package.add_entry("string", "app_name", scalar(ResValueData::String(index)));
    package.add_entry("color", "primary", scalar(ResValueData::IntHex(0xff336699)));
    package.add_entry("bool", "enabled", scalar(ResValueData::IntBoolean(1)));
    package.add_entry(
        "style",
        "base",
        EntryValue::Bag {
            parent: ResTableRef::new(0, 0, 0),
            map: vec![MapEntry {
                name: ResTableRef::new(0x01, 0x01, 0x0005),
                value: ResValue::new(ResValueData::IntDec(7)),
            }],
        },
    );
    table
}

#[test]
fn test_export_schema() {
    let table = example_table();
    let document = table.to_json();

    assert_eq!(document.restable_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(document.packages.len(), 1);

    let package = &document.packages[0];
    assert_eq!(package.id, 0x7f);
    assert_eq!(package.name, "com.example.app");
    assert_eq!(package.entries.len(), 4);

    let app_name = package
        .entries
        .iter()
        .find(|entry| entry.name.as_deref() == Some("app_name"))
        .unwrap();
    assert_eq!(app_name.type_name, "string");
    assert_eq!(
        app_name.value,
        ValueJson::String {
            value: "Example".to_string()
        }
    );

    let enabled = package
        .entries
        .iter()
        .find(|entry| entry.name.as_deref() == Some("enabled"))
        .unwrap();
    assert_eq!(enabled.value, ValueJson::Boolean { value: true });
}

#[test]
fn test_json_document_round_trip() {
    let table = example_table();
    let document = table.to_json();

    let rebuilt = ResourceTable::from_json(&document);
    assert_eq!(rebuilt.to_json(), document);
}

#[test]
fn test_json_string_round_trip() {
    let table = example_table();
    let text = table.to_json_string().unwrap();

    let rebuilt = ResourceTable::from_json_string(&text).unwrap();
    assert_eq!(rebuilt.to_json_string().unwrap(), text);
}

#[test]
fn test_import_preserves_type_names() {
    let table = example_table();
    let rebuilt = ResourceTable::from_json(&table.to_json());
    let package = rebuilt.package_by_id(0x7f).unwrap();

    assert!(package.resource_id_of("string", "app_name").is_some());
    assert!(package.resource_id_of("color", "primary").is_some());
    assert!(package.resource_id_of("bool", "enabled").is_some());
    assert!(package.resource_id_of("style", "base").is_some());
}

#[test]
fn test_import_rebuilds_string_pool() {
    let table = example_table();
    let rebuilt = ResourceTable::from_json(&table.to_json());

    let id = rebuilt
        .resolve_resource_id("com.example.app", "string", "app_name")
        .unwrap();
    let resource = rebuilt.resource(id).unwrap();
    let (_, entry) = resource.variants[0];
    let index = match &entry.value {
        EntryValue::Scalar(value) => value.data.string_index().unwrap(),
        other => panic!("expected a scalar string entry, got {other:?}"),
    };
    assert_eq!(rebuilt.string_pool.string(index), Some("Example"));
}

#[test]
fn test_parse_handwritten_document() {
    let text = r#"{
        "restable_version": "0.1.0",
        "packages": [
            {
                "id": 127,
                "name": "com.example.app",
                "entries": [
                    {
                        "type_id": 1,
                        "type_name": "color",
                        "entry_id": 0,
                        "name": "primary",
                        "value": { "type": "int_hex", "value": 4281545523 }
                    },
                    {
                        "type_id": 2,
                        "type_name": "string",
                        "entry_id": 0,
                        "name": "greeting",
                        "value": { "type": "string", "value": "hello" }
                    }
                ]
            }
        ]
    }"#;

    let document: TableJson = serde_json::from_str(text).unwrap();
    let table = ResourceTable::from_json(&document);

    let package = table.package_by_id(127).unwrap();
    assert_eq!(package.name(), "com.example.app");
    assert!(package.resource_id_of("color", "primary").is_some());
    assert!(table
        .resolve_resource_id("com.example.app", "string", "greeting")
        .is_some());
}
