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

use serde::{Deserialize, Serialize};

use crate::{
    ids::ResTableRef,
    package::{Entry, EntryValue, MapEntry},
    table::ResourceTable,
    value::{ResNullData, ResValue, ResValueData},
};

/// JSON document for a whole table: a version marker and the packages with
/// their entries. Type names travel with the entries so an import can
/// rebuild the package pools and keep name based lookups working.
/// Configuration variants beyond the default one are not part of the
/// schema; export takes the first variant of each resource and import
/// creates entries under the default config.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TableJson {
    pub restable_version: String,
    pub packages: Vec<PackageJson>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PackageJson {
    pub id: u8,
    pub name: String,
    pub entries: Vec<EntryJson>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EntryJson {
    pub type_id: u8,
    pub type_name: String,
    pub entry_id: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: ValueJson,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MapJson {
    pub name: u32,
    pub value: ValueJson,
}

/// One resource value. String values carry their text directly; the table
/// pool indirection is rebuilt on import.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueJson {
    Undefined,
    Empty,
    Reference { id: u32 },
    Attribute { id: u32 },
    String { value: String },
    Float { value: f32 },
    Dimension { data: u32 },
    Fraction { data: u32 },
    DynamicReference { id: u32 },
    IntDec { value: u32 },
    IntHex { value: u32 },
    Boolean { value: bool },
    Raw { data_type: u8, data: u32 },
    Bag { parent: u32, map: Vec<MapJson> },
}

fn scalar_to_json(table: &ResourceTable, data: &ResValueData) -> ValueJson {
    match data {
        ResValueData::Null(ResNullData::Undefined) => ValueJson::Undefined,
        ResValueData::Null(ResNullData::Empty) => ValueJson::Empty,
        ResValueData::Reference(r) => ValueJson::Reference { id: (*r).into() },
        ResValueData::Attribute(id) => ValueJson::Attribute { id: *id },
        ResValueData::String(index) => ValueJson::String {
            value: table
                .string_pool
                .string(*index)
                .unwrap_or_default()
                .to_string(),
        },
        ResValueData::Float(value) => ValueJson::Float { value: *value },
        ResValueData::Dimension(data) => ValueJson::Dimension { data: *data },
        ResValueData::Fraction(data) => ValueJson::Fraction { data: *data },
        ResValueData::DynamicReference(r) => ValueJson::DynamicReference { id: (*r).into() },
        ResValueData::IntDec(value) => ValueJson::IntDec { value: *value },
        ResValueData::IntHex(value) => ValueJson::IntHex { value: *value },
        ResValueData::IntBoolean(value) => ValueJson::Boolean { value: *value != 0 },
        ResValueData::Other { data_type, data } => ValueJson::Raw {
            data_type: *data_type,
            data: *data,
        },
    }
}

fn scalar_from_json(table: &mut ResourceTable, value: &ValueJson) -> Option<ResValueData> {
    Some(match value {
        ValueJson::Undefined => ResValueData::Null(ResNullData::Undefined),
        ValueJson::Empty => ResValueData::Null(ResNullData::Empty),
        ValueJson::Reference { id } => ResValueData::Reference((*id).into()),
        ValueJson::Attribute { id } => ResValueData::Attribute(*id),
        ValueJson::String { value } => {
            ResValueData::String(table.string_pool.get_or_create(value))
        }
        ValueJson::Float { value } => ResValueData::Float(*value),
        ValueJson::Dimension { data } => ResValueData::Dimension(*data),
        ValueJson::Fraction { data } => ResValueData::Fraction(*data),
        ValueJson::DynamicReference { id } => ResValueData::DynamicReference((*id).into()),
        ValueJson::IntDec { value } => ResValueData::IntDec(*value),
        ValueJson::IntHex { value } => ResValueData::IntHex(*value),
        ValueJson::Boolean { value } => ResValueData::IntBoolean(*value as u32),
        ValueJson::Raw { data_type, data } => ResValueData::Other {
            data_type: *data_type,
            data: *data,
        },
        ValueJson::Bag { .. } => return None,
    })
}

fn entry_to_json(
    table: &ResourceTable,
    id: ResTableRef,
    type_name: String,
    name: Option<&str>,
    entry: &Entry,
) -> EntryJson {
    let value = match &entry.value {
        EntryValue::Scalar(value) => scalar_to_json(table, &value.data),
        EntryValue::Bag { parent, map } => ValueJson::Bag {
            parent: (*parent).into(),
            map: map
                .iter()
                .map(|pair| MapJson {
                    name: pair.name.into(),
                    value: scalar_to_json(table, &pair.value.data),
                })
                .collect(),
        },
    };
    EntryJson {
        type_id: id.type_index,
        type_name,
        entry_id: id.entry_index,
        name: name.map(str::to_string),
        value,
    }
}

impl ResourceTable {
    /// Export to the JSON interchange document. A null table exports with an
    /// empty package list.
    pub fn to_json(&self) -> TableJson {
        let packages = self
            .packages()
            .iter()
            .map(|package| {
                let entries = package
                    .resource_refs()
                    .filter_map(|id| {
                        let resource = package.resource_entry(id.type_index, id.entry_index)?;
                        let (_, entry) = *resource.variants.first()?;
                        let type_name = match package.type_name(id.type_index) {
                            Some(name) => name.to_string(),
                            None => format!("type{}", id.type_index),
                        };
                        Some(entry_to_json(self, id, type_name, resource.entry_name, entry))
                    })
                    .collect();
                PackageJson {
                    id: package.id(),
                    name: package.name().to_string(),
                    entries,
                }
            })
            .collect();
        TableJson {
            restable_version: env!("CARGO_PKG_VERSION").to_string(),
            packages,
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json())
    }

    /// Build a table from the JSON interchange document. Entries land under
    /// the default config; entries with no name get a generated one so the
    /// key pool stays consistent. Bag map values that are themselves bags
    /// are skipped.
    pub fn from_json(document: &TableJson) -> Self {
        let mut table = ResourceTable::new();
        for package_json in &document.packages {
            table.get_or_create_package(package_json.id, Some(&package_json.name));
            for entry_json in &package_json.entries {
                let value = match &entry_json.value {
                    ValueJson::Bag { parent, map } => {
                        let map = map
                            .iter()
                            .filter_map(|pair| {
                                let data = scalar_from_json(&mut table, &pair.value)?;
                                Some(MapEntry {
                                    name: pair.name.into(),
                                    value: ResValue::new(data),
                                })
                            })
                            .collect();
                        EntryValue::Bag {
                            parent: (*parent).into(),
                            map,
                        }
                    }
                    scalar => match scalar_from_json(&mut table, scalar) {
                        Some(data) => EntryValue::Scalar(ResValue::new(data)),
                        None => continue,
                    },
                };

                let entry_name = entry_json.name.clone().unwrap_or_else(|| {
                    let id: u32 =
                        ResTableRef::new(package_json.id, entry_json.type_id, entry_json.entry_id)
                            .into();
                    format!("entry_{id:08x}")
                });
                if let Some(package) = table.package_by_id_mut(package_json.id) {
                    package.add_entry(&entry_json.type_name, &entry_name, value);
                }
            }
        }
        table
    }

    pub fn from_json_string(text: &str) -> Result<Self, serde_json::Error> {
        let document: TableJson = serde_json::from_str(text)?;
        Ok(Self::from_json(&document))
    }
}
