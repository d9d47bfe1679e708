//! Test utilities for building recents-list fixtures.
//!
//! This module provides reusable helpers for encoding in-memory binary
//! plists, keyed archives, and bookmark blobs, reducing duplication across
//! decoder tests. The encoders are intentionally independent of the parsing
//! code so the tests exercise a real byte-level round trip.
//!
//! # Panics
//!
//! All functions in this module may panic on invalid input since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;
use std::path::Path;

use crate::formats::bookmark;
use crate::formats::plist::Value;

/// Creates a bookmark blob for an absolute path.
///
/// # Examples
///
/// ```
/// use sflist_core::test_utils::bookmark_blob;
///
/// let blob = bookmark_blob("/Users/a/Projects/X".as_ref());
/// assert!(blob.starts_with(b"book"));
/// ```
#[must_use]
pub fn bookmark_blob(path: &Path) -> Vec<u8> {
    bookmark::create(path).unwrap()
}

/// A field value for an archive entry built with [`ArchiveBuilder`].
#[derive(Debug, Clone)]
pub enum EntryField {
    /// Raw data object (how bookmark blobs are archived).
    Blob(Vec<u8>),
    /// Raw string object.
    Text(String),
    /// String archived as a keyed `NSString` instance.
    KeyedText(String),
    /// Integer scalar.
    Int(i64),
}

/// Builder for keyed-archive recents fixtures.
///
/// Produces the on-disk layout of a shared-file-list file: a binary plist
/// with `$archiver`/`$objects`/`$top`, a keyed dictionary root holding an
/// `"items"` array, and one keyed dictionary per entry.
///
/// # Examples
///
/// ```
/// use sflist_core::test_utils::ArchiveBuilder;
/// use sflist_core::test_utils::EntryField;
///
/// let bytes = ArchiveBuilder::new()
///     .add_entry(&[("Bookmark", EntryField::Blob(vec![1, 2, 3]))])
///     .build();
/// assert!(bytes.starts_with(b"bplist00"));
/// ```
pub struct ArchiveBuilder {
    objects: Vec<Value>,
    entries: Vec<u64>,
    classes: HashMap<String, u64>,
    archiver: String,
    with_items: bool,
}

impl ArchiveBuilder {
    /// Creates a builder with an empty items list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: vec![Value::Text("$null".to_string())],
            entries: Vec::new(),
            classes: HashMap::new(),
            archiver: "NSKeyedArchiver".to_string(),
            with_items: true,
        }
    }

    /// Overrides the `$archiver` field.
    #[must_use]
    pub fn archiver(mut self, name: &str) -> Self {
        self.archiver = name.to_string();
        self
    }

    /// Builds a root whose items list is present but empty.
    #[must_use]
    pub fn root_empty_items(self) -> Self {
        self
    }

    /// Builds a root carrying no `"items"` key at all.
    #[must_use]
    pub fn root_without_items(mut self) -> Self {
        self.with_items = false;
        self
    }

    /// Appends an entry dictionary archived as `NSDictionary`.
    #[must_use]
    pub fn add_entry(self, fields: &[(&str, EntryField)]) -> Self {
        self.add_entry_with_class("NSDictionary", fields)
    }

    /// Appends an entry dictionary archived under an arbitrary class name.
    #[must_use]
    pub fn add_entry_with_class(mut self, class: &str, fields: &[(&str, EntryField)]) -> Self {
        let mut keys = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (key, field) in fields {
            keys.push(Value::Uid(self.push(Value::Text((*key).to_string()))));
            let value = match field {
                EntryField::Blob(blob) => self.push(Value::Bytes(blob.clone())),
                EntryField::Text(text) => self.push(Value::Text(text.clone())),
                EntryField::Int(int) => self.push(Value::Int(*int)),
                EntryField::KeyedText(text) => {
                    let class_uid = self.class("NSString");
                    let inner = self.push(Value::Text(text.clone()));
                    let mut dict = HashMap::new();
                    dict.insert("$class".to_string(), Value::Uid(class_uid));
                    dict.insert("NS.string".to_string(), Value::Uid(inner));
                    self.push(Value::Dict(dict))
                }
            };
            values.push(Value::Uid(value));
        }

        let class_uid = self.class(class);
        let mut dict = HashMap::new();
        dict.insert("$class".to_string(), Value::Uid(class_uid));
        dict.insert("NS.keys".to_string(), Value::Array(keys));
        dict.insert("NS.objects".to_string(), Value::Array(values));
        let entry = self.push(Value::Dict(dict));
        self.entries.push(entry);
        self
    }

    /// Encodes the archive to binary plist bytes.
    #[must_use]
    pub fn build(mut self) -> Vec<u8> {
        let array_class = self.class("NSArray");
        let items: Vec<Value> = self.entries.iter().map(|uid| Value::Uid(*uid)).collect();
        let mut items_dict = HashMap::new();
        items_dict.insert("$class".to_string(), Value::Uid(array_class));
        items_dict.insert("NS.objects".to_string(), Value::Array(items));
        let items_uid = self.push(Value::Dict(items_dict));

        let (root_key, root_value) = if self.with_items {
            ("items", items_uid)
        } else {
            ("properties", items_uid)
        };
        let key_uid = self.push(Value::Text(root_key.to_string()));
        let dict_class = self.class("NSDictionary");
        let mut root_dict = HashMap::new();
        root_dict.insert("$class".to_string(), Value::Uid(dict_class));
        root_dict.insert("NS.keys".to_string(), Value::Array(vec![Value::Uid(key_uid)]));
        root_dict.insert(
            "NS.objects".to_string(),
            Value::Array(vec![Value::Uid(root_value)]),
        );
        let root_uid = self.push(Value::Dict(root_dict));

        let mut top = HashMap::new();
        top.insert("root".to_string(), Value::Uid(root_uid));

        let mut plist = HashMap::new();
        plist.insert("$version".to_string(), Value::Int(100_000));
        plist.insert("$archiver".to_string(), Value::Text(self.archiver.clone()));
        plist.insert("$top".to_string(), Value::Dict(top));
        plist.insert("$objects".to_string(), Value::Array(self.objects.clone()));

        PlistWriter::encode(&Value::Dict(plist))
    }

    fn push(&mut self, value: Value) -> u64 {
        let uid = self.objects.len() as u64;
        self.objects.push(value);
        uid
    }

    fn class(&mut self, name: &str) -> u64 {
        if let Some(uid) = self.classes.get(name) {
            return *uid;
        }
        let mut descriptor = HashMap::new();
        descriptor.insert("$classname".to_string(), Value::Text(name.to_string()));
        descriptor.insert(
            "$classes".to_string(),
            Value::Array(vec![
                Value::Text(name.to_string()),
                Value::Text("NSObject".to_string()),
            ]),
        );
        let uid = self.push(Value::Dict(descriptor));
        self.classes.insert(name.to_string(), uid);
        uid
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Intermediate object form used by [`PlistWriter`] before reference widths
/// are known.
enum RawObject {
    /// Fully encoded marker plus payload.
    Scalar(Vec<u8>),
    /// Array of object indices.
    Array(Vec<usize>),
    /// Dictionary of key/value object index pairs.
    Dict(Vec<(usize, usize)>),
}

/// Minimal binary plist encoder for test fixtures.
///
/// Supports the object shapes the parser understands. The high-level entry
/// point is [`PlistWriter::encode`]; the `push_*` methods exist for building
/// deliberately malformed tables (wrong key types, reference cycles).
pub struct PlistWriter {
    objects: Vec<RawObject>,
    top: usize,
}

impl PlistWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            top: 0,
        }
    }

    /// Encodes a value tree into binary plist bytes.
    #[must_use]
    pub fn encode(value: &Value) -> Vec<u8> {
        let mut writer = Self::new();
        writer.top = writer.push_value(value);
        writer.finish()
    }

    /// Appends an integer object and returns its index.
    pub fn push_int(&mut self, value: i64) -> usize {
        self.push_scalar(encode_int(value))
    }

    /// Appends a dictionary object from raw key/value indices, marking it as
    /// the top object.
    pub fn push_dict_refs(&mut self, pairs: Vec<(usize, usize)>) -> usize {
        let index = self.objects.len();
        self.objects.push(RawObject::Dict(pairs));
        self.top = index;
        index
    }

    /// Appends an array object from raw element indices, marking it as the
    /// top object.
    pub fn push_array_refs(&mut self, children: Vec<usize>) -> usize {
        let index = self.objects.len();
        self.objects.push(RawObject::Array(children));
        self.top = index;
        index
    }

    /// Appends an array that references itself, marking it as the top
    /// object.
    pub fn push_self_referential_array(&mut self) -> usize {
        let index = self.objects.len();
        self.objects.push(RawObject::Array(vec![index]));
        self.top = index;
        index
    }

    /// Serializes the object table, offset table, and trailer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let num_objects = self.objects.len();
        assert!(num_objects > 0, "cannot encode an empty object table");
        let ref_size: usize = if num_objects <= 0xFF {
            1
        } else if num_objects <= 0xFFFF {
            2
        } else {
            4
        };

        let mut out: Vec<u8> = b"bplist00".to_vec();
        let mut offsets = Vec::with_capacity(num_objects);
        for object in &self.objects {
            offsets.push(out.len() as u64);
            match object {
                RawObject::Scalar(bytes) => out.extend_from_slice(bytes),
                RawObject::Array(children) => {
                    out.extend_from_slice(&marker_with_len(0xA, children.len()));
                    for child in children {
                        push_be(&mut out, *child as u64, ref_size);
                    }
                }
                RawObject::Dict(pairs) => {
                    out.extend_from_slice(&marker_with_len(0xD, pairs.len()));
                    for (key, _) in pairs {
                        push_be(&mut out, *key as u64, ref_size);
                    }
                    for (_, value) in pairs {
                        push_be(&mut out, *value as u64, ref_size);
                    }
                }
            }
        }

        let table_offset = out.len() as u64;
        let max_offset = offsets.last().copied().unwrap_or(0);
        let offset_int_size: usize = if max_offset <= 0xFF {
            1
        } else if max_offset <= 0xFFFF {
            2
        } else {
            4
        };
        for offset in &offsets {
            push_be(&mut out, *offset, offset_int_size);
        }

        // Trailer: padding, widths, then the three table scalars.
        out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        out.push(offset_int_size as u8);
        out.push(ref_size as u8);
        out.extend_from_slice(&(num_objects as u64).to_be_bytes());
        out.extend_from_slice(&(self.top as u64).to_be_bytes());
        out.extend_from_slice(&table_offset.to_be_bytes());
        out
    }

    fn push_scalar(&mut self, bytes: Vec<u8>) -> usize {
        let index = self.objects.len();
        self.objects.push(RawObject::Scalar(bytes));
        index
    }

    fn push_value(&mut self, value: &Value) -> usize {
        match value {
            Value::Null => self.push_scalar(vec![0x00]),
            Value::Bool(false) => self.push_scalar(vec![0x08]),
            Value::Bool(true) => self.push_scalar(vec![0x09]),
            Value::Int(i) => self.push_scalar(encode_int(*i)),
            Value::Real(r) => {
                let mut bytes = vec![0x23];
                bytes.extend_from_slice(&r.to_be_bytes());
                self.push_scalar(bytes)
            }
            Value::Date(d) => {
                let mut bytes = vec![0x33];
                bytes.extend_from_slice(&d.to_be_bytes());
                self.push_scalar(bytes)
            }
            Value::Bytes(data) => {
                let mut bytes = marker_with_len(0x4, data.len());
                bytes.extend_from_slice(data);
                self.push_scalar(bytes)
            }
            Value::Text(text) => self.push_scalar(encode_text(text)),
            Value::Uid(uid) => {
                let width = be_width(*uid);
                let mut bytes = vec![0x80 | (width as u8 - 1)];
                bytes.extend_from_slice(&uid.to_be_bytes()[8 - width..]);
                self.push_scalar(bytes)
            }
            Value::Array(items) => {
                let children: Vec<usize> = items.iter().map(|i| self.push_value(i)).collect();
                let index = self.objects.len();
                self.objects.push(RawObject::Array(children));
                index
            }
            Value::Dict(dict) => {
                let mut pairs = Vec::with_capacity(dict.len());
                for (key, value) in dict {
                    let key_index = self.push_scalar(encode_text(key));
                    let value_index = self.push_value(value);
                    pairs.push((key_index, value_index));
                }
                let index = self.objects.len();
                self.objects.push(RawObject::Dict(pairs));
                index
            }
        }
    }
}

impl Default for PlistWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn marker_with_len(kind: u8, len: usize) -> Vec<u8> {
    if len < 0x0F {
        vec![(kind << 4) | len as u8]
    } else {
        let mut bytes = vec![(kind << 4) | 0x0F];
        bytes.extend_from_slice(&encode_int(len as i64));
        bytes
    }
}

fn encode_int(value: i64) -> Vec<u8> {
    if (0..=0xFF).contains(&value) {
        vec![0x10, value as u8]
    } else if (0..=0xFFFF).contains(&value) {
        let mut bytes = vec![0x11];
        bytes.extend_from_slice(&(value as u16).to_be_bytes());
        bytes
    } else if (0..=0xFFFF_FFFF).contains(&value) {
        let mut bytes = vec![0x12];
        bytes.extend_from_slice(&(value as u32).to_be_bytes());
        bytes
    } else {
        let mut bytes = vec![0x13];
        bytes.extend_from_slice(&value.to_be_bytes());
        bytes
    }
}

fn encode_text(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        let mut bytes = marker_with_len(0x5, text.len());
        bytes.extend_from_slice(text.as_bytes());
        bytes
    } else {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut bytes = marker_with_len(0x6, units.len());
        for unit in units {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        bytes
    }
}

fn be_width(value: u64) -> usize {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFFFF_FFFF => 4,
        _ => 8,
    }
}

fn push_be(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}
