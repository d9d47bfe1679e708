//! Keyed-archive object graph decoding.
//!
//! A shared-file-list file is a keyed archive: a property list holding an
//! `$objects` table plus a `$top` entry pointing at the root, with nested
//! values spelled as `Uid` references into the table. Archives tag objects
//! with class names and the legacy reader would instantiate whatever the tag
//! named. This decoder instead enumerates the shapes it will materialize
//! (mapping, sequence, blob, text, null) and checks every class name
//! against the [`DecodeConfig`](crate::DecodeConfig) allow-list before
//! touching the payload. An unknown class fails the whole decode; a
//! malformed top-level structure gives no reliable partial data.

use std::collections::HashMap;

use crate::DecodeConfig;
use crate::SflError;
use crate::error::Result;
use crate::formats::plist;
use crate::formats::plist::Value;

/// Archiver name required in the `$archiver` field.
const ARCHIVER_NAME: &str = "NSKeyedArchiver";

/// A resolved node of the archived object graph.
///
/// References are fully resolved; consumers never see `Uid` values.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Archived null.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Real(f64),
    /// String value.
    Text(String),
    /// Opaque byte blob.
    Blob(Vec<u8>),
    /// Ordered sequence of nodes.
    Sequence(Vec<Object>),
    /// String-keyed mapping of nodes.
    Mapping(HashMap<String, Object>),
}

impl Object {
    /// Returns the contained mapping, if this is a mapping node.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&HashMap<String, Object>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the contained sequence, if this is a sequence node.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Object]> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained blob, if this is a blob node.
    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }
}

fn malformed(reason: impl Into<String>) -> SflError {
    SflError::MalformedArchive(reason.into())
}

/// Decodes a keyed archive into its root object graph.
///
/// Empty input is rejected before any parsing is attempted.
///
/// # Errors
///
/// - `SflError::MalformedPlist` if the container is not a binary plist
/// - `SflError::MalformedArchive` if the keyed-archive structure is invalid
/// - `SflError::DisallowedClass` if any object names a class outside the
///   allow-list
pub fn decode(bytes: &[u8], config: &DecodeConfig) -> Result<Object> {
    if bytes.is_empty() {
        return Err(malformed("empty input"));
    }

    let plist = plist::parse_with_limits(bytes, config.max_objects, config.max_depth)?;
    let Value::Dict(top) = plist else {
        return Err(malformed("top-level value is not a dictionary"));
    };

    match top.get("$archiver").and_then(Value::as_text) {
        Some(ARCHIVER_NAME) => {}
        Some(other) => return Err(malformed(format!("unsupported archiver {other:?}"))),
        None => return Err(malformed("missing $archiver field")),
    }

    let objects = match top.get("$objects") {
        Some(Value::Array(objects)) => objects,
        _ => return Err(malformed("missing $objects table")),
    };
    let root_uid = top
        .get("$top")
        .and_then(Value::as_dict)
        .and_then(|t| t.get("root"))
        .and_then(Value::as_uid)
        .ok_or_else(|| malformed("missing $top root reference"))?;

    let mut resolver = Resolver {
        objects,
        config,
        visiting: vec![false; objects.len()],
        // Shared table entries are resolved once per reference, so a small
        // table can fan out into far more visits than it has objects.
        // Honest visits are each backed by bytes in the file.
        work: config.max_objects.max(bytes.len()),
    };
    resolver.resolve_uid(root_uid, 0)
}

struct Resolver<'a> {
    objects: &'a [Value],
    config: &'a DecodeConfig,
    visiting: Vec<bool>,
    work: usize,
}

impl Resolver<'_> {
    fn resolve_uid(&mut self, uid: u64, depth: usize) -> Result<Object> {
        let index =
            usize::try_from(uid).map_err(|_| malformed("object reference out of range"))?;
        if index >= self.objects.len() {
            return Err(malformed("object reference past end of table"));
        }
        if self.visiting[index] {
            return Err(malformed("reference cycle in object graph"));
        }
        self.visiting[index] = true;
        let objects = self.objects;
        let result = self.resolve_value(&objects[index], depth);
        self.visiting[index] = false;
        result
    }

    fn resolve_value(&mut self, value: &Value, depth: usize) -> Result<Object> {
        if depth > self.config.max_depth {
            return Err(malformed("nesting depth exceeds cap"));
        }
        if self.work == 0 {
            return Err(malformed("shared references expand past the work cap"));
        }
        self.work -= 1;

        match value {
            Value::Null => Ok(Object::Null),
            Value::Bool(b) => Ok(Object::Bool(*b)),
            Value::Int(i) => Ok(Object::Int(*i)),
            Value::Real(r) | Value::Date(r) => Ok(Object::Real(*r)),
            Value::Bytes(b) => Ok(Object::Blob(b.clone())),
            // "$null" is the archiver's nil placeholder at table index 0.
            Value::Text(s) if s == "$null" => Ok(Object::Null),
            Value::Text(s) => Ok(Object::Text(s.clone())),
            Value::Uid(uid) => self.resolve_uid(*uid, depth + 1),
            Value::Array(items) => {
                let mut sequence = Vec::with_capacity(items.len());
                for item in items {
                    sequence.push(self.resolve_value(item, depth + 1)?);
                }
                Ok(Object::Sequence(sequence))
            }
            Value::Dict(dict) => self.resolve_dict(dict, depth),
        }
    }

    fn resolve_dict(&mut self, dict: &HashMap<String, Value>, depth: usize) -> Result<Object> {
        let Some(class_ref) = dict.get("$class") else {
            // Untagged dictionaries carry no instantiation risk; resolve
            // them as plain mappings.
            return self.resolve_plain_mapping(dict, depth);
        };

        let class_name = self.class_name(class_ref, depth)?;
        if !self.config.is_class_allowed(&class_name) {
            return Err(SflError::DisallowedClass { name: class_name });
        }

        if class_name == "NSNull" {
            return Ok(Object::Null);
        }
        if let Some(data) = dict.get("NS.data") {
            return match self.resolve_value(data, depth + 1)? {
                Object::Blob(b) => Ok(Object::Blob(b)),
                _ => Err(malformed("NS.data payload is not a blob")),
            };
        }
        if let Some(string) = dict.get("NS.string") {
            return match self.resolve_value(string, depth + 1)? {
                Object::Text(s) => Ok(Object::Text(s)),
                _ => Err(malformed("NS.string payload is not text")),
            };
        }
        if let Some(objects) = dict.get("NS.objects") {
            let values = match self.resolve_value(objects, depth + 1)? {
                Object::Sequence(values) => values,
                _ => return Err(malformed("NS.objects payload is not a sequence")),
            };
            return match dict.get("NS.keys") {
                Some(keys) => self.zip_keyed_mapping(keys, values, depth),
                None => Ok(Object::Sequence(values)),
            };
        }

        Err(malformed(format!(
            "unsupported object shape for class {class_name:?}"
        )))
    }

    fn resolve_plain_mapping(
        &mut self,
        dict: &HashMap<String, Value>,
        depth: usize,
    ) -> Result<Object> {
        let mut mapping = HashMap::with_capacity(dict.len());
        for (key, value) in dict {
            mapping.insert(key.clone(), self.resolve_value(value, depth + 1)?);
        }
        Ok(Object::Mapping(mapping))
    }

    fn zip_keyed_mapping(
        &mut self,
        keys: &Value,
        values: Vec<Object>,
        depth: usize,
    ) -> Result<Object> {
        let keys = match self.resolve_value(keys, depth + 1)? {
            Object::Sequence(keys) => keys,
            _ => return Err(malformed("NS.keys payload is not a sequence")),
        };
        if keys.len() != values.len() {
            return Err(malformed("NS.keys and NS.objects length mismatch"));
        }
        let mut mapping = HashMap::with_capacity(keys.len());
        for (key, value) in keys.into_iter().zip(values) {
            let Object::Text(key) = key else {
                return Err(malformed("non-string mapping key"));
            };
            mapping.insert(key, value);
        }
        Ok(Object::Mapping(mapping))
    }

    /// Resolves a `$class` reference to its `$classname` string.
    fn class_name(&mut self, class_ref: &Value, depth: usize) -> Result<String> {
        let descriptor = self.resolve_value(class_ref, depth + 1)?;
        let Object::Mapping(descriptor) = descriptor else {
            return Err(malformed("class descriptor is not a mapping"));
        };
        match descriptor.get("$classname") {
            Some(Object::Text(name)) => Ok(name.clone()),
            _ => Err(malformed("class descriptor missing $classname")),
        }
    }
}
