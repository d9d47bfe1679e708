//! Binary property list parsing.
//!
//! Parses the `bplist00` container that carries a keyed archive. Only the
//! leaf and collection shapes needed by the archive layer are produced; the
//! parser is defensive about truncation, oversized counts, and reference
//! cycles because the input file is written by other processes and must be
//! treated as untrusted.

use std::collections::HashMap;

use crate::SflError;
use crate::error::Result;

/// Magic prefix for binary property lists.
const MAGIC: &[u8] = b"bplist0";

/// Trailer length at the end of every binary plist.
const TRAILER_LEN: usize = 32;

/// Default object-count cap when no configuration is supplied.
pub const DEFAULT_MAX_OBJECTS: usize = 65_536;

/// Default nesting-depth cap when no configuration is supplied.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A decoded property list value.
///
/// `Uid` is the keyed-archive object reference; it only has meaning to the
/// archive layer that resolves it against the `$objects` table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null marker.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Real(f64),
    /// Date as seconds since the 2001-01-01 epoch.
    Date(f64),
    /// Opaque byte blob.
    Bytes(Vec<u8>),
    /// String (ASCII or UTF-16 in the container).
    Text(String),
    /// Keyed-archive object reference.
    Uid(u64),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// String-keyed mapping.
    Dict(HashMap<String, Value>),
}

impl Value {
    /// Returns the contained string, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained dictionary, if this is a dict value.
    #[must_use]
    pub fn as_dict(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the contained reference, if this is a uid value.
    #[must_use]
    pub fn as_uid(&self) -> Option<u64> {
        match self {
            Self::Uid(u) => Some(*u),
            _ => None,
        }
    }
}

/// Parses a binary property list with default limits.
///
/// # Errors
///
/// Returns `SflError::MalformedPlist` if the input is empty, truncated, or
/// structurally invalid.
pub fn parse(bytes: &[u8]) -> Result<Value> {
    parse_with_limits(bytes, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_DEPTH)
}

/// Parses a binary property list with explicit object-count and depth caps.
///
/// # Errors
///
/// Returns `SflError::MalformedPlist` if the input is invalid or exceeds the
/// supplied limits.
pub fn parse_with_limits(bytes: &[u8], max_objects: usize, max_depth: usize) -> Result<Value> {
    let parser = Parser::new(bytes, max_objects, max_depth)?;
    parser.parse_top()
}

fn malformed(reason: impl Into<String>) -> SflError {
    SflError::MalformedPlist(reason.into())
}

struct Parser<'a> {
    data: &'a [u8],
    offsets: Vec<usize>,
    ref_size: usize,
    top_object: usize,
    max_depth: usize,
    work_budget: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8], max_objects: usize, max_depth: usize) -> Result<Self> {
        if data.len() < MAGIC.len() + 1 + TRAILER_LEN {
            return Err(malformed("input too short for header and trailer"));
        }
        if !data.starts_with(MAGIC) {
            return Err(malformed("missing bplist magic"));
        }

        let trailer = &data[data.len() - TRAILER_LEN..];
        let offset_int_size = trailer[6] as usize;
        let ref_size = trailer[7] as usize;
        let num_objects = be_uint(&trailer[8..16]);
        let top_object = be_uint(&trailer[16..24]);
        let table_offset = be_uint(&trailer[24..32]);

        if !(1..=8).contains(&offset_int_size) || !(1..=8).contains(&ref_size) {
            return Err(malformed("invalid trailer field widths"));
        }
        let num_objects = usize::try_from(num_objects)
            .map_err(|_| malformed("object count does not fit in memory"))?;
        if num_objects == 0 {
            return Err(malformed("empty object table"));
        }
        if num_objects > max_objects {
            return Err(malformed(format!(
                "object count {num_objects} exceeds cap {max_objects}"
            )));
        }
        let top_object =
            usize::try_from(top_object).map_err(|_| malformed("top object out of range"))?;
        if top_object >= num_objects {
            return Err(malformed("top object index out of range"));
        }

        let table_offset =
            usize::try_from(table_offset).map_err(|_| malformed("offset table out of range"))?;
        let table_end = table_offset
            .checked_add(num_objects * offset_int_size)
            .ok_or_else(|| malformed("offset table overflow"))?;
        if table_end > data.len() - TRAILER_LEN {
            return Err(malformed("offset table extends past trailer"));
        }

        let body_len = data.len() - TRAILER_LEN;
        let mut offsets = Vec::with_capacity(num_objects);
        for i in 0..num_objects {
            let start = table_offset + i * offset_int_size;
            let off = be_uint(&data[start..start + offset_int_size]);
            let off = usize::try_from(off).map_err(|_| malformed("object offset out of range"))?;
            if off >= body_len {
                return Err(malformed("object offset past end of data"));
            }
            offsets.push(off);
        }

        // Shared references let a small file fan out into far more visits
        // than it has objects. Every honest visit is backed by a reference
        // slot in the file, so total visits are bounded by the input size.
        let work_budget = max_objects.max(data.len());

        Ok(Self {
            data,
            offsets,
            ref_size,
            top_object,
            max_depth,
            work_budget,
        })
    }

    fn parse_top(&self) -> Result<Value> {
        let mut visiting = vec![false; self.offsets.len()];
        let mut work = self.work_budget;
        self.parse_object(self.top_object, 0, &mut visiting, &mut work)
    }

    fn parse_object(
        &self,
        index: usize,
        depth: usize,
        visiting: &mut Vec<bool>,
        work: &mut usize,
    ) -> Result<Value> {
        if depth > self.max_depth {
            return Err(malformed("nesting depth exceeds cap"));
        }
        if *work == 0 {
            return Err(malformed("shared references expand past the work cap"));
        }
        *work -= 1;
        if visiting[index] {
            return Err(malformed("reference cycle in object table"));
        }

        let offset = self.offsets[index];
        let marker = self.byte(offset)?;
        let kind = marker >> 4;
        let info = (marker & 0x0F) as usize;

        match kind {
            0x0 => match marker {
                0x00 => Ok(Value::Null),
                0x08 => Ok(Value::Bool(false)),
                0x09 => Ok(Value::Bool(true)),
                _ => Err(malformed(format!("unknown singleton marker {marker:#04x}"))),
            },
            0x1 => self.parse_int(offset + 1, info),
            0x2 => self.parse_real(offset + 1, info),
            0x3 => {
                if info != 3 {
                    return Err(malformed("date must be an 8-byte real"));
                }
                let raw = self.slice(offset + 1, 8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Ok(Value::Date(f64::from_be_bytes(buf)))
            }
            0x4 => {
                let (len, data_start) = self.collection_len(offset, info)?;
                Ok(Value::Bytes(self.slice(data_start, len)?.to_vec()))
            }
            0x5 => {
                let (len, data_start) = self.collection_len(offset, info)?;
                let raw = self.slice(data_start, len)?;
                let text = std::str::from_utf8(raw)
                    .map_err(|_| malformed("ascii string contains invalid bytes"))?;
                Ok(Value::Text(text.to_string()))
            }
            0x6 => {
                let (chars, data_start) = self.collection_len(offset, info)?;
                let byte_len = chars
                    .checked_mul(2)
                    .ok_or_else(|| malformed("utf16 length overflow"))?;
                let raw = self.slice(data_start, byte_len)?;
                let units: Vec<u16> = raw
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let text = String::from_utf16(&units)
                    .map_err(|_| malformed("invalid utf16 string"))?;
                Ok(Value::Text(text))
            }
            0x8 => {
                let raw = self.slice(offset + 1, info + 1)?;
                Ok(Value::Uid(be_uint(raw)))
            }
            0xA | 0xC => {
                // Sets are rare in keyed archives; their elements are
                // decoded with array semantics since order is already
                // unspecified in the container.
                let (count, refs_start) = self.collection_len(offset, info)?;
                visiting[index] = true;
                let result = self.parse_ref_list(refs_start, count, depth, visiting, work);
                visiting[index] = false;
                Ok(Value::Array(result?))
            }
            0xD => {
                let (count, refs_start) = self.collection_len(offset, info)?;
                visiting[index] = true;
                let result = self.parse_dict(refs_start, count, depth, visiting, work);
                visiting[index] = false;
                result
            }
            _ => Err(malformed(format!("unknown object marker {marker:#04x}"))),
        }
    }

    fn parse_ref_list(
        &self,
        refs_start: usize,
        count: usize,
        depth: usize,
        visiting: &mut Vec<bool>,
        work: &mut usize,
    ) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let index = self.object_ref(refs_start + i * self.ref_size)?;
            values.push(self.parse_object(index, depth + 1, visiting, work)?);
        }
        Ok(values)
    }

    fn parse_dict(
        &self,
        refs_start: usize,
        count: usize,
        depth: usize,
        visiting: &mut Vec<bool>,
        work: &mut usize,
    ) -> Result<Value> {
        let values_start = refs_start + count * self.ref_size;
        let mut dict = HashMap::with_capacity(count);
        for i in 0..count {
            let key_index = self.object_ref(refs_start + i * self.ref_size)?;
            let value_index = self.object_ref(values_start + i * self.ref_size)?;
            let key = match self.parse_object(key_index, depth + 1, visiting, work)? {
                Value::Text(s) => s,
                other => {
                    return Err(malformed(format!("non-string dictionary key: {other:?}")));
                }
            };
            let value = self.parse_object(value_index, depth + 1, visiting, work)?;
            dict.insert(key, value);
        }
        Ok(Value::Dict(dict))
    }

    fn parse_int(&self, start: usize, info: usize) -> Result<Value> {
        if info > 3 {
            return Err(malformed("integer wider than 8 bytes"));
        }
        let len = 1 << info;
        let raw = self.slice(start, len)?;
        if len == 8 {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            Ok(Value::Int(i64::from_be_bytes(buf)))
        } else {
            let value = be_uint(raw);
            Ok(Value::Int(i64::try_from(value)
                .map_err(|_| malformed("integer out of range"))?))
        }
    }

    fn parse_real(&self, start: usize, info: usize) -> Result<Value> {
        match info {
            2 => {
                let raw = self.slice(start, 4)?;
                let mut buf = [0u8; 4];
                buf.copy_from_slice(raw);
                Ok(Value::Real(f64::from(f32::from_be_bytes(buf))))
            }
            3 => {
                let raw = self.slice(start, 8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                Ok(Value::Real(f64::from_be_bytes(buf)))
            }
            _ => Err(malformed("unsupported real width")),
        }
    }

    /// Reads a collection length, following the extended-length encoding
    /// where the low marker nibble of 0xF defers to a following int object.
    fn collection_len(&self, marker_offset: usize, info: usize) -> Result<(usize, usize)> {
        if info != 0x0F {
            return Ok((info, marker_offset + 1));
        }
        let len_marker = self.byte(marker_offset + 1)?;
        if len_marker >> 4 != 0x1 {
            return Err(malformed("extended length is not an integer"));
        }
        let width_exp = (len_marker & 0x0F) as usize;
        if width_exp > 3 {
            return Err(malformed("extended length wider than 8 bytes"));
        }
        let width = 1 << width_exp;
        let raw = self.slice(marker_offset + 2, width)?;
        let len = usize::try_from(be_uint(raw))
            .map_err(|_| malformed("collection length out of range"))?;
        Ok((len, marker_offset + 2 + width))
    }

    fn object_ref(&self, offset: usize) -> Result<usize> {
        let raw = self.slice(offset, self.ref_size)?;
        let index =
            usize::try_from(be_uint(raw)).map_err(|_| malformed("object ref out of range"))?;
        if index >= self.offsets.len() {
            return Err(malformed("object ref past end of table"));
        }
        Ok(index)
    }

    fn byte(&self, offset: usize) -> Result<u8> {
        self.data
            .get(offset)
            .copied()
            .ok_or_else(|| malformed("unexpected end of data"))
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| malformed("offset overflow"))?;
        self.data
            .get(offset..end)
            .ok_or_else(|| malformed("unexpected end of data"))
    }
}

/// Reads a big-endian unsigned integer of 1..=8 bytes.
fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::PlistWriter;

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(parse(&[]), Err(SflError::MalformedPlist(_))));
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let bytes = vec![b'x'; 64];
        assert!(matches!(parse(&bytes), Err(SflError::MalformedPlist(_))));
    }

    #[test]
    fn test_parse_rejects_truncated_plist() {
        let bytes = PlistWriter::encode(&Value::Text("hello".to_string()));
        for len in 0..bytes.len() {
            let result = parse(&bytes[..len]);
            assert!(result.is_err(), "truncation at {len} should fail");
        }
    }

    #[test]
    fn test_roundtrip_scalars() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(0),
            Value::Int(420_000),
            Value::Int(-7),
            Value::Real(1.5),
            Value::Text("items".to_string()),
            Value::Text("päth/юникод".to_string()),
            Value::Uid(3),
            Value::Bytes(vec![0, 1, 2, 255]),
        ] {
            let bytes = PlistWriter::encode(&value);
            assert_eq!(parse(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_roundtrip_nested_collections() {
        let mut dict = HashMap::new();
        dict.insert(
            "items".to_string(),
            Value::Array(vec![Value::Uid(1), Value::Uid(2)]),
        );
        dict.insert("version".to_string(), Value::Int(3));
        let value = Value::Dict(dict);
        let bytes = PlistWriter::encode(&value);
        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_long_string() {
        // Forces the extended-length encoding (> 14 elements).
        let value = Value::Text("x".repeat(300));
        let bytes = PlistWriter::encode(&value);
        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_large_array() {
        let value = Value::Array((0..100).map(Value::Int).collect());
        let bytes = PlistWriter::encode(&value);
        assert_eq!(parse(&bytes).unwrap(), value);
    }

    #[test]
    fn test_object_count_cap_enforced() {
        let value = Value::Array((0..50).map(Value::Int).collect());
        let bytes = PlistWriter::encode(&value);
        let result = parse_with_limits(&bytes, 10, DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(SflError::MalformedPlist(_))));
    }

    #[test]
    fn test_depth_cap_enforced() {
        let mut value = Value::Int(1);
        for _ in 0..20 {
            value = Value::Array(vec![value]);
        }
        let bytes = PlistWriter::encode(&value);
        assert!(parse(&bytes).is_ok());
        let result = parse_with_limits(&bytes, DEFAULT_MAX_OBJECTS, 5);
        assert!(matches!(result, Err(SflError::MalformedPlist(_))));
    }

    #[test]
    fn test_non_string_dict_key_rejected() {
        // Hand-build a dict whose key ref points at an integer object.
        let mut writer = PlistWriter::new();
        let key = writer.push_int(7);
        let val = writer.push_int(8);
        writer.push_dict_refs(vec![(key, val)]);
        let bytes = writer.finish();
        assert!(matches!(parse(&bytes), Err(SflError::MalformedPlist(_))));
    }

    #[test]
    fn test_shared_reference_parses_once_per_use() {
        let mut writer = PlistWriter::new();
        let shared = writer.push_int(7);
        writer.push_array_refs(vec![shared, shared]);
        let bytes = writer.finish();
        assert_eq!(
            parse(&bytes).unwrap(),
            Value::Array(vec![Value::Int(7), Value::Int(7)])
        );
    }

    #[test]
    fn test_shared_reference_amplification_rejected() {
        // Each array references the next object twice, doubling the walk at
        // every level. The table satisfies both the object and depth caps,
        // so only the work budget keeps this from costing 2^45 visits.
        let mut writer = PlistWriter::new();
        let mut prev = writer.push_int(1);
        for _ in 0..45 {
            prev = writer.push_array_refs(vec![prev, prev]);
        }
        let bytes = writer.finish();
        assert!(matches!(parse(&bytes), Err(SflError::MalformedPlist(_))));
    }

    #[test]
    fn test_self_referential_array_rejected() {
        let mut writer = PlistWriter::new();
        writer.push_self_referential_array();
        let bytes = writer.finish();
        assert!(matches!(parse(&bytes), Err(SflError::MalformedPlist(_))));
    }
}
