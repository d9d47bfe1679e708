//! Security-scoped bookmark data parsing and creation.
//!
//! Bookmark blobs are the little-endian `book` container: a 48-byte header,
//! a data region of typed items, and a table of contents mapping well-known
//! keys to item offsets. Resolution here is offline: the filesystem location
//! is recovered from the path-components record (key `0x1004`) and the
//! volume path record (key `0x2002`), and staleness is a stat against the
//! recovered path. No access grants are acquired and no UI is ever shown.
//!
//! All offsets in the container are relative to the end of the header.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::SflError;
use crate::error::Result;

/// Container magic at offset zero.
const MAGIC: &[u8] = b"book";

/// Fixed header length; the data region starts here.
const HEADER_LEN: usize = 48;

/// Format version written by the encoder.
const VERSION: u32 = 0x1004_0000;

/// Marker for the table of contents.
const TOC_MAGIC: u32 = 0xFFFF_FFFE;

/// Upper bound on TOC entries; real bookmarks carry a few dozen.
const MAX_TOC_ENTRIES: u32 = 4096;

/// Item type: UTF-8 string.
const TYPE_STRING: u32 = 0x0101;

/// Item type: array of item offsets.
const TYPE_ARRAY: u32 = 0x0601;

/// TOC key: target path split into components.
const KEY_PATH_COMPONENTS: u32 = 0x1004;

/// TOC key: mount path of the containing volume.
const KEY_VOLUME_PATH: u32 = 0x2002;

/// Outcome of resolving a bookmark blob.
///
/// `is_stale` records that the target no longer exists at the encoded
/// location (moved or deleted since the bookmark was minted). Staleness does
/// not block resolution; refreshing stale blobs is the bookmark store's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBookmark {
    /// Filesystem path encoded in the bookmark.
    pub path: PathBuf,
    /// Target is missing from the encoded location.
    pub is_stale: bool,
}

fn malformed(reason: impl Into<String>) -> SflError {
    SflError::MalformedBookmark(reason.into())
}

/// Resolves a bookmark blob to its filesystem path.
///
/// # Errors
///
/// Returns `SflError::MalformedBookmark` if the blob is truncated, carries
/// the wrong magic, lacks a path record, or encodes suspicious path
/// components.
pub fn resolve(data: &[u8]) -> Result<ResolvedBookmark> {
    let reader = Reader::new(data)?;
    let components = reader.path_components()?;
    let volume = reader.volume_path()?;

    let mut path = PathBuf::from(volume.unwrap_or_else(|| "/".to_string()));
    for component in &components {
        validate_component(component)?;
        path.push(component);
    }

    let is_stale = !path.exists();
    Ok(ResolvedBookmark { path, is_stale })
}

/// Creates a bookmark blob for an absolute filesystem path.
///
/// The counterpart of [`resolve`]; used when persisting authorized
/// directories and when refreshing a stale blob in place.
///
/// # Errors
///
/// Returns `SflError::MalformedBookmark` if the path is relative or not
/// valid UTF-8.
pub fn create(path: &Path) -> Result<Vec<u8>> {
    if !path.is_absolute() {
        return Err(malformed(format!(
            "bookmark target must be absolute: {}",
            path.display()
        )));
    }
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir => {}
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| malformed("bookmark target is not valid UTF-8"))?;
                components.push(part);
            }
            _ => return Err(malformed("bookmark target must be a normalized path")),
        }
    }
    Ok(encode_components(&components, "/"))
}

fn validate_component(component: &str) -> Result<()> {
    if component.is_empty() || component == "." || component == ".." || component.contains('/') {
        return Err(malformed(format!(
            "suspicious path component {component:?}"
        )));
    }
    Ok(())
}

/// Encodes path components and a volume path into the container layout.
pub(crate) fn encode_components(components: &[&str], volume: &str) -> Vec<u8> {
    let mut writer = Writer::new();
    let component_offsets: Vec<u32> = components
        .iter()
        .map(|c| writer.push_item(TYPE_STRING, c.as_bytes()))
        .collect();

    let mut array_payload = Vec::with_capacity(component_offsets.len() * 4);
    for offset in &component_offsets {
        array_payload.extend_from_slice(&offset.to_le_bytes());
    }
    let path_offset = writer.push_item(TYPE_ARRAY, &array_payload);
    let volume_offset = writer.push_item(TYPE_STRING, volume.as_bytes());

    writer.finish(&[
        (KEY_PATH_COMPONENTS, path_offset),
        (KEY_VOLUME_PATH, volume_offset),
    ])
}

struct Reader<'a> {
    /// Data region: everything after the fixed header.
    region: &'a [u8],
    /// Key to item-offset pairs from the first table of contents.
    toc: Vec<(u32, u32)>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_LEN + 4 {
            return Err(malformed("blob too short for header"));
        }
        if !data.starts_with(MAGIC) {
            return Err(malformed("missing book magic"));
        }
        let total_size = read_u32(data, 4)? as usize;
        if total_size > data.len() || total_size < HEADER_LEN + 4 {
            return Err(malformed("declared size out of range"));
        }
        let header_size = read_u32(data, 12)? as usize;
        if header_size != HEADER_LEN {
            return Err(malformed("unexpected header size"));
        }

        let region = &data[HEADER_LEN..];
        let toc_offset = read_u32(region, 0)? as usize;
        let toc_magic = read_u32(region, toc_offset + 4)?;
        if toc_magic != TOC_MAGIC {
            return Err(malformed("missing table of contents"));
        }
        let count = read_u32(region, toc_offset + 16)?;
        if count > MAX_TOC_ENTRIES {
            return Err(malformed("oversized table of contents"));
        }

        let mut toc = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let entry = toc_offset + 20 + i * 12;
            let key = read_u32(region, entry)?;
            let offset = read_u32(region, entry + 4)?;
            toc.push((key, offset));
        }
        Ok(Self { region, toc })
    }

    fn find(&self, key: u32) -> Option<u32> {
        self.toc
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, offset)| *offset)
    }

    /// Reads an item's payload, checking its declared type.
    fn item(&self, offset: u32, expected_type: u32) -> Result<&'a [u8]> {
        let offset = offset as usize;
        let length = read_u32(self.region, offset)? as usize;
        let item_type = read_u32(self.region, offset + 4)?;
        if item_type != expected_type {
            return Err(malformed(format!(
                "unexpected item type {item_type:#06x}, wanted {expected_type:#06x}"
            )));
        }
        let start = offset + 8;
        let end = start
            .checked_add(length)
            .ok_or_else(|| malformed("item length overflow"))?;
        self.region
            .get(start..end)
            .ok_or_else(|| malformed("item payload truncated"))
    }

    fn string_item(&self, offset: u32) -> Result<String> {
        let payload = self.item(offset, TYPE_STRING)?;
        String::from_utf8(payload.to_vec()).map_err(|_| malformed("string item is not UTF-8"))
    }

    fn path_components(&self) -> Result<Vec<String>> {
        let offset = self
            .find(KEY_PATH_COMPONENTS)
            .ok_or_else(|| malformed("missing path components record"))?;
        let payload = self.item(offset, TYPE_ARRAY)?;
        if payload.len() % 4 != 0 {
            return Err(malformed("ragged component array"));
        }
        let mut components = Vec::with_capacity(payload.len() / 4);
        for chunk in payload.chunks_exact(4) {
            let element = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            components.push(self.string_item(element)?);
        }
        if components.is_empty() {
            return Err(malformed("empty path components record"));
        }
        Ok(components)
    }

    fn volume_path(&self) -> Result<Option<String>> {
        match self.find(KEY_VOLUME_PATH) {
            Some(offset) => Ok(Some(self.string_item(offset)?)),
            None => Ok(None),
        }
    }
}

struct Writer {
    region: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        // Reserve the leading TOC pointer; patched in finish().
        Self {
            region: vec![0, 0, 0, 0],
        }
    }

    /// Appends one typed item and returns its region-relative offset.
    #[allow(clippy::cast_possible_truncation)]
    fn push_item(&mut self, item_type: u32, payload: &[u8]) -> u32 {
        let offset = self.region.len() as u32;
        self.region
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.region.extend_from_slice(&item_type.to_le_bytes());
        self.region.extend_from_slice(payload);
        while self.region.len() % 4 != 0 {
            self.region.push(0);
        }
        offset
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(mut self, entries: &[(u32, u32)]) -> Vec<u8> {
        let toc_offset = self.region.len() as u32;
        self.region[0..4].copy_from_slice(&toc_offset.to_le_bytes());

        let toc_size = (20 + entries.len() * 12) as u32;
        self.region.extend_from_slice(&toc_size.to_le_bytes());
        self.region.extend_from_slice(&TOC_MAGIC.to_le_bytes());
        self.region.extend_from_slice(&1u32.to_le_bytes());
        self.region.extend_from_slice(&0u32.to_le_bytes());
        self.region
            .extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for (key, offset) in entries {
            self.region.extend_from_slice(&key.to_le_bytes());
            self.region.extend_from_slice(&offset.to_le_bytes());
            self.region.extend_from_slice(&0u32.to_le_bytes());
        }

        let total = (HEADER_LEN + self.region.len()) as u32;
        let mut blob = Vec::with_capacity(total as usize);
        blob.extend_from_slice(MAGIC);
        blob.extend_from_slice(&total.to_le_bytes());
        blob.extend_from_slice(&VERSION.to_le_bytes());
        blob.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
        blob.resize(HEADER_LEN, 0);
        blob.extend_from_slice(&self.region);
        blob
    }
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let end = offset
        .checked_add(4)
        .ok_or_else(|| malformed("offset overflow"))?;
    let raw = data
        .get(offset..end)
        .ok_or_else(|| malformed("unexpected end of blob"))?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
