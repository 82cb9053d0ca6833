use crate::mix_id::format_id;
use crate::{ArchiveError, ByteCursor, FileType, IdScheme};
use indexmap::IndexMap;
use log::{debug, warn};
use std::fmt;
use std::ops::Range;

type Result<T> = std::result::Result<T, ArchiveError>;

pub const CHECKSUM_FLAG: u32 = 0x0001_0000;
pub const ENCRYPTED_FLAG: u32 = 0x0002_0000;
pub const PLAIN_HEADER_SIZE: usize = 6;
pub const INDEX_RECORD_SIZE: usize = 12;
pub const CHECKSUM_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// `count: u16, body_size: u32` straight away (Tiberian Dawn).
    Plain,
    /// A `flags: u32` word before the plain header.
    Flagged { checksum: bool },
    /// Flagged with a Blowfish-encrypted index. Recognized, never read.
    Encrypted { checksum: bool },
}

impl HeaderKind {
    pub fn has_checksum(&self) -> bool {
        match self {
            HeaderKind::Plain => false,
            HeaderKind::Flagged { checksum } | HeaderKind::Encrypted { checksum } => *checksum,
        }
    }

    fn index_offset(&self) -> usize {
        match self {
            HeaderKind::Plain => 0,
            _ => 4,
        }
    }
}

pub fn detect_header(data: &[u8]) -> Result<HeaderKind> {
    let mut cursor = ByteCursor::little(data);
    let leading = cursor.read_u16().map_err(|_| malformed("too small for a header"))?;
    if leading == 0 && data.len() > PLAIN_HEADER_SIZE {
        cursor.seek(0);
        let flags = cursor.read_u32()?;
        if flags & !(CHECKSUM_FLAG | ENCRYPTED_FLAG) == 0 {
            let checksum = flags & CHECKSUM_FLAG != 0;
            return Ok(if flags & ENCRYPTED_FLAG != 0 {
                HeaderKind::Encrypted { checksum }
            } else {
                HeaderKind::Flagged { checksum }
            });
        }
    }
    Ok(HeaderKind::Plain)
}

fn malformed(reason: &str) -> ArchiveError {
    ArchiveError::MalformedHeader(reason.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixEntry {
    pub id: u32,
    pub offset: u32,
    pub size: u32,
    pub name: Option<String>,
    pub file_type: Option<FileType>,
}

impl MixEntry {
    pub fn new(id: u32, offset: u32, size: u32) -> Self {
        MixEntry {
            id,
            offset,
            size,
            name: None,
            file_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryRef {
    Id(u32),
    Name(String),
}

impl From<u32> for EntryRef {
    fn from(id: u32) -> Self {
        EntryRef::Id(id)
    }
}

impl From<&str> for EntryRef {
    fn from(name: &str) -> Self {
        EntryRef::Name(name.to_string())
    }
}

impl From<String> for EntryRef {
    fn from(name: String) -> Self {
        EntryRef::Name(name)
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryRef::Id(id) => write!(f, "{}", format_id(*id)),
            EntryRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Parses names produced by the hash fallback, e.g. `1A2B3C4D.shp`.
pub fn parse_id_name(name: &str) -> Option<u32> {
    let stem = name.split('.').next()?;
    if stem.len() != 8 || !stem.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(stem, 16).ok()
}

struct IndexHeader {
    kind: HeaderKind,
    count: usize,
    body_offset: usize,
    body_size: usize,
}

fn read_index_header(data: &[u8]) -> Result<IndexHeader> {
    let kind = detect_header(data)?;
    if let HeaderKind::Encrypted { .. } = kind {
        return Err(ArchiveError::Encrypted);
    }
    let trailer = if kind.has_checksum() { CHECKSUM_SIZE } else { 0 };
    let mut cursor = ByteCursor::little(data);
    cursor.seek(kind.index_offset());
    let count = cursor
        .read_u16()
        .map_err(|_| malformed("too small for an index header"))? as usize;
    let body_size = cursor
        .read_u32()
        .map_err(|_| malformed("too small for an index header"))? as usize;
    let body_offset = kind.index_offset() + PLAIN_HEADER_SIZE + count * INDEX_RECORD_SIZE;
    if body_offset > data.len() {
        return Err(ArchiveError::MalformedHeader(format!(
            "index of {} entries does not fit in {} bytes",
            count,
            data.len()
        )));
    }
    if count > 0 && body_size == 0 {
        return Err(malformed("entries declared with an empty body"));
    }
    if body_offset + body_size + trailer > data.len() {
        return Err(ArchiveError::MalformedHeader(format!(
            "body of {} bytes at 0x{:x} exceeds archive size {}",
            body_size,
            body_offset,
            data.len()
        )));
    }
    Ok(IndexHeader {
        kind,
        count,
        body_offset,
        body_size,
    })
}

#[derive(Debug, Clone)]
pub struct MixArchive<'a> {
    data: &'a [u8],
    header: HeaderKind,
    scheme: IdScheme,
    entries: IndexMap<u32, MixEntry>,
    body_offset: usize,
    body_size: usize,
}

impl<'a> MixArchive<'a> {
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        MixArchive::with_scheme(data, IdScheme::default())
    }

    pub fn with_scheme(data: &'a [u8], scheme: IdScheme) -> Result<Self> {
        let header = read_index_header(data)?;
        let mut cursor = ByteCursor::little(data);
        cursor.seek(header.kind.index_offset() + PLAIN_HEADER_SIZE);
        let mut entries: IndexMap<u32, MixEntry> = IndexMap::with_capacity(header.count);
        for _ in 0..header.count {
            let id = cursor.read_u32()?;
            let offset = cursor.read_u32()?;
            let size = cursor.read_u32()?;
            if entries.contains_key(&id) {
                warn!("Duplicate MIX id {} ignored", format_id(id));
                continue;
            }
            entries.insert(id, MixEntry::new(id, offset, size));
        }
        debug!(
            "Opened {:?} MIX with {} entries and a {} byte body",
            header.kind,
            entries.len(),
            header.body_size
        );
        Ok(MixArchive {
            data,
            header: header.kind,
            scheme,
            entries,
            body_offset: header.body_offset,
            body_size: header.body_size,
        })
    }

    /// Validates a guessed header without trusting it: besides the header
    /// checks, the first `sample_cap` index records must fit the body.
    pub fn probe(data: &[u8], sample_cap: usize) -> bool {
        let header = match read_index_header(data) {
            Ok(header) => header,
            Err(_) => return false,
        };
        if header.count == 0 {
            return false;
        }
        let mut cursor = ByteCursor::little(data);
        cursor.seek(header.kind.index_offset() + PLAIN_HEADER_SIZE);
        for _ in 0..header.count.min(sample_cap) {
            let record = (cursor.read_u32(), cursor.read_u32(), cursor.read_u32());
            match record {
                (Ok(_), Ok(offset), Ok(size)) => {
                    if offset as usize + size as usize > header.body_size {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    pub fn header_kind(&self) -> HeaderKind {
        self.header
    }

    pub fn id_scheme(&self) -> IdScheme {
        self.scheme
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    pub fn body_size(&self) -> usize {
        self.body_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn id_of(&self, name: &str) -> u32 {
        self.scheme.id_of(name)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.contains_id(self.id_of(name))
    }

    pub fn entry(&self, id: u32) -> Option<&MixEntry> {
        self.entries.get(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MixEntry> {
        self.entries.values()
    }

    pub fn all_entries(&self) -> Vec<MixEntry> {
        self.entries.values().cloned().collect()
    }

    /// Maps a reference to an id present in this archive. Names are hashed
    /// first; a miss falls back to reading `XXXXXXXX.ext` as a raw id.
    pub fn resolve(&self, entry: &EntryRef) -> Option<u32> {
        match entry {
            EntryRef::Id(id) => Some(*id).filter(|id| self.contains_id(*id)),
            EntryRef::Name(name) => {
                let id = self.id_of(name);
                if self.contains_id(id) {
                    Some(id)
                } else {
                    parse_id_name(name).filter(|id| self.contains_id(*id))
                }
            }
        }
    }

    pub fn entry_range(&self, id: u32) -> Result<Range<usize>> {
        let entry = self
            .entries
            .get(&id)
            .ok_or_else(|| ArchiveError::NotFound(format_id(id)))?;
        let offset = entry.offset as usize;
        let size = entry.size as usize;
        if offset + size > self.body_size {
            return Err(ArchiveError::EntryOutOfBounds(
                id,
                offset,
                size,
                self.body_size,
            ));
        }
        let start = self.body_offset + offset;
        Ok(start..start + size)
    }

    pub fn open_by_id(&self, id: u32) -> Result<&'a [u8]> {
        let range = self.entry_range(id)?;
        Ok(&self.data[range])
    }

    pub fn open_by_name(&self, name: &str) -> Result<&'a [u8]> {
        self.open(&EntryRef::Name(name.to_string()))
    }

    pub fn open(&self, entry: &EntryRef) -> Result<&'a [u8]> {
        let id = self
            .resolve(entry)
            .ok_or_else(|| ArchiveError::NotFound(entry.to_string()))?;
        self.open_by_id(id)
    }

    /// Follows `path` through archives nested inside this one and returns
    /// the bytes of the last segment. An empty path yields this archive.
    pub fn open_nested(&self, path: &[EntryRef]) -> Result<&'a [u8]> {
        let mut bytes = self.data;
        let mut current = self.clone();
        for (i, segment) in path.iter().enumerate() {
            if i > 0 {
                current = match MixArchive::with_scheme(bytes, self.scheme) {
                    Ok(archive) => archive,
                    Err(ArchiveError::Encrypted) => return Err(ArchiveError::Encrypted),
                    Err(_) => return Err(ArchiveError::NotAContainer(path[i - 1].to_string())),
                };
            }
            bytes = current.open(segment)?;
        }
        Ok(bytes)
    }
}
