use crate::encoded_strings::to_windows_1252;
use crate::local_db::LOCAL_DATABASE_NAME;
use crate::mix_archive::{INDEX_RECORD_SIZE, PLAIN_HEADER_SIZE};
use crate::mix_id::format_id;
use crate::{BuildError, ByteWriter, Endian, GameType, IdScheme, LocalMixDatabase};
use log::{debug, warn};
use rustc_hash::FxHashMap;

type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEntry {
    pub filename: String,
    /// Written instead of the filename's id when set, e.g. for entries
    /// whose real name is unknown.
    pub id: Option<u32>,
    pub bytes: Vec<u8>,
}

impl BuildEntry {
    pub fn new(filename: &str, bytes: Vec<u8>) -> Self {
        BuildEntry {
            filename: filename.to_string(),
            id: None,
            bytes,
        }
    }

    pub fn with_id(filename: &str, id: u32, bytes: Vec<u8>) -> Self {
        BuildEntry {
            filename: filename.to_string(),
            id: Some(id),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameDatabaseSummary {
    pub file_name_count: usize,
    /// Entries whose filename does not hash to their id, such as hex
    /// fallback names.
    pub skipped_by_hash_mismatch: usize,
    pub replaced_existing: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MixBuilder {
    scheme: IdScheme,
    flagged: bool,
    sort_index: bool,
}

impl MixBuilder {
    pub fn new() -> Self {
        MixBuilder::default()
    }

    pub fn with_scheme(mut self, scheme: IdScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn flagged(mut self, flagged: bool) -> Self {
        self.flagged = flagged;
        self
    }

    /// Orders the index by signed id, the order the games binary search.
    /// The body keeps the input order either way.
    pub fn sort_index(mut self, sort_index: bool) -> Self {
        self.sort_index = sort_index;
        self
    }

    pub fn id_of(&self, entry: &BuildEntry) -> u32 {
        entry.id.unwrap_or_else(|| self.scheme.id_of(&entry.filename))
    }

    pub fn build(&self, entries: &[BuildEntry]) -> Result<Vec<u8>> {
        if entries.len() > u16::MAX as usize {
            return Err(BuildError::TooManyEntries(entries.len()));
        }
        let mut seen: FxHashMap<u32, &str> = FxHashMap::default();
        let mut records: Vec<(u32, u32, u32)> = Vec::with_capacity(entries.len());
        let mut offset: usize = 0;
        for entry in entries {
            if entry.filename.trim().is_empty() || to_windows_1252(&entry.filename).is_err() {
                return Err(BuildError::InvalidFilename(entry.filename.clone()));
            }
            let id = self.id_of(entry);
            if let Some(previous) = seen.insert(id, &entry.filename) {
                return Err(BuildError::DuplicateId(
                    id,
                    previous.to_string(),
                    entry.filename.clone(),
                ));
            }
            records.push((id, offset as u32, entry.bytes.len() as u32));
            offset += entry.bytes.len();
            if offset > u32::MAX as usize {
                return Err(BuildError::TooLarge(offset));
            }
        }
        if self.sort_index {
            records.sort_by_key(|(id, _, _)| *id as i32);
        }

        let flags_size = if self.flagged { 4 } else { 0 };
        let header_size = flags_size + PLAIN_HEADER_SIZE + records.len() * INDEX_RECORD_SIZE;
        let mut writer = ByteWriter::with_capacity(Endian::Little, header_size + offset);
        if self.flagged {
            writer.write_u32(0);
        }
        writer.write_u16(records.len() as u16);
        writer.write_u32(offset as u32);
        for (id, offset, size) in &records {
            writer.write_u32(*id);
            writer.write_u32(*offset);
            writer.write_u32(*size);
        }
        for entry in entries {
            writer.write_bytes(&entry.bytes);
        }
        debug!("Built MIX with {} entries and a {} byte body", records.len(), offset);
        Ok(writer.into_inner())
    }

    /// Drops any existing local mix database and appends a fresh one that
    /// names every other entry whose filename hashes to its id.
    pub fn upsert_name_database(
        &self,
        entries: Vec<BuildEntry>,
        game: GameType,
    ) -> Result<(Vec<BuildEntry>, NameDatabaseSummary)> {
        let database_id = LocalMixDatabase::id(self.scheme);
        let mut summary = NameDatabaseSummary::default();
        let mut database = LocalMixDatabase::new(game);
        let mut kept = Vec::with_capacity(entries.len() + 1);
        for entry in entries {
            let id = self.id_of(&entry);
            if id == database_id || entry.filename.eq_ignore_ascii_case(LOCAL_DATABASE_NAME) {
                summary.replaced_existing = true;
                continue;
            }
            if self.scheme.id_of(&entry.filename) == id {
                database.names.push(entry.filename.clone());
            } else {
                warn!(
                    "Leaving '{}' out of the name database, it does not hash to {}",
                    entry.filename,
                    format_id(id)
                );
                summary.skipped_by_hash_mismatch += 1;
            }
            kept.push(entry);
        }
        summary.file_name_count = database.names.len();
        kept.push(BuildEntry::new(LOCAL_DATABASE_NAME, database.serialize()?));
        Ok((kept, summary))
    }
}
