//! Entry points for callers that hold whole archives in memory.

use crate::palette_resolver::{PaletteRequest, PaletteResolver, PaletteSelection, ResourceIndex};
use crate::{
    ArchiveError, BuildEntry, BuildError, EntryRef, GlobalMixDatabase, MixArchive, MixBuilder,
    MixEntry, NameTable, Sniffer,
};

/// Every entry in on-disk order with names from the name databases.
/// Named entries take their type from the extension, the rest are
/// sniffed. Entries nobody could name keep `name: None`.
pub fn list_entries(bytes: &[u8], global: Option<&GlobalMixDatabase>) -> Result<Vec<MixEntry>, ArchiveError> {
    let archive = MixArchive::from_bytes(bytes)?;
    let table = NameTable::new(&archive, global);
    let sniffer = Sniffer::default();
    let mut entries = Vec::with_capacity(archive.len());
    for entry in archive.entries() {
        let name = table.known_name(entry.id).map(|known| known.name);
        let file_type = archive
            .open_by_id(entry.id)
            .ok()
            .and_then(|data| sniffer.type_for_name(name.as_deref(), data));
        let mut listed = entry.clone();
        listed.name = name;
        listed.file_type = file_type;
        entries.push(listed);
    }
    Ok(entries)
}

pub fn extract<'a>(bytes: &'a [u8], entry: &EntryRef) -> Result<&'a [u8], ArchiveError> {
    MixArchive::from_bytes(bytes)?.open(entry)
}

pub fn extract_nested<'a>(bytes: &'a [u8], path: &[EntryRef]) -> Result<&'a [u8], ArchiveError> {
    MixArchive::from_bytes(bytes)?.open_nested(path)
}

pub fn build_archive(entries: &[BuildEntry]) -> Result<Vec<u8>, BuildError> {
    MixBuilder::new().build(entries)
}

pub fn resolve_palette(
    request: &PaletteRequest,
    available: &[String],
    overlay: Option<&dyn ResourceIndex>,
) -> PaletteSelection {
    let resolver = PaletteResolver::new();
    match overlay {
        Some(overlay) => resolver.with_overlay(overlay).resolve(request, available),
        None => resolver.resolve(request, available),
    }
}
