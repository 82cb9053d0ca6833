use crate::mix_id::format_id;
use crate::{GameType, GlobalMixDatabase, LocalMixDatabase, MixArchive, Sniffer};
use log::debug;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameSource {
    Local,
    Global,
    /// `XXXXXXXX[.ext]` built from the id.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub source: NameSource,
}

/// Maps the ids of one archive back to filenames: the archive's own name
/// database first, then the shared global one, then the hex id.
#[derive(Debug)]
pub struct NameTable<'a> {
    archive: &'a MixArchive<'a>,
    global: Option<&'a GlobalMixDatabase>,
    game: Option<GameType>,
    local: FxHashMap<u32, String>,
    sniffer: Sniffer,
}

impl<'a> NameTable<'a> {
    pub fn new(archive: &'a MixArchive<'a>, global: Option<&'a GlobalMixDatabase>) -> Self {
        NameTable::with_sniffer(archive, global, Sniffer::default())
    }

    pub fn with_sniffer(
        archive: &'a MixArchive<'a>,
        global: Option<&'a GlobalMixDatabase>,
        sniffer: Sniffer,
    ) -> Self {
        let scheme = archive.id_scheme();
        let mut table = NameTable {
            archive,
            global,
            game: None,
            local: FxHashMap::default(),
            sniffer,
        };
        let bytes = match archive.open_by_id(LocalMixDatabase::id(scheme)) {
            Ok(bytes) => bytes,
            Err(_) => return table,
        };
        match LocalMixDatabase::from_bytes(bytes) {
            Ok(database) => {
                for (id, name) in database.ids(scheme) {
                    table.local.entry(id).or_insert_with(|| name.to_string());
                }
                debug!(
                    "Loaded {} local names for game {}",
                    table.local.len(),
                    database.game
                );
                table.game = Some(database.game);
            }
            Err(err) => debug!("Ignoring unreadable local mix database: {}", err),
        }
        table
    }

    pub fn game(&self) -> Option<GameType> {
        self.game
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    pub fn known_name(&self, id: u32) -> Option<ResolvedName> {
        if let Some(name) = self.local.get(&id) {
            return Some(ResolvedName {
                name: name.clone(),
                source: NameSource::Local,
            });
        }
        self.global
            .and_then(|global| global.lookup(id, self.game))
            .map(|name| ResolvedName {
                name: name.to_string(),
                source: NameSource::Global,
            })
    }

    pub fn resolve(&self, id: u32) -> ResolvedName {
        if let Some(known) = self.known_name(id) {
            return known;
        }
        let mut name = format_id(id);
        let extension = self
            .archive
            .open_by_id(id)
            .ok()
            .and_then(|bytes| self.sniffer.guess_extension(None, bytes));
        if let Some(extension) = extension {
            name.push('.');
            name.push_str(&extension);
        }
        ResolvedName {
            name,
            source: NameSource::Fallback,
        }
    }
}
