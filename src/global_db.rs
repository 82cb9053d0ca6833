use crate::{ByteCursor, GameType, NameDatabaseError};
use indexmap::IndexMap;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

type Result<T> = std::result::Result<T, NameDatabaseError>;

const SECTIONS: [GameType; 4] = [
    GameType::TiberianDawn,
    GameType::RedAlert,
    GameType::TiberianSun,
    GameType::RedAlert2,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalName {
    pub name: String,
    pub description: String,
}

fn section_for(game: GameType) -> Option<GameType> {
    match game {
        GameType::YurisRevenge => Some(GameType::RedAlert2),
        GameType::TiberianDawn
        | GameType::RedAlert
        | GameType::TiberianSun
        | GameType::RedAlert2 => Some(game),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalMixDatabase {
    sections: IndexMap<GameType, FxHashMap<u32, GlobalName>>,
}

impl GlobalMixDatabase {
    pub fn new() -> Self {
        GlobalMixDatabase::default()
    }

    /// Reads the XCC layout: per game, `count: u32` then `count` pairs of
    /// null-terminated name and description. Trailing sections may be absent.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut database = GlobalMixDatabase::new();
        let mut cursor = ByteCursor::little(bytes);
        for game in SECTIONS.iter() {
            if cursor.is_at_end() {
                break;
            }
            let count = cursor.read_u32()?;
            for _ in 0..count {
                let name = cursor.read_cstring()?;
                let description = cursor.read_cstring()?;
                database.insert(*game, name, description);
            }
        }
        debug!("Loaded global mix database with {} names", database.len());
        Ok(database)
    }

    pub fn insert(&mut self, game: GameType, name: String, description: String) {
        let section = section_for(game).unwrap_or(game);
        let id = section.id_scheme().id_of(&name);
        self.sections
            .entry(section)
            .or_insert_with(FxHashMap::default)
            .entry(id)
            .or_insert(GlobalName { name, description });
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks in the preferred game's section first, then in every section
    /// from the newest game back.
    pub fn lookup_entry(&self, id: u32, preferred: Option<GameType>) -> Option<&GlobalName> {
        let preferred = preferred.and_then(section_for);
        if let Some(found) = preferred
            .and_then(|game| self.sections.get(&game))
            .and_then(|section| section.get(&id))
        {
            return Some(found);
        }
        let extra = self
            .sections
            .iter()
            .filter(|(game, _)| !SECTIONS.contains(game))
            .map(|(_, section)| section);
        SECTIONS
            .iter()
            .rev()
            .filter(|game| Some(**game) != preferred)
            .filter_map(|game| self.sections.get(game))
            .chain(extra)
            .find_map(|section| section.get(&id))
    }

    pub fn lookup(&self, id: u32, preferred: Option<GameType>) -> Option<&str> {
        self.lookup_entry(id, preferred).map(|n| n.name.as_str())
    }
}

pub type DatabaseLoader = Box<dyn Fn() -> std::io::Result<Vec<u8>> + Send + Sync>;

/// Lazily loaded global database. Construct once, share behind an `Arc` and
/// pass it to whoever resolves names. The loader runs at most once even
/// with concurrent callers; later reads take no lock.
pub struct SharedNameDatabase {
    cell: OnceLock<GlobalMixDatabase>,
    loader: DatabaseLoader,
}

impl fmt::Debug for SharedNameDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedNameDatabase")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl SharedNameDatabase {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> std::io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        SharedNameDatabase {
            cell: OnceLock::new(),
            loader: Box::new(loader),
        }
    }

    pub fn preloaded(database: GlobalMixDatabase) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(database);
        SharedNameDatabase {
            cell,
            loader: Box::new(|| Ok(Vec::new())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// A failed load leaves an empty database behind; names then fall
    /// through to the hash fallback.
    pub fn get(&self) -> &GlobalMixDatabase {
        self.cell.get_or_init(|| {
            let bytes = match (self.loader)() {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("Failed to read global mix database: {}", err);
                    return GlobalMixDatabase::new();
                }
            };
            GlobalMixDatabase::from_bytes(&bytes).unwrap_or_else(|err| {
                warn!("Failed to parse global mix database: {}", err);
                GlobalMixDatabase::new()
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mix_id::mix_id;
    use crate::IdScheme;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn raw_database(sections: &[&[(&str, &str)]]) -> Vec<u8> {
        let mut raw = Vec::new();
        for section in sections {
            raw.extend(&(section.len() as u32).to_le_bytes());
            for (name, description) in section.iter() {
                raw.extend(name.as_bytes());
                raw.push(0);
                raw.extend(description.as_bytes());
                raw.push(0);
            }
        }
        raw
    }

    #[test]
    fn parse_sections() {
        let raw = raw_database(&[
            &[("conquer.mix", "Main")],
            &[],
            &[("tibsun.mix", "")],
            &[("ra2.mix", "Main"), ("rules.ini", "Rules")],
        ]);
        let database = GlobalMixDatabase::from_bytes(&raw).unwrap();
        assert_eq!(4, database.len());
        assert_eq!(Some("ra2.mix"), database.lookup(mix_id("ra2.mix"), None));
        let legacy = IdScheme::Legacy.id_of("conquer.mix");
        assert_eq!(Some("conquer.mix"), database.lookup(legacy, None));
        let entry = database.lookup_entry(mix_id("rules.ini"), None).unwrap();
        assert_eq!("Rules", entry.description);
    }

    #[test]
    fn missing_trailing_sections() {
        let raw = raw_database(&[&[("conquer.mix", "")]]);
        let database = GlobalMixDatabase::from_bytes(&raw).unwrap();
        assert_eq!(1, database.len());
    }

    #[test]
    fn truncated_section_fails() {
        let mut raw = raw_database(&[&[("conquer.mix", "")]]);
        raw.pop();
        assert!(GlobalMixDatabase::from_bytes(&raw).is_err());
    }

    #[test]
    fn preferred_section_wins() {
        let mut database = GlobalMixDatabase::new();
        database.insert(GameType::TiberianSun, "ts.ini".to_string(), String::new());
        database.insert(GameType::YurisRevenge, "yr.ini".to_string(), String::new());
        let ts_id = mix_id("ts.ini");
        assert_eq!(Some("ts.ini"), database.lookup(ts_id, Some(GameType::RedAlert2)));
        assert_eq!(Some("yr.ini"), database.lookup(mix_id("yr.ini"), Some(GameType::YurisRevenge)));
        assert_eq!(None, database.lookup(1, Some(GameType::TiberianSun)));
    }

    #[test]
    fn newest_game_wins_regardless_of_insert_order() {
        let mut database = GlobalMixDatabase::new();
        database.insert(GameType::RedAlert2, "shared.ini".to_string(), "ra2".to_string());
        database.insert(GameType::TiberianSun, "shared.ini".to_string(), "ts".to_string());
        let id = mix_id("shared.ini");
        assert_eq!("ra2", database.lookup_entry(id, None).unwrap().description);
        assert_eq!(
            "ts",
            database.lookup_entry(id, Some(GameType::TiberianSun)).unwrap().description
        );
    }

    #[test]
    fn loads_once_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let shared = Arc::new(SharedNameDatabase::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(raw_database(&[&[], &[], &[], &[("rules.ini", "")]]))
        }));
        assert!(!shared.is_loaded());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.get().len())
            })
            .collect();
        for handle in handles {
            assert_eq!(1, handle.join().unwrap());
        }
        assert_eq!(1, calls.load(Ordering::SeqCst));
        assert!(shared.is_loaded());
    }

    #[test]
    fn failed_load_is_empty() {
        let shared = SharedNameDatabase::new(|| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
        });
        assert!(shared.get().is_empty());
    }
}
