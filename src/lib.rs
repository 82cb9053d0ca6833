mod byte_cursor;
mod encoded_strings;
mod errors;
mod file_type;
mod format80;
mod game;
mod global_db;
mod layered_overlay;
mod local_db;
mod mix_archive;
mod mix_builder;
mod mix_id;
mod mix_tree;
mod name_table;
mod palette;
mod palette_resolver;
mod palette_rules;
mod sniffer;

pub mod mix;

#[cfg(test)]
mod utils;

pub use byte_cursor::{ByteCursor, ByteWriter, Endian};
pub use encoded_strings::{from_windows_1252, to_windows_1252};
pub use file_type::{base_name, extension_of, is_map_extension, stem_of, FileType, Theater};
pub use format80::Format80;
pub use game::GameType;
pub use global_db::{DatabaseLoader, GlobalMixDatabase, GlobalName, SharedNameDatabase};
pub use layered_overlay::LayeredOverlay;
pub use local_db::{LocalMixDatabase, LOCAL_DATABASE_NAME, LOCAL_DATABASE_SIGNATURE};
pub use mix_archive::{
    detect_header, parse_id_name, EntryRef, HeaderKind, MixArchive, MixEntry, CHECKSUM_FLAG,
    ENCRYPTED_FLAG,
};
pub use mix_builder::{BuildEntry, MixBuilder, NameDatabaseSummary};
pub use mix_id::{format_id, mix_id, IdScheme};
pub use mix_tree::{MixTree, NodeId};
pub use name_table::{NameSource, NameTable, ResolvedName};
pub use palette::Palette;
pub use palette_resolver::{
    ByteSource, PaletteRequest, PaletteResolver, PaletteSelection, PaletteSource, ResourceIndex,
    ULTIMATE_FALLBACKS,
};
pub use palette_rules::{AssetKind, PaletteRule, PaletteRules, DEFAULT_RULES};
pub use sniffer::{SniffOptions, Sniffer};

pub use errors::{
    ArchiveError, BuildError, CursorError, EncodedStringsError, Format80Error, NameDatabaseError,
    OverlayError, PaletteError,
};
