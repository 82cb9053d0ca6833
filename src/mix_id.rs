use encoding_rs::WINDOWS_1252;
use std::fmt;

/// Filename to id functions used by MIX indices. Both are case-insensitive
/// and must match the games bit for bit, otherwise names from external
/// lists never line up with archive entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdScheme {
    /// Tiberian Dawn and Red Alert: rotate-and-add over 4-byte groups.
    Legacy,
    /// Tiberian Sun and Red Alert 2: CRC-32 over the padded name.
    Crc,
}

impl Default for IdScheme {
    fn default() -> Self {
        IdScheme::Crc
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdScheme::Legacy => write!(f, "legacy"),
            IdScheme::Crc => write!(f, "crc"),
        }
    }
}

// Unmappable characters encode as `&#NNNN;`, builders reject such names.
fn upper_bytes(name: &str) -> Vec<u8> {
    let (encoded, _, _) = WINDOWS_1252.encode(name);
    encoded.iter().map(|b| b.to_ascii_uppercase()).collect()
}

impl IdScheme {
    pub fn id_of(&self, name: &str) -> u32 {
        let bytes = upper_bytes(name);
        match self {
            IdScheme::Legacy => legacy_id(&bytes),
            IdScheme::Crc => crc_id(bytes),
        }
    }
}

fn legacy_id(name: &[u8]) -> u32 {
    let length = name.len();
    let mut id: u32 = 0;
    let mut i = 0;
    while i < length {
        let mut a: u32 = 0;
        for _ in 0..4 {
            a >>= 8;
            if i < length {
                a = a.wrapping_add((name[i] as u32) << 24);
            }
            i += 1;
        }
        id = id.rotate_left(1).wrapping_add(a);
    }
    id
}

fn crc_id(mut name: Vec<u8>) -> u32 {
    let length = name.len();
    let aligned = length & !3;
    if length & 3 != 0 {
        name.push((length - aligned) as u8);
        let filler = name[aligned];
        for _ in 0..(3 - (length & 3)) {
            name.push(filler);
        }
    }
    crc32fast::hash(&name)
}

pub fn mix_id(name: &str) -> u32 {
    IdScheme::Crc.id_of(name)
}

pub fn format_id(id: u32) -> String {
    format!("{:08X}", id)
}
