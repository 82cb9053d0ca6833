use crate::encoded_strings::to_windows_1252;
use crate::{ByteCursor, ByteWriter, GameType, IdScheme, NameDatabaseError};

type Result<T> = std::result::Result<T, NameDatabaseError>;

pub const LOCAL_DATABASE_NAME: &str = "local mix database.dat";
pub const LOCAL_DATABASE_SIGNATURE: &[u8; 32] =
    b"XCC by Olaf van der Spek\x1a\x04\x17\x27\x10\x19\x80\x00";

const HEADER_SIZE: usize = 32 + 4 * 5;
const DATABASE_TYPE: u32 = 0;
const DATABASE_VERSION: u32 = 0;

/// Filename list stored inside an archive so its hashed ids can be mapped
/// back to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMixDatabase {
    pub game: GameType,
    pub names: Vec<String>,
}

pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(LOCAL_DATABASE_SIGNATURE)
}

impl LocalMixDatabase {
    pub fn new(game: GameType) -> Self {
        LocalMixDatabase {
            game,
            names: Vec::new(),
        }
    }

    pub fn id(scheme: IdScheme) -> u32 {
        scheme.id_of(LOCAL_DATABASE_NAME)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if !has_signature(bytes) {
            return Err(NameDatabaseError::BadSignature);
        }
        let mut cursor = ByteCursor::little(bytes);
        cursor.seek(LOCAL_DATABASE_SIGNATURE.len());
        let size = cursor.read_u32()? as usize;
        let database_type = cursor.read_u32()?;
        let version = cursor.read_u32()?;
        if database_type != DATABASE_TYPE || version != DATABASE_VERSION {
            return Err(NameDatabaseError::UnsupportedVersion(database_type, version));
        }
        if size > bytes.len() || size < HEADER_SIZE {
            return Err(NameDatabaseError::SizeMismatch(size, bytes.len()));
        }
        let game = GameType::from_id(cursor.read_u32()?);
        let count = cursor.read_u32()? as usize;

        // Names never reach past the declared size.
        let mut names_cursor = ByteCursor::little(&bytes[..size]);
        names_cursor.seek(cursor.tell());
        let mut names = Vec::with_capacity(count.min(size));
        for _ in 0..count {
            names.push(names_cursor.read_cstring()?);
        }
        Ok(LocalMixDatabase { game, names })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut raw_names = Vec::new();
        for name in &self.names {
            raw_names.push(to_windows_1252(name)?);
        }
        let size = HEADER_SIZE + raw_names.iter().map(|n| n.len() + 1).sum::<usize>();
        let mut writer = ByteWriter::little();
        writer.write_bytes(LOCAL_DATABASE_SIGNATURE);
        writer.write_u32(size as u32);
        writer.write_u32(DATABASE_TYPE);
        writer.write_u32(DATABASE_VERSION);
        writer.write_u32(self.game.id());
        writer.write_u32(self.names.len() as u32);
        for name in &raw_names {
            writer.write_cstring(name);
        }
        Ok(writer.into_inner())
    }

    pub fn ids(&self, scheme: IdScheme) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.names
            .iter()
            .map(move |name| (scheme.id_of(name), name.as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mix_id::mix_id;

    #[test]
    fn round_trip() {
        let database = LocalMixDatabase {
            game: GameType::RedAlert2,
            names: vec!["rules.ini".to_string(), "art.ini".to_string()],
        };
        let bytes = database.serialize().unwrap();
        assert_eq!(HEADER_SIZE + 10 + 8, bytes.len());
        assert_eq!(database, LocalMixDatabase::from_bytes(&bytes).unwrap());
    }

    #[test]
    fn own_id() {
        assert_eq!(0x366E051F, LocalMixDatabase::id(IdScheme::Crc));
    }

    #[test]
    fn bad_signature() {
        let mut bytes = LocalMixDatabase::new(GameType::TiberianSun).serialize().unwrap();
        bytes[0] = b'Y';
        assert!(matches!(
            LocalMixDatabase::from_bytes(&bytes),
            Err(NameDatabaseError::BadSignature)
        ));
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = LocalMixDatabase::new(GameType::TiberianSun).serialize().unwrap();
        bytes[40] = 1;
        assert!(matches!(
            LocalMixDatabase::from_bytes(&bytes),
            Err(NameDatabaseError::UnsupportedVersion(0, 1))
        ));
    }

    #[test]
    fn truncated_names_fail() {
        let database = LocalMixDatabase {
            game: GameType::RedAlert2,
            names: vec!["rules.ini".to_string()],
        };
        let mut bytes = database.serialize().unwrap();
        bytes.pop();
        let size = bytes.len() as u32;
        bytes[32..36].copy_from_slice(&size.to_le_bytes());
        assert!(matches!(
            LocalMixDatabase::from_bytes(&bytes),
            Err(NameDatabaseError::CursorError(_))
        ));
    }

    #[test]
    fn ids_follow_scheme() {
        let database = LocalMixDatabase {
            game: GameType::RedAlert2,
            names: vec!["rules.ini".to_string()],
        };
        let ids: Vec<(u32, &str)> = database.ids(IdScheme::Crc).collect();
        assert_eq!(vec![(mix_id("rules.ini"), "rules.ini")], ids);
    }
}
