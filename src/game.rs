use crate::IdScheme;
use std::fmt;
use strum_macros::EnumString;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString)]
pub enum GameType {
    #[strum(serialize = "td", serialize = "TD")]
    TiberianDawn,
    #[strum(serialize = "ra", serialize = "RA")]
    RedAlert,
    #[strum(serialize = "ts", serialize = "TS")]
    TiberianSun,
    #[strum(serialize = "dune2")]
    Dune2,
    #[strum(serialize = "dune2000")]
    Dune2000,
    #[strum(serialize = "ra2", serialize = "RA2")]
    RedAlert2,
    #[strum(serialize = "yr", serialize = "YR")]
    YurisRevenge,
    #[strum(disabled)]
    Unknown(u32),
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::TiberianDawn => write!(f, "td"),
            GameType::RedAlert => write!(f, "ra"),
            GameType::TiberianSun => write!(f, "ts"),
            GameType::Dune2 => write!(f, "dune2"),
            GameType::Dune2000 => write!(f, "dune2000"),
            GameType::RedAlert2 => write!(f, "ra2"),
            GameType::YurisRevenge => write!(f, "yr"),
            GameType::Unknown(id) => write!(f, "unknown({})", id),
        }
    }
}

impl GameType {
    pub fn from_id(id: u32) -> Self {
        match id {
            0 => GameType::TiberianDawn,
            1 => GameType::RedAlert,
            2 => GameType::TiberianSun,
            3 => GameType::Dune2,
            4 => GameType::Dune2000,
            5 => GameType::RedAlert2,
            6 => GameType::YurisRevenge,
            other => GameType::Unknown(other),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            GameType::TiberianDawn => 0,
            GameType::RedAlert => 1,
            GameType::TiberianSun => 2,
            GameType::Dune2 => 3,
            GameType::Dune2000 => 4,
            GameType::RedAlert2 => 5,
            GameType::YurisRevenge => 6,
            GameType::Unknown(id) => *id,
        }
    }

    pub fn id_scheme(&self) -> IdScheme {
        match self {
            GameType::TiberianDawn | GameType::RedAlert => IdScheme::Legacy,
            _ => IdScheme::Crc,
        }
    }
}
