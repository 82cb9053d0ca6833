use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, Display)]
pub enum FileType {
    Palette,
    PaletteText,
    LocalMixDatabase,
    Mix,
    Vxl,
    Wav,
    Csf,
    Voc,
    Pcx,
    Idx,
    Ini,
    Text,
    /// Tiberian Sun / Red Alert 2 sprite.
    ShpTs,
    /// Tiberian Dawn / Red Alert sprite.
    ShpTd,
    /// Isometric Tiberian Sun / Red Alert 2 tile set.
    TmpTs,
    /// Square Tiberian Dawn / Red Alert tile set.
    TmpTd,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Palette | FileType::PaletteText => "pal",
            FileType::LocalMixDatabase => "dat",
            FileType::Mix => "mix",
            FileType::Vxl => "vxl",
            FileType::Wav => "wav",
            FileType::Csf => "csf",
            FileType::Voc => "voc",
            FileType::Pcx => "pcx",
            FileType::Idx => "idx",
            FileType::Ini => "ini",
            FileType::Text => "txt",
            FileType::ShpTs | FileType::ShpTd => "shp",
            FileType::TmpTs | FileType::TmpTd => "tmp",
        }
    }

    /// Canonical type for an extension. Sprite and tile extensions give
    /// the Tiberian Sun variants.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pal" => Some(FileType::Palette),
            "mix" => Some(FileType::Mix),
            "vxl" => Some(FileType::Vxl),
            "wav" => Some(FileType::Wav),
            "csf" => Some(FileType::Csf),
            "voc" => Some(FileType::Voc),
            "pcx" => Some(FileType::Pcx),
            "idx" => Some(FileType::Idx),
            "ini" => Some(FileType::Ini),
            "txt" => Some(FileType::Text),
            "shp" => Some(FileType::ShpTs),
            "tmp" => Some(FileType::TmpTs),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FileType::Ini | FileType::Text | FileType::PaletteText)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, Display)]
pub enum Theater {
    #[strum(to_string = "tem")]
    Temperate,
    #[strum(to_string = "sno")]
    Snow,
    #[strum(to_string = "urb")]
    Urban,
    #[strum(to_string = "des")]
    Desert,
    #[strum(to_string = "lun")]
    Lunar,
    #[strum(to_string = "ubn")]
    NewUrban,
}

impl Theater {
    pub fn suffix(&self) -> &'static str {
        match self {
            Theater::Temperate => "tem",
            Theater::Snow => "sno",
            Theater::Urban => "urb",
            Theater::Desert => "des",
            Theater::Lunar => "lun",
            Theater::NewUrban => "ubn",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "tem" => Some(Theater::Temperate),
            "sno" => Some(Theater::Snow),
            "urb" => Some(Theater::Urban),
            "des" => Some(Theater::Desert),
            "lun" => Some(Theater::Lunar),
            "ubn" => Some(Theater::NewUrban),
            _ => None,
        }
    }
}

pub const MAP_EXTENSIONS: [&str; 3] = ["map", "mpr", "yrm"];

pub fn is_map_extension(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    MAP_EXTENSIONS.iter().any(|e| *e == extension)
}

pub fn extension_of(path: &str) -> Option<String> {
    let file_name = base_name(path);
    let dot = file_name.rfind('.')?;
    Some(file_name[dot + 1..].to_ascii_lowercase()).filter(|e| !e.is_empty())
}

pub fn base_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}

pub fn stem_of(path: &str) -> &str {
    let file_name = base_name(path);
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}
