use crate::file_type::{extension_of, is_map_extension, Theater};
use crate::local_db::has_signature;
use crate::{FileType, MixArchive};
use binread::{BinRead, BinReaderExt};
use regex::Regex;
use std::io::Cursor;
use std::sync::OnceLock;

const PALETTE_SIZE: usize = 768;
const MAX_IMAGES: usize = 10000;
const IDX_MAGIC: u32 = 0x4142_4147;
const TMP_TD_MAGIC: u32 = 0x0D1A_FFFF;
const TMP_TD_CELL: usize = 24 * 24;
const TMP_TS_TILE_HEADER_SIZE: usize = 52;

fn config_line() -> &'static Regex {
    static CONFIG_LINE: OnceLock<Regex> = OnceLock::new();
    CONFIG_LINE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(\[[^\]\r\n]+\]|[^=\[\r\n;][^=\r\n]*=)")
            .expect("config line pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SniffOptions {
    pub sample_cap: usize,
    pub header_probe_len: usize,
    pub text_ratio: f32,
}

impl Default for SniffOptions {
    fn default() -> Self {
        SniffOptions {
            sample_cap: 64,
            header_probe_len: 512,
            text_ratio: 0.9,
        }
    }
}

#[derive(BinRead, Debug)]
#[br(little)]
struct ShpTsHeader {
    zero: u16,
    width: u16,
    height: u16,
    count: u16,
}

#[derive(BinRead, Debug)]
#[br(little)]
struct ShpTsFrame {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    _flags: u32,
    _radar_color: u32,
    reserved: u32,
    offset: u32,
}

const SHP_TS_HEADER_SIZE: usize = 8;
const SHP_TS_FRAME_SIZE: usize = 24;

#[derive(BinRead, Debug)]
#[br(little)]
struct ShpTdHeader {
    count: u16,
    _x: u16,
    _y: u16,
    width: u16,
    height: u16,
    _largest_frame: u32,
}

#[derive(BinRead, Debug)]
#[br(little)]
struct ShpTdOffset {
    packed: u32,
    _reference: u32,
}

const SHP_TD_HEADER_SIZE: usize = 14;
const SHP_TD_OFFSET_SIZE: usize = 8;

#[derive(BinRead, Debug)]
#[br(little)]
struct TmpTsHeader {
    blocks_x: u32,
    blocks_y: u32,
    cell_width: u32,
    cell_height: u32,
}

#[derive(BinRead, Debug)]
#[br(little)]
struct TmpTsTile {
    _x: i32,
    _y: i32,
    extra_offset: u32,
    z_offset: u32,
    extra_z_offset: u32,
}

const TMP_TS_HEADER_SIZE: usize = 16;

#[derive(BinRead, Debug)]
#[br(little)]
struct TmpTdHeader {
    cell_width: u16,
    cell_height: u16,
    count: u16,
    zero1: u16,
    size: u32,
    image_offset: u32,
    zero2: u32,
    magic: u32,
    _index2: u32,
    index1: u32,
}

fn read_at<T>(bytes: &[u8], position: usize) -> Option<T>
where
    T: BinRead,
    T::Args: Default,
{
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(position as u64);
    cursor.read_le::<T>().ok()
}

#[derive(Debug, Clone, Default)]
pub struct Sniffer {
    options: SniffOptions,
}

impl Sniffer {
    pub fn new(options: SniffOptions) -> Self {
        Sniffer { options }
    }

    pub fn options(&self) -> &SniffOptions {
        &self.options
    }

    pub fn sniff(&self, bytes: &[u8]) -> Option<FileType> {
        self.sniff_header(bytes)
            .or_else(|| self.probe_structure(bytes))
    }

    pub fn sniff_header(&self, bytes: &[u8]) -> Option<FileType> {
        if bytes.len() == PALETTE_SIZE {
            return Some(FileType::Palette);
        }
        let head = &bytes[..bytes.len().min(self.options.header_probe_len)];
        if head.starts_with(b"JASC-PAL") {
            return Some(FileType::PaletteText);
        }
        if has_signature(head) {
            return Some(FileType::LocalMixDatabase);
        }
        if head.starts_with(b"Voxel Animation") {
            return Some(FileType::Vxl);
        }
        if head.starts_with(b"RIFF") {
            return Some(FileType::Wav);
        }
        if head.starts_with(b" FSC") {
            return Some(FileType::Csf);
        }
        if head.starts_with(b"Creative Voice File") {
            return Some(FileType::Voc);
        }
        if head.len() >= 128 && head[0] == 0x0A && head[1] <= 5 && head[2] == 1 {
            return Some(FileType::Pcx);
        }
        if head.len() >= 4 && u32::from_le_bytes([head[0], head[1], head[2], head[3]]) == IDX_MAGIC {
            return Some(FileType::Idx);
        }
        self.sniff_text(head)
    }

    fn sniff_text(&self, head: &[u8]) -> Option<FileType> {
        if head.is_empty() {
            return None;
        }
        let printable = head
            .iter()
            .filter(|b| matches!(**b, b'\t' | b'\n' | b'\r' | 0x20..=0x7E))
            .count();
        if (printable as f32) / (head.len() as f32) <= self.options.text_ratio {
            return None;
        }
        let text = String::from_utf8_lossy(head);
        if config_line().is_match(&text) {
            Some(FileType::Ini)
        } else {
            Some(FileType::Text)
        }
    }

    pub fn probe_structure(&self, bytes: &[u8]) -> Option<FileType> {
        if MixArchive::probe(bytes, self.options.sample_cap) {
            Some(FileType::Mix)
        } else if self.is_shp_ts(bytes) {
            Some(FileType::ShpTs)
        } else if let Some(tile) = self.probe_tile(bytes) {
            Some(tile)
        } else if self.is_shp_td(bytes) {
            Some(FileType::ShpTd)
        } else {
            None
        }
    }

    fn probe_tile(&self, bytes: &[u8]) -> Option<FileType> {
        if self.is_tmp_ts(bytes) {
            Some(FileType::TmpTs)
        } else if self.is_tmp_td(bytes) {
            Some(FileType::TmpTd)
        } else {
            None
        }
    }

    fn probe_sprite(&self, bytes: &[u8]) -> Option<FileType> {
        if self.is_shp_ts(bytes) {
            Some(FileType::ShpTs)
        } else if self.is_shp_td(bytes) {
            Some(FileType::ShpTd)
        } else {
            None
        }
    }

    pub fn is_shp_ts(&self, bytes: &[u8]) -> bool {
        let header: ShpTsHeader = match read_at(bytes, 0) {
            Some(header) => header,
            None => return false,
        };
        let count = header.count as usize;
        if header.zero != 0 || count == 0 || count > MAX_IMAGES {
            return false;
        }
        if header.width == 0 || header.height == 0 {
            return false;
        }
        let table_end = SHP_TS_HEADER_SIZE + count * SHP_TS_FRAME_SIZE;
        if table_end > bytes.len() {
            return false;
        }
        (0..count.min(self.options.sample_cap)).all(|i| {
            let frame: ShpTsFrame = match read_at(bytes, SHP_TS_HEADER_SIZE + i * SHP_TS_FRAME_SIZE) {
                Some(frame) => frame,
                None => return false,
            };
            let fits = frame.x as u32 + frame.width as u32 <= header.width as u32
                && frame.y as u32 + frame.height as u32 <= header.height as u32;
            let empty = frame.width == 0 || frame.height == 0;
            let offset = frame.offset as usize;
            let offset_ok = if empty && offset == 0 {
                true
            } else {
                offset >= table_end && offset < bytes.len()
            };
            fits && frame.reserved == 0 && offset_ok
        })
    }

    pub fn is_shp_td(&self, bytes: &[u8]) -> bool {
        let header: ShpTdHeader = match read_at(bytes, 0) {
            Some(header) => header,
            None => return false,
        };
        let count = header.count as usize;
        if count == 0 || count > MAX_IMAGES || header.width == 0 || header.height == 0 {
            return false;
        }
        let table_end = SHP_TD_HEADER_SIZE + (count + 2) * SHP_TD_OFFSET_SIZE;
        if table_end > bytes.len() {
            return false;
        }
        let offset_at = |i: usize| -> Option<ShpTdOffset> {
            read_at(bytes, SHP_TD_HEADER_SIZE + i * SHP_TD_OFFSET_SIZE)
        };
        // Record `count` holds the file size, the one after it is zeroed.
        match (offset_at(count), offset_at(count + 1)) {
            (Some(end), Some(zero)) => {
                if (end.packed & 0x00FF_FFFF) as usize != bytes.len() || zero.packed != 0 {
                    return false;
                }
            }
            _ => return false,
        }
        let mut previous = table_end;
        for i in 0..count.min(self.options.sample_cap) {
            let record = match offset_at(i) {
                Some(record) => record,
                None => return false,
            };
            let offset = (record.packed & 0x00FF_FFFF) as usize;
            let format = record.packed >> 24;
            if !matches!(format, 0x80 | 0x40 | 0x20) {
                return false;
            }
            if offset < previous || offset > bytes.len() {
                return false;
            }
            previous = offset;
        }
        true
    }

    pub fn is_tmp_ts(&self, bytes: &[u8]) -> bool {
        let header: TmpTsHeader = match read_at(bytes, 0) {
            Some(header) => header,
            None => return false,
        };
        let aspect_ok = header.cell_width == 2 * header.cell_height
            && (header.cell_width == 48 || header.cell_width == 60);
        if !aspect_ok || header.blocks_x == 0 || header.blocks_y == 0 {
            return false;
        }
        let count = header.blocks_x as usize * header.blocks_y as usize;
        if count > MAX_IMAGES {
            return false;
        }
        let index_end = TMP_TS_HEADER_SIZE + count * 4;
        if index_end > bytes.len() {
            return false;
        }
        let mut tiles = 0;
        for i in 0..count.min(self.options.sample_cap) {
            let offset: u32 = match read_at(bytes, TMP_TS_HEADER_SIZE + i * 4) {
                Some(offset) => offset,
                None => return false,
            };
            let offset = offset as usize;
            if offset == 0 {
                continue;
            }
            if offset < index_end || offset + TMP_TS_TILE_HEADER_SIZE > bytes.len() {
                return false;
            }
            let tile: TmpTsTile = match read_at(bytes, offset) {
                Some(tile) => tile,
                None => return false,
            };
            let within = |relative: u32| relative == 0 || offset + relative as usize <= bytes.len();
            if !within(tile.extra_offset) || !within(tile.z_offset) || !within(tile.extra_z_offset) {
                return false;
            }
            tiles += 1;
        }
        tiles > 0
    }

    pub fn is_tmp_td(&self, bytes: &[u8]) -> bool {
        let header: TmpTdHeader = match read_at(bytes, 0) {
            Some(header) => header,
            None => return false,
        };
        let count = header.count as usize;
        let size = header.size as usize;
        let image_offset = header.image_offset as usize;
        let index1 = header.index1 as usize;
        if header.cell_width != 24 || header.cell_height != 24 || header.magic != TMP_TD_MAGIC {
            return false;
        }
        if header.zero1 != 0 || header.zero2 != 0 || count == 0 || count > MAX_IMAGES {
            return false;
        }
        if size != bytes.len() || image_offset > size || index1 + count > size {
            return false;
        }
        bytes[index1..index1 + count.min(self.options.sample_cap)]
            .iter()
            .all(|cell| *cell == 0xFF || image_offset + (*cell as usize + 1) * TMP_TD_CELL <= size)
    }

    /// Extension to show for an entry. Known names keep theirs, except that
    /// theater suffixes become `tmp` (or `shp` when only a sprite probe
    /// passes). Map extensions are never replaced.
    pub fn guess_extension(&self, name: Option<&str>, bytes: &[u8]) -> Option<String> {
        match name.and_then(extension_of) {
            Some(extension) if is_map_extension(&extension) => Some(extension),
            Some(extension) if Theater::from_extension(&extension).is_some() => {
                Some(self.theater_type(bytes).extension().to_string())
            }
            Some(extension) => Some(extension),
            None => self.sniff(bytes).map(|t| t.extension().to_string()),
        }
    }

    /// Type of an entry whose name may be known. A known extension beats
    /// the content checks, and map entries stay untagged.
    pub fn type_for_name(&self, name: Option<&str>, bytes: &[u8]) -> Option<FileType> {
        let extension = match name.and_then(extension_of) {
            Some(extension) => extension,
            None => return self.sniff(bytes),
        };
        if is_map_extension(&extension) {
            return None;
        }
        if Theater::from_extension(&extension).is_some() {
            return Some(self.theater_type(bytes));
        }
        match self.sniff(bytes) {
            Some(sniffed) if sniffed.extension() == extension => Some(sniffed),
            sniffed => FileType::from_extension(&extension).or(sniffed),
        }
    }

    fn theater_type(&self, bytes: &[u8]) -> FileType {
        match self.probe_tile(bytes) {
            Some(tile) => tile,
            None => self.probe_sprite(bytes).unwrap_or(FileType::TmpTs),
        }
    }
}
