use crate::mix_archive::CHECKSUM_FLAG;

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend(&value.to_le_bytes());
}

fn index_and_body(entries: &[(u32, &[u8])]) -> Vec<u8> {
    let body_size: usize = entries.iter().map(|(_, bytes)| bytes.len()).sum();
    let mut raw = Vec::new();
    push_u16(&mut raw, entries.len() as u16);
    push_u32(&mut raw, body_size as u32);
    let mut offset = 0;
    for (id, bytes) in entries {
        push_u32(&mut raw, *id);
        push_u32(&mut raw, offset as u32);
        push_u32(&mut raw, bytes.len() as u32);
        offset += bytes.len();
    }
    for (_, bytes) in entries {
        raw.extend(*bytes);
    }
    raw
}

/// Plain header MIX with the body laid out in entry order.
pub fn plain_mix(entries: &[(u32, &[u8])]) -> Vec<u8> {
    index_and_body(entries)
}

/// Flagged header MIX. A zeroed digest follows the body when the checksum
/// bit is set.
pub fn flagged_mix(flags: u32, entries: &[(u32, &[u8])]) -> Vec<u8> {
    let mut raw = Vec::new();
    push_u32(&mut raw, flags);
    raw.extend(index_and_body(entries));
    if flags & CHECKSUM_FLAG != 0 {
        raw.extend(&[0u8; 20]);
    }
    raw
}

/// Tiberian Sun sprite: header, one 24 byte record per `(x, y, w, h)`
/// frame, zero padding up to `total_len`. Frame `i` points `i` bytes past
/// the end of the frame table.
pub fn shp_ts(width: u16, height: u16, frames: &[(u16, u16, u16, u16)], total_len: usize) -> Vec<u8> {
    let table_end = 8 + frames.len() * 24;
    let mut raw = Vec::new();
    push_u16(&mut raw, 0);
    push_u16(&mut raw, width);
    push_u16(&mut raw, height);
    push_u16(&mut raw, frames.len() as u16);
    for (i, (x, y, w, h)) in frames.iter().enumerate() {
        push_u16(&mut raw, *x);
        push_u16(&mut raw, *y);
        push_u16(&mut raw, *w);
        push_u16(&mut raw, *h);
        push_u32(&mut raw, 0);
        push_u32(&mut raw, 0);
        push_u32(&mut raw, 0);
        push_u32(&mut raw, (table_end + i) as u32);
    }
    if raw.len() < total_len {
        raw.resize(total_len, 0);
    }
    raw
}

/// Tiberian Dawn sprite with LCW-flagged frames of the given sizes. The
/// offset table ends with the file size and a zero record.
pub fn shp_td(width: u16, height: u16, frame_sizes: &[usize]) -> Vec<u8> {
    let count = frame_sizes.len();
    let table_end = 14 + (count + 2) * 8;
    let total = table_end + frame_sizes.iter().sum::<usize>();
    let mut raw = Vec::new();
    push_u16(&mut raw, count as u16);
    push_u16(&mut raw, 0);
    push_u16(&mut raw, 0);
    push_u16(&mut raw, width);
    push_u16(&mut raw, height);
    push_u32(&mut raw, frame_sizes.iter().copied().max().unwrap_or(0) as u32);
    let mut offset = table_end;
    for size in frame_sizes {
        push_u32(&mut raw, offset as u32 | 0x8000_0000);
        push_u32(&mut raw, 0);
        offset += size;
    }
    push_u32(&mut raw, total as u32);
    push_u32(&mut raw, 0);
    push_u32(&mut raw, 0);
    push_u32(&mut raw, 0);
    raw.resize(total, 0x11);
    raw
}

/// Isometric tile set. `present` marks which of the `blocks_x * blocks_y`
/// cells carry a tile.
pub fn tmp_ts(cell_width: u32, cell_height: u32, blocks_x: u32, blocks_y: u32, present: &[bool]) -> Vec<u8> {
    let tile_size = 52 + (cell_width * cell_height / 2) as usize;
    let index_end = 16 + present.len() * 4;
    let mut raw = Vec::new();
    push_u32(&mut raw, blocks_x);
    push_u32(&mut raw, blocks_y);
    push_u32(&mut raw, cell_width);
    push_u32(&mut raw, cell_height);
    let mut next = index_end;
    for exists in present {
        if *exists {
            push_u32(&mut raw, next as u32);
            next += tile_size;
        } else {
            push_u32(&mut raw, 0);
        }
    }
    raw.resize(next, 0);
    raw
}

/// Square tile set. `cells` is the per-cell image index, 0xFF for empty.
pub fn tmp_td(cells: &[u8]) -> Vec<u8> {
    let images = cells
        .iter()
        .filter(|c| **c != 0xFF)
        .map(|c| *c as usize + 1)
        .max()
        .unwrap_or(0);
    let image_offset = 40;
    let index1 = image_offset + images * 24 * 24;
    let size = index1 + cells.len();
    let mut raw = Vec::new();
    push_u16(&mut raw, 24);
    push_u16(&mut raw, 24);
    push_u16(&mut raw, cells.len() as u16);
    push_u16(&mut raw, 0);
    push_u32(&mut raw, size as u32);
    push_u32(&mut raw, image_offset as u32);
    push_u32(&mut raw, 0);
    push_u32(&mut raw, 0x0D1A_FFFF);
    push_u32(&mut raw, index1 as u32);
    push_u32(&mut raw, index1 as u32);
    raw.resize(index1, 0x01);
    raw.extend(cells);
    raw
}
