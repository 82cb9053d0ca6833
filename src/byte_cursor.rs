use crate::encoded_strings::from_windows_1252;
use crate::CursorError;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

type Result<T> = std::result::Result<T, CursorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn decode_u16(&self, bytes: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(bytes),
            Endian::Big => BigEndian::read_u16(bytes),
        }
    }

    fn decode_u32(&self, bytes: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(bytes),
            Endian::Big => BigEndian::read_u32(bytes),
        }
    }

    pub fn encode_u16(&self, value: u16) -> [u8; 2] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    pub fn encode_u32(&self, value: u32) -> [u8; 4] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        ByteCursor {
            data,
            position: 0,
            endian,
        }
    }

    pub fn little(data: &'a [u8]) -> Self {
        ByteCursor::new(data, Endian::Little)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    pub fn skip(&mut self, amount: usize) {
        self.position = self.position.saturating_add(amount);
    }

    pub fn tell(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or(CursorError::OutOfBounds(self.position, count, self.data.len()))?;
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(self.endian.decode_u16(bytes))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(self.endian.decode_u32(bytes))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    /// Reads `count` bytes and cuts the string at the first NUL.
    pub fn read_fixed_string(&mut self, count: usize) -> Result<String> {
        let bytes = self.take(count)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        Ok(from_windows_1252(&bytes[..end]))
    }

    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = self.data.get(self.position..).unwrap_or(&[]);
        match rest.iter().position(|b| *b == 0) {
            Some(end) => {
                let value = from_windows_1252(&rest[..end]);
                self.position += end + 1;
                Ok(value)
            }
            None => Err(CursorError::UnterminatedString(self.position)),
        }
    }

    pub fn peek_u32(&self) -> Result<u32> {
        self.clone().read_u32()
    }
}

#[derive(Debug, Clone)]
pub struct ByteWriter {
    data: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    pub fn new(endian: Endian) -> Self {
        ByteWriter {
            data: Vec::new(),
            endian,
        }
    }

    pub fn little() -> Self {
        ByteWriter::new(Endian::Little)
    }

    pub fn with_capacity(endian: Endian, capacity: usize) -> Self {
        ByteWriter {
            data: Vec::with_capacity(capacity),
            endian,
        }
    }

    pub fn tell(&self) -> usize {
        self.data.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&self.endian.encode_u16(value));
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&self.endian.encode_u32(value));
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn write_cstring(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
        self.data.push(0);
    }

    /// Overwrites four bytes that were already written.
    pub fn patch_u32(&mut self, position: usize, value: u32) {
        let encoded = self.endian.encode_u32(value);
        self.data[position..position + 4].copy_from_slice(&encoded);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}
