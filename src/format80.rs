use crate::{ByteCursor, Format80Error};

type Result<T> = std::result::Result<T, Format80Error>;

const END_OF_STREAM: u8 = 0x80;
const LONG_FILL: u8 = 0xFE;
const LONG_COPY: u8 = 0xFF;
const MAX_LITERAL_RUN: usize = 0x3F;

/// Westwood's LCW block codec ("Format80"). Decoding only ever writes into
/// a caller-sized output and every back-reference must point strictly
/// behind the write head.
#[derive(Debug, Clone, Copy)]
pub struct Format80;

fn ensure_room(command_at: usize, dest: usize, count: usize, size: usize) -> Result<()> {
    if dest + count > size {
        Err(Format80Error::OutputOverflow(command_at, dest + count - size, size))
    } else {
        Ok(())
    }
}

// Forward byte-wise copy; overlapping ranges repeat the pattern.
fn copy_within(output: &mut [u8], source: usize, dest: usize, count: usize) {
    for i in 0..count {
        output[dest + i] = output[source + i];
    }
}

fn decode_block(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let size = output.len();
    let mut cursor = ByteCursor::little(input);
    let mut dest = 0;
    loop {
        let command_at = cursor.tell();
        let truncated = |_| Format80Error::TruncatedInput(command_at);
        let command = cursor.read_u8().map_err(truncated)?;

        if command & 0x80 == 0 {
            // 0cccpppp pppppppp: copy relative to the write head.
            let count = 3 + ((command >> 4) & 0x7) as usize;
            let low = cursor.read_u8().map_err(truncated)? as usize;
            let distance = (((command & 0x0F) as usize) << 8) | low;
            if distance == 0 || distance > dest {
                return Err(Format80Error::BadDistance(command_at, distance, dest));
            }
            ensure_room(command_at, dest, count, size)?;
            if distance == 1 {
                let value = output[dest - 1];
                output[dest..dest + count].iter_mut().for_each(|b| *b = value);
            } else {
                copy_within(output, dest - distance, dest, count);
            }
            dest += count;
        } else if command & 0x40 == 0 {
            // 10cccccc: literal bytes, a zero count ends the stream.
            let count = (command & 0x3F) as usize;
            if count == 0 {
                return Ok(dest);
            }
            let literal = cursor.read_bytes(count).map_err(truncated)?;
            ensure_room(command_at, dest, count, size)?;
            output[dest..dest + count].copy_from_slice(literal);
            dest += count;
        } else if command == LONG_FILL {
            let count = cursor.read_u16().map_err(truncated)? as usize;
            let value = cursor.read_u8().map_err(truncated)?;
            ensure_room(command_at, dest, count, size)?;
            output[dest..dest + count].iter_mut().for_each(|b| *b = value);
            dest += count;
        } else {
            let count = if command == LONG_COPY {
                cursor.read_u16().map_err(truncated)? as usize
            } else {
                3 + (command & 0x3F) as usize
            };
            let source = cursor.read_u16().map_err(truncated)? as usize;
            if source >= dest {
                return Err(Format80Error::BadReference(command_at, source, dest));
            }
            ensure_room(command_at, dest, count, size)?;
            copy_within(output, source, dest, count);
            dest += count;
        }
    }
}

impl Format80 {
    pub fn decode(&self, input: &[u8], output_size: usize) -> Result<Vec<u8>> {
        let mut output = vec![0; output_size];
        decode_block(input, &mut output)?;
        Ok(output)
    }

    /// Decodes into `output` and returns how many bytes were produced.
    /// `output` is left untouched when the stream is invalid.
    pub fn decode_into(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let mut scratch = vec![0; output.len()];
        let written = decode_block(input, &mut scratch)?;
        output[..written].copy_from_slice(&scratch[..written]);
        Ok(written)
    }

    /// Encodes with fills and literal runs only. The output is larger than
    /// what the games produce but decodes to the same bytes.
    pub fn encode(&self, input: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(input.len() + input.len() / MAX_LITERAL_RUN + 2);
        let mut literal_start = 0;
        let mut position = 0;
        while position < input.len() {
            let value = input[position];
            let run = input[position..]
                .iter()
                .take(u16::MAX as usize)
                .take_while(|b| **b == value)
                .count();
            if run >= 5 {
                flush_literals(&mut result, &input[literal_start..position]);
                result.push(LONG_FILL);
                result.extend_from_slice(&(run as u16).to_le_bytes());
                result.push(value);
                position += run;
                literal_start = position;
            } else {
                position += run;
            }
        }
        flush_literals(&mut result, &input[literal_start..]);
        result.push(END_OF_STREAM);
        result
    }
}

fn flush_literals(result: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERAL_RUN) {
        result.push(END_OF_STREAM | chunk.len() as u8);
        result.extend_from_slice(chunk);
    }
}
