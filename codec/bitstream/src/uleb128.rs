use std::io;

use bitstream_io::{BitRead, BitWrite};
use num::ToPrimitive;

/// Longest canonical encoding of a 32 bit value: ceil(32 / 7) bytes.
pub const MAX_ULEB128_SIZE: usize = 5;

/// Writes `value` as an unsigned little-endian base-128 integer, 7 data bits
/// per byte, high bit set on every byte except the last. The encoding is
/// always the shortest one for `value`.
pub fn write_uleb128<W: BitWrite>(writer: &mut W, value: u32) -> io::Result<()> {
    let mut remaining = value;
    loop {
        let byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining == 0 {
            return writer.write::<8, u8>(byte);
        }
        writer.write::<8, u8>(byte | 0x80)?;
    }
}

pub fn read_uleb128<R: BitRead>(reader: &mut R) -> io::Result<u32> {
    let mut value: u64 = 0;
    for index in 0..MAX_ULEB128_SIZE {
        let byte = reader.read::<8, u8>()?;
        value |= u64::from(byte & 0x7f) << (7 * index);
        if byte & 0x80 == 0 {
            return value.to_u32().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("uleb128 value does not fit in 32 bits: {}", value),
                )
            });
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("uleb128 longer than {} bytes", MAX_ULEB128_SIZE),
    ))
}

/// Byte count of the canonical encoding of `value`.
pub const fn uleb128_size(value: u32) -> usize {
    let mut remaining = value;
    let mut size = 1;
    while remaining >= 0x80 {
        remaining >>= 7;
        size += 1;
    }
    size
}
