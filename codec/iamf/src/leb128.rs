//! @see: IAMF v1.0, leb128() — unsigned little-endian base-128 integers.

use bitstream_io::{BitRead, BitWrite};

use crate::errors::IAMFCodecResult;

pub use codec_bitstream::uleb128::{MAX_ULEB128_SIZE, uleb128_size};

/// Decoded form of a `leb128()` field: an unsigned 32 bit integer.
pub type DecodedUleb128 = u32;

pub fn write_uleb128<W: BitWrite>(writer: &mut W, value: DecodedUleb128) -> IAMFCodecResult<()> {
    codec_bitstream::uleb128::write_uleb128(writer, value)?;
    Ok(())
}

pub fn read_uleb128<R: BitRead>(reader: &mut R) -> IAMFCodecResult<DecodedUleb128> {
    Ok(codec_bitstream::uleb128::read_uleb128(reader)?)
}
