use bitstream_io::BitRead;
use tokio_util::bytes::Bytes;

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::{read_uleb128, uleb128_size};

use super::{ObuHeader, ObuType, TrimmingStatus};

impl ObuHeader {
    /// Reads the header and returns it together with the byte size of the
    /// payload that follows it.
    pub fn read_with_payload_size<R: BitRead>(reader: &mut R) -> IAMFCodecResult<(Self, usize)> {
        let obu_type = ObuType::try_from(reader.read::<5, u8>()?)?;
        let redundant_copy = reader.read_bit()?;
        let has_trimming_status = reader.read_bit()?;
        let has_extension_header = reader.read_bit()?;
        let obu_size = read_uleb128(reader)?;

        let mut consumed = 0_usize;
        let trimming_status = if has_trimming_status {
            let num_samples_to_trim_at_end = read_uleb128(reader)?;
            let num_samples_to_trim_at_start = read_uleb128(reader)?;
            consumed += uleb128_size(num_samples_to_trim_at_end)
                + uleb128_size(num_samples_to_trim_at_start);
            Some(TrimmingStatus {
                num_samples_to_trim_at_end,
                num_samples_to_trim_at_start,
            })
        } else {
            None
        };
        let extension_header = if has_extension_header {
            let extension_size = read_uleb128(reader)?;
            consumed += uleb128_size(extension_size) + extension_size as usize;
            Some(Bytes::from(reader.read_to_vec(extension_size as usize)?))
        } else {
            None
        };

        let payload_size = (obu_size as usize)
            .checked_sub(consumed)
            .ok_or(IAMFCodecError::ObuSizeTooSmall(obu_size))?;
        Ok((
            Self {
                obu_type,
                redundant_copy,
                trimming_status,
                extension_header,
            },
            payload_size,
        ))
    }
}
