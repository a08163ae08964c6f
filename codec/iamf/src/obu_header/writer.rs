use bitstream_io::{BigEndian, BitWrite, BitWriter};
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::{uleb128_size, write_uleb128};

use super::ObuHeader;

impl ObuHeader {
    /// Writes the header for a payload of `payload_size` bytes. `obu_size`
    /// counts everything after its own field: the trimming and extension
    /// fields plus the payload.
    pub fn write_with_payload_size<W: BitWrite>(
        &self,
        payload_size: usize,
        writer: &mut W,
    ) -> IAMFCodecResult<()> {
        writer.write::<5, u8>(self.obu_type.into())?;
        writer.write_bit(self.redundant_copy)?;
        writer.write_bit(self.trimming_status.is_some())?;
        writer.write_bit(self.extension_header.is_some())?;

        let mut obu_size = payload_size;
        if let Some(trimming) = &self.trimming_status {
            obu_size += uleb128_size(trimming.num_samples_to_trim_at_end)
                + uleb128_size(trimming.num_samples_to_trim_at_start);
        }
        if let Some(extension) = &self.extension_header {
            obu_size += uleb128_size(extension.len() as u32) + extension.len();
        }
        let obu_size =
            u32::try_from(obu_size).map_err(|_| IAMFCodecError::ObuPayloadTooLarge(obu_size))?;
        write_uleb128(writer, obu_size)?;

        if let Some(trimming) = &self.trimming_status {
            write_uleb128(writer, trimming.num_samples_to_trim_at_end)?;
            write_uleb128(writer, trimming.num_samples_to_trim_at_start)?;
        }
        if let Some(extension) = &self.extension_header {
            write_uleb128(writer, extension.len() as u32)?;
            writer.write_bytes(extension)?;
        }
        Ok(())
    }
}

/// Frames `payload` as a complete OBU: the payload is serialized first so
/// the header can carry its byte size.
pub fn write_obu<W, P>(header: &ObuHeader, payload: &P, writer: &mut W) -> IAMFCodecResult<()>
where
    W: BitWrite,
    P: BitwiseWriteTo<BitWriter<Vec<u8>, BigEndian>, Error = IAMFCodecError>,
{
    let mut payload_writer = BitWriter::endian(Vec::new(), BigEndian);
    payload.write_to(&mut payload_writer)?;
    payload_writer.byte_align()?;
    let payload_bytes = payload_writer.into_writer();
    header.write_with_payload_size(payload_bytes.len(), writer)?;
    writer.write_bytes(&payload_bytes)?;
    Ok(())
}
