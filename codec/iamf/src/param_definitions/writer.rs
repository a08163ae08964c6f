use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::IAMFCodecError;
use crate::leb128::write_uleb128;

use super::{ParamDefinition, ParamDefinitionVariant, SubblockPartition};

impl<W: BitWrite> BitwiseWriteTo<W> for SubblockPartition {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.duration())?;
        write_uleb128(writer, self.constant_subblock_duration())?;
        if self.constant_subblock_duration() == 0 {
            write_uleb128(writer, self.num_subblocks())?;
            // The last subblock duration is implicit.
            let durations = self.subblock_durations();
            for duration in &durations[..durations.len() - 1] {
                write_uleb128(writer, *duration)?;
            }
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for ParamDefinition {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        if let ParamDefinitionVariant::Reserved {
            definition_type,
            definition_bytes,
        } = &self.variant
        {
            if *definition_type < 3 {
                return Err(IAMFCodecError::InvalidReservedDefinitionType(
                    *definition_type,
                ));
            }
            write_uleb128(writer, definition_bytes.len() as u32)?;
            writer.write_bytes(definition_bytes)?;
            return Ok(());
        }

        write_uleb128(writer, self.parameter_id)?;
        write_uleb128(writer, self.parameter_rate)?;
        writer.write_bit(self.partition.is_none())?; // param_definition_mode
        writer.write::<7, u8>(self.reserved)?;
        if let Some(partition) = &self.partition {
            partition.write_to(writer)?;
        }
        match &self.variant {
            ParamDefinitionVariant::MixGain | ParamDefinitionVariant::Reserved { .. } => {}
            ParamDefinitionVariant::Demixing {
                default_demixing_info,
                default_w,
            } => {
                default_demixing_info.write_to(writer)?;
                writer.write::<4, u8>(*default_w)?;
                writer.write::<4, u8>(0)?; // reserved
            }
            ParamDefinitionVariant::ReconGain { audio_element_id } => {
                write_uleb128(writer, *audio_element_id)?;
            }
        }
        Ok(())
    }
}
