use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::IAMFCodecError;
use crate::leb128::write_uleb128;

use super::{
    DemixingInfoParameterData, MixGainParameterData, RECON_GAIN_MASK_BITS, ReconGainElement,
    ReconGainInfoParameterData,
};

impl<W: BitWrite> BitwiseWriteTo<W> for MixGainParameterData {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.animation_type())?;
        match *self {
            Self::Step { start_point_value } => {
                writer.write_signed::<16, i16>(start_point_value)?;
            }
            Self::Linear {
                start_point_value,
                end_point_value,
            } => {
                writer.write_signed::<16, i16>(start_point_value)?;
                writer.write_signed::<16, i16>(end_point_value)?;
            }
            Self::Bezier {
                start_point_value,
                end_point_value,
                control_point_value,
                control_point_relative_time,
            } => {
                writer.write_signed::<16, i16>(start_point_value)?;
                writer.write_signed::<16, i16>(end_point_value)?;
                writer.write_signed::<16, i16>(control_point_value)?;
                writer.write::<8, u8>(control_point_relative_time)?;
            }
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for DemixingInfoParameterData {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write::<3, u8>(self.dmixp_mode.into())?;
        writer.write::<5, u8>(self.reserved)?;
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for ReconGainElement {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.validate()?;
        write_uleb128(writer, self.recon_gain_flag)?;
        for bit in 0..RECON_GAIN_MASK_BITS {
            if self.recon_gain_flag & (1 << bit) != 0 {
                writer.write::<8, u8>(self.recon_gain[bit])?;
            }
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for ReconGainInfoParameterData {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        for element in self.recon_gain_elements.iter().flatten() {
            element.write_to(writer)?;
        }
        Ok(())
    }
}
