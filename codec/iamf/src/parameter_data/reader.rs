use bitstream_io::BitRead;
use utils::traits::reader::{BitwiseReadFrom, BitwiseReadRemainingFrom};

use crate::errors::IAMFCodecError;
use crate::leb128::read_uleb128;

use super::{
    DemixingInfoParameterData, MixGainParameterData, RECON_GAIN_MASK_BITS, ReconGainElement,
    ReconGainInfoParameterData,
};

impl<R: BitRead> BitwiseReadFrom<R> for MixGainParameterData {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let animation_type = read_uleb128(reader)?;
        match animation_type {
            0 => Ok(Self::Step {
                start_point_value: reader.read_signed::<16, i16>()?,
            }),
            1 => Ok(Self::Linear {
                start_point_value: reader.read_signed::<16, i16>()?,
                end_point_value: reader.read_signed::<16, i16>()?,
            }),
            2 => Ok(Self::Bezier {
                start_point_value: reader.read_signed::<16, i16>()?,
                end_point_value: reader.read_signed::<16, i16>()?,
                control_point_value: reader.read_signed::<16, i16>()?,
                control_point_relative_time: reader.read::<8, u8>()?,
            }),
            _ => Err(IAMFCodecError::UnknownAnimationType(animation_type)),
        }
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for DemixingInfoParameterData {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            dmixp_mode: reader.read::<3, u8>()?.try_into()?,
            reserved: reader.read::<5, u8>()?,
        })
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for ReconGainElement {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let recon_gain_flag = read_uleb128(reader)?;
        if recon_gain_flag >> RECON_GAIN_MASK_BITS != 0 {
            return Err(IAMFCodecError::ReconGainBitPosition(recon_gain_flag));
        }
        let mut recon_gain = [0_u8; RECON_GAIN_MASK_BITS];
        for (bit, gain) in recon_gain.iter_mut().enumerate() {
            if recon_gain_flag & (1 << bit) != 0 {
                *gain = reader.read::<8, u8>()?;
            }
        }
        Ok(Self {
            recon_gain_flag,
            recon_gain,
        })
    }
}

/// Reads one element per layer whose `recon_gain_is_present` flag is set;
/// the other layers are absent from the wire.
impl<R: BitRead> BitwiseReadRemainingFrom<&[bool], R> for ReconGainInfoParameterData {
    type Error = IAMFCodecError;
    fn read_remaining_from(
        recon_gain_is_present: &[bool],
        reader: &mut R,
    ) -> Result<Self, Self::Error> {
        let mut recon_gain_elements = Vec::with_capacity(recon_gain_is_present.len());
        for present in recon_gain_is_present {
            if *present {
                recon_gain_elements.push(Some(ReconGainElement::read_from(reader)?));
            } else {
                recon_gain_elements.push(None);
            }
        }
        Ok(Self {
            recon_gain_elements,
        })
    }
}
