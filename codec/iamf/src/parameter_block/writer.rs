use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::IAMFCodecError;
use crate::leb128::write_uleb128;

use super::{ParameterBlockObu, ParameterSubblock};

impl<W: BitWrite> BitwiseWriteTo<W> for ParameterSubblock {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            Self::MixGain(data) => data.write_to(writer),
            Self::Demixing(data) => data.write_to(writer),
            Self::ReconGain(data) => data.write_to(writer),
        }
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for ParameterBlockObu {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.parameter_id)?;
        if let Some(partition) = &self.partition {
            partition.write_to(writer)?;
        }
        for subblock in &self.subblocks {
            subblock.write_to(writer)?;
        }
        Ok(())
    }
}
