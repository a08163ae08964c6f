use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::IAMFCodecError;

use super::{IA_CODE, IASequenceHeaderObu};

impl<W: BitWrite> BitwiseWriteTo<W> for IASequenceHeaderObu {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write::<32, u32>(IA_CODE)?;
        writer.write::<8, u8>(self.primary_profile.into())?;
        writer.write::<8, u8>(self.additional_profile.into())?;
        Ok(())
    }
}
