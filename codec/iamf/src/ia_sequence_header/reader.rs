use bitstream_io::BitRead;
use utils::traits::reader::BitwiseReadFrom;

use crate::errors::IAMFCodecError;
use crate::obu_header::{ObuHeader, ObuType};

use super::{IA_CODE, IASequenceHeaderObu, ProfileVersion};

impl<R: BitRead> BitwiseReadFrom<R> for IASequenceHeaderObu {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let ia_code = reader.read::<32, u32>()?;
        if ia_code != IA_CODE {
            return Err(IAMFCodecError::InvalidIaCode(ia_code));
        }
        Ok(Self {
            header: ObuHeader::new(ObuType::SequenceHeader),
            primary_profile: ProfileVersion::from(reader.read::<8, u8>()?),
            additional_profile: ProfileVersion::from(reader.read::<8, u8>()?),
        })
    }
}
