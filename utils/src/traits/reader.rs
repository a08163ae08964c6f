pub trait BitwiseReadFrom<R: bitstream_io::BitRead>: Sized {
    type Error;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error>;
}

pub trait BitwiseReadRemainingFrom<Header, R: bitstream_io::BitRead>: Sized {
    type Error;
    fn read_remaining_from(header: Header, reader: &mut R) -> Result<Self, Self::Error>;
}
