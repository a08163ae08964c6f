use std::io;

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::uleb128::write_uleb128;

/// Byte sink backing a [`BitstreamWriter`], with an optional hard capacity.
pub struct BoundedBuf {
    bytes: Vec<u8>,
    max_bytes: Option<usize>,
}

impl io::Write for BoundedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(max_bytes) = self.max_bytes
            && self.bytes.len() + buf.len() > max_bytes
        {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("bitstream capacity of {} bytes exceeded", max_bytes),
            ));
        }
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Bit-granular output buffer for assembling OBU sequences.
///
/// Multi-bit fields are packed MSB first. Raw byte writes require the cursor
/// to be byte aligned; [`BitstreamWriter::flush`] zero-pads any trailing
/// partial byte.
pub struct BitstreamWriter {
    writer: BitWriter<BoundedBuf, BigEndian>,
}

impl BitstreamWriter {
    pub fn new() -> Self {
        Self {
            writer: BitWriter::endian(
                BoundedBuf {
                    bytes: Vec::new(),
                    max_bytes: None,
                },
                BigEndian,
            ),
        }
    }

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            writer: BitWriter::endian(
                BoundedBuf {
                    bytes: Vec::with_capacity(max_bytes),
                    max_bytes: Some(max_bytes),
                },
                BigEndian,
            ),
        }
    }

    pub fn writer_mut(&mut self) -> &mut BitWriter<BoundedBuf, BigEndian> {
        &mut self.writer
    }

    /// Writes the low `bits` bits of `value`, most significant bit first.
    pub fn write_unsigned_literal(&mut self, value: u32, bits: u32) -> io::Result<()> {
        if bits > 32 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsigned literal wider than 32 bits: {}", bits),
            ));
        }
        self.writer.write_var(bits, value)
    }

    /// Writes 16 bits of two's complement.
    pub fn write_signed16(&mut self, value: i16) -> io::Result<()> {
        self.writer.write_signed::<16, i16>(value)
    }

    pub fn write_uleb128(&mut self, value: u32) -> io::Result<()> {
        write_uleb128(&mut self.writer, value)
    }

    /// Appends raw bytes. The cursor must be byte aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.writer.byte_aligned() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "byte write on an unaligned bitstream",
            ));
        }
        self.writer.write_bytes(bytes)
    }

    pub fn byte_aligned(&self) -> bool {
        self.writer.byte_aligned()
    }

    /// Zero-pads the trailing partial byte, if any.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.byte_align()
    }

    /// Flushes and returns the assembled bytes.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        self.writer.byte_align()?;
        Ok(self.writer.into_writer().bytes)
    }
}

impl Default for BitstreamWriter {
    fn default() -> Self {
        Self::new()
    }
}
