use std::io::Read;
use std::io::Write;

use bitstream_io::BigEndian;
use bitstream_io::BitRead;
use bitstream_io::BitReader;
use bitstream_io::BitWrite;
use bitstream_io::BitWriter;
use log::trace;
use pg_utilities::PgError;

/// Writes values to an underlying byte stream using a canonical, big-endian bit packing.
///
/// Integers are written with [`BitStreamWriter::write_integer`], a 7-bit-per-byte
/// variable-length encoding with a continuation bit in the high-order position of each
/// byte (so smaller values take fewer bytes, independent of the bit width requested
/// elsewhere in the stream).
pub struct BitStreamWriter<W: Write> {
    inner: BitWriter<W, BigEndian>,
}

impl<W: Write> BitStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        BitStreamWriter {
            inner: BitWriter::new(writer),
        }
    }

    /// Writes the low `bits` bits of `value`, most-significant bit first.
    pub fn write_bits(&mut self, value: u64, bits: u32) -> Result<(), PgError> {
        self.inner.write_var(bits, value)?;
        Ok(())
    }

    /// Writes `value` using a 7-bit-per-byte variable-length encoding.
    pub fn write_integer(&mut self, value: u64) -> Result<(), PgError> {
        let mut remainder = value;
        loop {
            let mut byte = (remainder & 0x7f) as u8;
            remainder >>= 7;
            if remainder != 0 {
                byte |= 0x80;
            }
            self.inner.write_var(8, byte)?;
            if remainder == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Writes `s` as a length-prefixed sequence of bytes.
    pub fn write_string(&mut self, s: &str) -> Result<(), PgError> {
        self.write_integer(s.len() as u64)?;
        for byte in s.as_bytes() {
            self.inner.write_var(8, *byte)?;
        }
        Ok(())
    }

    /// Flushes any buffered bits, padding the final byte with zeroes.
    pub fn flush(&mut self) -> Result<(), PgError> {
        self.inner.byte_align()?;
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for BitStreamWriter<W> {
    fn drop(&mut self) {
        if let Err(error) = self.flush() {
            trace!("failed to flush bitstream writer on drop: {error}");
        }
    }
}

/// Reads values written by [`BitStreamWriter`].
pub struct BitStreamReader<R: Read> {
    inner: BitReader<R, BigEndian>,
}

impl<R: Read> BitStreamReader<R> {
    pub fn new(reader: R) -> Self {
        BitStreamReader {
            inner: BitReader::new(reader),
        }
    }

    /// Reads `bits` bits, most-significant bit first.
    pub fn read_bits(&mut self, bits: u32) -> Result<u64, PgError> {
        Ok(self.inner.read_var(bits)?)
    }

    /// Reads a value written by [`BitStreamWriter::write_integer`].
    pub fn read_integer(&mut self) -> Result<u64, PgError> {
        let mut value: u64 = 0;
        let mut shift = 0;
        loop {
            let byte: u8 = self.inner.read_var(8)?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(value)
    }

    /// Reads a value written by [`BitStreamWriter::write_string`].
    pub fn read_string(&mut self) -> Result<String, PgError> {
        let len = self.read_integer()? as usize;
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(self.inner.read_var(8)?);
        }
        String::from_utf8(bytes)
            .map_err(|error| PgError::InvalidInput { reason: error.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use arbitrary::Arbitrary;
    use arbitrary::Unstructured;

    #[derive(Debug, Arbitrary)]
    enum Instruction {
        String(String),
        Integer(u64),
        Bits(u8, u32),
    }

    #[test]
    fn test_roundtrip_bitstream() {
        arbtest::arbtest(|u| {
            let instructions: Vec<Instruction> = u.arbitrary()?;

            let mut buffer = Vec::new();
            {
                let mut writer = BitStreamWriter::new(&mut buffer);
                for instruction in &instructions {
                    match instruction {
                        Instruction::String(s) => writer.write_string(s).unwrap(),
                        Instruction::Integer(value) => writer.write_integer(*value).unwrap(),
                        Instruction::Bits(value, bits) => {
                            let bits = (*bits % 8) + 1;
                            writer.write_bits(u64::from(*value) & ((1u64 << bits) - 1), bits).unwrap();
                        }
                    }
                }
                writer.flush().unwrap();
            }

            let mut reader = BitStreamReader::new(buffer.as_slice());
            for instruction in &instructions {
                match instruction {
                    Instruction::String(s) => assert_eq!(reader.read_string().unwrap(), *s),
                    Instruction::Integer(value) => assert_eq!(reader.read_integer().unwrap(), *value),
                    Instruction::Bits(value, bits) => {
                        let bits = (*bits % 8) + 1;
                        let expected = u64::from(*value) & ((1u64 << bits) - 1);
                        assert_eq!(reader.read_bits(bits).unwrap(), expected);
                    }
                }
            }

            Ok(())
        });
    }

    #[test]
    fn test_small_integers_take_one_byte() {
        let mut buffer = Vec::new();
        {
            let mut writer = BitStreamWriter::new(&mut buffer);
            writer.write_integer(100).unwrap();
        }
        assert_eq!(buffer.len(), 1);
    }
}
