//! MSB-first bit reader with Exp-Golomb decoding.

use crate::error::ParseError;

/// Bit-aligned cursor over an RBSP buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current cursor position in bits.
    pub fn position(&self) -> usize {
        self.position
    }

    fn bit_len(&self) -> usize {
        self.data.len() * 8
    }

    pub fn read_bit(&mut self) -> Result<bool, ParseError> {
        if self.position >= self.bit_len() {
            return Err(ParseError::Exhausted {
                position: self.position,
                length: self.bit_len(),
            });
        }
        let byte = self.data[self.position / 8];
        let bit = (byte >> (7 - self.position % 8)) & 1;
        self.position += 1;
        Ok(bit == 1)
    }

    /// Read `count` bits (at most 32) as an unsigned value.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, ParseError> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Unsigned Exp-Golomb (`ue(v)`).
    pub fn read_ue(&mut self) -> Result<u32, ParseError> {
        let mut leading_zeros = 0u32;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(ParseError::ExpGolombOverflow(leading_zeros));
            }
        }
        let suffix = self.read_bits(leading_zeros)?;
        let value = ((1u64 << leading_zeros) - 1) + suffix as u64;
        u32::try_from(value).map_err(|_| ParseError::ValueOutOfRange("ue(v)"))
    }

    /// Signed Exp-Golomb (`se(v)`): odd codes are positive.
    pub fn read_se(&mut self) -> Result<i32, ParseError> {
        let code = self.read_ue()? as i64;
        let magnitude = (code + 1) / 2;
        let value = if code % 2 == 1 { magnitude } else { -magnitude };
        i32::try_from(value).map_err(|_| ParseError::ValueOutOfRange("se(v)"))
    }
}

#[cfg(test)]
pub(crate) mod test_writer {
    /// Builds RBSP bitstreams for parser tests.
    #[derive(Default)]
    pub struct BitWriter {
        bytes: Vec<u8>,
        bits: usize,
    }

    impl BitWriter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn bit(&mut self, set: bool) -> &mut Self {
            if self.bits % 8 == 0 {
                self.bytes.push(0);
            }
            if set {
                let last = self.bytes.last_mut().unwrap();
                *last |= 0x80 >> (self.bits % 8);
            }
            self.bits += 1;
            self
        }

        pub fn bits(&mut self, value: u64, count: u32) -> &mut Self {
            for i in (0..count).rev() {
                self.bit((value >> i) & 1 == 1);
            }
            self
        }

        pub fn ue(&mut self, value: u32) -> &mut Self {
            let code = value as u64 + 1;
            let len = 64 - code.leading_zeros();
            self.bits(0, len - 1);
            self.bits(code, len)
        }

        pub fn se(&mut self, value: i32) -> &mut Self {
            let code = if value > 0 {
                2 * value as u32 - 1
            } else {
                (-2 * value as i64) as u32
            };
            self.ue(code)
        }

        /// Append the RBSP stop bit and return the bytes.
        pub fn finish(&mut self) -> Vec<u8> {
            self.bit(true);
            std::mem::take(&mut self.bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_writer::BitWriter;
    use super::*;

    #[test]
    fn reads_across_byte_boundaries() {
        let mut r = BitReader::new(&[0b1010_1100, 0b0101_0000]);
        assert!(r.read_bit().unwrap());
        assert_eq!(r.read_bits(7).unwrap(), 0b010_1100);
        assert_eq!(r.read_bits(4).unwrap(), 0b0101);
        assert_eq!(r.position(), 12);
    }

    #[test]
    fn exp_golomb_unsigned() {
        // 1 | 010 | 011 | 00100 | 0001000
        let mut r = BitReader::new(&[0b1010_0110, 0b0100_0001, 0b0000_0000]);
        assert_eq!(r.read_ue().unwrap(), 0);
        assert_eq!(r.read_ue().unwrap(), 1);
        assert_eq!(r.read_ue().unwrap(), 2);
        assert_eq!(r.read_ue().unwrap(), 3);
        assert_eq!(r.read_ue().unwrap(), 7);
    }

    #[test]
    fn exp_golomb_signed() {
        let bytes = BitWriter::new().se(0).se(1).se(-1).se(2).se(-2).se(-300).finish();
        let mut r = BitReader::new(&bytes);
        for expected in [0, 1, -1, 2, -2, -300] {
            assert_eq!(r.read_se().unwrap(), expected);
        }
    }

    #[test]
    fn exhausted_buffer_is_an_error() {
        let mut r = BitReader::new(&[0xFF]);
        r.read_bits(8).unwrap();
        assert_eq!(
            r.read_bit(),
            Err(ParseError::Exhausted {
                position: 8,
                length: 8
            })
        );
    }

    #[test]
    fn truncated_exp_golomb_is_an_error() {
        // Three leading zeros, then only two suffix bits remain.
        let mut r = BitReader::new(&[0b0001_01]);
        r.read_bits(2).unwrap();
        assert!(matches!(r.read_ue(), Err(ParseError::Exhausted { .. })));
    }

    #[test]
    fn all_zero_prefix_overflows() {
        let mut r = BitReader::new(&[0u8; 8]);
        assert_eq!(r.read_ue(), Err(ParseError::ExpGolombOverflow(32)));
    }
}
