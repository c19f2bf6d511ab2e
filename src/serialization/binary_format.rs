use byteorder::{BigEndian, WriteBytesExt};
use std::io::Result;

/// Utility trait for writing the fixed-layout pieces of a serialization stream
///
/// Records that take part in handle assignment go through [`super::Encode`] instead, since they
/// need the encoder's handle table. Everything here is a leaf:
///
///   - tags and flags are always `u8`
///   - every multi-byte number is big-endian
///   - lengths are written by the caller, since their width depends on the record (`u16` for
///     field counts and short strings, `i32` for arrays, `u64` for long strings)
///
pub trait Serialize: Sized {
    /// Serialize construct into a binary output stream
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()>;
}

impl Serialize for u8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)
    }
}

impl Serialize for u16 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<BigEndian>(*self)
    }
}

impl Serialize for u32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<BigEndian>(*self)
    }
}

impl Serialize for u64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<BigEndian>(*self)
    }
}

impl Serialize for i8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i8(*self)
    }
}

impl Serialize for i16 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<BigEndian>(*self)
    }
}

impl Serialize for i32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<BigEndian>(*self)
    }
}

impl Serialize for i64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i64::<BigEndian>(*self)
    }
}

/// Floats go through their bit patterns so that NaN payloads survive a round trip
impl Serialize for f32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<BigEndian>(self.to_bits())
    }
}

impl Serialize for f64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<BigEndian>(self.to_bits())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn numbers_are_big_endian() {
        let mut out: Vec<u8> = vec![];
        0x0102u16.serialize(&mut out).unwrap();
        0x7E0000u32.serialize(&mut out).unwrap();
        (-2i64).serialize(&mut out).unwrap();
        assert_eq!(
            out,
            vec![1, 2, 0, 0x7E, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn nan_payload_survives() {
        let weird = f64::from_bits(0x7FF0_0000_0000_0001);
        let mut out: Vec<u8> = vec![];
        weird.serialize(&mut out).unwrap();
        assert_eq!(out, vec![0x7F, 0xF0, 0, 0, 0, 0, 0, 1]);
    }
}
