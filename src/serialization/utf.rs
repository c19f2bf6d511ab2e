use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

/// String as it appears in a serialization stream: modified UTF-8 bytes
///
/// The raw bytes are what gets stored, not a decoded `String`. Hostile streams often carry bytes
/// that are not valid modified UTF-8, and they still have to be re-encoded exactly. Decoding is
/// available on demand through [`JavaString::decode`] and [`JavaString::to_string_lossy`].
#[derive(Clone, Hash, Eq, PartialEq, Default)]
pub struct JavaString(Vec<u8>);

impl JavaString {
    /// Wrap raw modified UTF-8 bytes (these are not checked)
    pub fn from_bytes(bytes: Vec<u8>) -> JavaString {
        JavaString(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the encoded form, in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode, failing on malformed byte sequences or unpaired surrogates
    pub fn decode(&self) -> Option<String> {
        let units = decode_modified_utf8(&self.0).ok()?;
        String::from_utf16(&units).ok()
    }

    /// Decode, replacing anything malformed with `U+FFFD`
    pub fn to_string_lossy(&self) -> String {
        let units = match decode_modified_utf8(&self.0) {
            Ok(units) => units,
            Err(units) => units,
        };
        String::from_utf16_lossy(&units)
    }
}

impl From<&str> for JavaString {
    fn from(string: &str) -> JavaString {
        JavaString(encode_modified_utf8(string))
    }
}

impl Debug for JavaString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl Display for JavaString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_string_lossy())
    }
}

/// Modified UTF-8 format used by `DataOutput.writeUTF` (and so by serialization streams)
///
/// See [this `DataInput` section for details][0]. In short: the string is first turned into UTF-16
/// code units and each unit is written in the 1, 2, or 3 byte UTF-8 form. The null character gets
/// the 2 byte form, and supplementary characters end up as two 3 byte surrogates.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = Vec::with_capacity(string.len());
    for unit in string.encode_utf16() {
        match unit {
            0x0001..=0x007F => buffer.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                buffer.push(0b1100_0000 | (unit >> 6) as u8);
                buffer.push(0b1000_0000 | (unit & 0x3F) as u8);
            }
            _ => {
                buffer.push(0b1110_0000 | (unit >> 12) as u8);
                buffer.push(0b1000_0000 | (unit >> 6 & 0x3F) as u8);
                buffer.push(0b1000_0000 | (unit & 0x3F) as u8);
            }
        }
    }
    buffer
}

/// Inverse of [`encode_modified_utf8`], producing UTF-16 code units
///
/// On a malformed sequence, the error holds the units decoded with `U+FFFD` substituted for every
/// bad sequence.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<Vec<u16>, Vec<u16>> {
    const REPLACEMENT: u16 = 0xFFFD;

    fn continuation(byte: Option<&u8>) -> Option<u16> {
        match byte {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => Some((b & 0x3F) as u16),
            _ => None,
        }
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut malformed = false;
    let mut idx = 0;
    while idx < bytes.len() {
        let lead = bytes[idx];
        match lead >> 4 {
            0x0..=0x7 => {
                units.push(lead as u16);
                idx += 1;
            }
            0xC | 0xD => match continuation(bytes.get(idx + 1)) {
                Some(low) => {
                    units.push(((lead & 0x1F) as u16) << 6 | low);
                    idx += 2;
                }
                None => {
                    units.push(REPLACEMENT);
                    malformed = true;
                    idx += 1;
                }
            },
            0xE => match (
                continuation(bytes.get(idx + 1)),
                continuation(bytes.get(idx + 2)),
            ) {
                (Some(mid), Some(low)) => {
                    units.push(((lead & 0x0F) as u16) << 12 | mid << 6 | low);
                    idx += 3;
                }
                _ => {
                    units.push(REPLACEMENT);
                    malformed = true;
                    idx += 1;
                }
            },
            _ => {
                units.push(REPLACEMENT);
                malformed = true;
                idx += 1;
            }
        }
    }

    if malformed {
        Err(units)
    } else {
        Ok(units)
    }
}
