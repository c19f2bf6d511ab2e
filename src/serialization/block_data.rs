use super::{Encode, EncodeError, Encoder, Error, ObjectStream, RecordKind};
use super::{TC_BLOCKDATA, TC_BLOCKDATALONG};
use std::io::Write;

/// Raw bytes written by a custom `writeObject` or `writeExternal`
///
/// Block data records are not referenceable and never get a handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockData {
    pub data: Vec<u8>,

    /// Written as `TC_BLOCKDATALONG` (with a 32-bit length) rather than `TC_BLOCKDATA`
    pub long: bool,
}

impl BlockData {
    pub fn read(stream: &mut ObjectStream) -> Result<BlockData, Error> {
        let offset = stream.current_index();
        let (length, long) = match stream.read_u8()? {
            TC_BLOCKDATA => (stream.read_u8()? as usize, false),
            TC_BLOCKDATALONG => {
                let length_offset = stream.current_index();
                let length = stream.read_i32()?;
                if length < 0 {
                    return Err(Error::Malformed {
                        offset: length_offset,
                        record: RecordKind::BlockData,
                        reason: format!("negative block length {}", length),
                    });
                }
                (length as usize, true)
            }
            tag => {
                return Err(Error::UnsupportedTag {
                    offset,
                    tag,
                    context: "block data",
                })
            }
        };
        let data = stream.read_n(length)?.to_vec();
        Ok(BlockData { data, long })
    }
}

impl Encode for BlockData {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        let overflow = || EncodeError::LengthOverflow {
            record: RecordKind::BlockData,
            length: self.data.len(),
        };
        if self.long {
            let length = i32::try_from(self.data.len()).map_err(|_| overflow())?;
            encoder.write(&TC_BLOCKDATALONG)?;
            encoder.write(&length)?;
        } else {
            let length = u8::try_from(self.data.len()).map_err(|_| overflow())?;
            encoder.write(&TC_BLOCKDATA)?;
            encoder.write(&length)?;
        }
        encoder.write_bytes(&self.data)
    }
}
