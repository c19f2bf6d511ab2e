use super::{read_content, Content, Encode, EncodeError, Encoder, Error, HandleTable};
use super::{ObjectStream, Settings, STREAM_MAGIC, STREAM_VERSION};
use std::io::Write;

/// Whole serialization stream: the header followed by top-level records
#[derive(Clone, Debug, PartialEq)]
pub struct SerializedStream {
    /// Protocol version from the header (always `5` in practice, but kept as found)
    pub version: u16,

    pub contents: Vec<Content>,
}

impl SerializedStream {
    pub fn new(contents: Vec<Content>) -> SerializedStream {
        SerializedStream {
            version: STREAM_VERSION,
            contents,
        }
    }

    /// Decode a complete stream with the default bounds
    pub fn decode(data: &[u8]) -> Result<SerializedStream, Error> {
        SerializedStream::decode_with(data, Settings::new())
    }

    pub fn decode_with(data: &[u8], settings: Settings) -> Result<SerializedStream, Error> {
        let (stream, _) = SerializedStream::decode_with_handles(data, settings)?;
        Ok(stream)
    }

    /// Decode a complete stream, also returning the handle table as it was at the end
    ///
    /// Back-references in the decoded records are handles, so this is what resolves them (as
    /// long as no reset happened after the record being resolved).
    pub fn decode_with_handles(
        data: &[u8],
        settings: Settings,
    ) -> Result<(SerializedStream, HandleTable), Error> {
        let mut stream = ObjectStream::with_settings(data, settings);

        let magic = stream.read_u16()?;
        if magic != STREAM_MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let version = stream.read_u16()?;
        if version != STREAM_VERSION {
            log::warn!("Unexpected stream version {}", version);
        }

        // There is always at least one record after the header
        let mut contents = vec![];
        loop {
            contents.push(read_content(&mut stream)?);
            if stream.is_at_end() {
                break;
            }
        }
        log::debug!(
            "Decoded {} top-level records and {} handles",
            contents.len(),
            stream.handles().len()
        );

        Ok((SerializedStream { version, contents }, stream.into_handles()))
    }

    /// Encode the stream into a fresh buffer
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode_to(vec![])
    }

    /// Encode the stream into `writer`, handing it back once everything has been written
    pub fn encode_to<W: Write>(&self, writer: W) -> Result<W, EncodeError> {
        self.encode_with(writer, Settings::new())
    }

    pub fn encode_with<W: Write>(&self, writer: W, settings: Settings) -> Result<W, EncodeError> {
        let mut encoder = Encoder::with_settings(writer, settings);
        encoder.write(&STREAM_MAGIC)?;
        encoder.write(&self.version)?;
        for content in &self.contents {
            content.encode(&mut encoder)?;
        }
        Ok(encoder.into_inner())
    }
}
