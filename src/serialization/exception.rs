use super::{read_content, Content, Encode, EncodeError, Encoder, Error, ObjectStream};
use super::TC_EXCEPTION;
use std::io::Write;

/// Exception thrown while the stream was being written
///
/// The handle table is reset on both sides of the throwable, so the throwable can only refer to
/// records inside itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ExceptionRecord {
    pub throwable: Content,
}

impl ExceptionRecord {
    pub fn read(stream: &mut ObjectStream) -> Result<ExceptionRecord, Error> {
        stream.expect_tag(TC_EXCEPTION, "exception")?;
        stream.reset_handles();
        let throwable = read_content(stream)?;
        stream.reset_handles();
        Ok(ExceptionRecord { throwable })
    }
}

impl Encode for ExceptionRecord {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_EXCEPTION)?;
        encoder.reset_handles();
        self.throwable.encode(encoder)?;
        encoder.reset_handles();
        Ok(())
    }
}
