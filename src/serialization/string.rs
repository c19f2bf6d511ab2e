use super::{read_content, Content, Encode, EncodeError, Encoder, Error, Handle, JavaString};
use super::{ObjectStream, RecordKind, Referent, TC_LONGSTRING, TC_STRING};
use std::io::Write;

/// `java.lang.String` instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringRecord {
    pub handle: Handle,
    pub value: JavaString,

    /// Written as `TC_LONGSTRING` (with a 64-bit length) rather than `TC_STRING`
    pub long: bool,
}

impl StringRecord {
    pub fn read(stream: &mut ObjectStream) -> Result<StringRecord, Error> {
        let offset = stream.current_index();
        let long = match stream.read_u8()? {
            TC_STRING => false,
            TC_LONGSTRING => true,
            tag => {
                return Err(Error::UnsupportedTag {
                    offset,
                    tag,
                    context: "string",
                })
            }
        };
        let handle = stream.add_reference(Referent::String(JavaString::default()));
        let value = if long {
            stream.read_long_utf()?
        } else {
            stream.read_utf()?
        };
        stream.complete_reference(handle, Referent::String(value.clone()));
        Ok(StringRecord {
            handle,
            value,
            long,
        })
    }
}

impl Encode for StringRecord {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        if self.long {
            encoder.write(&TC_LONGSTRING)?;
            encoder.add_reference(self.handle, Referent::String(self.value.clone()))?;
            encoder.write_long_utf(&self.value)
        } else {
            encoder.write(&TC_STRING)?;
            encoder.add_reference(self.handle, Referent::String(self.value.clone()))?;
            encoder.write_utf(&self.value, RecordKind::String)
        }
    }
}

/// Read a record that has to be a string: either a new one or a back-reference to one
///
/// Returns the record as read along with the string it denotes, or `None` for the string if the
/// record is neither (callers decide what error that is). A back-reference to something other
/// than a string is always an error.
pub fn read_string_object(
    stream: &mut ObjectStream,
) -> Result<(Content, Option<JavaString>), Error> {
    let offset = stream.current_index();
    let content = read_content(stream)?;
    let string = match &content {
        Content::String(record) => Some(record.value.clone()),
        Content::Reference(handle) => match stream.lookup(*handle, RecordKind::String, offset)? {
            Referent::String(value) => Some(value.clone()),
            _ => None,
        },
        _ => None,
    };
    Ok((content, string))
}
