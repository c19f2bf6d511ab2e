use super::{read_string_object, ClassPointer, Content, Encode, EncodeError, Encoder, Error};
use super::{Handle, JavaString, ObjectStream, RecordKind, Referent, TC_ENUM};
use std::io::Write;

/// Enum constant, identified by the name of the constant
#[derive(Clone, Debug, PartialEq)]
pub struct EnumConstant {
    pub handle: Handle,
    pub class_pointer: ClassPointer,

    /// String record (or reference to one) holding the constant name
    pub constant_name: Content,
}

impl EnumConstant {
    pub fn read(stream: &mut ObjectStream) -> Result<EnumConstant, Error> {
        stream.expect_tag(TC_ENUM, "enum constant")?;
        let class_pointer = ClassPointer::read(stream)?;
        let handle = stream.add_reference(Referent::Enum);

        let name_offset = stream.current_index();
        let (constant_name, name) = read_string_object(stream)?;
        if name.is_none() {
            return Err(Error::Malformed {
                offset: name_offset,
                record: RecordKind::Enum,
                reason: format!("constant name is a {:?}", constant_name.kind()),
            });
        }

        Ok(EnumConstant {
            handle,
            class_pointer,
            constant_name,
        })
    }

    /// Name of the constant, when it is written inline
    pub fn inline_name(&self) -> Option<&JavaString> {
        match &self.constant_name {
            Content::String(record) => Some(&record.value),
            _ => None,
        }
    }
}

impl Encode for EnumConstant {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_ENUM)?;
        self.class_pointer.encode(encoder)?;
        encoder.add_reference(self.handle, Referent::Enum)?;
        self.constant_name.encode(encoder)
    }
}
