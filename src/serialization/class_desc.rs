use super::{read_annotation, read_string_object, write_annotation, ClassDescFlags, ClassPointer};
use super::{Content, Encode, EncodeError, Encoder, Error, FieldType, Handle, JavaString};
use super::{ObjectStream, RecordKind, Referent, TC_CLASSDESC};
use std::io::Write;
use std::sync::Arc;

/// Description of one serializable class
///
/// Once decoded a descriptor never changes, and it is shared (through `Arc`) between the graph
/// and the handle table. Its super class is a [`ClassPointer`], so a descriptor whose super class
/// was already seen only holds that class's handle.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDesc {
    pub handle: Handle,
    pub class_name: JavaString,
    pub serial_version_uid: i64,

    /// Flag byte exactly as read (see [`ClassDesc::flags`] for the recognized bits)
    pub raw_flags: u8,

    /// Serializable fields, in the order their values appear in class data
    pub fields: Vec<FieldDesc>,

    /// Extra records written by `ObjectOutputStream.annotateClass`
    pub annotation: Vec<Content>,

    pub super_class: ClassPointer,
}

impl ClassDesc {
    /// Recognized flag bits (unknown bits are dropped here, but kept in `raw_flags`)
    pub fn flags(&self) -> ClassDescFlags {
        ClassDescFlags::from_bits_truncate(self.raw_flags)
    }

    pub fn has_flag(&self, flag: ClassDescFlags) -> bool {
        self.flags().contains(flag)
    }

    /// Decode a `TC_CLASSDESC` record
    ///
    /// The descriptor is registered in the handle table right after its serial version UID, so
    /// records inside its annotation or super class chain can already refer back to it.
    pub fn read(stream: &mut ObjectStream) -> Result<Arc<ClassDesc>, Error> {
        stream.expect_tag(TC_CLASSDESC, "class descriptor")?;
        let class_name = stream.read_utf()?;
        let serial_version_uid = stream.read_i64()?;
        let handle = stream.add_reference(Referent::ClassDesc(None));
        log::debug!("Class descriptor {} for '{}'", handle, class_name);

        let raw_flags = stream.read_u8()?;
        let field_count = stream.read_u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(FieldDesc::read(stream)?);
        }
        let annotation = read_annotation(stream)?;
        let super_class = ClassPointer::read(stream)?;

        let desc = Arc::new(ClassDesc {
            handle,
            class_name,
            serial_version_uid,
            raw_flags,
            fields,
            annotation,
            super_class,
        });
        stream.complete_reference(handle, Referent::ClassDesc(Some(desc.clone())));
        Ok(desc)
    }
}

impl Encode for Arc<ClassDesc> {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_CLASSDESC)?;
        encoder.write_utf(&self.class_name, RecordKind::ClassDesc)?;
        encoder.write(&self.serial_version_uid)?;
        encoder.add_reference(self.handle, Referent::ClassDesc(None))?;

        encoder.write(&self.raw_flags)?;
        let field_count = u16::try_from(self.fields.len()).map_err(|_| {
            EncodeError::LengthOverflow {
                record: RecordKind::ClassDesc,
                length: self.fields.len(),
            }
        })?;
        encoder.write(&field_count)?;
        for field in &self.fields {
            field.encode(encoder)?;
        }
        write_annotation(&self.annotation, encoder)?;
        self.super_class.encode(encoder)?;

        encoder.complete_reference(self.handle, Referent::ClassDesc(Some(self.clone())));
        Ok(())
    }
}

/// Serializable field of a class
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDesc {
    pub field_type: FieldType,
    pub name: JavaString,

    /// Type signature of object and array fields (eg. `Ljava/lang/String;`), as a string record
    /// or a back-reference to one
    pub class_name: Option<Content>,
}

impl FieldDesc {
    pub fn read(stream: &mut ObjectStream) -> Result<FieldDesc, Error> {
        let offset = stream.current_index();
        let code = stream.read_u8()?;
        let field_type = FieldType::from_code(code).ok_or_else(|| Error::MalformedField {
            offset,
            reason: format!("invalid type code {:#04x}", code),
        })?;
        let name = stream.read_utf()?;

        let class_name = if field_type.is_primitive() {
            None
        } else {
            let signature_offset = stream.current_index();
            let (content, signature) = read_string_object(stream)?;
            let signature = signature.ok_or_else(|| Error::MalformedField {
                offset: signature_offset,
                reason: format!(
                    "type of field '{}' is a {:?} instead of a string",
                    name,
                    content.kind()
                ),
            })?;
            if FieldType::of_signature(&signature.to_string_lossy()).is_none() {
                return Err(Error::MalformedField {
                    offset: signature_offset,
                    reason: format!("field '{}' has invalid type '{}'", name, signature),
                });
            }
            Some(content)
        };

        Ok(FieldDesc {
            field_type,
            name,
            class_name,
        })
    }
}

impl Encode for FieldDesc {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&self.field_type.code())?;
        encoder.write_utf(&self.name, RecordKind::Field)?;
        match (&self.class_name, self.field_type.is_primitive()) {
            (None, true) => Ok(()),
            (Some(class_name), false) => class_name.encode(encoder),
            (_, primitive) => Err(EncodeError::FieldValueMismatch {
                class_name: self.name.to_string_lossy(),
                reason: if primitive {
                    String::from("primitive field with a type signature")
                } else {
                    String::from("object field without a type signature")
                },
            }),
        }
    }
}
