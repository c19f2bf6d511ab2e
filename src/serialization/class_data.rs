use super::{read_annotation, read_content, write_annotation, BaseType, ClassDesc};
use super::{ClassDescFlags, Content, Encode, EncodeError, Encoder, Error, FieldType};
use super::ObjectStream;
use std::io::Write;

/// Serialized state of an object for one class of its hierarchy
#[derive(Clone, Debug, PartialEq)]
pub struct ClassData {
    /// One value per serializable field of the class, in field order
    pub values: Vec<FieldValue>,

    /// Records written by a custom `writeObject` (or `writeExternal`), if the class has one
    pub annotation: Option<Vec<Content>>,
}

impl ClassData {
    /// Read the class data of `class`, using its fields and flags to know what is there
    pub fn read(stream: &mut ObjectStream, class: &ClassDesc) -> Result<ClassData, Error> {
        let flags = class.flags();
        let mut values = Vec::with_capacity(class.fields.len());
        if flags.contains(ClassDescFlags::SERIALIZABLE) {
            for field in &class.fields {
                values.push(FieldValue::read(stream, field.field_type)?);
            }
        } else if flags.contains(ClassDescFlags::EXTERNALIZABLE)
            && !flags.contains(ClassDescFlags::BLOCK_DATA)
        {
            return Err(Error::UnsupportedExternalContents {
                offset: stream.current_index(),
                class_name: class.class_name.to_string_lossy(),
            });
        }

        let annotation = if flags.has_object_annotation() {
            Some(read_annotation(stream)?)
        } else {
            None
        };

        Ok(ClassData { values, annotation })
    }

    /// Write this as the class data of `class`, checking that it fits the class
    pub fn encode_for<W: Write>(
        &self,
        class: &ClassDesc,
        encoder: &mut Encoder<W>,
    ) -> Result<(), EncodeError> {
        let flags = class.flags();
        let expected_values = if flags.contains(ClassDescFlags::SERIALIZABLE) {
            class.fields.len()
        } else {
            0
        };
        if self.values.len() != expected_values {
            return Err(EncodeError::FieldValueMismatch {
                class_name: class.class_name.to_string_lossy(),
                reason: format!(
                    "{} values for {} fields",
                    self.values.len(),
                    expected_values
                ),
            });
        }
        if self.annotation.is_some() != flags.has_object_annotation() {
            return Err(EncodeError::AnnotationMismatch {
                class_name: class.class_name.to_string_lossy(),
            });
        }

        for (value, field) in self.values.iter().zip(&class.fields) {
            if !value.fits(field.field_type) {
                return Err(EncodeError::FieldValueMismatch {
                    class_name: class.class_name.to_string_lossy(),
                    reason: format!(
                        "field '{}' of type {} holds {:?}",
                        field.name, field.field_type, value
                    ),
                });
            }
            value.encode(encoder)?;
        }
        if let Some(annotation) = &self.annotation {
            write_annotation(annotation, encoder)?;
        }
        Ok(())
    }
}

/// Value of a field (or an array element)
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),

    /// The byte as written (anything but 0 is `true`, but it is kept as is)
    Boolean(u8),

    /// Value of an object or array field
    Object(Content),
}

impl FieldValue {
    pub fn read(stream: &mut ObjectStream, field_type: FieldType) -> Result<FieldValue, Error> {
        let value = match field_type {
            FieldType::Base(BaseType::Byte) => FieldValue::Byte(stream.read_i8()?),
            FieldType::Base(BaseType::Char) => FieldValue::Char(stream.read_u16()?),
            FieldType::Base(BaseType::Double) => FieldValue::Double(stream.read_f64()?),
            FieldType::Base(BaseType::Float) => FieldValue::Float(stream.read_f32()?),
            FieldType::Base(BaseType::Int) => FieldValue::Int(stream.read_i32()?),
            FieldType::Base(BaseType::Long) => FieldValue::Long(stream.read_i64()?),
            FieldType::Base(BaseType::Short) => FieldValue::Short(stream.read_i16()?),
            FieldType::Base(BaseType::Boolean) => FieldValue::Boolean(stream.read_u8()?),
            FieldType::Object | FieldType::Array => FieldValue::Object(read_content(stream)?),
        };
        Ok(value)
    }

    /// Could this value have been read for a field of this type?
    pub fn fits(&self, field_type: FieldType) -> bool {
        match (self, field_type) {
            (FieldValue::Byte(_), FieldType::Base(BaseType::Byte))
            | (FieldValue::Char(_), FieldType::Base(BaseType::Char))
            | (FieldValue::Double(_), FieldType::Base(BaseType::Double))
            | (FieldValue::Float(_), FieldType::Base(BaseType::Float))
            | (FieldValue::Int(_), FieldType::Base(BaseType::Int))
            | (FieldValue::Long(_), FieldType::Base(BaseType::Long))
            | (FieldValue::Short(_), FieldType::Base(BaseType::Short))
            | (FieldValue::Boolean(_), FieldType::Base(BaseType::Boolean))
            | (FieldValue::Object(_), FieldType::Object | FieldType::Array) => true,
            _ => false,
        }
    }
}

impl Encode for FieldValue {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        match self {
            FieldValue::Byte(value) => encoder.write(value),
            FieldValue::Char(value) => encoder.write(value),
            FieldValue::Double(value) => encoder.write(value),
            FieldValue::Float(value) => encoder.write(value),
            FieldValue::Int(value) => encoder.write(value),
            FieldValue::Long(value) => encoder.write(value),
            FieldValue::Short(value) => encoder.write(value),
            FieldValue::Boolean(value) => encoder.write(value),
            FieldValue::Object(content) => content.encode(encoder),
        }
    }
}
