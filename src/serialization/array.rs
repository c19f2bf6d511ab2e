use super::{ClassPointer, Encode, EncodeError, Encoder, Error, FieldType, FieldValue, Handle};
use super::{ObjectStream, RecordKind, Referent, TC_ARRAY};
use std::io::Write;

/// Array of primitives or references
///
/// The element type is not written out: it comes from the name of the array class (eg. `[I` for
/// `int[]`, `[Ljava.lang.String;` for `String[]`).
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    pub handle: Handle,
    pub class_pointer: ClassPointer,
    pub values: Vec<FieldValue>,
}

impl Array {
    pub fn read(stream: &mut ObjectStream) -> Result<Array, Error> {
        stream.expect_tag(TC_ARRAY, "array")?;
        let class_offset = stream.current_index();
        let class_pointer = ClassPointer::read(stream)?;
        let handle = stream.add_reference(Referent::Array);

        let class = class_pointer
            .class_desc(stream.handles())
            .map_err(|err| err.at(class_offset))?
            .ok_or_else(|| Error::Malformed {
                offset: class_offset,
                record: RecordKind::Array,
                reason: String::from("array without a class"),
            })?;
        let class_name = class.class_name.to_string_lossy();
        let element_type =
            FieldType::of_array_elements(&class_name).ok_or_else(|| Error::Malformed {
                offset: class_offset,
                record: RecordKind::Array,
                reason: format!("'{}' is not an array class", class_name),
            })?;

        let size_offset = stream.current_index();
        let size = stream.read_i32()?;
        if size < 0 {
            return Err(Error::Malformed {
                offset: size_offset,
                record: RecordKind::Array,
                reason: format!("negative array size {}", size),
            });
        }
        log::trace!("Array {} of {} {}", handle, size, element_type);

        let mut values = Vec::with_capacity((size as usize).min(stream.remaining()));
        for _ in 0..size {
            values.push(FieldValue::read(stream, element_type)?);
        }

        Ok(Array {
            handle,
            class_pointer,
            values,
        })
    }
}

impl Encode for Array {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_ARRAY)?;
        self.class_pointer.encode(encoder)?;
        encoder.add_reference(self.handle, Referent::Array)?;

        let class = encoder.class_desc(&self.class_pointer)?;
        let class_name = class
            .map(|class| class.class_name.to_string_lossy())
            .unwrap_or_default();
        let element_type = FieldType::of_array_elements(&class_name).ok_or_else(|| {
            EncodeError::FieldValueMismatch {
                class_name: class_name.clone(),
                reason: String::from("array class is not an array type"),
            }
        })?;

        let size = i32::try_from(self.values.len()).map_err(|_| EncodeError::LengthOverflow {
            record: RecordKind::Array,
            length: self.values.len(),
        })?;
        encoder.write(&size)?;
        for value in &self.values {
            if !value.fits(element_type) {
                return Err(EncodeError::FieldValueMismatch {
                    class_name,
                    reason: format!("element {:?} in an array of {}", value, element_type),
                });
            }
            value.encode(encoder)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serialization::TC_NULL;

    /// `new int[] { 1, -1 }`
    const INTS: &[u8] = &[
        TC_ARRAY, 0x72, 0x00, 0x02, b'[', b'I', 0x4D, 0xBA, 0x60, 0x26, 0x76, 0xEA, 0xB2, 0xA5,
        0x02, 0x00, 0x00, 0x78, 0x70, // class [I
        0x00, 0x00, 0x00, 0x02, // size
        0x00, 0x00, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF,
    ];

    #[test]
    fn int_array() {
        let mut stream = ObjectStream::new(INTS);
        let array = Array::read(&mut stream).unwrap();
        assert!(stream.is_at_end());
        assert_eq!(array.handle, Handle(0x7E0001));
        assert_eq!(array.values, vec![FieldValue::Int(1), FieldValue::Int(-1)]);

        let mut encoder = Encoder::new(vec![]);
        array.encode(&mut encoder).unwrap();
        assert_eq!(encoder.into_inner(), INTS.to_vec());

        let mut mistyped = array;
        mistyped.values.push(FieldValue::Long(3));
        let mut encoder = Encoder::new(vec![]);
        assert!(matches!(
            mistyped.encode(&mut encoder),
            Err(EncodeError::FieldValueMismatch { .. })
        ));
    }

    #[test]
    fn negative_size() {
        let mut data = INTS[..19].to_vec();
        data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFE]);
        let mut stream = ObjectStream::new(&data);
        match Array::read(&mut stream) {
            Err(Error::Malformed {
                offset: 19,
                record: RecordKind::Array,
                ..
            }) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn array_without_class() {
        let mut stream = ObjectStream::new(&[TC_ARRAY, TC_NULL, 0, 0, 0, 0]);
        assert!(matches!(
            Array::read(&mut stream),
            Err(Error::Malformed {
                offset: 1,
                record: RecordKind::Array,
                ..
            })
        ));
    }

    #[test]
    fn huge_size_is_truncation_not_allocation() {
        let mut data = INTS[..19].to_vec();
        data.extend_from_slice(&[0x7F, 0xFF, 0xFF, 0xFF, 0x00]);
        let mut stream = ObjectStream::new(&data);
        assert!(matches!(
            Array::read(&mut stream),
            Err(Error::UnexpectedEndOfStream { .. })
        ));
    }
}
