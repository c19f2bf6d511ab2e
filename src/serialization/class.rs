use super::{ClassPointer, Encode, EncodeError, Encoder, Error, Handle, ObjectStream, Referent};
use super::TC_CLASS;
use std::io::Write;

/// `java.lang.Class` instance (`TC_CLASS`)
#[derive(Clone, Debug, PartialEq)]
pub struct ClassRecord {
    pub handle: Handle,
    pub class_pointer: ClassPointer,
}

impl ClassRecord {
    pub fn read(stream: &mut ObjectStream) -> Result<ClassRecord, Error> {
        stream.expect_tag(TC_CLASS, "class")?;
        let class_pointer = ClassPointer::read(stream)?;
        let handle = stream.add_reference(Referent::Class);
        Ok(ClassRecord {
            handle,
            class_pointer,
        })
    }
}

impl Encode for ClassRecord {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_CLASS)?;
        self.class_pointer.encode(encoder)?;
        encoder.add_reference(self.handle, Referent::Class)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn class_after_its_descriptor() {
        let data = [
            TC_CLASS, 0x72, 0x00, 0x01, b'C', 0, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x00, 0x00, 0x78, 0x70,
        ];
        let mut stream = ObjectStream::new(&data);
        let class = ClassRecord::read(&mut stream).unwrap();
        assert_eq!(class.handle, Handle(0x7E0001));
        assert!(class.class_pointer.is_inline());

        let mut encoder = Encoder::new(vec![]);
        class.encode(&mut encoder).unwrap();
        assert_eq!(encoder.into_inner(), data.to_vec());

        // Handles are checked against the order records get replayed in
        let renumbered = ClassRecord {
            handle: Handle::BASE,
            ..class
        };
        let mut encoder = Encoder::new(vec![]);
        assert!(matches!(
            renumbered.encode(&mut encoder),
            Err(EncodeError::HandleMismatch {
                stored: Handle(0x7E0000),
                assigned: Handle(0x7E0001)
            })
        ));
    }
}
