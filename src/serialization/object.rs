use super::{find_class_bag, ClassData, ClassPointer, Encode, EncodeError, Encoder, Error};
use super::{Handle, ObjectStream, Referent, TC_OBJECT};
use std::io::Write;

/// Instance of a serializable class
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    pub handle: Handle,
    pub class_pointer: ClassPointer,

    /// One block per class in the hierarchy, starting at the most ancestral class
    ///
    /// Empty when the class pointer is null.
    pub class_data: Vec<ClassData>,
}

impl Object {
    pub fn read(stream: &mut ObjectStream) -> Result<Object, Error> {
        stream.expect_tag(TC_OBJECT, "object")?;
        let class_pointer = ClassPointer::read(stream)?;
        let handle = stream.add_reference(Referent::Object);

        if class_pointer.is_null() {
            return Ok(Object {
                handle,
                class_pointer,
                class_data: vec![],
            });
        }

        let bag = find_class_bag(&class_pointer, stream)?;
        log::trace!("Object {} has {} classes with data", handle, bag.len());
        let mut class_data = Vec::with_capacity(bag.len());
        for class in bag.ancestors_first() {
            class_data.push(ClassData::read(stream, class)?);
        }

        Ok(Object {
            handle,
            class_pointer,
            class_data,
        })
    }
}

impl Encode for Object {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_OBJECT)?;
        self.class_pointer.encode(encoder)?;
        encoder.add_reference(self.handle, Referent::Object)?;

        let bag = encoder.class_bag(&self.class_pointer)?;
        if bag.len() != self.class_data.len() {
            return Err(EncodeError::ClassDataCountMismatch {
                expected: bag.len(),
                found: self.class_data.len(),
            });
        }
        for (class, data) in bag.ancestors_first().zip(&self.class_data) {
            data.encode_for(class, encoder)?;
        }
        Ok(())
    }
}
