use super::{read_annotation, write_annotation, ClassPointer, Content, Encode, EncodeError};
use super::{Encoder, Error, Handle, JavaString, ObjectStream, RecordKind, Referent};
use super::TC_PROXYCLASSDESC;
use std::io::Write;
use std::sync::Arc;

/// Description of a dynamic proxy class (`java.lang.reflect.Proxy`)
///
/// Proxy classes have no serializable fields of their own, so instances carry no class data for
/// them. Their super class (normally `java.lang.reflect.Proxy`, with its `h` field) does.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyClassDesc {
    pub handle: Handle,

    /// Names of the interfaces the proxy class implements
    pub interfaces: Vec<JavaString>,

    pub annotation: Vec<Content>,
    pub super_class: ClassPointer,
}

impl ProxyClassDesc {
    /// Decode a `TC_PROXYCLASSDESC` record (registered right after its tag)
    pub fn read(stream: &mut ObjectStream) -> Result<Arc<ProxyClassDesc>, Error> {
        stream.expect_tag(TC_PROXYCLASSDESC, "proxy class descriptor")?;
        let handle = stream.add_reference(Referent::ProxyClassDesc(None));

        let offset = stream.current_index();
        let count = stream.read_i32()?;
        if count < 0 {
            return Err(Error::Malformed {
                offset,
                record: RecordKind::ProxyClassDesc,
                reason: format!("negative interface count {}", count),
            });
        }

        // Every name takes at least its two byte length
        let mut interfaces = Vec::with_capacity((count as usize).min(stream.remaining() / 2));
        for _ in 0..count {
            interfaces.push(stream.read_utf()?);
        }
        log::debug!("Proxy class descriptor {} for {:?}", handle, interfaces);

        let annotation = read_annotation(stream)?;
        let super_class = ClassPointer::read(stream)?;

        let desc = Arc::new(ProxyClassDesc {
            handle,
            interfaces,
            annotation,
            super_class,
        });
        stream.complete_reference(handle, Referent::ProxyClassDesc(Some(desc.clone())));
        Ok(desc)
    }
}

impl Encode for Arc<ProxyClassDesc> {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        encoder.write(&TC_PROXYCLASSDESC)?;
        encoder.add_reference(self.handle, Referent::ProxyClassDesc(None))?;

        let count = i32::try_from(self.interfaces.len()).map_err(|_| {
            EncodeError::LengthOverflow {
                record: RecordKind::ProxyClassDesc,
                length: self.interfaces.len(),
            }
        })?;
        encoder.write(&count)?;
        for interface in &self.interfaces {
            encoder.write_utf(interface, RecordKind::ProxyClassDesc)?;
        }
        write_annotation(&self.annotation, encoder)?;
        self.super_class.encode(encoder)?;

        encoder.complete_reference(self.handle, Referent::ProxyClassDesc(Some(self.clone())));
        Ok(())
    }
}
