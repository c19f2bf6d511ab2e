use super::{ClassDesc, Encode, EncodeError, Encoder, Error, ObjectStream, ProxyClassDesc};
use super::{Handle, HandleTable, RecordKind, Referent};
use super::{TC_CLASSDESC, TC_NULL, TC_PROXYCLASSDESC, TC_REFERENCE};
use std::io::Write;
use std::sync::Arc;

/// Pointer to a class descriptor, as found in front of objects, arrays, enums, classes, and after
/// every descriptor (for its super class)
///
/// The last two variants are both descriptors written inline.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassPointer {
    /// No class (or, after a descriptor, no serializable super class)
    Null,

    /// Back-reference to a descriptor seen earlier
    Reference(Handle),

    ClassDesc(Arc<ClassDesc>),
    ProxyClassDesc(Arc<ProxyClassDesc>),
}

impl ClassPointer {
    /// Decode a class pointer
    ///
    /// Inline descriptors register themselves in the handle table as they are read.
    pub fn read(stream: &mut ObjectStream) -> Result<ClassPointer, Error> {
        let offset = stream.current_index();
        let pointer = match stream.peek_tag()? {
            TC_NULL => {
                stream.read_u8()?;
                ClassPointer::Null
            }
            TC_REFERENCE => {
                stream.read_u8()?;
                let handle = Handle(stream.read_u32()?);
                stream.lookup(handle, RecordKind::AnyClassDesc, offset)?;
                ClassPointer::Reference(handle)
            }
            TC_CLASSDESC => {
                stream.enter()?;
                let desc = ClassDesc::read(stream)?;
                stream.leave();
                ClassPointer::ClassDesc(desc)
            }
            TC_PROXYCLASSDESC => {
                stream.enter()?;
                let desc = ProxyClassDesc::read(stream)?;
                stream.leave();
                ClassPointer::ProxyClassDesc(desc)
            }
            tag => {
                return Err(Error::UnsupportedTag {
                    offset,
                    tag,
                    context: "class descriptor",
                })
            }
        };
        Ok(pointer)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ClassPointer::Null)
    }

    /// Is the descriptor written out here, as opposed to referred to?
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            ClassPointer::ClassDesc(_) | ClassPointer::ProxyClassDesc(_)
        )
    }

    /// The (non-proxy) class descriptor this points to directly, without walking super classes
    pub fn class_desc(&self, handles: &HandleTable) -> Result<Option<Arc<ClassDesc>>, ClassBagError> {
        match self.resolve(handles)? {
            None => Ok(None),
            Some(Resolved::ClassDesc(desc)) => Ok(Some(desc)),
            Some(Resolved::ProxyClassDesc(proxy)) => Err(ClassBagError::Unresolved {
                handle: proxy.handle,
                expected: RecordKind::ClassDesc,
                found: Some(RecordKind::ProxyClassDesc),
            }),
        }
    }

    /// Follow one pointer (not the super chain)
    fn resolve(&self, handles: &HandleTable) -> Result<Option<Resolved>, ClassBagError> {
        let resolved = match self {
            ClassPointer::Null => return Ok(None),
            ClassPointer::ClassDesc(desc) => Resolved::ClassDesc(desc.clone()),
            ClassPointer::ProxyClassDesc(proxy) => Resolved::ProxyClassDesc(proxy.clone()),
            ClassPointer::Reference(handle) => match handles.get(*handle) {
                Some(Referent::ClassDesc(Some(desc))) => Resolved::ClassDesc(desc.clone()),
                Some(Referent::ProxyClassDesc(Some(proxy))) => {
                    Resolved::ProxyClassDesc(proxy.clone())
                }

                // Still being decoded, so its fields are not known yet
                Some(Referent::ClassDesc(None)) | Some(Referent::ProxyClassDesc(None)) | None => {
                    return Err(ClassBagError::Unresolved {
                        handle: *handle,
                        expected: RecordKind::AnyClassDesc,
                        found: None,
                    })
                }
                Some(other) => {
                    return Err(ClassBagError::Unresolved {
                        handle: *handle,
                        expected: RecordKind::AnyClassDesc,
                        found: Some(other.kind()),
                    })
                }
            },
        };
        Ok(Some(resolved))
    }
}

impl Encode for ClassPointer {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        match self {
            ClassPointer::Null => encoder.write(&TC_NULL),
            ClassPointer::Reference(handle) => {
                encoder.write(&TC_REFERENCE)?;
                encoder.write(handle)
            }
            ClassPointer::ClassDesc(desc) => desc.encode(encoder),
            ClassPointer::ProxyClassDesc(proxy) => proxy.encode(encoder),
        }
    }
}

enum Resolved {
    ClassDesc(Arc<ClassDesc>),
    ProxyClassDesc(Arc<ProxyClassDesc>),
}

/// Problems following class pointers through a handle table
#[derive(Debug)]
pub enum ClassBagError {
    Unresolved {
        handle: Handle,
        expected: RecordKind,
        found: Option<RecordKind>,
    },
    TooDeep {
        limit: usize,
    },
}

/// Class hierarchy of an object: its own class first, then each super class in turn
///
/// Proxy class descriptors are passed through (they never have class data of their own), so
/// every entry here is a class that contributes one class data block to instances.
#[derive(Clone, Debug, Default)]
pub struct ClassBag {
    classes: Vec<Arc<ClassDesc>>,
}

impl ClassBag {
    /// Walk super class pointers starting at `pointer`
    ///
    /// At most `max_depth` descriptors get visited, since a descriptor may name itself (or one of
    /// its subclasses) as its super class.
    pub fn resolve(
        pointer: &ClassPointer,
        handles: &HandleTable,
        max_depth: usize,
    ) -> Result<ClassBag, ClassBagError> {
        let mut classes = vec![];
        let mut visited = 0;
        let mut next = pointer.resolve(handles)?;
        while let Some(resolved) = next {
            visited += 1;
            if visited > max_depth {
                return Err(ClassBagError::TooDeep { limit: max_depth });
            }
            next = match resolved {
                Resolved::ClassDesc(desc) => {
                    let super_class = desc.super_class.resolve(handles)?;
                    classes.push(desc);
                    super_class
                }
                Resolved::ProxyClassDesc(proxy) => proxy.super_class.resolve(handles)?,
            };
        }
        Ok(ClassBag { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes from most derived to most ancestral
    pub fn classes(&self) -> &[Arc<ClassDesc>] {
        &self.classes
    }

    /// Classes in the order their class data appears in a stream (most ancestral first)
    pub fn ancestors_first(&self) -> impl Iterator<Item = &Arc<ClassDesc>> + '_ {
        self.classes.iter().rev()
    }
}

/// Class hierarchy of a class pointer, using the handles decoded so far
pub fn find_class_bag(pointer: &ClassPointer, stream: &ObjectStream) -> Result<ClassBag, Error> {
    ClassBag::resolve(pointer, stream.handles(), stream.settings().max_class_depth)
        .map_err(|err| err.at(stream.current_index()))
}

impl ClassBagError {
    /// Decode error for this, reported at `offset`
    pub fn at(self, offset: usize) -> Error {
        match self {
            ClassBagError::Unresolved {
                handle,
                expected,
                found,
            } => Error::UnresolvedHandle {
                offset,
                handle,
                expected,
                found,
            },
            ClassBagError::TooDeep { limit } => Error::ClassChainTooDeep { offset, limit },
        }
    }
}
