use super::constants::*;
use super::{Array, BlockData, ClassDesc, ClassRecord, EnumConstant, ExceptionRecord, Object};
use super::{Encode, EncodeError, Encoder, Error, Handle, ObjectStream, ProxyClassDesc};
use super::{RecordKind, StringRecord};
use std::io::Write;
use std::sync::Arc;

/// Any record that can appear where the stream grammar says `content` or `object`
///
/// This is also what field values of object type and entries of annotations are.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Null,

    /// Back-reference to an earlier record
    Reference(Handle),

    ClassDesc(Arc<ClassDesc>),
    ProxyClassDesc(Arc<ProxyClassDesc>),
    Object(Box<Object>),

    /// `TC_STRING` or `TC_LONGSTRING`
    String(StringRecord),

    Array(Box<Array>),
    Enum(Box<EnumConstant>),

    /// `TC_CLASS`: a `java.lang.Class` instance
    Class(ClassRecord),

    /// `TC_BLOCKDATA` or `TC_BLOCKDATALONG`: raw bytes from a custom `writeObject`
    BlockData(BlockData),

    /// `TC_RESET` (only at the top level)
    Reset,

    Exception(Box<ExceptionRecord>),
}

impl Content {
    pub fn kind(&self) -> RecordKind {
        match self {
            Content::Null => RecordKind::Null,
            Content::Reference(_) => RecordKind::Reference,
            Content::ClassDesc(_) => RecordKind::ClassDesc,
            Content::ProxyClassDesc(_) => RecordKind::ProxyClassDesc,
            Content::Object(_) => RecordKind::Object,
            Content::String(_) => RecordKind::String,
            Content::Array(_) => RecordKind::Array,
            Content::Enum(_) => RecordKind::Enum,
            Content::Class(_) => RecordKind::Class,
            Content::BlockData(_) => RecordKind::BlockData,
            Content::Reset => RecordKind::Reset,
            Content::Exception(_) => RecordKind::Exception,
        }
    }
}

/// Decode the next record, whatever its kind
///
/// The tag is only peeked here: each record reader consumes (and checks) its own tag.
pub fn read_content(stream: &mut ObjectStream) -> Result<Content, Error> {
    let offset = stream.current_index();
    let tag = stream.peek_tag()?;
    stream.enter()?;
    log::trace!(
        "Reading {} at index {}",
        tag_name(tag).unwrap_or("unknown tag"),
        offset
    );

    let content = match tag {
        TC_NULL => {
            stream.read_u8()?;
            Content::Null
        }
        TC_REFERENCE => {
            stream.read_u8()?;
            let handle = Handle(stream.read_u32()?);
            stream.lookup(handle, RecordKind::Any, offset)?;
            Content::Reference(handle)
        }
        TC_CLASSDESC => Content::ClassDesc(ClassDesc::read(stream)?),
        TC_PROXYCLASSDESC => Content::ProxyClassDesc(ProxyClassDesc::read(stream)?),
        TC_OBJECT => Content::Object(Box::new(Object::read(stream)?)),
        TC_STRING | TC_LONGSTRING => Content::String(StringRecord::read(stream)?),
        TC_ARRAY => Content::Array(Box::new(Array::read(stream)?)),
        TC_ENUM => Content::Enum(Box::new(EnumConstant::read(stream)?)),
        TC_CLASS => Content::Class(ClassRecord::read(stream)?),
        TC_BLOCKDATA | TC_BLOCKDATALONG => Content::BlockData(BlockData::read(stream)?),
        TC_EXCEPTION => Content::Exception(Box::new(ExceptionRecord::read(stream)?)),

        // Resetting in the middle of a record would invalidate handles the record already uses
        TC_RESET if stream.depth() == 1 => {
            stream.read_u8()?;
            stream.reset_handles();
            Content::Reset
        }

        _ => {
            return Err(Error::UnsupportedTag {
                offset,
                tag,
                context: if stream.depth() == 1 {
                    "stream contents"
                } else {
                    "nested content"
                },
            })
        }
    };

    stream.leave();
    Ok(content)
}

/// Read records up to and including `TC_ENDBLOCKDATA` (which is not part of the result)
pub fn read_annotation(stream: &mut ObjectStream) -> Result<Vec<Content>, Error> {
    let mut contents = vec![];
    while stream.peek_tag()? != TC_ENDBLOCKDATA {
        contents.push(read_content(stream)?);
    }
    stream.read_u8()?;
    Ok(contents)
}

/// Write records followed by `TC_ENDBLOCKDATA`
pub fn write_annotation<W: Write>(
    contents: &[Content],
    encoder: &mut Encoder<W>,
) -> Result<(), EncodeError> {
    for content in contents {
        content.encode(encoder)?;
    }
    encoder.write(&TC_ENDBLOCKDATA)
}

impl Encode for Content {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError> {
        match self {
            Content::Null => encoder.write(&TC_NULL),
            Content::Reference(handle) => {
                encoder.write(&TC_REFERENCE)?;
                encoder.write(handle)
            }
            Content::ClassDesc(desc) => desc.encode(encoder),
            Content::ProxyClassDesc(proxy) => proxy.encode(encoder),
            Content::Object(object) => object.encode(encoder),
            Content::String(string) => string.encode(encoder),
            Content::Array(array) => array.encode(encoder),
            Content::Enum(constant) => constant.encode(encoder),
            Content::Class(class) => class.encode(encoder),
            Content::BlockData(block) => block.encode(encoder),
            Content::Reset => {
                encoder.write(&TC_RESET)?;
                encoder.reset_handles();
                Ok(())
            }
            Content::Exception(exception) => exception.encode(encoder),
        }
    }
}
