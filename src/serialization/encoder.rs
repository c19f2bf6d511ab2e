use super::{ClassBag, ClassBagError, ClassDesc, ClassPointer};
use super::{EncodeError, Handle, HandleTable, JavaString, RecordKind, Referent, Serialize, Settings};
use std::io::Write;
use std::sync::Arc;

/// Records that can be written back into a stream
///
/// Unlike [`Serialize`], encoding goes through an [`Encoder`] so that handle assignment can be
/// replayed: a record registers itself at the same point the decoder did, which is what lets
/// objects whose class is only a back-reference find their class hierarchy again.
pub trait Encode {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), EncodeError>;
}

/// Writes records to an output, tracking handles the way a decoder reading the output would
pub struct Encoder<W: Write> {
    writer: W,
    handles: HandleTable,
    settings: Settings,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Encoder<W> {
        Encoder::with_settings(writer, Settings::new())
    }

    pub fn with_settings(writer: W, settings: Settings) -> Encoder<W> {
        Encoder {
            writer,
            handles: HandleTable::new(),
            settings,
        }
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// Recover the underlying output
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a fixed-layout value
    pub fn write<S: Serialize>(&mut self, value: &S) -> Result<(), EncodeError> {
        value.serialize(&mut self.writer)?;
        Ok(())
    }

    /// Write raw bytes, with no length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Write a string with a `u16` byte length prefix
    pub fn write_utf(&mut self, string: &JavaString, record: RecordKind) -> Result<(), EncodeError> {
        let len = u16::try_from(string.len()).map_err(|_| EncodeError::LengthOverflow {
            record,
            length: string.len(),
        })?;
        self.write(&len)?;
        self.write_bytes(string.as_bytes())
    }

    /// Write a string with a `u64` byte length prefix
    pub fn write_long_utf(&mut self, string: &JavaString) -> Result<(), EncodeError> {
        self.write(&(string.len() as u64))?;
        self.write_bytes(string.as_bytes())
    }

    /// Register a record, checking that it gets the handle it was decoded with
    pub fn add_reference(&mut self, stored: Handle, referent: Referent) -> Result<(), EncodeError> {
        let assigned = self.handles.register(referent);
        if assigned != stored {
            return Err(EncodeError::HandleMismatch { stored, assigned });
        }
        Ok(())
    }

    /// Fill in the table entry of a class descriptor once its body is written
    pub fn complete_reference(&mut self, handle: Handle, referent: Referent) {
        if !self.handles.complete(handle, referent) {
            log::debug!("Handle {} was reset before its record was complete", handle);
        }
    }

    pub fn reset_handles(&mut self) {
        self.handles.reset();
    }

    /// Class hierarchy of a class pointer, using the handles written so far
    pub fn class_bag(&self, pointer: &ClassPointer) -> Result<ClassBag, EncodeError> {
        ClassBag::resolve(pointer, &self.handles, self.settings.max_class_depth)
            .map_err(EncodeError::from)
    }

    /// Class descriptor a class pointer refers to directly, using the handles written so far
    pub fn class_desc(&self, pointer: &ClassPointer) -> Result<Option<Arc<ClassDesc>>, EncodeError> {
        pointer.class_desc(&self.handles).map_err(EncodeError::from)
    }
}

impl From<ClassBagError> for EncodeError {
    fn from(err: ClassBagError) -> EncodeError {
        match err {
            ClassBagError::Unresolved {
                handle,
                expected,
                found,
            } => EncodeError::UnresolvedHandle {
                handle,
                expected,
                found,
            },
            ClassBagError::TooDeep { limit } => EncodeError::ClassChainTooDeep { limit },
        }
    }
}
