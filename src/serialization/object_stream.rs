use super::{Error, Handle, HandleTable, JavaString, RecordKind, Referent, Settings};
use byteorder::{BigEndian, ByteOrder};

/// Cursor over an in-memory serialization stream, along with the handle table of the pass
///
/// Reading is strictly left to right: every record's offset depends on having consumed all the
/// bytes before it, and back-references only ever point at earlier records. One `ObjectStream`
/// is one decode pass; it is never shared.
pub struct ObjectStream<'a> {
    data: &'a [u8],
    position: usize,
    handles: HandleTable,
    settings: Settings,

    /// Current record nesting (see [`Settings::max_nesting_depth`])
    depth: usize,
}

impl<'a> ObjectStream<'a> {
    pub fn new(data: &'a [u8]) -> ObjectStream<'a> {
        ObjectStream::with_settings(data, Settings::new())
    }

    pub fn with_settings(data: &'a [u8], settings: Settings) -> ObjectStream<'a> {
        ObjectStream {
            data,
            position: 0,
            handles: HandleTable::new(),
            settings,
            depth: 0,
        }
    }

    /// Byte offset of the next unread byte
    pub fn current_index(&self) -> usize {
        self.position
    }

    /// Number of bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position == self.data.len()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// Consume the stream, keeping only the handle table built so far
    pub fn into_handles(self) -> HandleTable {
        self.handles
    }

    /// Consume the next `n` bytes
    pub fn read_n(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let bytes = self.peek_n(n)?;
        self.position += n;
        Ok(bytes)
    }

    /// Look at the next `n` bytes without consuming them
    pub fn peek_n(&self, n: usize) -> Result<&'a [u8], Error> {
        let data: &'a [u8] = self.data;
        if n > self.remaining() {
            return Err(Error::UnexpectedEndOfStream {
                offset: self.position,
                wanted: n,
                available: self.remaining(),
            });
        }
        Ok(&data[self.position..self.position + n])
    }

    /// Look at the next tag byte without consuming it
    pub fn peek_tag(&self) -> Result<u8, Error> {
        Ok(self.peek_n(1)?[0])
    }

    /// Consume a tag byte, which must be `tag`
    pub fn expect_tag(&mut self, tag: u8, context: &'static str) -> Result<(), Error> {
        let offset = self.position;
        let found = self.read_u8()?;
        if found != tag {
            return Err(Error::UnsupportedTag {
                offset,
                tag: found,
                context,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_n(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(BigEndian::read_u16(self.read_n(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        Ok(BigEndian::read_i16(self.read_n(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.read_n(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(BigEndian::read_i32(self.read_n(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        Ok(BigEndian::read_u64(self.read_n(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        Ok(BigEndian::read_i64(self.read_n(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read a string with a `u16` byte length prefix
    pub fn read_utf(&mut self) -> Result<JavaString, Error> {
        let len = self.read_u16()? as usize;
        Ok(JavaString::from_bytes(self.read_n(len)?.to_vec()))
    }

    /// Read a string with a `u64` byte length prefix
    pub fn read_long_utf(&mut self) -> Result<JavaString, Error> {
        let offset = self.position;
        let len = self.read_u64()?;
        let len = usize::try_from(len).map_err(|_| Error::UnexpectedEndOfStream {
            offset,
            wanted: usize::MAX,
            available: self.remaining(),
        })?;
        Ok(JavaString::from_bytes(self.read_n(len)?.to_vec()))
    }

    /// Register a record in the handle table, returning its handle
    ///
    /// Call this right after the record's fixed header and before its body, since that is when
    /// the writer assigned the handle.
    pub fn add_reference(&mut self, referent: Referent) -> Handle {
        self.handles.register(referent)
    }

    /// Fill in the entry of a record registered before its body was read
    pub fn complete_reference(&mut self, handle: Handle, referent: Referent) {
        // An exception inside the record resets the table, taking the pending entry with it
        if !self.handles.complete(handle, referent) {
            log::debug!("Handle {} was reset before its record was complete", handle);
        }
    }

    /// Forget all handles (`TC_RESET`)
    pub fn reset_handles(&mut self) {
        self.handles.reset();
    }

    /// Resolve a back-reference, checking that it has an acceptable kind
    ///
    /// `offset` is where the reference was read, for diagnostics.
    pub fn lookup(
        &self,
        handle: Handle,
        expected: RecordKind,
        offset: usize,
    ) -> Result<&Referent, Error> {
        let referent = self.handles.get(handle).ok_or(Error::UnresolvedHandle {
            offset,
            handle,
            expected,
            found: None,
        })?;
        let acceptable = match expected {
            RecordKind::Any => true,
            RecordKind::AnyClassDesc => referent.is_class_desc(),
            kind => referent.kind() == kind,
        };
        if !acceptable {
            return Err(Error::UnresolvedHandle {
                offset,
                handle,
                expected,
                found: Some(referent.kind()),
            });
        }
        Ok(referent)
    }

    /// Note that a nested record is being entered
    pub(crate) fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= self.settings.max_nesting_depth {
            return Err(Error::NestingTooDeep {
                offset: self.position,
                limit: self.settings.max_nesting_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Nesting depth of the record currently being read (0 at the top level)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_and_peek() {
        let data = [0x00, 0x05, 0xFF, 0xFF, 0xFF, 0xFE];
        let mut stream = ObjectStream::new(&data);
        assert_eq!(stream.peek_n(2).unwrap(), &[0x00, 0x05]);
        assert_eq!(stream.current_index(), 0);
        assert_eq!(stream.read_u16().unwrap(), 5);
        assert_eq!(stream.read_i32().unwrap(), -2);
        assert!(stream.is_at_end());
    }

    #[test]
    fn short_read_reports_position() {
        let data = [0x01, 0x02, 0x03];
        let mut stream = ObjectStream::new(&data);
        stream.read_u8().unwrap();
        match stream.read_u32() {
            Err(Error::UnexpectedEndOfStream {
                offset: 1,
                wanted: 4,
                available: 2,
            }) => (),
            other => panic!("unexpected result {:?}", other),
        }
        // A failed read does not move the cursor
        assert_eq!(stream.current_index(), 1);
    }

    #[test]
    fn string_lengths() {
        let data = [0x00, 0x02, b'h', b'i', 0, 0, 0, 0, 0, 0, 0, 1, b'!'];
        let mut stream = ObjectStream::new(&data);
        assert_eq!(stream.read_utf().unwrap(), JavaString::from("hi"));
        assert_eq!(stream.read_long_utf().unwrap(), JavaString::from("!"));
    }

    #[test]
    fn huge_long_string_length_is_truncation() {
        let data = [0xFF; 8];
        let mut stream = ObjectStream::new(&data);
        assert!(matches!(
            stream.read_long_utf(),
            Err(Error::UnexpectedEndOfStream { .. })
        ));
    }

    #[test]
    fn lookup_checks_kind() {
        let mut stream = ObjectStream::new(&[]);
        let handle = stream.add_reference(Referent::Object);
        assert!(stream.lookup(handle, RecordKind::Any, 0).is_ok());
        assert!(stream.lookup(handle, RecordKind::Object, 0).is_ok());
        match stream.lookup(handle, RecordKind::AnyClassDesc, 7) {
            Err(Error::UnresolvedHandle {
                offset: 7,
                found: Some(RecordKind::Object),
                ..
            }) => (),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            stream.lookup(Handle(0x7E0001), RecordKind::Any, 0),
            Err(Error::UnresolvedHandle { found: None, .. })
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        let mut settings = Settings::new();
        settings.max_nesting_depth = 2;
        let mut stream = ObjectStream::with_settings(&[], settings);
        stream.enter().unwrap();
        stream.enter().unwrap();
        assert!(matches!(
            stream.enter(),
            Err(Error::NestingTooDeep { limit: 2, .. })
        ));
        stream.leave();
        assert_eq!(stream.depth(), 1);
    }
}
