use super::{Serialize, BASE_WIRE_HANDLE};
use super::{ClassDesc, JavaString, ProxyClassDesc};
use byteorder::WriteBytesExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Identifier of a referenceable record, in the order records were first seen
///
/// The first record gets [`BASE_WIRE_HANDLE`], the next one that plus one, and so on.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct Handle(pub u32);

impl Handle {
    pub const BASE: Handle = Handle(BASE_WIRE_HANDLE);
}

impl Display for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:#x}", self.0)
    }
}

impl Serialize for Handle {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

/// Kinds of records (used for diagnostics and for checking back-references)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum RecordKind {
    Null,
    Reference,
    ClassDesc,
    ProxyClassDesc,
    Object,
    String,
    Array,
    Enum,
    Class,
    BlockData,
    Reset,
    Exception,
    Field,

    /// Either sort of class descriptor
    AnyClassDesc,

    /// Anything that can be back-referenced
    Any,
}

/// What a handle in the table points to
///
/// Class descriptors are registered before their body is read, so for a moment their entry is
/// `None`. A descriptor whose own super chain or annotation refers back to it sees that state.
#[derive(Clone, Debug)]
pub enum Referent {
    ClassDesc(Option<Arc<ClassDesc>>),
    ProxyClassDesc(Option<Arc<ProxyClassDesc>>),
    Object,
    Array,
    Enum,
    Class,
    String(JavaString),
}

impl Referent {
    pub fn kind(&self) -> RecordKind {
        match self {
            Referent::ClassDesc(_) => RecordKind::ClassDesc,
            Referent::ProxyClassDesc(_) => RecordKind::ProxyClassDesc,
            Referent::Object => RecordKind::Object,
            Referent::Array => RecordKind::Array,
            Referent::Enum => RecordKind::Enum,
            Referent::Class => RecordKind::Class,
            Referent::String(_) => RecordKind::String,
        }
    }

    /// Is this some (possibly still pending) class descriptor?
    pub fn is_class_desc(&self) -> bool {
        matches!(self, Referent::ClassDesc(_) | Referent::ProxyClassDesc(_))
    }
}

/// Append-only table of every referenceable record seen so far in one pass over a stream
///
/// Nothing outside the table owns a back-referenced record through the reference: the graph only
/// ever holds [`Handle`]s, which get resolved here.
#[derive(Default, Debug)]
pub struct HandleTable {
    entries: Vec<Referent>,
}

impl HandleTable {
    pub fn new() -> HandleTable {
        HandleTable { entries: vec![] }
    }

    /// Number of entries since the start of the stream (or the last reset)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handle the next registered record will get
    pub fn next_handle(&self) -> Handle {
        Handle(BASE_WIRE_HANDLE + self.entries.len() as u32)
    }

    /// Append an entry, returning the handle it was assigned
    pub fn register(&mut self, referent: Referent) -> Handle {
        let handle = self.next_handle();
        log::trace!("Assigning handle {} to {:?}", handle, referent.kind());
        self.entries.push(referent);
        handle
    }

    /// Replace a pending entry once its record is fully read
    ///
    /// Returns `false` if the handle is not in the table.
    pub fn complete(&mut self, handle: Handle, referent: Referent) -> bool {
        match self.slot(handle) {
            Some(idx) => {
                self.entries[idx] = referent;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&Referent> {
        self.slot(handle).map(|idx| &self.entries[idx])
    }

    /// Forget every entry (`TC_RESET`); the next handle is the base handle again
    pub fn reset(&mut self) {
        log::debug!("Resetting handle table ({} entries)", self.entries.len());
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Referent)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, referent)| (Handle(BASE_WIRE_HANDLE + idx as u32), referent))
    }

    fn slot(&self, handle: Handle) -> Option<usize> {
        let idx = handle.0.checked_sub(BASE_WIRE_HANDLE)? as usize;
        if idx < self.entries.len() {
            Some(idx)
        } else {
            None
        }
    }
}
