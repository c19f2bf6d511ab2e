use super::{tag_name, Handle, RecordKind};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Errors while decoding a stream
///
/// Every error is terminal: byte offsets of everything after a bad record depend on having
/// consumed that record correctly, so there is no skipping ahead.
#[derive(Debug)]
pub enum Error {
    /// Fewer bytes are left than a fixed-size or length-prefixed field needs
    UnexpectedEndOfStream {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    /// Stream does not start with `0xACED`
    BadMagic(u16),

    /// Tag byte that has no reader, or that is not allowed where it was found
    UnsupportedTag {
        offset: usize,
        tag: u8,
        context: &'static str,
    },

    /// Back-reference to a handle that is not in the table, or that is of the wrong kind
    UnresolvedHandle {
        offset: usize,
        handle: Handle,
        expected: RecordKind,

        /// What the handle resolved to, if anything
        found: Option<RecordKind>,
    },

    /// Walking super class pointers went past the configured bound
    ClassChainTooDeep { offset: usize, limit: usize },

    /// Records are nested deeper than the configured bound
    NestingTooDeep { offset: usize, limit: usize },

    /// Field descriptor whose type cannot be parsed
    MalformedField { offset: usize, reason: String },

    /// Structurally invalid record (eg. negative lengths)
    Malformed {
        offset: usize,
        record: RecordKind,
        reason: String,
    },

    /// Externalizable class data written without block data mode can only be read by the class
    UnsupportedExternalContents { offset: usize, class_name: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::UnexpectedEndOfStream {
                offset,
                wanted,
                available,
            } => write!(
                f,
                "unexpected end of stream at index {}: wanted {} bytes, {} available",
                offset, wanted, available
            ),
            Error::BadMagic(magic) => write!(f, "bad stream magic {:#06x}", magic),
            Error::UnsupportedTag {
                offset,
                tag,
                context,
            } => match tag_name(*tag) {
                Some(name) => write!(f, "unexpected {} in {} at index {}", name, context, offset),
                None => write!(f, "unknown tag {:#04x} in {} at index {}", tag, context, offset),
            },
            Error::UnresolvedHandle {
                offset,
                handle,
                expected,
                found: None,
            } => write!(
                f,
                "handle {} (expected {:?}) is not defined at index {}",
                handle, expected, offset
            ),
            Error::UnresolvedHandle {
                offset,
                handle,
                expected,
                found: Some(found),
            } => write!(
                f,
                "handle {} refers to {:?} but {:?} was expected at index {}",
                handle, found, expected, offset
            ),
            Error::ClassChainTooDeep { offset, limit } => write!(
                f,
                "class hierarchy deeper than {} at index {}",
                limit, offset
            ),
            Error::NestingTooDeep { offset, limit } => {
                write!(f, "records nested deeper than {} at index {}", limit, offset)
            }
            Error::MalformedField { offset, reason } => {
                write!(f, "malformed field at index {}: {}", offset, reason)
            }
            Error::Malformed {
                offset,
                record,
                reason,
            } => write!(f, "malformed {:?} at index {}: {}", record, offset, reason),
            Error::UnsupportedExternalContents { offset, class_name } => write!(
                f,
                "externalizable class '{}' was not written in block data mode (index {})",
                class_name, offset
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Errors while encoding a graph
///
/// Apart from I/O, these all mean the graph is internally inconsistent (it was edited or built by
/// hand into something no decode could have produced).
#[derive(Debug)]
pub enum EncodeError {
    IoError(std::io::Error),

    /// Record carries a different handle than the one replaying the stream assigns it
    HandleMismatch { stored: Handle, assigned: Handle },

    /// Back-reference or class chain that cannot be resolved while encoding
    UnresolvedHandle {
        handle: Handle,
        expected: RecordKind,
        found: Option<RecordKind>,
    },

    /// Class chain longer than the configured bound
    ClassChainTooDeep { limit: usize },

    /// Object has a different number of class data blocks than its class has classes
    ClassDataCountMismatch { expected: usize, found: usize },

    /// Field values do not line up with the field descriptors of their class
    FieldValueMismatch { class_name: String, reason: String },

    /// Object annotation present when the class flags say it should not be (or vice versa)
    AnnotationMismatch { class_name: String },

    /// A length does not fit in the width the protocol gives it
    LengthOverflow { record: RecordKind, length: usize },
}

impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> EncodeError {
        EncodeError::IoError(err)
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EncodeError::IoError(err) => write!(f, "I/O error: {}", err),
            EncodeError::HandleMismatch { stored, assigned } => write!(
                f,
                "record carries handle {} but is assigned {}",
                stored, assigned
            ),
            EncodeError::UnresolvedHandle {
                handle,
                expected,
                found,
            } => write!(
                f,
                "handle {} resolves to {:?}, expected {:?}",
                handle, found, expected
            ),
            EncodeError::ClassChainTooDeep { limit } => {
                write!(f, "class hierarchy deeper than {}", limit)
            }
            EncodeError::ClassDataCountMismatch { expected, found } => write!(
                f,
                "object has {} class data blocks but its class hierarchy has {}",
                found, expected
            ),
            EncodeError::FieldValueMismatch { class_name, reason } => {
                write!(f, "field values of '{}': {}", class_name, reason)
            }
            EncodeError::AnnotationMismatch { class_name } => write!(
                f,
                "object annotation of '{}' disagrees with its class flags",
                class_name
            ),
            EncodeError::LengthOverflow { record, length } => {
                write!(f, "{:?} length {} does not fit its encoding", record, length)
            }
        }
    }
}

impl std::error::Error for EncodeError {}
