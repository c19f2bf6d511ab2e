//! Decode and re-encode Java object serialization streams
//!
//! A stream (as written by `java.io.ObjectOutputStream`) is a short header followed by records.
//! Records are decoded into a tree of [`Content`], where anything already seen is a
//! [`Content::Reference`] holding the [`Handle`] of the earlier record. Encoding a decoded tree
//! produces the original bytes.
//!
//! ### Simple example
//!
//! ```
//! use javaserial::serialization::*;
//!
//! # fn round_trip() -> Result<(), Box<dyn std::error::Error>> {
//! // `out.writeObject("hi"); out.writeObject("hi");`
//! let bytes = [
//!     0xAC, 0xED, 0x00, 0x05, // header
//!     0x74, 0x00, 0x02, b'h', b'i', // TC_STRING "hi"
//!     0x71, 0x00, 0x7E, 0x00, 0x00, // TC_REFERENCE to the first string
//! ];
//!
//! let stream = SerializedStream::decode(&bytes)?;
//! match &stream.contents[..] {
//!     [Content::String(string), Content::Reference(handle)] => {
//!         assert_eq!(string.value, JavaString::from("hi"));
//!         assert_eq!(*handle, string.handle);
//!     }
//!     other => panic!("unexpected contents {:?}", other),
//! }
//!
//! assert_eq!(stream.encode()?, bytes.to_vec());
//! # Ok(())
//! # }
//! # round_trip().unwrap();
//! ```

mod array;
mod binary_format;
mod block_data;
mod class;
mod class_data;
mod class_desc;
mod class_desc_flags;
mod class_pointer;
mod constants;
mod content;
mod descriptors;
mod encoder;
mod enum_constant;
mod errors;
mod exception;
mod handles;
mod object;
mod object_stream;
mod proxy_class_desc;
mod settings;
mod stream;
mod string;
mod utf;

pub use array::*;
pub use binary_format::*;
pub use block_data::*;
pub use class::*;
pub use class_data::*;
pub use class_desc::*;
pub use class_desc_flags::*;
pub use class_pointer::*;
pub use constants::*;
pub use content::*;
pub use descriptors::*;
pub use encoder::*;
pub use enum_constant::*;
pub use errors::*;
pub use exception::*;
pub use handles::*;
pub use object::*;
pub use object_stream::*;
pub use proxy_class_desc::*;
pub use settings::*;
pub use stream::*;
pub use string::*;
pub use utf::*;
