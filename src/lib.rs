pub mod dump;
pub mod serialization;

pub use serialization::{EncodeError, Error, SerializedStream, Settings};
