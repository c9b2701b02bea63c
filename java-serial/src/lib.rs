//! Reader and writer for the Java Object Serialization Stream Protocol.
//!
//! This works at the level of the stream grammar: class descriptors, objects, arrays,
//! strings and block data. It does not know about any particular class; callers pick
//! the fields they need out of the returned [`Object`]s by name.


mod content;
mod error;
pub mod mutf8;
pub mod reader;
pub mod writer;

pub use content::{Array, ClassDesc, Content, Field, FieldDesc, FieldKind, Handle, Object, Value};
pub use error::{Error, Result};
pub use reader::ObjectReader;
pub use writer::{ElementWriter, FieldWriter, Output, StreamWriter};

pub const STREAM_MAGIC: u16 = 0xACED;
pub const STREAM_VERSION: u16 = 5;

/// First handle assigned in a stream, and the first one after every `TC_RESET`.
pub const BASE_HANDLE: u32 = 0x7E_0000;

pub mod tag {
	pub const NULL: u8 = 0x70;
	pub const REFERENCE: u8 = 0x71;
	pub const CLASS_DESC: u8 = 0x72;
	pub const OBJECT: u8 = 0x73;
	pub const STRING: u8 = 0x74;
	pub const ARRAY: u8 = 0x75;
	pub const CLASS: u8 = 0x76;
	pub const BLOCK_DATA: u8 = 0x77;
	pub const END_BLOCK_DATA: u8 = 0x78;
	pub const RESET: u8 = 0x79;
	pub const BLOCK_DATA_LONG: u8 = 0x7A;
	pub const EXCEPTION: u8 = 0x7B;
	pub const LONG_STRING: u8 = 0x7C;
	pub const PROXY_CLASS_DESC: u8 = 0x7D;
	pub const ENUM: u8 = 0x7E;
}

/// Class descriptor flags.
pub mod flags {
	pub const WRITE_METHOD: u8 = 0x01;
	pub const SERIALIZABLE: u8 = 0x02;
	pub const EXTERNALIZABLE: u8 = 0x04;
	pub const BLOCK_DATA: u8 = 0x08;
	pub const ENUM: u8 = 0x10;
}
