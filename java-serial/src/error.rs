use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("I/O error: {0}")]
	Io(io::Error),

	#[error("stream ended before the object graph was complete")]
	Truncated,

	#[error("bad stream magic: expected 0xACED, found {0:#06X}")]
	BadMagic(u16),

	#[error("unsupported stream version: {0}")]
	UnsupportedVersion(u16),

	#[error("unknown tag {tag:#04X} while reading {context}")]
	UnknownTag { tag: u8, context: &'static str },

	#[error("unknown field type code {0:#04X}")]
	UnknownTypeCode(u8),

	#[error("reference to unassigned handle {0:#X}")]
	BadHandle(u32),

	#[error("handle {handle:#X} refers to {found}, expected {expected}")]
	HandleKind { handle: u32, expected: &'static str, found: &'static str },

	#[error("negative length {0}")]
	NegativeLength(i64),

	#[error("invalid modified UTF-8 string")]
	InvalidString,

	#[error("object graph nested deeper than {0} levels")]
	TooDeep(usize),

	#[error("the writer serialized an exception into the stream")]
	Exception,

	#[error("unsupported construct: {0}")]
	Unsupported(String),
}

impl From<io::Error> for Error {
	fn from(error: io::Error) -> Self {
		if error.kind() == io::ErrorKind::UnexpectedEof {
			Error::Truncated
		} else {
			Error::Io(error)
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
