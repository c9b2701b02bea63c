use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read a legacy level.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// The source file could not be opened at all.
	#[error("cannot open {}: {source}", .path.display())]
	Open { path: PathBuf, source: io::Error },

	#[error("level stream ended before the record was complete")]
	Truncated,

	#[error("I/O error while reading level: {0}")]
	Io(io::Error),

	#[error("malformed object stream: {0}")]
	Stream(java_serial::Error),

	#[error("expected a level object, found {0}")]
	UnexpectedContent(&'static str),

	#[error("expected an object of class {expected}, found {found}")]
	UnexpectedClass { expected: &'static str, found: String },

	#[error("level record has no field named {0}")]
	MissingField(&'static str),

	#[error("level field {field} should hold {expected}, found {found}")]
	FieldType { field: &'static str, expected: &'static str, found: &'static str },

	#[error("level {axis} of {value} is out of range (1..=65535)")]
	Dimension { axis: &'static str, value: i64 },

	#[error("block array of {found} entries does not fit a {width}x{height}x{depth} level")]
	VolumeMismatch { width: u16, height: u16, depth: u16, found: usize }
}

impl From<io::Error> for DecodeError {
	fn from(error: io::Error) -> Self {
		if error.kind() == io::ErrorKind::UnexpectedEof {
			DecodeError::Truncated
		} else {
			DecodeError::Io(error)
		}
	}
}

impl From<java_serial::Error> for DecodeError {
	fn from(error: java_serial::Error) -> Self {
		match error {
			java_serial::Error::Truncated => DecodeError::Truncated,
			java_serial::Error::Io(error) => DecodeError::Io(error),
			other => DecodeError::Stream(other)
		}
	}
}

/// Failure to write a compact level.
#[derive(Debug, Error)]
pub enum EncodeError {
	#[error("cannot create {}: {source}", .path.display())]
	Create { path: PathBuf, source: io::Error },

	#[error("failed to write level: {0}")]
	Write(#[from] io::Error)
}

/// Failure to read back a compact level.
#[derive(Debug, Error)]
pub enum CompactError {
	#[error("cannot open {}: {source}", .path.display())]
	Open { path: PathBuf, source: io::Error },

	#[error("compact level header is truncated")]
	Truncated,

	#[error("compact level is too short: expected {expected} blocks, found {found}")]
	TooShort { expected: usize, found: usize },

	#[error("I/O error while reading compact level: {0}")]
	Io(io::Error)
}

impl From<io::Error> for CompactError {
	fn from(error: io::Error) -> Self {
		if error.kind() == io::ErrorKind::UnexpectedEof {
			CompactError::Truncated
		} else {
			CompactError::Io(error)
		}
	}
}
