//! The legacy save format: a gzip stream holding a 5 byte prefix followed by a Java
//! serialized `com.mojang.minecraft.level.Level`.
//!
//! The object stream is walked in full, but only a fixed set of fields is picked out
//! of the level object. Everything else the class declares (entities, the player,
//! colors and so on) is parsed to keep the stream aligned and then dropped.

use flate2::read::GzDecoder;
use java_serial::{Array, Content, Object, ObjectReader, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::mem;
use std::path::Path;
use tracing::{debug, info};

use crate::{BlockVolume, ClassicLevel, DecodeError};

/// Length of the prefix in front of the object stream. Its content is never inspected.
pub const FRAMING_LEN: usize = 5;

pub const LEVEL_CLASS: &str = "com.mojang.minecraft.level.Level";

/// Opens and decodes a gzip compressed legacy level file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ClassicLevel, DecodeError> {
	let path = path.as_ref();

	let file = File::open(path).map_err(|source| DecodeError::Open { path: path.to_owned(), source })?;
	let level = read_level(GzDecoder::new(BufReader::new(file)))?;

	info!(
		"Loaded legacy level from {} (size = {} x {} x {})",
		path.display(),
		level.width(),
		level.height(),
		level.depth()
	);

	Ok(level)
}

/// Decodes a legacy level from an already decompressed stream.
pub fn read_level<R: Read>(mut input: R) -> Result<ClassicLevel, DecodeError> {
	let mut framing = [0; FRAMING_LEN];
	input.read_exact(&mut framing)?;

	debug!("skipped legacy framing {:02X?}", framing);

	let mut reader = ObjectReader::new(input)?;

	let mut object = match reader.read_content()? {
		Content::Object(object) => object,
		other => return Err(DecodeError::UnexpectedContent(other.kind_name()))
	};

	if object.class_name() != LEVEL_CLASS {
		return Err(DecodeError::UnexpectedClass { expected: LEVEL_CLASS, found: object.class_name().to_owned() });
	}

	debug!("read {} with {} fields, {} handles assigned", LEVEL_CLASS, object.fields.len(), reader.handle_count());

	let mut record = Record { object: &mut object, reader: &reader };

	let width = record.dimension("width")?;
	let height = record.dimension("height")?;
	let depth = record.dimension("depth")?;

	let spawn = (record.int("xSpawn")?, record.int("ySpawn")?, record.int("zSpawn")?);
	let time_created = record.long("createTime")?;

	let name = record.string("name")?;
	let creator = record.string("creator")?;

	let blocks = BlockVolume::new(width, height, depth, record.take_bytes("blocks")?)?;

	Ok(ClassicLevel::new(name, creator, time_created, spawn, blocks))
}

/// Typed access to the fields of the level object.
struct Record<'a, R: Read> {
	object: &'a mut Object,
	reader: &'a ObjectReader<R>
}

impl<'a, R: Read> Record<'a, R> {
	fn field(&mut self, name: &'static str) -> Result<&mut Value, DecodeError> {
		self.object.fields.iter_mut()
			.rev()
			.find(|field| field.name == name)
			.map(|field| &mut field.value)
			.ok_or(DecodeError::MissingField(name))
	}

	/// Reads an `int` field. Older levels may declare coordinates as `short`.
	fn int(&mut self, name: &'static str) -> Result<i32, DecodeError> {
		match *self.field(name)? {
			Value::Int(value) => Ok(value),
			Value::Short(value) => Ok(value as i32),
			ref other => Err(mismatch(name, "int", other))
		}
	}

	fn dimension(&mut self, name: &'static str) -> Result<u16, DecodeError> {
		let value = self.int(name)?;

		if value < 1 || value > u16::max_value() as i32 {
			return Err(DecodeError::Dimension { axis: name, value: value as i64 });
		}

		Ok(value as u16)
	}

	fn long(&mut self, name: &'static str) -> Result<i64, DecodeError> {
		match *self.field(name)? {
			Value::Long(value) => Ok(value),
			ref other => Err(mismatch(name, "long", other))
		}
	}

	/// Reads a `String` field, which may be null or point back at an earlier string.
	fn string(&mut self, name: &'static str) -> Result<Option<String>, DecodeError> {
		let reader = self.reader;

		match self.field(name)? {
			Value::Content(Content::Null) => Ok(None),
			Value::Content(Content::String(value)) => Ok(Some(value.clone())),
			Value::Content(Content::Reference(handle)) => Ok(Some(reader.resolve_string(*handle)?.to_owned())),
			other => Err(mismatch(name, "String", other))
		}
	}

	/// Moves a `byte[]` field out of the record, leaving an empty array in its place.
	/// Shrinking to a boxed slice may still reallocate when the vector has spare capacity.
	fn take_bytes(&mut self, name: &'static str) -> Result<Box<[u8]>, DecodeError> {
		match self.field(name)? {
			Value::Content(Content::Array(Array::Bytes(bytes))) => Ok(mem::replace(bytes, Vec::new()).into_boxed_slice()),
			other => Err(mismatch(name, "byte[]", other))
		}
	}
}

fn mismatch(field: &'static str, expected: &'static str, found: &Value) -> DecodeError {
	DecodeError::FieldType { field, expected, found: describe(found) }
}

fn describe(value: &Value) -> &'static str {
	match value {
		Value::Byte(_) => "byte",
		Value::Char(_) => "char",
		Value::Double(_) => "double",
		Value::Float(_) => "float",
		Value::Int(_) => "int",
		Value::Long(_) => "long",
		Value::Short(_) => "short",
		Value::Boolean(_) => "boolean",
		Value::Content(Content::Array(Array::Bytes(_))) => "byte[]",
		Value::Content(Content::Array(_)) => "array",
		Value::Content(content) => content.kind_name()
	}
}
