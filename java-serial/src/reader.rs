use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;
use std::rc::Rc;

use crate::content::{Array, ClassDesc, Content, Field, FieldDesc, FieldKind, Handle, Object, Value};
use crate::{flags, mutf8, tag, Error, Result, BASE_HANDLE, STREAM_MAGIC, STREAM_VERSION};

/// Upper bound on speculative allocation for arrays. A corrupt length only costs
/// memory as the data actually arrives.
const PREALLOCATE_LIMIT: usize = 65536;

/// Deepest nesting of content and class descriptors accepted before giving up, so
/// that a hostile stream cannot exhaust the call stack.
pub const MAX_DEPTH: usize = 512;

/// What a handle was assigned to.
#[derive(Debug, Clone)]
enum Entry {
	/// Assigned but not complete yet, such as a class descriptor whose superclass
	/// is still being read.
	Pending,
	ClassDesc(Rc<ClassDesc>),
	String(String),
	Object(Rc<ClassDesc>),
	Array(Rc<ClassDesc>),
	Enum(Rc<ClassDesc>),
	Class(Rc<ClassDesc>)
}

impl Entry {
	fn kind_name(&self) -> &'static str {
		match self {
			Entry::Pending => "an incomplete entry",
			Entry::ClassDesc(_) => "a class descriptor",
			Entry::String(_) => "a string",
			Entry::Object(_) => "an object",
			Entry::Array(_) => "an array",
			Entry::Enum(_) => "an enum constant",
			Entry::Class(_) => "a class"
		}
	}
}

pub struct ObjectReader<R: Read> {
	input: R,
	handles: Vec<Entry>,
	depth: usize
}

impl<R: Read> ObjectReader<R> {
	/// Reads and checks the stream header.
	pub fn new(mut input: R) -> Result<Self> {
		let magic = input.read_u16::<BigEndian>()?;
		if magic != STREAM_MAGIC {
			return Err(Error::BadMagic(magic));
		}

		let version = input.read_u16::<BigEndian>()?;
		if version != STREAM_VERSION {
			return Err(Error::UnsupportedVersion(version));
		}

		Ok(ObjectReader { input, handles: Vec::new(), depth: 0 })
	}

	pub fn into_inner(self) -> R {
		self.input
	}

	/// Number of handles assigned since the start of the stream or the last reset.
	pub fn handle_count(&self) -> usize {
		self.handles.len()
	}

	/// Reads the next top-level content item.
	pub fn read_content(&mut self) -> Result<Content> {
		let tag = self.input.read_u8()?;

		self.content(tag)
	}

	/// Returns the class descriptor of whatever the handle was assigned to.
	pub fn resolve(&self, handle: Handle) -> Result<Option<&Rc<ClassDesc>>> {
		Ok(match self.entry(handle)? {
			Entry::ClassDesc(class) | Entry::Object(class) | Entry::Array(class) | Entry::Enum(class) | Entry::Class(class) => Some(class),
			Entry::String(_) | Entry::Pending => None
		})
	}

	pub fn resolve_string(&self, handle: Handle) -> Result<&str> {
		match self.entry(handle)? {
			Entry::String(value) => Ok(value),
			other => Err(Error::HandleKind { handle: handle.0, expected: "a string", found: other.kind_name() })
		}
	}

	fn entry(&self, handle: Handle) -> Result<&Entry> {
		handle.0.checked_sub(BASE_HANDLE)
			.and_then(|index| self.handles.get(index as usize))
			.ok_or(Error::BadHandle(handle.0))
	}

	fn assign(&mut self, entry: Entry) -> Handle {
		self.handles.push(entry);

		Handle(BASE_HANDLE + (self.handles.len() - 1) as u32)
	}

	fn replace(&mut self, handle: Handle, entry: Entry) {
		let index = (handle.0 - BASE_HANDLE) as usize;

		// A TC_RESET inside an annotation may already have discarded the slot
		if let Some(slot) = self.handles.get_mut(index) {
			*slot = entry;
		}
	}

	fn read_handle(&mut self) -> Result<Handle> {
		Ok(Handle(self.input.read_u32::<BigEndian>()?))
	}

	/// Runs a nested read, failing once the nesting gets too deep.
	fn nested<T, F>(&mut self, read: F) -> Result<T> where F: FnOnce(&mut Self) -> Result<T> {
		if self.depth >= MAX_DEPTH {
			return Err(Error::TooDeep(MAX_DEPTH));
		}

		self.depth += 1;
		let result = read(self);
		self.depth -= 1;

		result
	}

	fn content(&mut self, tag: u8) -> Result<Content> {
		self.nested(|reader| reader.new_content(tag))
	}

	fn new_content(&mut self, tag: u8) -> Result<Content> {
		match tag {
			tag::NULL => Ok(Content::Null),
			tag::REFERENCE => {
				let handle = self.read_handle()?;
				self.entry(handle)?;

				Ok(Content::Reference(handle))
			},
			tag::STRING | tag::LONG_STRING => Ok(Content::String(self.new_string(tag)?)),
			tag::OBJECT => self.new_object(),
			tag::ARRAY => self.new_array(),
			tag::ENUM => self.new_enum(),
			tag::CLASS => {
				let class = self.required_class_desc()?;
				self.assign(Entry::Class(class.clone()));

				Ok(Content::Class(class))
			},
			tag::CLASS_DESC | tag::PROXY_CLASS_DESC => {
				let class = self.class_desc(tag)?.ok_or(Error::UnknownTag { tag, context: "content" })?;

				Ok(Content::ClassDesc(class))
			},
			tag::BLOCK_DATA => {
				let len = self.input.read_u8()? as u64;

				Ok(Content::BlockData(self.read_bytes(len)?))
			},
			tag::BLOCK_DATA_LONG => {
				let len = self.input.read_i32::<BigEndian>()?;
				let len = checked_len(len as i64)?;

				Ok(Content::BlockData(self.read_bytes(len as u64)?))
			},
			tag::RESET => {
				self.handles.clear();

				self.read_content()
			},
			tag::EXCEPTION => Err(Error::Exception),
			tag => Err(Error::UnknownTag { tag, context: "content" })
		}
	}

	fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
		read_bytes(&mut self.input, len)
	}

	fn read_utf(&mut self) -> Result<String> {
		let len = self.input.read_u16::<BigEndian>()? as u64;

		mutf8::decode(&self.read_bytes(len)?)
	}

	fn new_string(&mut self, tag: u8) -> Result<String> {
		let len = if tag == tag::LONG_STRING {
			let len = self.input.read_i64::<BigEndian>()?;
			checked_len(len)? as u64
		} else {
			self.input.read_u16::<BigEndian>()? as u64
		};

		let value = mutf8::decode(&self.read_bytes(len)?)?;
		self.assign(Entry::String(value.clone()));

		Ok(value)
	}

	/// Reads a string object: a new string or a reference to an earlier one.
	fn string_object(&mut self) -> Result<String> {
		match self.input.read_u8()? {
			code @ tag::STRING | code @ tag::LONG_STRING => self.new_string(code),
			tag::REFERENCE => {
				let handle = self.read_handle()?;

				self.resolve_string(handle).map(str::to_owned)
			},
			tag => Err(Error::UnknownTag { tag, context: "string" })
		}
	}

	fn required_class_desc(&mut self) -> Result<Rc<ClassDesc>> {
		let tag = self.input.read_u8()?;

		self.class_desc(tag)?.ok_or(Error::Unsupported("null class descriptor".to_owned()))
	}

	fn class_desc(&mut self, tag: u8) -> Result<Option<Rc<ClassDesc>>> {
		self.nested(|reader| reader.read_class_desc(tag))
	}

	fn read_class_desc(&mut self, tag: u8) -> Result<Option<Rc<ClassDesc>>> {
		match tag {
			tag::NULL => Ok(None),
			tag::REFERENCE => {
				let handle = self.read_handle()?;

				match self.entry(handle)? {
					Entry::ClassDesc(class) => Ok(Some(class.clone())),
					other => Err(Error::HandleKind { handle: handle.0, expected: "a class descriptor", found: other.kind_name() })
				}
			},
			tag::CLASS_DESC => self.new_class_desc().map(Some),
			tag::PROXY_CLASS_DESC => self.new_proxy_class_desc().map(Some),
			tag => Err(Error::UnknownTag { tag, context: "class descriptor" })
		}
	}

	fn new_class_desc(&mut self) -> Result<Rc<ClassDesc>> {
		let name = self.read_utf()?;
		let serial_version_uid = self.input.read_i64::<BigEndian>()?;
		let handle = self.assign(Entry::Pending);

		let flags = self.input.read_u8()?;
		let count = self.input.read_i16::<BigEndian>()?;
		let count = checked_len(count as i64)?;

		let mut fields = Vec::with_capacity(count);
		for _ in 0..count {
			let code = self.input.read_u8()?;
			let kind = FieldKind::from_code(code).ok_or(Error::UnknownTypeCode(code))?;
			let name = self.read_utf()?;

			let class_name = if kind.is_primitive() {
				None
			} else {
				Some(self.string_object()?)
			};

			fields.push(FieldDesc { kind, name, class_name });
		}

		self.annotations()?;

		let super_tag = self.input.read_u8()?;
		let super_class = self.class_desc(super_tag)?;

		let class = Rc::new(ClassDesc {
			name,
			serial_version_uid,
			flags,
			fields,
			interfaces: Vec::new(),
			super_class
		});

		self.replace(handle, Entry::ClassDesc(class.clone()));

		Ok(class)
	}

	fn new_proxy_class_desc(&mut self) -> Result<Rc<ClassDesc>> {
		let handle = self.assign(Entry::Pending);

		let count = self.input.read_i32::<BigEndian>()?;
		let count = checked_len(count as i64)?;

		let mut interfaces = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
		for _ in 0..count {
			interfaces.push(self.read_utf()?);
		}

		self.annotations()?;

		let super_tag = self.input.read_u8()?;
		let super_class = self.class_desc(super_tag)?;

		let class = Rc::new(ClassDesc {
			name: String::new(),
			serial_version_uid: 0,
			flags: flags::SERIALIZABLE,
			fields: Vec::new(),
			interfaces,
			super_class
		});

		self.replace(handle, Entry::ClassDesc(class.clone()));

		Ok(class)
	}

	/// Reads content up to and including the closing `TC_ENDBLOCKDATA`.
	fn annotations(&mut self) -> Result<Vec<Content>> {
		let mut contents = Vec::new();

		loop {
			match self.input.read_u8()? {
				tag::END_BLOCK_DATA => return Ok(contents),
				tag => contents.push(self.content(tag)?)
			}
		}
	}

	fn new_object(&mut self) -> Result<Content> {
		let class = self.required_class_desc()?;
		let handle = self.assign(Entry::Object(class.clone()));

		let mut fields = Vec::new();
		let mut annotations = Vec::new();

		for desc in class.hierarchy() {
			if desc.flags & flags::EXTERNALIZABLE != 0 {
				if desc.flags & flags::BLOCK_DATA == 0 {
					return Err(Error::Unsupported(format!("externalizable class {} written without block data", desc.name)));
				}

				annotations.extend(self.annotations()?);
			} else if desc.flags & flags::SERIALIZABLE != 0 {
				for field in &desc.fields {
					let value = self.value(field.kind)?;

					fields.push(Field { name: field.name.clone(), value });
				}

				if desc.flags & flags::WRITE_METHOD != 0 {
					annotations.extend(self.annotations()?);
				}
			}
		}

		Ok(Content::Object(Object { class, handle, fields, annotations }))
	}

	fn value(&mut self, kind: FieldKind) -> Result<Value> {
		if !kind.is_primitive() {
			return Ok(Value::Content(self.read_content()?));
		}

		let input = &mut self.input;

		Ok(match kind {
			FieldKind::Byte => Value::Byte(input.read_i8()?),
			FieldKind::Char => Value::Char(input.read_u16::<BigEndian>()?),
			FieldKind::Double => Value::Double(input.read_f64::<BigEndian>()?),
			FieldKind::Float => Value::Float(input.read_f32::<BigEndian>()?),
			FieldKind::Int => Value::Int(input.read_i32::<BigEndian>()?),
			FieldKind::Long => Value::Long(input.read_i64::<BigEndian>()?),
			FieldKind::Short => Value::Short(input.read_i16::<BigEndian>()?),
			FieldKind::Boolean => Value::Boolean(input.read_u8()? != 0),
			FieldKind::Array | FieldKind::Object => unreachable!()
		})
	}

	fn new_array(&mut self) -> Result<Content> {
		let class = self.required_class_desc()?;
		self.assign(Entry::Array(class.clone()));

		let len = self.input.read_i32::<BigEndian>()?;
		let len = checked_len(len as i64)?;

		let element = class.name.as_bytes().get(1).copied()
			.and_then(FieldKind::from_code)
			.ok_or_else(|| Error::Unsupported(format!("array class name {:?}", class.name)))?;

		let capacity = len.min(PREALLOCATE_LIMIT);

		if !element.is_primitive() {
			let mut elements = Vec::with_capacity(capacity);

			for _ in 0..len {
				elements.push(self.read_content()?);
			}

			return Ok(Content::Array(Array::Objects(elements)));
		}

		let input = &mut self.input;

		let array = match element {
			FieldKind::Byte => Array::Bytes(read_bytes(input, len as u64)?),
			FieldKind::Char => Array::Chars(read_n(len, capacity, || input.read_u16::<BigEndian>())?),
			FieldKind::Double => Array::Doubles(read_n(len, capacity, || input.read_f64::<BigEndian>())?),
			FieldKind::Float => Array::Floats(read_n(len, capacity, || input.read_f32::<BigEndian>())?),
			FieldKind::Int => Array::Ints(read_n(len, capacity, || input.read_i32::<BigEndian>())?),
			FieldKind::Long => Array::Longs(read_n(len, capacity, || input.read_i64::<BigEndian>())?),
			FieldKind::Short => Array::Shorts(read_n(len, capacity, || input.read_i16::<BigEndian>())?),
			FieldKind::Boolean => Array::Booleans(read_n(len, capacity, || input.read_u8().map(|value| value != 0))?),
			FieldKind::Array | FieldKind::Object => unreachable!()
		};

		Ok(Content::Array(array))
	}

	fn new_enum(&mut self) -> Result<Content> {
		let class = self.required_class_desc()?;
		self.assign(Entry::Enum(class.clone()));

		let constant = self.string_object()?;

		Ok(Content::Enum { class, constant })
	}
}

fn read_bytes<R: Read>(input: &mut R, len: u64) -> Result<Vec<u8>> {
	let mut bytes = Vec::with_capacity((len as usize).min(PREALLOCATE_LIMIT));

	input.take(len).read_to_end(&mut bytes)?;

	if (bytes.len() as u64) < len {
		return Err(Error::Truncated);
	}

	Ok(bytes)
}

fn read_n<T, F>(len: usize, capacity: usize, mut element: F) -> Result<Vec<T>> where F: FnMut() -> std::io::Result<T> {
	let mut values = Vec::with_capacity(capacity);

	for _ in 0..len {
		values.push(element()?);
	}

	Ok(values)
}

fn checked_len(len: i64) -> Result<usize> {
	if len < 0 {
		Err(Error::NegativeLength(len))
	} else {
		Ok(len as usize)
	}
}
