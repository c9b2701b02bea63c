use std::rc::Rc;

use crate::flags;

/// A wire handle, as it appears after `TC_REFERENCE`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Handle(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldKind {
	Byte,
	Char,
	Double,
	Float,
	Int,
	Long,
	Short,
	Boolean,
	Array,
	Object
}

impl FieldKind {
	pub fn from_code(code: u8) -> Option<Self> {
		Some(match code {
			b'B' => FieldKind::Byte,
			b'C' => FieldKind::Char,
			b'D' => FieldKind::Double,
			b'F' => FieldKind::Float,
			b'I' => FieldKind::Int,
			b'J' => FieldKind::Long,
			b'S' => FieldKind::Short,
			b'Z' => FieldKind::Boolean,
			b'[' => FieldKind::Array,
			b'L' => FieldKind::Object,
			_ => return None
		})
	}

	pub fn code(self) -> u8 {
		match self {
			FieldKind::Byte => b'B',
			FieldKind::Char => b'C',
			FieldKind::Double => b'D',
			FieldKind::Float => b'F',
			FieldKind::Int => b'I',
			FieldKind::Long => b'J',
			FieldKind::Short => b'S',
			FieldKind::Boolean => b'Z',
			FieldKind::Array => b'[',
			FieldKind::Object => b'L'
		}
	}

	pub fn is_primitive(self) -> bool {
		!matches!(self, FieldKind::Array | FieldKind::Object)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
	pub kind: FieldKind,
	pub name: String,
	/// JVM type signature for array and object fields, such as `[B` or `Ljava/lang/String;`.
	pub class_name: Option<String>
}

impl FieldDesc {
	pub fn primitive(kind: FieldKind, name: &str) -> Self {
		assert!(kind.is_primitive(), "{:?} is not a primitive field kind", kind);

		FieldDesc { kind, name: name.to_owned(), class_name: None }
	}

	pub fn array(name: &str, signature: &str) -> Self {
		FieldDesc { kind: FieldKind::Array, name: name.to_owned(), class_name: Some(signature.to_owned()) }
	}

	pub fn object(name: &str, signature: &str) -> Self {
		FieldDesc { kind: FieldKind::Object, name: name.to_owned(), class_name: Some(signature.to_owned()) }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
	pub name: String,
	pub serial_version_uid: i64,
	pub flags: u8,
	pub fields: Vec<FieldDesc>,
	/// Interface names of a dynamic proxy class. Empty for ordinary classes.
	pub interfaces: Vec<String>,
	pub super_class: Option<Rc<ClassDesc>>
}

impl ClassDesc {
	/// Describes a plain `Serializable` class with no superclass and no `writeObject` method.
	pub fn serializable(name: &str, serial_version_uid: i64, fields: Vec<FieldDesc>) -> Self {
		ClassDesc {
			name: name.to_owned(),
			serial_version_uid,
			flags: flags::SERIALIZABLE,
			fields,
			interfaces: Vec::new(),
			super_class: None
		}
	}

	pub fn is_proxy(&self) -> bool {
		!self.interfaces.is_empty()
	}

	/// Walks the class hierarchy from the topmost serializable superclass down to this
	/// class, which is the order class data appears in the stream.
	pub fn hierarchy(&self) -> Vec<&ClassDesc> {
		let mut chain = vec![self];
		let mut current = self;

		while let Some(parent) = current.super_class.as_ref() {
			chain.push(parent);
			current = parent;
		}

		chain.reverse();
		chain
	}

	pub fn field(&self, name: &str) -> Option<&FieldDesc> {
		self.fields.iter().find(|field| field.name == name)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
	Null,
	Reference(Handle),
	String(String),
	Object(Object),
	Array(Array),
	Enum { class: Rc<ClassDesc>, constant: String },
	Class(Rc<ClassDesc>),
	ClassDesc(Rc<ClassDesc>),
	BlockData(Vec<u8>)
}

impl Content {
	/// Short description of the content kind, for error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Content::Null => "null",
			Content::Reference(_) => "reference",
			Content::String(_) => "string",
			Content::Object(_) => "object",
			Content::Array(_) => "array",
			Content::Enum { .. } => "enum constant",
			Content::Class(_) => "class",
			Content::ClassDesc(_) => "class descriptor",
			Content::BlockData(_) => "block data"
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Array {
	Bytes(Vec<u8>),
	Chars(Vec<u16>),
	Doubles(Vec<f64>),
	Floats(Vec<f32>),
	Ints(Vec<i32>),
	Longs(Vec<i64>),
	Shorts(Vec<i16>),
	Booleans(Vec<bool>),
	Objects(Vec<Content>)
}

impl Array {
	pub fn len(&self) -> usize {
		match self {
			Array::Bytes(values) => values.len(),
			Array::Chars(values) => values.len(),
			Array::Doubles(values) => values.len(),
			Array::Floats(values) => values.len(),
			Array::Ints(values) => values.len(),
			Array::Longs(values) => values.len(),
			Array::Shorts(values) => values.len(),
			Array::Booleans(values) => values.len(),
			Array::Objects(values) => values.len()
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Byte(i8),
	Char(u16),
	Double(f64),
	Float(f32),
	Int(i32),
	Long(i64),
	Short(i16),
	Boolean(bool),
	/// Value of an array or object field.
	Content(Content)
}

impl Value {
	pub fn kind(&self) -> FieldKind {
		match self {
			Value::Byte(_) => FieldKind::Byte,
			Value::Char(_) => FieldKind::Char,
			Value::Double(_) => FieldKind::Double,
			Value::Float(_) => FieldKind::Float,
			Value::Int(_) => FieldKind::Int,
			Value::Long(_) => FieldKind::Long,
			Value::Short(_) => FieldKind::Short,
			Value::Boolean(_) => FieldKind::Boolean,
			Value::Content(Content::Array(_)) => FieldKind::Array,
			Value::Content(_) => FieldKind::Object
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	pub name: String,
	pub value: Value
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
	pub class: Rc<ClassDesc>,
	pub handle: Handle,
	/// Field values of every class in the hierarchy, superclass fields first.
	pub fields: Vec<Field>,
	/// Extra data written by `writeObject` or `writeExternal` methods.
	pub annotations: Vec<Content>
}

impl Object {
	pub fn class_name(&self) -> &str {
		&self.class.name
	}

	/// Looks up a field value by name. When a subclass shadows a superclass field,
	/// the subclass value wins.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.iter().rev().find(|field| field.name == name).map(|field| &field.value)
	}
}
