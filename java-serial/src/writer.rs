use std::collections::HashMap;

use crate::content::{ClassDesc, FieldDesc, FieldKind, Handle};
use crate::{flags, mutf8, tag, BASE_HANDLE, STREAM_MAGIC, STREAM_VERSION};

/// Serial version UIDs that the JVM computes for `byte[]` and `int[]`.
pub const BYTE_ARRAY_UID: i64 = -5984413125824719648;
pub const INT_ARRAY_UID: i64 = 5600894804908749477;

pub trait Output {
	fn push(&mut self, value: u8);
	fn extend_from_slice(&mut self, slice: &[u8]);
}

impl<T> Output for &mut T where T: Output {
	fn push(&mut self, value: u8) {
		T::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		T::extend_from_slice(self, slice);
	}
}

impl Output for Vec<u8> {
	fn push(&mut self, value: u8) {
		Vec::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		Vec::extend_from_slice(self, slice)
	}
}

/// Writes an object serialization stream, assigning handles in the same order
/// `ObjectInputStream` would. Class descriptors and field type strings are written
/// once and referenced afterwards, like `ObjectOutputStream` does.
pub struct StreamWriter<T: Output> {
	out: T,
	next_handle: u32,
	classes: HashMap<String, Handle>,
	type_strings: HashMap<String, Handle>
}

impl<T: Output> StreamWriter<T> {
	/// Begins a new stream by writing the magic and version.
	pub fn start(mut out: T) -> Self {
		out.extend_from_slice(&STREAM_MAGIC.to_be_bytes());
		out.extend_from_slice(&STREAM_VERSION.to_be_bytes());

		StreamWriter { out, next_handle: BASE_HANDLE, classes: HashMap::new(), type_strings: HashMap::new() }
	}

	pub fn write<F>(out: T, filler: F) -> T where F: FnOnce(&mut StreamWriter<T>) {
		let mut writer = StreamWriter::start(out);

		filler(&mut writer);

		writer.end()
	}

	/// Ends the stream, returning the buffer.
	pub fn end(self) -> T {
		self.out
	}

	/// Handle that the next string, object or array written will be assigned.
	pub fn next_handle(&self) -> Handle {
		Handle(self.next_handle)
	}

	fn assign(&mut self) -> Handle {
		let handle = Handle(self.next_handle);
		self.next_handle += 1;

		handle
	}

	fn utf(&mut self, value: &str) {
		let bytes = mutf8::encode(value);

		assert!(bytes.len() <= 65535, "UTF string too long: {}", value);
		self.out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
		self.out.extend_from_slice(&bytes);
	}

	pub fn null(&mut self) -> &mut Self {
		self.out.push(tag::NULL);

		self
	}

	pub fn reference(&mut self, handle: Handle) -> &mut Self {
		assert!(handle.0 >= BASE_HANDLE && handle.0 < self.next_handle, "Reference to unassigned handle {:#X}", handle.0);

		self.out.push(tag::REFERENCE);
		self.out.extend_from_slice(&handle.0.to_be_bytes());

		self
	}

	/// Clears the handle table on both ends of the stream.
	pub fn reset(&mut self) -> &mut Self {
		self.out.push(tag::RESET);
		self.next_handle = BASE_HANDLE;
		self.classes.clear();
		self.type_strings.clear();

		self
	}

	pub fn string(&mut self, value: &str) -> Handle {
		let bytes = mutf8::encode(value);

		if bytes.len() <= 65535 {
			self.out.push(tag::STRING);
			self.out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
		} else {
			self.out.push(tag::LONG_STRING);
			self.out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
		}

		self.out.extend_from_slice(&bytes);
		self.assign()
	}

	fn type_string(&mut self, signature: &str) {
		match self.type_strings.get(signature).copied() {
			Some(handle) => { self.reference(handle); },
			None => {
				let handle = self.string(signature);
				self.type_strings.insert(signature.to_owned(), handle);
			}
		}
	}

	pub fn block_data(&mut self, bytes: &[u8]) -> &mut Self {
		if bytes.len() <= 255 {
			self.out.push(tag::BLOCK_DATA);
			self.out.push(bytes.len() as u8);
		} else {
			assert!(bytes.len() <= std::i32::MAX as usize, "Block data too long: {}", bytes.len());

			self.out.push(tag::BLOCK_DATA_LONG);
			self.out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
		}

		self.out.extend_from_slice(bytes);

		self
	}

	/// Writes a class descriptor, including its superclass descriptors. A class that is
	/// already in the stream is written as a reference to its first descriptor.
	pub fn class_desc(&mut self, class: &ClassDesc) -> Handle {
		if let Some(handle) = self.classes.get(&class.name).copied() {
			self.reference(handle);

			return handle;
		}

		assert!(!class.is_proxy(), "Cannot write proxy class descriptor");

		self.out.push(tag::CLASS_DESC);
		self.utf(&class.name);
		self.out.extend_from_slice(&class.serial_version_uid.to_be_bytes());

		let handle = self.assign();
		self.classes.insert(class.name.clone(), handle);

		self.out.push(class.flags);

		assert!(class.fields.len() <= std::i16::MAX as usize, "Too many fields: {}", class.fields.len());
		self.out.extend_from_slice(&(class.fields.len() as u16).to_be_bytes());

		for field in &class.fields {
			self.out.push(field.kind.code());
			self.utf(&field.name);

			if !field.kind.is_primitive() {
				let signature = field.class_name.as_ref()
					.unwrap_or_else(|| panic!("Field {} of {} has no type signature", field.name, class.name));

				self.type_string(signature);
			}
		}

		// No class annotation
		self.out.push(tag::END_BLOCK_DATA);

		match class.super_class.as_ref() {
			Some(parent) => { self.class_desc(parent); },
			None => { self.null(); }
		}

		handle
	}

	fn array_header(&mut self, class: &ClassDesc, len: usize) -> Handle {
		assert!(len <= std::i32::MAX as usize, "Array too long: {} (maximum length: {})", len, std::i32::MAX);

		self.out.push(tag::ARRAY);
		self.class_desc(class);

		let handle = self.assign();
		self.out.extend_from_slice(&(len as u32).to_be_bytes());

		handle
	}

	pub fn byte_array(&mut self, value: &[u8]) -> Handle {
		let handle = self.array_header(&ClassDesc::serializable("[B", BYTE_ARRAY_UID, Vec::new()), value.len());
		self.out.extend_from_slice(value);

		handle
	}

	pub fn int_array(&mut self, values: &[i32]) -> Handle {
		let handle = self.array_header(&ClassDesc::serializable("[I", INT_ARRAY_UID, Vec::new()), values.len());

		for value in values {
			self.out.extend_from_slice(&value.to_be_bytes());
		}

		handle
	}

	/// Writes an array of objects, such as `[Ljava.lang.Object;` or `[[I`. The filler must
	/// write exactly `len` elements.
	pub fn object_array<F>(&mut self, class: &ClassDesc, len: usize, filler: F) -> Handle where F: FnOnce(&mut ElementWriter<T>) {
		assert!(class.name.starts_with("[L") || class.name.starts_with("[["), "{} is not an object array class", class.name);

		let handle = self.array_header(class, len);
		let mut elements = ElementWriter { stream: self, remaining: len };

		filler(&mut elements);

		assert_eq!(elements.remaining, 0, "Attempted to end an object array with {} element(s) remaining", elements.remaining);

		handle
	}

	/// Writes a new object. The filler must write every field of the hierarchy in
	/// descriptor order, superclass fields first.
	pub fn object<F>(&mut self, class: &ClassDesc, filler: F) -> Handle where F: FnOnce(&mut FieldWriter<T>) {
		self.out.push(tag::OBJECT);
		self.class_desc(class);

		let handle = self.assign();
		let mut writer = FieldWriter::new(self, class);

		filler(&mut writer);

		writer.finish();

		handle
	}
}

pub struct ElementWriter<'w, T: Output> {
	stream: &'w mut StreamWriter<T>,
	remaining: usize
}

impl<'w, T> ElementWriter<'w, T> where T: Output {
	fn next(&mut self) -> &mut StreamWriter<T> {
		assert!(self.remaining > 0, "Attempted to write past the end of an object array");
		self.remaining -= 1;

		&mut *self.stream
	}

	pub fn null(&mut self) -> &mut Self {
		self.next().null();

		self
	}

	pub fn reference(&mut self, handle: Handle) -> &mut Self {
		self.next().reference(handle);

		self
	}

	pub fn string(&mut self, value: &str) -> Handle {
		self.next().string(value)
	}

	pub fn int_array(&mut self, values: &[i32]) -> Handle {
		self.next().int_array(values)
	}

	pub fn object<F>(&mut self, class: &ClassDesc, filler: F) -> Handle where F: FnOnce(&mut FieldWriter<T>) {
		self.next().object(class, filler)
	}
}

struct Segment {
	fields: Vec<FieldDesc>,
	write_method: bool
}

pub struct FieldWriter<'w, T: Output> {
	stream: &'w mut StreamWriter<T>,
	segments: Vec<Segment>,
	segment: usize,
	field: usize
}

impl<'w, T> FieldWriter<'w, T> where T: Output {
	fn new(stream: &'w mut StreamWriter<T>, class: &ClassDesc) -> Self {
		let segments = class.hierarchy().into_iter()
			.filter(|desc| desc.flags & flags::SERIALIZABLE != 0)
			.map(|desc| Segment {
				fields: desc.fields.clone(),
				write_method: desc.flags & flags::WRITE_METHOD != 0
			})
			.collect();

		let mut writer = FieldWriter { stream, segments, segment: 0, field: 0 };

		writer.close_finished(false);
		writer
	}

	/// Moves past every segment whose fields have all been written. A class with a
	/// `writeObject` method stays open for annotations until `close` is set, and then
	/// gets its end marker.
	fn close_finished(&mut self, close: bool) {
		while let Some(segment) = self.segments.get(self.segment) {
			if self.field < segment.fields.len() {
				break;
			}

			if segment.write_method {
				if !close {
					break;
				}

				self.stream.out.push(tag::END_BLOCK_DATA);
			}

			self.segment += 1;
			self.field = 0;
		}
	}

	fn expect(&mut self, name: &str, accepts: &[FieldKind]) {
		self.close_finished(true);

		let field = self.segments.get(self.segment)
			.and_then(|segment| segment.fields.get(self.field))
			.unwrap_or_else(|| panic!("Attempted to write field {} past the end of the object", name));

		assert_eq!(field.name, name, "Fields must be written in descriptor order");
		assert!(accepts.contains(&field.kind), "Field {} is declared as {:?}", name, field.kind);
	}

	fn advance(&mut self) -> &mut Self {
		self.field += 1;
		self.close_finished(false);

		self
	}

	fn finish(mut self) {
		self.close_finished(true);

		assert_eq!(self.segment, self.segments.len(), "Attempted to end an incomplete object, {} field(s) remaining",
			self.segments.iter().skip(self.segment).map(|segment| segment.fields.len()).sum::<usize>() - self.field);
	}

	/// Writes the extra data of a `writeObject` method, after the default fields of
	/// its class.
	pub fn annotate<F>(&mut self, filler: F) -> &mut Self where F: FnOnce(&mut StreamWriter<T>) {
		let open = self.segments.get(self.segment)
			.map(|segment| segment.write_method && self.field == segment.fields.len())
			.unwrap_or(false);

		assert!(open, "Annotations must follow the fields of a class with a writeObject method");

		filler(&mut *self.stream);

		self
	}

	pub fn next_handle(&self) -> Handle {
		self.stream.next_handle()
	}

	pub fn bool(&mut self, name: &str, value: bool) -> &mut Self {
		self.expect(name, &[FieldKind::Boolean]);
		self.stream.out.push(value as u8);

		self.advance()
	}

	pub fn i8(&mut self, name: &str, value: i8) -> &mut Self {
		self.expect(name, &[FieldKind::Byte]);
		self.stream.out.push(value as u8);

		self.advance()
	}

	pub fn char(&mut self, name: &str, value: u16) -> &mut Self {
		self.expect(name, &[FieldKind::Char]);
		self.stream.out.extend_from_slice(&value.to_be_bytes());

		self.advance()
	}

	pub fn i16(&mut self, name: &str, value: i16) -> &mut Self {
		self.expect(name, &[FieldKind::Short]);
		self.stream.out.extend_from_slice(&value.to_be_bytes());

		self.advance()
	}

	pub fn i32(&mut self, name: &str, value: i32) -> &mut Self {
		self.expect(name, &[FieldKind::Int]);
		self.stream.out.extend_from_slice(&value.to_be_bytes());

		self.advance()
	}

	pub fn i64(&mut self, name: &str, value: i64) -> &mut Self {
		self.expect(name, &[FieldKind::Long]);
		self.stream.out.extend_from_slice(&value.to_be_bytes());

		self.advance()
	}

	pub fn f32(&mut self, name: &str, value: f32) -> &mut Self {
		self.expect(name, &[FieldKind::Float]);
		self.stream.out.extend_from_slice(&value.to_bits().to_be_bytes());

		self.advance()
	}

	pub fn f64(&mut self, name: &str, value: f64) -> &mut Self {
		self.expect(name, &[FieldKind::Double]);
		self.stream.out.extend_from_slice(&value.to_bits().to_be_bytes());

		self.advance()
	}

	pub fn null(&mut self, name: &str) -> &mut Self {
		self.expect(name, &[FieldKind::Object, FieldKind::Array]);
		self.stream.null();

		self.advance()
	}

	pub fn reference(&mut self, name: &str, handle: Handle) -> &mut Self {
		self.expect(name, &[FieldKind::Object, FieldKind::Array]);
		self.stream.reference(handle);

		self.advance()
	}

	pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
		self.expect(name, &[FieldKind::Object]);
		self.stream.string(value);

		self.advance()
	}

	pub fn byte_array(&mut self, name: &str, value: &[u8]) -> &mut Self {
		self.expect(name, &[FieldKind::Array]);
		self.stream.byte_array(value);

		self.advance()
	}

	pub fn object<F>(&mut self, name: &str, class: &ClassDesc, filler: F) -> &mut Self where F: FnOnce(&mut FieldWriter<T>) {
		self.expect(name, &[FieldKind::Object]);
		self.stream.object(class, filler);

		self.advance()
	}

	pub fn int_array(&mut self, name: &str, values: &[i32]) -> &mut Self {
		self.expect(name, &[FieldKind::Array]);
		self.stream.int_array(values);

		self.advance()
	}

	pub fn object_array<F>(&mut self, name: &str, class: &ClassDesc, len: usize, filler: F) -> &mut Self where F: FnOnce(&mut ElementWriter<T>) {
		self.expect(name, &[FieldKind::Array]);
		self.stream.object_array(class, len, filler);

		self.advance()
	}
}
