//! Builds legacy level files the way the Classic client serializes them.

#![allow(dead_code)]

use java_serial::{flags, ClassDesc, FieldDesc, FieldKind, StreamWriter};

/// Prefix the Classic client writes before the object stream: a magic number and a format version.
pub const CLASSIC_PREFIX: [u8; 5] = [0x27, 0x1B, 0xB7, 0x88, 0x02];

pub const LEVEL_CLASS: &str = "com.mojang.minecraft.level.Level";

pub struct Fixture {
	pub prefix: Vec<u8>,
	pub class_name: &'static str,
	pub width: i32,
	pub height: i32,
	pub depth: i32,
	pub spawn: (i32, i32, i32),
	pub create_time: i64,
	pub name: Option<&'static str>,
	pub creator: Option<&'static str>,
	pub blocks: Vec<u8>,
	/// Declare dimensions and spawn as `short` like some early levels.
	pub short_fields: bool,
	/// Declare `createTime` as `int`, which is not a valid level.
	pub int_time: bool,
	/// Fields left out of the class descriptor.
	pub omit: Vec<&'static str>,
	/// Entities stored in the block map's entity lists.
	pub entities: usize
}

impl Fixture {
	pub fn new(width: i32, height: i32, depth: i32) -> Self {
		let blocks = (0..width * height * depth).map(|index| (index * 7 % 50) as u8).collect();

		Fixture {
			prefix: CLASSIC_PREFIX.to_vec(),
			class_name: LEVEL_CLASS,
			width,
			height,
			depth,
			spawn: (1, 0, -1),
			create_time: 1_245_168_000_000,
			name: Some("Fixture"),
			creator: Some("tester"),
			blocks,
			short_fields: false,
			int_time: false,
			omit: Vec::new(),
			entities: 1
		}
	}

	/// Field layout of the Classic `Level` class: primitives then objects, each sorted by name.
	fn class(&self) -> ClassDesc {
		let coordinate = if self.short_fields { FieldKind::Short } else { FieldKind::Int };
		let time = if self.int_time { FieldKind::Int } else { FieldKind::Long };

		let fields = vec![
			FieldDesc::primitive(FieldKind::Int, "cloudColor"),
			FieldDesc::primitive(time, "createTime"),
			FieldDesc::primitive(coordinate, "depth"),
			FieldDesc::primitive(FieldKind::Int, "fogColor"),
			FieldDesc::primitive(coordinate, "height"),
			FieldDesc::primitive(FieldKind::Float, "rotSpawn"),
			FieldDesc::primitive(FieldKind::Int, "skyColor"),
			FieldDesc::primitive(FieldKind::Int, "tickCount"),
			FieldDesc::primitive(FieldKind::Int, "unprocessed"),
			FieldDesc::primitive(FieldKind::Int, "waterLevel"),
			FieldDesc::primitive(coordinate, "width"),
			FieldDesc::primitive(coordinate, "xSpawn"),
			FieldDesc::primitive(coordinate, "ySpawn"),
			FieldDesc::primitive(coordinate, "zSpawn"),
			FieldDesc::object("blockMap", "Lcom/mojang/minecraft/level/BlockMap;"),
			FieldDesc::array("blockers", "[I"),
			FieldDesc::array("blocks", "[B"),
			FieldDesc::object("creator", "Ljava/lang/String;"),
			FieldDesc::object("name", "Ljava/lang/String;"),
			FieldDesc::object("player", "Lcom/mojang/minecraft/Entity;")
		];

		let fields = fields.into_iter()
			.filter(|field| !self.omit.iter().any(|omitted| *omitted == field.name))
			.collect();

		ClassDesc::serializable(self.class_name, 1, fields)
	}

	fn block_map_class() -> ClassDesc {
		ClassDesc::serializable("com.mojang.minecraft.level.BlockMap", 2, vec![
			FieldDesc::primitive(FieldKind::Int, "depth"),
			FieldDesc::primitive(FieldKind::Int, "height"),
			FieldDesc::primitive(FieldKind::Int, "width"),
			FieldDesc::object("all", "Ljava/util/List;"),
			FieldDesc::array("entityGrid", "[Ljava/util/List;")
		])
	}

	fn entity_class() -> ClassDesc {
		ClassDesc::serializable("com.mojang.minecraft.Entity", 3, vec![
			FieldDesc::primitive(FieldKind::Boolean, "removed"),
			FieldDesc::primitive(FieldKind::Float, "x"),
			FieldDesc::primitive(FieldKind::Float, "y"),
			FieldDesc::primitive(FieldKind::Float, "z")
		])
	}

	/// `java.util.ArrayList`, whose `writeObject` adds the capacity and the elements.
	fn list_class() -> ClassDesc {
		ClassDesc {
			flags: flags::SERIALIZABLE | flags::WRITE_METHOD,
			..ClassDesc::serializable("java.util.ArrayList", 8683452581122892189, vec![FieldDesc::primitive(FieldKind::Int, "size")])
		}
	}

	/// The decompressed file: prefix followed by the object stream.
	pub fn stream(&self) -> Vec<u8> {
		let class = self.class();
		let block_map = Fixture::block_map_class();
		let entity = Fixture::entity_class();
		let list = Fixture::list_class();
		let list_array = ClassDesc::serializable("[Ljava.util.List;", 4, Vec::new());

		let capacity = (self.entities.max(10) as i32).to_be_bytes();
		let heights = vec![self.height; (self.width * self.depth).max(0) as usize];

		StreamWriter::write(self.prefix.clone(), |writer| {
			writer.object(&class, |fields| {
				let mut creator_handle = None;

				for field in &class.fields {
					let name = field.name.as_str();

					match (name, field.kind) {
						("createTime", FieldKind::Long) => { fields.i64(name, self.create_time); },
						("createTime", _) => { fields.i32(name, self.create_time as i32); },
						(_, FieldKind::Short) => { fields.i16(name, self.coordinate(name) as i16); },
						("width", _) | ("height", _) | ("depth", _) | ("xSpawn", _) | ("ySpawn", _) | ("zSpawn", _) => {
							fields.i32(name, self.coordinate(name));
						},
						("waterLevel", _) => { fields.i32(name, self.height / 2); },
						(_, FieldKind::Int) => { fields.i32(name, 0x00FF_FFFF); },
						("rotSpawn", _) => { fields.f32(name, 90.0); },
						("blockMap", _) => {
							fields.object(name, &block_map, |map| {
								map.i32("depth", self.depth).i32("height", self.height).i32("width", self.width);

								let mut entities = Vec::new();

								map.object("all", &list, |all| {
									all.i32("size", self.entities as i32).annotate(|stream| {
										stream.block_data(&capacity);

										for index in 0..self.entities {
											let position = index as f32 + 0.5;

											entities.push(stream.object(&entity, |fields| {
												fields.bool("removed", false).f32("x", position).f32("y", 42.0).f32("z", position);
											}));
										}
									});
								});

								// One cell holds every entity by reference, the other is empty
								map.object_array("entityGrid", &list_array, 2, |cells| {
									cells.object(&list, |cell| {
										cell.i32("size", entities.len() as i32).annotate(|stream| {
											stream.block_data(&capacity);

											for &handle in &entities {
												stream.reference(handle);
											}
										});
									});

									cells.object(&list, |cell| { cell.i32("size", 0); });
								});
							});
						},
						("blockers", _) => { fields.int_array(name, &heights); },
						("blocks", _) => { fields.byte_array(name, &self.blocks); },
						("creator", _) => match self.creator {
							Some(creator) => {
								creator_handle = Some((creator, fields.next_handle()));
								fields.string(name, creator);
							},
							None => { fields.null(name); }
						},
						("name", _) => match (self.name, creator_handle) {
							// The same string instance is written as a back reference
							(Some(level_name), Some((creator, handle))) if level_name == creator => { fields.reference(name, handle); },
							(Some(level_name), _) => { fields.string(name, level_name); },
							(None, _) => { fields.null(name); }
						},
						("player", _) => { fields.null(name); },
						_ => panic!("fixture does not know how to write {}", name)
					}
				}
			});
		})
	}

	pub fn gzip(&self) -> Vec<u8> {
		gzip(&self.stream())
	}

	fn coordinate(&self, name: &str) -> i32 {
		match name {
			"width" => self.width,
			"height" => self.height,
			"depth" => self.depth,
			"xSpawn" => self.spawn.0,
			"ySpawn" => self.spawn.1,
			"zSpawn" => self.spawn.2,
			_ => panic!("{} is not a coordinate", name)
		}
	}
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
	deflate::deflate_bytes_gzip(data)
}

pub fn gunzip(data: &[u8]) -> Vec<u8> {
	use std::io::Read;

	let mut out = Vec::new();
	flate2::read::GzDecoder::new(data).read_to_end(&mut out).unwrap();

	out
}
