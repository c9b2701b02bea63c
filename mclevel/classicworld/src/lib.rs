//! Minecraft Classic levels: the legacy serialized `Level` record and the compact
//! gzip layout that replaces it.

pub mod compact;
mod error;
pub mod legacy;
mod summary;

pub use error::{CompactError, DecodeError, EncodeError};
pub use summary::Summary;

/// A decoded level. Created once by a decoder and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicLevel {
	name: Option<String>,
	creator: Option<String>,
	time_created: i64,
	spawn: (i32, i32, i32),
	blocks: BlockVolume
}

impl ClassicLevel {
	pub fn new(name: Option<String>, creator: Option<String>, time_created: i64, spawn: (i32, i32, i32), blocks: BlockVolume) -> Self {
		ClassicLevel { name, creator, time_created, spawn, blocks }
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn creator(&self) -> Option<&str> {
		self.creator.as_deref()
	}

	/// Creation time in milliseconds since the Unix epoch.
	pub fn time_created(&self) -> i64 {
		self.time_created
	}

	/// Spawn point in whole blocks.
	pub fn spawn(&self) -> (i32, i32, i32) {
		self.spawn
	}

	pub fn blocks(&self) -> &BlockVolume {
		&self.blocks
	}

	pub fn width(&self) -> u16 {
		self.blocks.width()
	}

	pub fn height(&self) -> u16 {
		self.blocks.height()
	}

	pub fn depth(&self) -> u16 {
		self.blocks.depth()
	}
}

/// Block IDs in Y, Z, X order: `(y * depth + z) * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockVolume {
	blocks: Box<[u8]>,
	x_size: u16,
	y_size: u16,
	z_size: u16
}

impl BlockVolume {
	/// Wraps a block array, which must hold exactly `width * height * depth` entries.
	pub fn new(width: u16, height: u16, depth: u16, blocks: Box<[u8]>) -> Result<Self, DecodeError> {
		let expected = width as usize * height as usize * depth as usize;

		if blocks.len() != expected {
			return Err(DecodeError::VolumeMismatch {
				width,
				height,
				depth,
				found: blocks.len()
			});
		}

		Ok(BlockVolume { blocks, x_size: width, y_size: height, z_size: depth })
	}

	pub fn width(&self) -> u16 {
		self.x_size
	}

	pub fn height(&self) -> u16 {
		self.y_size
	}

	pub fn depth(&self) -> u16 {
		self.z_size
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	pub fn raw(&self) -> &[u8] {
		&self.blocks
	}

	pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
		assert!(x < self.x_size as usize);
		assert!(y < self.y_size as usize);
		assert!(z < self.z_size as usize);

		(y * self.z_size as usize + z) * self.x_size as usize + x
	}

	pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
		self.blocks[self.index(x, y, z)]
	}
}
