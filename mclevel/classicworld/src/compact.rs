//! The compact level layout, written as a gzip stream:
//!
//! | bytes | content |
//! |---|---|
//! | 0..2 | width, big endian |
//! | 2..4 | depth |
//! | 4..6 | height |
//! | 6..8 | spawn X in 1/32 block units, centered in the block |
//! | 8..10 | spawn Y in 1/32 block units |
//! | 10..12 | spawn Z in 1/32 block units, centered in the block |
//! | 12.. | block array, same order as the legacy level |

use byteorder::{BigEndian, ReadBytesExt};
use deflate::write::GzEncoder;
use deflate::Compression;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

use crate::{BlockVolume, ClassicLevel, CompactError, EncodeError};

pub const HEADER_LEN: usize = 12;

/// A corrupt header can claim up to 2^48 blocks, so the buffer grows with the data instead.
const PREALLOCATE_LIMIT: usize = 1 << 24;

/// Spawn coordinates are stored with 5 fractional bits.
pub const SPAWN_SHIFT: u32 = 5;

/// Half a block in fixed point units, which moves the spawn to the center of the X/Z cell.
pub const SPAWN_CENTER: i32 = 16;

/// Converts a block coordinate to its fixed point wire form. The arithmetic wraps like
/// a 32-bit int and keeps only the low 16 bits of the result.
pub fn spawn_fixed_point(coordinate: i32, offset: i32) -> [u8; 2] {
	let fixed = coordinate.wrapping_shl(SPAWN_SHIFT).wrapping_add(offset);

	(fixed as u16).to_be_bytes()
}

pub fn header(level: &ClassicLevel) -> [u8; HEADER_LEN] {
	let (x, y, z) = level.spawn();
	let mut header = [0; HEADER_LEN];

	header[0..2].copy_from_slice(&level.width().to_be_bytes());
	header[2..4].copy_from_slice(&level.depth().to_be_bytes());
	header[4..6].copy_from_slice(&level.height().to_be_bytes());

	header[6..8].copy_from_slice(&spawn_fixed_point(x, SPAWN_CENTER));
	header[8..10].copy_from_slice(&spawn_fixed_point(y, 0));
	header[10..12].copy_from_slice(&spawn_fixed_point(z, SPAWN_CENTER));

	header
}

/// Writes the uncompressed layout.
pub fn write_level<W: Write>(level: &ClassicLevel, mut out: W) -> io::Result<()> {
	out.write_all(&header(level))?;
	out.write_all(level.blocks().raw())
}

pub fn encode(level: &ClassicLevel) -> Vec<u8> {
	let mut out = Vec::with_capacity(HEADER_LEN + level.blocks().len());

	out.extend_from_slice(&header(level));
	out.extend_from_slice(level.blocks().raw());

	out
}

/// Writes a gzip compressed compact level. The file is only complete once this
/// returns `Ok`; a failed write may leave a partial file behind.
pub fn save<P: AsRef<Path>>(level: &ClassicLevel, path: P) -> Result<(), EncodeError> {
	let path = path.as_ref();

	let file = File::create(path).map_err(|source| EncodeError::Create { path: path.to_owned(), source })?;
	let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::Default);

	write_level(level, &mut encoder)?;

	let mut out = encoder.finish()?;
	out.flush()?;

	info!("Saved compact level to {} ({} blocks)", path.display(), level.blocks().len());

	Ok(())
}

/// A level read back from the compact layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactLevel {
	/// Spawn point in fixed point units, as stored.
	pub spawn: (i16, i16, i16),
	pub blocks: BlockVolume
}

/// Reads the uncompressed layout.
pub fn read_level<R: Read>(mut input: R) -> Result<CompactLevel, CompactError> {
	let width = input.read_u16::<BigEndian>()?;
	let depth = input.read_u16::<BigEndian>()?;
	let height = input.read_u16::<BigEndian>()?;

	let spawn = (
		input.read_i16::<BigEndian>()?,
		input.read_i16::<BigEndian>()?,
		input.read_i16::<BigEndian>()?
	);

	let expected = width as usize * depth as usize * height as usize;
	let mut blocks = Vec::with_capacity(expected.min(PREALLOCATE_LIMIT));

	input.take(expected as u64).read_to_end(&mut blocks)?;

	let found = blocks.len();

	let blocks = BlockVolume::new(width, height, depth, blocks.into_boxed_slice())
		.map_err(|_| CompactError::TooShort { expected, found })?;

	Ok(CompactLevel { spawn, blocks })
}

/// Opens and reads a gzip compressed compact level.
pub fn open<P: AsRef<Path>>(path: P) -> Result<CompactLevel, CompactError> {
	let path = path.as_ref();

	let file = File::open(path).map_err(|source| CompactError::Open { path: path.to_owned(), source })?;
	let level = read_level(GzDecoder::new(BufReader::new(file)))?;

	info!(
		"Loaded compact level from {} (size = {} x {} x {})",
		path.display(),
		level.blocks.width(),
		level.blocks.depth(),
		level.blocks.height()
	);

	Ok(level)
}
