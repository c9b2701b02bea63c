//! Java's "modified UTF-8": NUL is encoded as `C0 80`, and characters outside the
//! basic multilingual plane are written as two 3-byte encoded surrogates.
//!
//! Java strings may hold unpaired surrogates. Those decode to U+FFFD.

use crate::{Error, Result};

pub fn decode(bytes: &[u8]) -> Result<String> {
	let mut units = Vec::with_capacity(bytes.len());
	let mut index = 0;

	while index < bytes.len() {
		let a = bytes[index] as u16;

		if a & 0x80 == 0 {
			units.push(a);
			index += 1;
		} else if a & 0xE0 == 0xC0 {
			let b = continuation(bytes, index + 1)?;

			units.push(((a & 0x1F) << 6) | b);
			index += 2;
		} else if a & 0xF0 == 0xE0 {
			let b = continuation(bytes, index + 1)?;
			let c = continuation(bytes, index + 2)?;

			units.push(((a & 0x0F) << 12) | (b << 6) | c);
			index += 3;
		} else {
			return Err(Error::InvalidString);
		}
	}

	Ok(String::from_utf16_lossy(&units))
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16> {
	match bytes.get(index) {
		Some(&byte) if byte & 0xC0 == 0x80 => Ok((byte & 0x3F) as u16),
		_ => Err(Error::InvalidString)
	}
}

pub fn encode(value: &str) -> Vec<u8> {
	let mut out = Vec::with_capacity(value.len());

	for unit in value.encode_utf16() {
		match unit {
			0x0001..=0x007F => out.push(unit as u8),
			0x0000 | 0x0080..=0x07FF => {
				out.push(0xC0 | (unit >> 6) as u8);
				out.push(0x80 | (unit & 0x3F) as u8);
			},
			_ => {
				out.push(0xE0 | (unit >> 12) as u8);
				out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
				out.push(0x80 | (unit & 0x3F) as u8);
			}
		}
	}

	out
}
