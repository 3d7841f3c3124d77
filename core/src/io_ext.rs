use std::io::{
	Error,
	ErrorKind,
	Read,
	Result,
	Write
};

use ultraviolet::vec::Vec3;

pub trait ReadBinExt: Read {
	/// Reads a fixed number of bytes into an array
	#[inline]
	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut buf = [0; N];
		self.read_exact(&mut buf)?;

		Ok(buf)
	}

	/// Reads exactly `length` bytes. Memory grows with the bytes actually read, never with `length`.
	fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
		let mut raw = vec![];
		Read::take(&mut *self, length as u64).read_to_end(&mut raw)?;

		if raw.len() < length {
			return Err(Error::new(ErrorKind::UnexpectedEof,
				format!("expected {} bytes, found {}", length, raw.len())));
		}

		Ok(raw)
	}

	/// Reads a string of exactly `length` bytes, one byte per character
	#[inline]
	fn read_latin1(&mut self, length: usize) -> Result<String> {
		Ok(self.read_bytes(length)?.into_iter().map(char::from).collect())
	}

	/// Reads a little endian 3D vector
	#[inline]
	fn read_vec3_le(&mut self) -> Result<Vec3> {
		let mut x = [0; 4];
		let mut y = x;
		let mut z = y;

		self.read_exact(&mut x)?;
		self.read_exact(&mut y)?;
		self.read_exact(&mut z)?;

		Ok(Vec3::new(f32::from_le_bytes(x), f32::from_le_bytes(y), f32::from_le_bytes(z)))
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBinExt: Write {
	/// Writes a string one byte per character. Characters above U+00FF are rejected.
	#[inline]
	fn write_latin1(&mut self, s: &str) -> Result<()> {
		let mut raw = Vec::with_capacity(s.len());
		for c in s.chars() {
			match u8::try_from(c) {
				Ok(b) => raw.push(b),
				Err(_) => return Err(Error::new(ErrorKind::InvalidInput,
					format!("character {:?} does not fit in a single byte", c))),
			}
		}

		self.write_all(&raw)
	}

	/// Writes a little endian 3D vector
	#[inline]
	fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())?;
		self.write_all(&v.z.to_le_bytes())
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}

/// Number of Latin-1 bytes `s` occupies when written with [`WriteBinExt::write_latin1`]
pub fn latin1_len(s: &str) -> usize {
	s.chars().count()
}

#[cfg(test)]
mod tests {
	use std::io::ErrorKind;

	use ultraviolet::vec::Vec3;

	use super::*;

	#[test]
	fn test_read_array() {
		let mut data = &b"\x01\x02\x03\x04\x05"[..];
		assert_eq!([1, 2, 3], data.read_array::<3>().unwrap());
		assert_eq!(data, &[4, 5][..]);
	}

	#[test]
	fn test_read_latin1() {
		let mut data = &b"tex\xe9_a12345"[..];
		assert_eq!("tex\u{e9}_a".to_string(), data.read_latin1(6).unwrap());
	}

	#[test]
	fn test_read_bytes() {
		let mut data = &b"\x01\x02\x03\x04"[..];
		assert_eq!(data.read_bytes(3).unwrap(), vec![1, 2, 3]);
		assert_eq!(data.read_bytes(2).unwrap_err().kind(), ErrorKind::UnexpectedEof);
	}

	#[test]
	fn test_read_latin1_huge_length() {
		let mut data = &b"short"[..];
		assert_eq!(data.read_latin1(u32::MAX as usize).unwrap_err().kind(), ErrorKind::UnexpectedEof);
	}

	#[test]
	fn test_latin1_roundtrip() {
		let mut out = vec![];
		out.write_latin1("caf\u{e9}").unwrap();
		assert_eq!(out, b"caf\xe9");
		assert_eq!(latin1_len("caf\u{e9}"), 4);
		assert_eq!(out.write_latin1("\u{263a}").unwrap_err().kind(), ErrorKind::InvalidInput);
	}

	#[test]
	fn test_read_vec3() {
		let mut vec3: &[u8] = &[0x5c, 0x1f, 0x7f, 0x3c, 0xa4, 0xfb, 0xf0, 0x3d, 0xd4, 0xf1, 0xb6, 0x3d][..];
		assert_eq!(Vec3::new(0.0155714415, 0.117667466, 0.089328438), vec3.read_vec3_le().unwrap());
	}

	#[test]
	fn test_write_vec3() {
		let mut out = vec![];
		out.write_vec3_le(Vec3::new(0.0155714415, 0.117667466, 0.089328438)).unwrap();
		assert_eq!(out, [0x5c, 0x1f, 0x7f, 0x3c, 0xa4, 0xfb, 0xf0, 0x3d, 0xd4, 0xf1, 0xb6, 0x3d]);
	}
}
