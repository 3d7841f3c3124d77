//! Wire primitives shared by every section.
//!
//! The game's coordinate system swaps the Y and Z axes relative to ours. The swap happens here and
//! nowhere else.

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io::{
	Read,
	Result,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use brgkit_core::{
	color::Color,
	io_ext::{
		ReadBinExt,
		WriteBinExt
	}
};

/// Triangle as three vertex indices
pub type Face = [u16; 3];

/// Converts a truncated half-float wire value into an `f32`.
/// The two stored bytes are the high half of the float; the low half is zero.
#[inline]
pub fn half_to_f32(raw: u16) -> f32 {
	f32::from_bits((raw as u32) << 16)
}

/// Keeps the high 16 bits of `value`, dropping the rest of the mantissa without rounding
#[inline]
pub fn f32_to_half(value: f32) -> u16 {
	(value.to_bits() >> 16) as u16
}

/// Exchanges the 2nd and 3rd components
#[inline]
pub fn swap_yz(v: Vec3) -> Vec3 {
	Vec3::new(v.x, v.z, v.y)
}

pub trait ReadBrgExt: Read {
	#[inline]
	fn read_half(&mut self) -> Result<f32> {
		Ok(half_to_f32(self.read_u16::<LE>()?))
	}

	#[inline]
	fn read_vec2_half(&mut self) -> Result<Vec2> {
		let x = self.read_half()?;
		let y = self.read_half()?;

		Ok(Vec2::new(x, y))
	}

	/// Reads three halves stored as `(x, y, z)`, returned as `(x, z, y)`
	#[inline]
	fn read_vec3_half(&mut self) -> Result<Vec3> {
		let x = self.read_half()?;
		let y = self.read_half()?;
		let z = self.read_half()?;

		Ok(swap_yz(Vec3::new(x, y, z)))
	}

	/// Reads three halves stored as `(x, y, z)`, returned as `(x, y, -z)`
	#[inline]
	fn read_vec3_half_unswapped(&mut self) -> Result<Vec3> {
		let x = self.read_half()?;
		let y = self.read_half()?;
		let z = self.read_half()?;

		Ok(Vec3::new(x, y, -z))
	}

	/// Reads three full floats, returned as `(x, z, y)`
	#[inline]
	fn read_vec3_full(&mut self) -> Result<Vec3> {
		Ok(swap_yz(self.read_vec3_le()?))
	}

	/// Reads three indices, reordered to follow the vertex axis swap
	#[inline]
	fn read_face(&mut self) -> Result<Face> {
		let a = self.read_u16::<LE>()?;
		let b = self.read_u16::<LE>()?;
		let c = self.read_u16::<LE>()?;

		Ok([a, c, b])
	}

	#[inline]
	fn read_color(&mut self) -> Result<Color> {
		Ok(Color::from_rgba8888(self.read_array::<4>()?))
	}
}

impl<R> ReadBrgExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBrgExt: Write {
	#[inline]
	fn write_half(&mut self, value: f32) -> Result<()> {
		self.write_u16::<LE>(f32_to_half(value))
	}

	#[inline]
	fn write_vec2_half(&mut self, v: Vec2) -> Result<()> {
		self.write_half(v.x)?;
		self.write_half(v.y)
	}

	#[inline]
	fn write_vec3_half(&mut self, v: Vec3) -> Result<()> {
		let s = swap_yz(v);
		self.write_half(s.x)?;
		self.write_half(s.y)?;
		self.write_half(s.z)
	}

	#[inline]
	fn write_vec3_half_unswapped(&mut self, v: Vec3) -> Result<()> {
		self.write_half(v.x)?;
		self.write_half(v.y)?;
		self.write_half(-v.z)
	}

	#[inline]
	fn write_vec3_full(&mut self, v: Vec3) -> Result<()> {
		self.write_vec3_le(swap_yz(v))
	}

	#[inline]
	fn write_face(&mut self, face: &Face) -> Result<()> {
		self.write_u16::<LE>(face[0])?;
		self.write_u16::<LE>(face[2])?;
		self.write_u16::<LE>(face[1])
	}

	#[inline]
	fn write_color(&mut self, color: &Color) -> Result<()> {
		self.write_all(&color.to_rgba8888())
	}
}

impl<W> WriteBrgExt for W
where
	W: Write + ?Sized,
{
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	use brgkit_core::color::Color;

	use super::*;

	#[test]
	fn test_half_layout() {
		// 1.0f32 is 0x3F80_0000, so its high half is 0x3F80
		let mut data = &[0x80, 0x3f][..];
		assert_eq!(data.read_half().unwrap(), 1.0);
		assert_eq!(f32_to_half(-2.0), 0xC000);
	}

	#[test]
	fn test_half_truncates() {
		// 1.0 + 2^-7 + 2^-20: the 2^-20 bit lives in the dropped half
		let x = f32::from_bits(0x3F81_0008);
		assert_eq!(half_to_f32(f32_to_half(x)), f32::from_bits(0x3F81_0000));

		// Truncation never rounds away from zero
		let y = f32::from_bits(0x3F81_FFFF);
		assert_eq!(half_to_f32(f32_to_half(y)), f32::from_bits(0x3F81_0000));
	}

	#[test]
	fn test_half_keeps_nan_payload() {
		// A signalling NaN must not be quieted on the way through
		assert_eq!(half_to_f32(0x7F81).to_bits(), 0x7F81_0000);
		assert_eq!(f32_to_half(half_to_f32(0x7F81)), 0x7F81);
		assert_eq!(f32_to_half(half_to_f32(0xFFC3)), 0xFFC3);
	}

	#[test]
	fn test_half_error_bound() {
		for &x in &[0.1f32, -3.14159, 1234.5678, 1.0e-3, -7.77e5] {
			let y = half_to_f32(f32_to_half(x));
			// 7 mantissa bits survive
			assert!((y - x).abs() <= x.abs() / 128.0, "{} -> {}", x, y);
			assert!(y.abs() <= x.abs());
		}
	}

	#[test]
	fn test_half_idempotent() {
		for &x in &[0.3f32, -9.81, 65504.0, 1.0e-7, 0.0] {
			let once = f32_to_half(x);
			assert_eq!(f32_to_half(half_to_f32(once)), once);
		}
	}

	#[test]
	fn test_half_order_preserving() {
		let values = [-100.0f32, -1.5, -0.001, 0.0, 0.001, 1.5, 100.0];
		for w in values.windows(2) {
			assert!(half_to_f32(f32_to_half(w[0])) <= half_to_f32(f32_to_half(w[1])));
		}
	}

	#[test]
	fn test_swap_involution() {
		let v = Vec3::new(1.0, 2.0, 3.0);
		assert_eq!(swap_yz(v), Vec3::new(1.0, 3.0, 2.0));
		assert_eq!(swap_yz(swap_yz(v)), v);
	}

	#[test]
	fn test_vec3_half_swapped() {
		// x = 1.0, y = 2.0, z = -0.5
		let mut data = &[0x80, 0x3f, 0x00, 0x40, 0x00, 0xbf][..];
		assert_eq!(data.read_vec3_half().unwrap(), Vec3::new(1.0, -0.5, 2.0));

		let mut out = vec![];
		out.write_vec3_half(Vec3::new(1.0, -0.5, 2.0)).unwrap();
		assert_eq!(out, [0x80, 0x3f, 0x00, 0x40, 0x00, 0xbf]);
	}

	#[test]
	fn test_vec3_half_unswapped() {
		let mut data = &[0x80, 0x3f, 0x00, 0x40, 0x00, 0xbf][..];
		assert_eq!(data.read_vec3_half_unswapped().unwrap(), Vec3::new(1.0, 2.0, 0.5));

		let mut out = vec![];
		out.write_vec3_half_unswapped(Vec3::new(1.0, 2.0, 0.5)).unwrap();
		assert_eq!(out, [0x80, 0x3f, 0x00, 0x40, 0x00, 0xbf]);
	}

	#[test]
	fn test_vec3_full() {
		let mut out = vec![];
		out.write_vec3_full(Vec3::new(1.0, 2.0, 3.0)).unwrap();
		assert_eq!(&out[4..8], &3.0f32.to_le_bytes()[..]);
		assert_eq!(out.as_slice().read_vec3_full().unwrap(), Vec3::new(1.0, 2.0, 3.0));
	}

	#[test]
	fn test_vec2_half() {
		let mut out = vec![];
		out.write_vec2_half(Vec2::new(0.5, 0.25)).unwrap();
		assert_eq!(out.as_slice().read_vec2_half().unwrap(), Vec2::new(0.5, 0.25));
	}

	#[test]
	fn test_face_order() {
		let mut data = &[1, 0, 2, 0, 3, 0][..];
		assert_eq!(data.read_face().unwrap(), [1, 3, 2]);

		let mut out = vec![];
		out.write_face(&[1, 3, 2]).unwrap();
		assert_eq!(out, [1, 0, 2, 0, 3, 0]);
	}

	#[test]
	fn test_color() {
		let mut data = &[255, 0, 51, 255][..];
		let c = data.read_color().unwrap();
		assert_eq!(c, Color::new(1.0, 0.0, 0.2, 1.0));

		let mut out = vec![];
		out.write_color(&c).unwrap();
		assert_eq!(out, [255, 0, 51, 255]);
	}
}
