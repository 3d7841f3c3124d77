use byteorder::LE;

#[cfg(feature = "import")]
use byteorder::ReadBytesExt;

#[cfg(feature = "export")]
use byteorder::WriteBytesExt;

#[cfg(feature = "import")]
use brgkit_core::io_ext::ReadBinExt;

#[cfg(feature = "export")]
use brgkit_core::io_ext::{
	latin1_len,
	WriteBinExt
};

use crate::flags::{
	FlagSet,
	MatrFlags
};

#[cfg(feature = "import")]
use crate::brg::import::BrgImportError;

#[cfg(feature = "export")]
use crate::brg::export::BrgExportError;

/// Effect reference carried by materials flagged with [`MatrFlags::SFX`]
#[derive(Clone, Debug, PartialEq)]
pub struct Sfx {
	pub unknown: [u8; 2],
	pub name: String,
}

impl Sfx {
	pub fn new(name: &str) -> Sfx {
		Sfx {
			unknown: [0; 2],
			name: name.to_string(),
		}
	}
}

/// A `MTRL` section.
///
/// `raw_id` is the value faces use to refer to this material in the first frame. The texture is
/// referenced by name only.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub raw_id: u32,
	pub flags: FlagSet<MatrFlags>,
	pub unknown0: [u8; 4],
	pub unknown1: [u8; 48],
	pub texture_name: String,
	pub unknown2: [u8; 4],
	pub sfx: Option<Sfx>,
}

impl Material {
	pub fn new(raw_id: u32, flags: FlagSet<MatrFlags>, texture_name: &str) -> Material {
		Material {
			raw_id: raw_id,
			flags: flags,
			unknown0: [0; 4],
			unknown1: [0; 48],
			texture_name: texture_name.to_string(),
			unknown2: [0; 4],
			sfx: None,
		}
	}

	pub fn sfx_name(&self) -> Option<&str> {
		self.sfx.as_ref().map(|sfx| sfx.name.as_str())
	}

	#[cfg(feature = "import")]
	pub(crate) fn read<R>(buf: &mut R) -> Result<Material, BrgImportError>
	where
		R: ReadBytesExt + ?Sized,
	{
		let raw_id = buf.read_u32::<LE>()?;
		let flags = FlagSet::from_raw(buf.read_u32::<LE>()?);
		let unknown0 = buf.read_array()?;
		let name_length = buf.read_u32::<LE>()? as usize;
		let unknown1 = buf.read_array()?;
		let texture_name = buf.read_latin1(name_length)?;
		let unknown2 = buf.read_array()?;

		let sfx = if flags.has(MatrFlags::SFX) {
			let unknown = buf.read_array()?;
			let sfx_length = buf.read_u16::<LE>()? as usize;

			Some(Sfx {
				unknown: unknown,
				name: buf.read_latin1(sfx_length)?,
			})
		} else {
			None
		};

		Ok(Material {
			raw_id: raw_id,
			flags: flags,
			unknown0: unknown0,
			unknown1: unknown1,
			texture_name: texture_name,
			unknown2: unknown2,
			sfx: sfx,
		})
	}

	/// Returns the texture and sfx name lengths as written
	#[cfg(feature = "export")]
	pub(crate) fn validate(&self) -> Result<(u32, Option<u16>), BrgExportError> {
		if self.flags.has(MatrFlags::SFX) != self.sfx.is_some() {
			return Err(BrgExportError::Sfx(self.raw_id));
		}

		let name_length = latin1_len(&self.texture_name);
		let name_length = u32::try_from(name_length)
			.map_err(|_| BrgExportError::TooLong { what: "texture name", len: name_length })?;

		let sfx_length = match self.sfx {
			Some(ref sfx) => {
				let len = latin1_len(&sfx.name);
				Some(u16::try_from(len).map_err(|_| BrgExportError::TooLong { what: "sfx name", len: len })?)
			},
			None => None,
		};

		Ok((name_length, sfx_length))
	}

	#[cfg(feature = "export")]
	pub(crate) fn write<W>(&self, buf: &mut W) -> Result<(), BrgExportError>
	where
		W: WriteBytesExt + ?Sized,
	{
		let (name_length, sfx_length) = self.validate()?;

		buf.write_u32::<LE>(self.raw_id)?;
		buf.write_u32::<LE>(self.flags.raw())?;
		buf.write_all(&self.unknown0)?;
		buf.write_u32::<LE>(name_length)?;
		buf.write_all(&self.unknown1)?;
		buf.write_latin1(&self.texture_name)?;
		buf.write_all(&self.unknown2)?;

		if let (Some(sfx), Some(sfx_length)) = (self.sfx.as_ref(), sfx_length) {
			buf.write_all(&sfx.unknown)?;
			buf.write_u16::<LE>(sfx_length)?;
			buf.write_latin1(&sfx.name)?;
		}

		Ok(())
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use byteorder::{
		LE,
		WriteBytesExt
	};

	use crate::{
		brg::export::BrgExportError,
		flags::{
			FlagSet,
			MatrFlags
		}
	};

	use super::*;

	fn raw_material(flags: u32, name: &[u8], sfx: Option<&[u8]>) -> Vec<u8> {
		let mut raw = vec![];
		raw.write_u32::<LE>(7).unwrap();
		raw.write_u32::<LE>(flags).unwrap();
		raw.extend_from_slice(&[0xee; 4]);
		raw.write_u32::<LE>(name.len() as u32).unwrap();
		raw.extend_from_slice(&[0x11; 48]);
		raw.extend_from_slice(name);
		raw.extend_from_slice(&[0x22; 4]);
		if let Some(sfx) = sfx {
			raw.extend_from_slice(&[0x33; 2]);
			raw.write_u16::<LE>(sfx.len() as u16).unwrap();
			raw.extend_from_slice(sfx);
		}
		raw
	}

	#[test]
	fn test_plain() {
		let raw = raw_material(0x0000_0030, b"hoplite_t", None);
		let mat = Material::read(&mut raw.as_slice()).unwrap();
		assert_eq!(mat.raw_id, 7);
		assert_eq!(mat.texture_name, "hoplite_t");
		assert!(mat.flags.has(MatrFlags::MATTEXTURE));
		assert_eq!(mat.sfx, None);
		assert_eq!(mat.unknown1, [0x11; 48]);

		let mut out = vec![];
		mat.write(&mut out).unwrap();
		assert_eq!(out, raw);
	}

	#[test]
	fn test_sfx() {
		// Trailing bytes belong to the next section and must be left alone
		let mut raw = raw_material(0x1C20_0030, b"fire", Some(b"flame_sfx"));
		let len = raw.len();
		raw.extend_from_slice(b"MTRL");

		let mut input = raw.as_slice();
		let mat = Material::read(&mut input).unwrap();
		assert_eq!(mat.sfx_name(), Some("flame_sfx"));
		assert_eq!(mat.sfx.as_ref().unwrap().unknown, [0x33; 2]);
		assert!(mat.flags.has(MatrFlags::GLOW));
		assert_eq!(input, b"MTRL");

		let mut out = vec![];
		mat.write(&mut out).unwrap();
		assert_eq!(out, &raw[..len]);
	}

	#[test]
	fn test_sfx_mismatch() {
		let mut mat = Material::new(3, FlagSet::from_flags(MatrFlags::SFX), "t");
		assert!(matches!(mat.write(&mut vec![]), Err(BrgExportError::Sfx(3))));

		mat.flags = FlagSet::from_flags(MatrFlags::MATTEXTURE);
		mat.sfx = Some(Sfx::new("boom"));
		assert!(matches!(mat.write(&mut vec![]), Err(BrgExportError::Sfx(3))));
	}

	#[test]
	fn test_truncated_name() {
		let raw = raw_material(0, b"longname", None);
		assert!(matches!(Material::read(&mut &raw[..70]),
			Err(crate::brg::import::BrgImportError::TruncatedStream)));
	}

	#[test]
	fn test_huge_name_length() {
		let mut raw = raw_material(0, b"", None);
		raw[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
		assert!(matches!(Material::read(&mut raw.as_slice()),
			Err(crate::brg::import::BrgImportError::TruncatedStream)));
	}
}
