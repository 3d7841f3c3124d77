use byteorder::LE;

#[cfg(feature = "import")]
use byteorder::ReadBytesExt;

#[cfg(feature = "export")]
use byteorder::WriteBytesExt;

#[cfg(feature = "import")]
use brgkit_core::io_ext::ReadBinExt;

#[cfg(feature = "import")]
use crate::brg::import::BrgImportError;

#[cfg(feature = "export")]
use crate::brg::export::BrgExportError;

/// File-level `BANG` section
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
	pub unknown0: [u8; 4],
	/// Number of materials, as declared by the file
	pub material_count: u32,
	pub unknown1: [u8; 4],
	pub shape_key_count: u32,
	pub unknown2: [u8; 8],
}

impl Header {
	pub fn new(material_count: u32, shape_key_count: u32) -> Header {
		Header {
			material_count: material_count,
			shape_key_count: shape_key_count,
			..Header::default()
		}
	}

	/// More than one shape key means the mesh frames form a vertex animation
	pub fn is_animated(&self) -> bool {
		self.shape_key_count > 1
	}

	#[cfg(feature = "import")]
	pub(crate) fn read<R>(buf: &mut R) -> Result<Header, BrgImportError>
	where
		R: ReadBytesExt + ?Sized,
	{
		Ok(Header {
			unknown0: buf.read_array()?,
			material_count: buf.read_u32::<LE>()?,
			unknown1: buf.read_array()?,
			shape_key_count: buf.read_u32::<LE>()?,
			unknown2: buf.read_array()?,
		})
	}

	#[cfg(feature = "export")]
	pub(crate) fn write<W>(&self, buf: &mut W) -> Result<(), BrgExportError>
	where
		W: WriteBytesExt + ?Sized,
	{
		buf.write_all(&self.unknown0)?;
		buf.write_u32::<LE>(self.material_count)?;
		buf.write_all(&self.unknown1)?;
		buf.write_u32::<LE>(self.shape_key_count)?;
		buf.write_all(&self.unknown2)?;

		Ok(())
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use super::Header;

	const RAW: [u8; 24] = [
		0xaa, 0xbb, 0xcc, 0xdd,
		3, 0, 0, 0,
		1, 2, 3, 4,
		12, 0, 0, 0,
		9, 9, 9, 9, 0, 0, 0, 7,
	];

	#[test]
	fn test_header() {
		let header = Header::read(&mut &RAW[..]).unwrap();
		assert_eq!(header.material_count, 3);
		assert_eq!(header.shape_key_count, 12);
		assert_eq!(header.unknown0, [0xaa, 0xbb, 0xcc, 0xdd]);
		assert!(header.is_animated());

		let mut out = vec![];
		header.write(&mut out).unwrap();
		assert_eq!(out, RAW);
	}

	#[test]
	fn test_truncated() {
		assert!(matches!(Header::read(&mut &RAW[..20]),
			Err(crate::brg::import::BrgImportError::TruncatedStream)));
	}

	#[test]
	fn test_static() {
		assert!(!Header::new(1, 1).is_animated());
		assert!(!Header::new(1, 0).is_animated());
	}
}
