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

/// Optional `ASET` section holding vertex animation timing.
///
/// Turning these into playback frames is left to the consumer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
	pub frame_count: u32,
	pub unknown0: [u8; 4],
	pub duration_seconds: f32,
	pub unknown1: [u8; 4],
	pub seconds_per_frame: f32,
	pub fps: f32,
	pub unknown2: [u8; 4],
}

impl Animation {
	pub fn new(frame_count: u32, duration_seconds: f32, fps: f32) -> Animation {
		Animation {
			frame_count: frame_count,
			duration_seconds: duration_seconds,
			seconds_per_frame: if frame_count > 0 { duration_seconds / (frame_count as f32) } else { 0.0 },
			fps: fps,
			..Animation::default()
		}
	}

	#[cfg(feature = "import")]
	pub(crate) fn read<R>(buf: &mut R) -> Result<Animation, BrgImportError>
	where
		R: ReadBytesExt + ?Sized,
	{
		Ok(Animation {
			frame_count: buf.read_u32::<LE>()?,
			unknown0: buf.read_array()?,
			duration_seconds: buf.read_f32::<LE>()?,
			unknown1: buf.read_array()?,
			seconds_per_frame: buf.read_f32::<LE>()?,
			fps: buf.read_f32::<LE>()?,
			unknown2: buf.read_array()?,
		})
	}

	#[cfg(feature = "export")]
	pub(crate) fn write<W>(&self, buf: &mut W) -> Result<(), BrgExportError>
	where
		W: WriteBytesExt + ?Sized,
	{
		buf.write_u32::<LE>(self.frame_count)?;
		buf.write_all(&self.unknown0)?;
		buf.write_f32::<LE>(self.duration_seconds)?;
		buf.write_all(&self.unknown1)?;
		buf.write_f32::<LE>(self.seconds_per_frame)?;
		buf.write_f32::<LE>(self.fps)?;
		buf.write_all(&self.unknown2)?;

		Ok(())
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use byteorder::{
		LE,
		WriteBytesExt
	};

	use super::Animation;

	#[test]
	fn test_animation() {
		let mut raw = vec![];
		raw.write_u32::<LE>(20).unwrap();
		raw.extend_from_slice(&[1, 1, 1, 1]);
		raw.write_f32::<LE>(2.0).unwrap();
		raw.extend_from_slice(&[2, 2, 2, 2]);
		raw.write_f32::<LE>(0.1).unwrap();
		raw.write_f32::<LE>(30.0).unwrap();
		raw.extend_from_slice(&[3, 3, 3, 3]);

		let anim = Animation::read(&mut raw.as_slice()).unwrap();
		assert_eq!(anim.frame_count, 20);
		assert_eq!(anim.duration_seconds, 2.0);
		assert_eq!(anim.seconds_per_frame, 0.1);
		assert_eq!(anim.fps, 30.0);
		assert_eq!(anim.unknown1, [2, 2, 2, 2]);

		let mut out = vec![];
		anim.write(&mut out).unwrap();
		assert_eq!(out, raw);
	}

	#[test]
	fn test_new() {
		let anim = Animation::new(4, 2.0, 30.0);
		assert_eq!(anim.seconds_per_frame, 0.5);
		assert_eq!(Animation::new(0, 1.0, 30.0).seconds_per_frame, 0.0);
	}
}
