//! The BRG container: a flat run of 4-byte tagged sections, read front to back.

use std::{
	collections::HashMap,
	io::{
		Read,
		Write
	}
};

use crate::{
	anim::Animation,
	header::Header,
	material::Material,
	mesh::Frame
};

pub const BANG: [u8; 4] = *b"BANG";
pub const ASET: [u8; 4] = *b"ASET";
pub const MESI: [u8; 4] = *b"MESI";
pub const MTRL: [u8; 4] = *b"MTRL";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SectionTag {
	Header,
	Animation,
	Mesh,
	Material,
}

impl SectionTag {
	pub fn from_tag(tag: &[u8; 4]) -> Option<SectionTag> {
		match tag {
			b"BANG" => Some(SectionTag::Header),
			b"ASET" => Some(SectionTag::Animation),
			b"MESI" => Some(SectionTag::Mesh),
			b"MTRL" => Some(SectionTag::Material),
			_ => None,
		}
	}

	pub fn tag(self) -> [u8; 4] {
		match self {
			SectionTag::Header => BANG,
			SectionTag::Animation => ASET,
			SectionTag::Mesh => MESI,
			SectionTag::Material => MTRL,
		}
	}
}

/// Reads and writes section tags on a byte stream
#[derive(Debug)]
pub struct Scanner<'a, T: ?Sized> {
	inner: &'a mut T,
}

impl<'a, T: ?Sized> Scanner<'a, T> {
	pub fn new(inner: &'a mut T) -> Scanner<'a, T> {
		Scanner {
			inner: inner,
		}
	}

	/// The underlying stream, positioned just after the last tag
	pub fn get_mut(&mut self) -> &mut T {
		self.inner
	}

	pub fn into_inner(self) -> &'a mut T {
		self.inner
	}
}

#[cfg(feature = "import")]
impl<'a, R: Read + ?Sized> Scanner<'a, R> {
	/// Reads the next tag. A clean end of stream yields `None`; a partial tag is an error.
	pub fn next_tag(&mut self) -> Result<Option<[u8; 4]>, import::BrgImportError> {
		let mut tag = [0; 4];
		let mut filled = 0;

		while filled < tag.len() {
			match self.inner.read(&mut tag[filled..]) {
				Ok(0) => break,
				Ok(n) => filled += n,
				Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}

		match filled {
			0 => Ok(None),
			4 => Ok(Some(tag)),
			_ => Err(import::BrgImportError::TruncatedStream),
		}
	}
}

#[cfg(feature = "export")]
impl<'a, W: Write + ?Sized> Scanner<'a, W> {
	pub fn write_tag(&mut self, tag: [u8; 4]) -> Result<(), export::BrgExportError> {
		self.inner.write_all(&tag)?;

		Ok(())
	}
}

/// A decoded BRG document
#[derive(Clone, Debug, PartialEq)]
pub struct BrgModel {
	pub header: Header,
	pub animation: Option<Animation>,
	/// Frame 0 holds the topology, later frames are shape keys
	pub frames: Vec<Frame>,
	/// In file order
	pub materials: Vec<Material>,
}

impl BrgModel {
	pub fn material_count(&self) -> u32 {
		self.header.material_count
	}

	pub fn shape_key_count(&self) -> u32 {
		self.header.shape_key_count
	}

	pub fn is_animated(&self) -> bool {
		self.header.is_animated()
	}

	/// Maps each material's raw id to its position in [`BrgModel::materials`].
	/// When ids repeat, the first material wins.
	pub fn material_map(&self) -> HashMap<u32, usize> {
		let mut map = HashMap::new();
		for (i, mat) in self.materials.iter().enumerate() {
			map.entry(mat.raw_id).or_insert(i);
		}

		map
	}

	/// Rewrites frame 0's per-face raw material ids into material indices.
	/// Fails with the first raw id that has no material.
	pub fn resolve_face_materials(&self) -> Result<Vec<usize>, u32> {
		let topo = match self.frames.first().and_then(|f| f.topology.as_ref()) {
			Some(topo) => topo,
			None => return Ok(vec![]),
		};
		let map = self.material_map();

		topo.face_material_ids.iter()
			.map(|id| map.get(&(*id as u32)).copied().ok_or(*id as u32))
			.collect()
	}

	#[cfg(feature = "import")]
	pub fn read<R, S>(buf: &mut R, cfg: &import::ImportCfg, sink: &mut S) -> Result<BrgModel, import::BrgImportError>
	where
		R: Read + ?Sized,
		S: crate::event::EventSink + ?Sized,
	{
		import::read(buf, cfg, sink)
	}

	#[cfg(feature = "export")]
	pub fn write<W, S>(&self, buf: &mut W, sink: &mut S) -> Result<(), export::BrgExportError>
	where
		W: Write + ?Sized,
		S: crate::event::EventSink + ?Sized,
	{
		export::write(self, buf, sink)
	}
}

#[cfg(feature = "import")]
pub mod import {
	use bitflags::bitflags;

	use std::io::{
		self,
		Read
	};

	use thiserror::Error;

	use brgkit_core::tag_str;

	use crate::event::{
		Event,
		EventSink
	};

	use super::*;

	bitflags! {
		pub struct ImportFlag: u32 {
			/// An unrecognized tag is an error instead of the end of the document
			const STRICT_TAGS = 1;
			const CHECK_TOPOLOGY = 2;
			const CHECK_FACES = 4;
			const CHECK_NAMES = 8;
			const RESOLVE_MATERIALS = 16;
		}
	}

	impl Default for ImportFlag {
		fn default() -> Self {
			ImportFlag::CHECK_TOPOLOGY | ImportFlag::CHECK_FACES | ImportFlag::CHECK_NAMES |
				ImportFlag::RESOLVE_MATERIALS
		}
	}

	#[derive(Clone, Debug, Default, PartialEq)]
	pub struct ImportCfg {
		pub flags: ImportFlag,
	}

	#[derive(Debug, Error)]
	pub enum BrgImportError {
		#[error("Negative attach point duplicate count: {0}")]
		DupliCount(i32),
		#[error("Face {face} references vertex {index}, but the mesh only has {vertex_count} vertices")]
		FaceIndexOutOfRange {
			face: usize,
			index: u16,
			vertex_count: u16,
		},
		#[error("Frame {0} is out of order: only frame 0 may define topology")]
		FrameOrder(u32),
		#[error("Unknown section tag: {}", tag_str(.0))]
		InvalidTag([u8; 4]),
		#[error("I/O error")]
		IO {
			source: io::Error,
		},
		#[error("Face material id {0} has no matching material")]
		MaterialIdUnresolved(u32),
		#[error("Attach point name code out of range: {0}/54")]
		NameTableOverflow(u8),
		#[error("Frame {frame} declares {found} vertices, but frame 0 has {expected}")]
		TopologyMismatch {
			frame: u32,
			expected: u16,
			found: u16,
		},
		#[error("Unexpected end of stream")]
		TruncatedStream,
	}

	impl From<io::Error> for BrgImportError {
		fn from(source: io::Error) -> Self {
			match source.kind() {
				io::ErrorKind::UnexpectedEof => BrgImportError::TruncatedStream,
				_ => BrgImportError::IO {
					source: source,
				},
			}
		}
	}

	/// Decodes one document. Scanning stops cleanly at the end of the stream or at the first
	/// unrecognized tag, unless [`ImportFlag::STRICT_TAGS`] is set.
	pub fn read<R, S>(buf: &mut R, cfg: &ImportCfg, sink: &mut S) -> Result<BrgModel, BrgImportError>
	where
		R: Read + ?Sized,
		S: EventSink + ?Sized,
	{
		let mut scanner = Scanner::new(buf);
		let mut header = None;
		let mut animation = None;
		let mut frames: Vec<Frame> = vec![];
		let mut materials = vec![];

		let end = loop {
			let tag = match scanner.next_tag()? {
				Some(tag) => tag,
				None => break None,
			};

			let section = match SectionTag::from_tag(&tag) {
				Some(section) => section,
				None if cfg.flags.contains(ImportFlag::STRICT_TAGS) => return Err(BrgImportError::InvalidTag(tag)),
				None => break Some(tag),
			};
			sink.event(&Event::Tag(tag));

			let buf = scanner.get_mut();
			match section {
				SectionTag::Header => {
					let h = Header::read(buf)?;
					sink.event(&Event::Header {
						material_count: h.material_count,
						shape_key_count: h.shape_key_count,
					});
					header = Some(h);
				},
				SectionTag::Animation => {
					let anim = Animation::read(buf)?;
					sink.event(&Event::Animation {
						frame_count: anim.frame_count,
						duration_seconds: anim.duration_seconds,
						fps: anim.fps,
					});
					animation = Some(anim);
				},
				SectionTag::Mesh => {
					let basis = frames.first().map(|f| f.vertex_count);
					let frame = Frame::read(frames.len() as u32, basis, cfg, buf)?;
					sink.event(&Event::frame(&frame));
					if let Some(event) = Event::attach_points(&frame) {
						sink.event(&event);
					}
					frames.push(frame);
				},
				SectionTag::Material => {
					let mat = Material::read(buf)?;
					sink.event(&Event::material(materials.len(), &mat));
					materials.push(mat);
				},
			}
		};
		sink.event(&Event::End(end));

		let model = BrgModel {
			header: header.unwrap_or_default(),
			animation: animation,
			frames: frames,
			materials: materials,
		};

		if cfg.flags.contains(ImportFlag::RESOLVE_MATERIALS) {
			model.resolve_face_materials().map_err(BrgImportError::MaterialIdUnresolved)?;
		}

		Ok(model)
	}
}

#[cfg(feature = "export")]
pub mod export {
	use std::io::{
		self,
		Write
	};

	use thiserror::Error;

	use crate::event::{
		Event,
		EventSink
	};

	use super::*;

	#[derive(Debug, Error)]
	pub enum BrgExportError {
		#[error("Wrong number of {what}: expected {expected}, found {found}")]
		CountMismatch {
			what: &'static str,
			expected: usize,
			found: usize,
		},
		#[error("Negative attach point duplicate count: {0}")]
		DupliCount(i32),
		#[error("Face {face} references vertex {index}, but the mesh only has {vertex_count} vertices")]
		FaceIndexOutOfRange {
			face: usize,
			index: u16,
			vertex_count: u16,
		},
		#[error("Frame {0} is out of order: only frame 0 may define topology")]
		FrameOrder(u32),
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("Attach point name code out of range: {0}/54")]
		NameTableOverflow(u8),
		#[error("Frame {frame}: {what} must be present exactly when the mesh flags call for them")]
		Optional {
			what: &'static str,
			frame: u32,
		},
		#[error("Material {0}: SFX flag and effect name disagree")]
		Sfx(u32),
		#[error("Frame {frame} declares {found} vertices, but frame 0 has {expected}")]
		TopologyMismatch {
			frame: u32,
			expected: u16,
			found: u16,
		},
		#[error("Too many {what} for the length field: {len}")]
		TooLong {
			what: &'static str,
			len: usize,
		},
	}

	fn expect_count(what: &'static str, expected: usize, found: u32) -> Result<(), BrgExportError> {
		if expected != found as usize {
			return Err(BrgExportError::CountMismatch {
				what: what,
				expected: expected,
				found: found as usize,
			});
		}

		Ok(())
	}

	/// Checks counts, frames and materials of the whole document without writing anything
	pub fn validate(model: &BrgModel) -> Result<(), BrgExportError> {
		expect_count("header materials", model.materials.len(), model.header.material_count)?;
		expect_count("header shape keys", model.frames.len(), model.header.shape_key_count)?;
		if let Some(ref anim) = model.animation {
			expect_count("animation frames", model.frames.len(), anim.frame_count)?;
		}

		let basis = model.frames.first().map(|f| f.vertex_count);
		for (i, frame) in model.frames.iter().enumerate() {
			frame.validate(i as u32, if i == 0 { None } else { basis })?;
		}

		for mat in model.materials.iter() {
			mat.validate()?;
		}

		Ok(())
	}

	/// Encodes a document in canonical section order: header, animation, frames, materials
	pub fn write<W, S>(model: &BrgModel, buf: &mut W, sink: &mut S) -> Result<(), BrgExportError>
	where
		W: Write + ?Sized,
		S: EventSink + ?Sized,
	{
		validate(model)?;

		let mut scanner = Scanner::new(buf);

		scanner.write_tag(BANG)?;
		model.header.write(scanner.get_mut())?;
		sink.event(&Event::Tag(BANG));
		sink.event(&Event::Header {
			material_count: model.header.material_count,
			shape_key_count: model.header.shape_key_count,
		});

		if let Some(ref anim) = model.animation {
			scanner.write_tag(ASET)?;
			anim.write(scanner.get_mut())?;
			sink.event(&Event::Tag(ASET));
			sink.event(&Event::Animation {
				frame_count: anim.frame_count,
				duration_seconds: anim.duration_seconds,
				fps: anim.fps,
			});
		}

		let basis = model.frames.first().map(|f| f.vertex_count);
		for (i, frame) in model.frames.iter().enumerate() {
			scanner.write_tag(MESI)?;
			frame.write(i as u32, if i == 0 { None } else { basis }, scanner.get_mut())?;
			sink.event(&Event::Tag(MESI));
			sink.event(&Event::frame(frame));
			if let Some(event) = Event::attach_points(frame) {
				sink.event(&event);
			}
		}

		for (i, mat) in model.materials.iter().enumerate() {
			scanner.write_tag(MTRL)?;
			mat.write(scanner.get_mut())?;
			sink.event(&Event::Tag(MTRL));
			sink.event(&Event::material(i, mat));
		}

		sink.event(&Event::End(None));

		Ok(())
	}
}
