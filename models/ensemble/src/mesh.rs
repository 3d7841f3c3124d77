//! `MESI` sections: one mesh frame each.
//!
//! Frame 0 carries the topology. Every later frame is a shape-key pose and only supplies new
//! vertex data for the same vertices.

use byteorder::LE;

#[cfg(feature = "import")]
use byteorder::ReadBytesExt;

#[cfg(feature = "export")]
use byteorder::WriteBytesExt;

use std::num::NonZeroU32;

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use brgkit_core::color::Color;

#[cfg(feature = "import")]
use brgkit_core::io_ext::ReadBinExt;

use crate::{
	attach::AttachPointSet,
	flags::{
		FlagSet,
		MeshFlags
	},
	prim::Face
};

#[cfg(feature = "import")]
use crate::{
	brg::import::{
		BrgImportError,
		ImportCfg,
		ImportFlag
	},
	prim::ReadBrgExt
};

#[cfg(feature = "export")]
use crate::{
	brg::export::BrgExportError,
	prim::WriteBrgExt
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
	pub center: Vec3,
	pub height: f32,
	pub unknown: Vec3,
	/// Stored as the "positive" corner
	pub corner_max: Vec3,
	/// Stored as the "negative" corner
	pub corner_min: Vec3,
}

impl BoundingBox {
	pub fn zero() -> BoundingBox {
		BoundingBox {
			center: Vec3::zero(),
			height: 0.0,
			unknown: Vec3::zero(),
			corner_max: Vec3::zero(),
			corner_min: Vec3::zero(),
		}
	}
}

/// Data only the first frame carries
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
	pub uvs: Vec<Vec2>,
	/// Raw material ids, matched against [`crate::material::Material::raw_id`]
	pub face_material_ids: Vec<u16>,
	pub faces: Vec<Face>,
	/// Present when the frame has [`MeshFlags::MATERIALS`]; unused by any consumer
	pub vertex_material_ids: Option<Vec<u16>>,
}

/// Optional block signalled by a zero `check_space` sentinel
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpaceBlock {
	pub anim_time_mult: f32,
	pub num_materials_used: u32,
	/// Its length is written as `len_space`
	pub trailing: Vec<f32>,
}

/// The `check_space` sentinel. Zero on disk means the block follows.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckSpace {
	Present(SpaceBlock),
	Absent(NonZeroU32),
}

impl CheckSpace {
	pub fn block(&self) -> Option<&SpaceBlock> {
		match self {
			CheckSpace::Present(block) => Some(block),
			CheckSpace::Absent(_) => None,
		}
	}

	/// The value stored on disk
	pub fn sentinel(&self) -> u32 {
		match self {
			CheckSpace::Present(_) => 0,
			CheckSpace::Absent(v) => v.get(),
		}
	}
}

impl Default for CheckSpace {
	fn default() -> Self {
		CheckSpace::Absent(NonZeroU32::MIN)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	/// Position in the file, counting only mesh frames
	pub frame_id: u32,
	pub version: u16,
	pub format: u16,
	pub vertex_count: u16,
	pub face_count: u16,
	pub state: i32,
	pub bounds: BoundingBox,
	/// Raw and un-negated; the sign convention is up to the consumer
	pub origin_offset: Vec3,
	pub flags: FlagSet<MeshFlags>,
	pub positions: Vec<Vec3>,
	/// Read for cursor correctness, not otherwise used
	pub normals: Vec<Vec3>,
	pub topology: Option<Topology>,
	pub unknown: [u8; 24],
	pub check_space: CheckSpace,
	pub vertex_colors: Option<Vec<Color>>,
	pub attach_points: Option<AttachPointSet>,
}

/// Whether a frame with `flags` carries a vertex color block
pub fn has_vertex_colors(flags: &FlagSet<MeshFlags>) -> bool {
	((flags.has(MeshFlags::TRANSPCOLOR) || flags.has(MeshFlags::CHANGINGCOL))
		&& !flags.has(MeshFlags::NOTFIRST))
		|| flags.has(MeshFlags::VERTCOLOR)
}

impl Frame {
	/// Creates an empty frame. Frames other than 0 get [`MeshFlags::NOTFIRST`].
	pub fn new(frame_id: u32, flags: FlagSet<MeshFlags>) -> Frame {
		let flags = if frame_id > 0 { flags.with(MeshFlags::NOTFIRST) } else { flags };

		Frame {
			frame_id: frame_id,
			version: 0,
			format: 0,
			vertex_count: 0,
			face_count: 0,
			state: 0,
			bounds: BoundingBox::zero(),
			origin_offset: Vec3::zero(),
			flags: flags,
			positions: vec![],
			normals: vec![],
			topology: if frame_id == 0 { Some(Topology::default()) } else { None },
			unknown: [0; 24],
			check_space: CheckSpace::default(),
			vertex_colors: None,
			attach_points: None,
		}
	}

	pub fn is_first(&self) -> bool {
		!self.flags.has(MeshFlags::NOTFIRST)
	}

	pub fn trailing_floats(&self) -> Option<&[f32]> {
		self.check_space.block().map(|block| block.trailing.as_slice())
	}

	/// Reads one frame. `basis` is frame 0's vertex count, or `None` when reading frame 0.
	#[cfg(feature = "import")]
	pub(crate) fn read<R>(frame_id: u32, basis: Option<u16>, cfg: &ImportCfg, buf: &mut R)
		-> Result<Frame, BrgImportError>
	where
		R: ReadBytesExt + ?Sized,
	{
		let version = buf.read_u16::<LE>()?;
		let format = buf.read_u16::<LE>()?;
		let vertex_count = buf.read_u16::<LE>()?;
		let face_count = buf.read_u16::<LE>()?;

		if let Some(expected) = basis {
			if cfg.flags.contains(ImportFlag::CHECK_TOPOLOGY) && vertex_count != expected {
				return Err(BrgImportError::TopologyMismatch {
					frame: frame_id,
					expected: expected,
					found: vertex_count,
				});
			}
		}

		let state = buf.read_i32::<LE>()?;
		let center = buf.read_vec3_full()?;
		let height = buf.read_f32::<LE>()?;
		let unknown_vec = buf.read_vec3_full()?;
		let origin_offset = buf.read_vec3_full()?;

		let flags = FlagSet::<MeshFlags>::from_raw(buf.read_u32::<LE>()?);
		let first = !flags.has(MeshFlags::NOTFIRST);
		if first != (frame_id == 0) {
			return Err(BrgImportError::FrameOrder(frame_id));
		}

		let corner_max = buf.read_vec3_full()?;
		let corner_min = buf.read_vec3_full()?;

		let vcount = vertex_count as usize;
		let mut positions = Vec::with_capacity(vcount);
		for _ in 0..vcount {
			positions.push(buf.read_vec3_half()?);
		}

		let mut normals = Vec::with_capacity(vcount);
		for _ in 0..vcount {
			normals.push(buf.read_vec3_half()?);
		}

		let topology = if first {
			let mut uvs = Vec::with_capacity(vcount);
			for _ in 0..vcount {
				uvs.push(buf.read_vec2_half()?);
			}

			let mut face_material_ids = Vec::with_capacity(face_count as usize);
			for _ in 0..face_count {
				face_material_ids.push(buf.read_u16::<LE>()?);
			}

			let mut faces = Vec::with_capacity(face_count as usize);
			for i in 0..(face_count as usize) {
				let face = buf.read_face()?;
				if cfg.flags.contains(ImportFlag::CHECK_FACES) {
					if let Some(index) = face.iter().find(|v| **v >= vertex_count) {
						return Err(BrgImportError::FaceIndexOutOfRange {
							face: i,
							index: *index,
							vertex_count: vertex_count,
						});
					}
				}
				faces.push(face);
			}

			let vertex_material_ids = if flags.has(MeshFlags::MATERIALS) {
				let mut ids = Vec::with_capacity(vcount);
				for _ in 0..vcount {
					ids.push(buf.read_u16::<LE>()?);
				}
				Some(ids)
			} else {
				None
			};

			Some(Topology {
				uvs: uvs,
				face_material_ids: face_material_ids,
				faces: faces,
				vertex_material_ids: vertex_material_ids,
			})
		} else {
			None
		};

		let unknown = buf.read_array()?;

		// The trailing floats come after colors and attach points, so only their count is known here
		let (mut check_space, len_space) = match NonZeroU32::new(buf.read_u32::<LE>()?) {
			Some(v) => (CheckSpace::Absent(v), 0),
			None => {
				let anim_time_mult = buf.read_f32::<LE>()?;
				let len_space = buf.read_u32::<LE>()? as usize;
				let num_materials_used = buf.read_u32::<LE>()?;

				(CheckSpace::Present(SpaceBlock {
					anim_time_mult: anim_time_mult,
					num_materials_used: num_materials_used,
					trailing: vec![],
				}), len_space)
			},
		};

		let vertex_colors = if has_vertex_colors(&flags) {
			let mut colors = Vec::with_capacity(vcount);
			for _ in 0..vcount {
				colors.push(buf.read_color()?);
			}
			Some(colors)
		} else {
			None
		};

		let attach_points = if flags.has(MeshFlags::ATTACHPOINTS) {
			Some(AttachPointSet::read(cfg, buf)?)
		} else {
			None
		};

		if let CheckSpace::Present(ref mut block) = check_space {
			let mut trailing = vec![];
			for _ in 0..len_space {
				trailing.push(buf.read_f32::<LE>()?);
			}
			block.trailing = trailing;
		}

		Ok(Frame {
			frame_id: frame_id,
			version: version,
			format: format,
			vertex_count: vertex_count,
			face_count: face_count,
			state: state,
			bounds: BoundingBox {
				center: center,
				height: height,
				unknown: unknown_vec,
				corner_max: corner_max,
				corner_min: corner_min,
			},
			origin_offset: origin_offset,
			flags: flags,
			positions: positions,
			normals: normals,
			topology: topology,
			unknown: unknown,
			check_space: check_space,
			vertex_colors: vertex_colors,
			attach_points: attach_points,
		})
	}

	/// Checks that the frame's counts, flags and optional blocks agree with each other
	#[cfg(feature = "export")]
	pub(crate) fn validate(&self, index: u32, basis: Option<u16>) -> Result<(), BrgExportError> {
		let vcount = self.vertex_count as usize;
		let fcount = self.face_count as usize;

		if self.is_first() != (index == 0) {
			return Err(BrgExportError::FrameOrder(index));
		}

		if let Some(expected) = basis {
			if self.vertex_count != expected {
				return Err(BrgExportError::TopologyMismatch {
					frame: index,
					expected: expected,
					found: self.vertex_count,
				});
			}
		}

		expect_len("positions", vcount, self.positions.len())?;
		expect_len("normals", vcount, self.normals.len())?;

		match self.topology {
			Some(ref topo) if self.is_first() => {
				expect_len("uvs", vcount, topo.uvs.len())?;
				expect_len("face material ids", fcount, topo.face_material_ids.len())?;
				expect_len("faces", fcount, topo.faces.len())?;

				for (i, face) in topo.faces.iter().enumerate() {
					if let Some(v) = face.iter().find(|v| **v >= self.vertex_count) {
						return Err(BrgExportError::FaceIndexOutOfRange {
							face: i,
							index: *v,
							vertex_count: self.vertex_count,
						});
					}
				}

				match topo.vertex_material_ids {
					Some(ref ids) if self.flags.has(MeshFlags::MATERIALS) =>
						expect_len("vertex material ids", vcount, ids.len())?,
					None if !self.flags.has(MeshFlags::MATERIALS) => (),
					_ => return Err(BrgExportError::Optional { what: "vertex material ids", frame: index }),
				}
			},
			None if !self.is_first() => (),
			_ => return Err(BrgExportError::Optional { what: "topology", frame: index }),
		}

		match self.vertex_colors {
			Some(ref colors) if has_vertex_colors(&self.flags) =>
				expect_len("vertex colors", vcount, colors.len())?,
			None if !has_vertex_colors(&self.flags) => (),
			_ => return Err(BrgExportError::Optional { what: "vertex colors", frame: index }),
		}

		match self.attach_points {
			Some(ref points) if self.flags.has(MeshFlags::ATTACHPOINTS) => {
				points.validate()?;
			},
			None if !self.flags.has(MeshFlags::ATTACHPOINTS) => (),
			_ => return Err(BrgExportError::Optional { what: "attach points", frame: index }),
		}

		if let CheckSpace::Present(ref block) = self.check_space {
			if u32::try_from(block.trailing.len()).is_err() {
				return Err(BrgExportError::TooLong { what: "trailing floats", len: block.trailing.len() });
			}
		}

		Ok(())
	}

	/// Writes the frame found at `index`; see [`Frame::read`] for `basis`
	#[cfg(feature = "export")]
	pub(crate) fn write<W>(&self, index: u32, basis: Option<u16>, buf: &mut W) -> Result<(), BrgExportError>
	where
		W: WriteBytesExt + ?Sized,
	{
		self.validate(index, basis)?;

		buf.write_u16::<LE>(self.version)?;
		buf.write_u16::<LE>(self.format)?;
		buf.write_u16::<LE>(self.vertex_count)?;
		buf.write_u16::<LE>(self.face_count)?;
		buf.write_i32::<LE>(self.state)?;
		buf.write_vec3_full(self.bounds.center)?;
		buf.write_f32::<LE>(self.bounds.height)?;
		buf.write_vec3_full(self.bounds.unknown)?;
		buf.write_vec3_full(self.origin_offset)?;
		buf.write_u32::<LE>(self.flags.raw())?;
		buf.write_vec3_full(self.bounds.corner_max)?;
		buf.write_vec3_full(self.bounds.corner_min)?;

		for v in self.positions.iter() {
			buf.write_vec3_half(*v)?;
		}

		for n in self.normals.iter() {
			buf.write_vec3_half(*n)?;
		}

		if let Some(ref topo) = self.topology {
			for uv in topo.uvs.iter() {
				buf.write_vec2_half(*uv)?;
			}

			for id in topo.face_material_ids.iter() {
				buf.write_u16::<LE>(*id)?;
			}

			for face in topo.faces.iter() {
				buf.write_face(face)?;
			}

			if let Some(ref ids) = topo.vertex_material_ids {
				for id in ids.iter() {
					buf.write_u16::<LE>(*id)?;
				}
			}
		}

		buf.write_all(&self.unknown)?;
		buf.write_u32::<LE>(self.check_space.sentinel())?;

		if let CheckSpace::Present(ref block) = self.check_space {
			let len_space = u32::try_from(block.trailing.len())
				.map_err(|_| BrgExportError::TooLong { what: "trailing floats", len: block.trailing.len() })?;

			buf.write_f32::<LE>(block.anim_time_mult)?;
			buf.write_u32::<LE>(len_space)?;
			buf.write_u32::<LE>(block.num_materials_used)?;
		}

		if let Some(ref colors) = self.vertex_colors {
			for c in colors.iter() {
				buf.write_color(c)?;
			}
		}

		if let Some(ref points) = self.attach_points {
			points.write(buf)?;
		}

		if let CheckSpace::Present(ref block) = self.check_space {
			for f in block.trailing.iter() {
				buf.write_f32::<LE>(*f)?;
			}
		}

		Ok(())
	}
}

#[cfg(feature = "export")]
fn expect_len(what: &'static str, expected: usize, found: usize) -> Result<(), BrgExportError> {
	if expected != found {
		return Err(BrgExportError::CountMismatch {
			what: what,
			expected: expected,
			found: found,
		});
	}

	Ok(())
}
