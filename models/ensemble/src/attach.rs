//! Attachment point data nested inside a mesh frame.
//!
//! Which bone each name code belongs to is not known, so the codes are kept as read, in order,
//! next to the duplicate-count groups that produced them.

use byteorder::LE;

#[cfg(feature = "import")]
use byteorder::ReadBytesExt;

#[cfg(feature = "export")]
use byteorder::WriteBytesExt;

use ultraviolet::{
	mat::{
		Mat3,
		Mat4
	},
	vec::{
		Vec3,
		Vec4
	}
};

#[cfg(feature = "import")]
use brgkit_core::io_ext::ReadBinExt;

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

/// Semantic attachment point names, indexed by the per-point byte code
pub const NODE_NAMES: [&str; 54] = [
	"TARGETPOINT", "LEFTFOREARM", "RIGHTFOREARM", "FOREARM", "LEFTFOOT", "RIGHTFOOT",
	"FOOT", "LEFTTHIGH", "RIGHTTHIGH", "THIGH", "LEFTLEG", "RIGHTLEG",
	"LEG", "LEFTHAND", "RIGHTHAND", "HAND", "LEFTCLAVICLE", "RIGHTCLAVICLE",
	"CLAVICLE", "LEFTEAR", "RIGHTEAR", "EAR", "BACKCHEST", "FRONTCHEST",
	"CHEST", "BACKABDOMEN", "FRONTABDOMEN", "ABDOMEN", "BACKHEAD", "FRONTHEAD",
	"TOPOFHEAD", "FACE", "HEAD", "NECK", "PELVIS", "HITPOINTBAR",
	"CORPSE", "GARRISONFLAG", "FIRE", "SMOKE0", "SMOKE1", "SMOKE2",
	"SMOKE3", "SMOKE4", "SMOKE5", "SMOKE6", "SMOKE7", "SMOKE8",
	"SMOKE9", "LAUNCHPOINT", "DECAL", "GATHERPOINT", "ATTACHPOINT", "REARFOOT",
];

/// Looks up the name for an attachment point byte code
pub fn node_name(code: u8) -> Option<&'static str> {
	NODE_NAMES.get(code as usize).copied()
}

/// One bone's transform for a single frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonePose {
	/// Columns are the x, y and z passes as stored
	pub rotation: Mat3,
	pub translation: Vec3,
}

impl BonePose {
	/// Builds the 4x4 pose matrix. The passes are taken as rows in z, y, x order and transposed,
	/// so the rotation columns are z, y, x.
	pub fn matrix(&self) -> Mat4 {
		let [x, y, z] = self.rotation.cols;
		let t = self.translation;

		Mat4::new(
			Vec4::new(z.x, z.y, z.z, 0.0),
			Vec4::new(y.x, y.y, y.z, 0.0),
			Vec4::new(x.x, x.y, x.z, 0.0),
			Vec4::new(t.x, t.y, t.z, 1.0),
		)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointGroup {
	pub dupli_count: i32,
	pub unknown: [u8; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttachPointSet {
	pub unknown0: [u8; 2],
	pub bones: Vec<BonePose>,
	/// Two per bone, meaning unknown
	pub unknown: Vec<Vec3>,
	pub groups: Vec<PointGroup>,
	/// Indices into [`NODE_NAMES`], one per attachment point
	pub name_codes: Vec<u8>,
}

impl AttachPointSet {
	pub fn bone_count(&self) -> usize {
		self.bones.len()
	}

	pub fn index_count(&self) -> usize {
		self.groups.len()
	}

	/// Sum of every group's duplicate count, or `None` if any count is negative
	pub fn total_points(&self) -> Option<usize> {
		total_points(&self.groups).ok()
	}

	/// Yields `(point_index, name_code)` pairs
	pub fn names(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
		self.name_codes.iter().copied().enumerate()
	}

	#[cfg(feature = "import")]
	pub(crate) fn read<R>(cfg: &ImportCfg, buf: &mut R) -> Result<AttachPointSet, BrgImportError>
	where
		R: ReadBytesExt + ?Sized,
	{
		let bone_count = buf.read_u16::<LE>()? as usize;
		let index_count = buf.read_u16::<LE>()? as usize;
		let unknown0 = buf.read_array()?;

		// Each rotation column is stored for every bone before the next column starts
		let mut columns = [vec![], vec![], vec![]];
		for column in columns.iter_mut() {
			for _ in 0..bone_count {
				column.push(buf.read_vec3_half_unswapped()?);
			}
		}

		let mut bones = Vec::with_capacity(bone_count);
		for i in 0..bone_count {
			bones.push(BonePose {
				rotation: Mat3::new(columns[0][i], columns[1][i], columns[2][i]),
				translation: buf.read_vec3_half_unswapped()?,
			});
		}

		let mut unknown = Vec::with_capacity(bone_count * 2);
		for _ in 0..(bone_count * 2) {
			unknown.push(buf.read_vec3_half_unswapped()?);
		}

		let mut groups = Vec::with_capacity(index_count);
		for _ in 0..index_count {
			groups.push(PointGroup {
				dupli_count: buf.read_i32::<LE>()?,
				unknown: buf.read_array()?,
			});
		}

		let num_points = total_points(&groups).map_err(BrgImportError::DupliCount)?;
		let name_codes = buf.read_bytes(num_points)?;

		if cfg.flags.contains(ImportFlag::CHECK_NAMES) {
			if let Some(code) = name_codes.iter().find(|c| **c as usize >= NODE_NAMES.len()) {
				return Err(BrgImportError::NameTableOverflow(*code));
			}
		}

		Ok(AttachPointSet {
			unknown0: unknown0,
			bones: bones,
			unknown: unknown,
			groups: groups,
			name_codes: name_codes,
		})
	}

	/// Checks lengths, duplicate counts and name codes without writing anything
	#[cfg(feature = "export")]
	pub(crate) fn validate(&self) -> Result<(u16, u16), BrgExportError> {
		let bone_count = u16::try_from(self.bones.len())
			.map_err(|_| BrgExportError::TooLong { what: "attach point bones", len: self.bones.len() })?;
		let index_count = u16::try_from(self.groups.len())
			.map_err(|_| BrgExportError::TooLong { what: "attach point groups", len: self.groups.len() })?;

		if self.unknown.len() != self.bones.len() * 2 {
			return Err(BrgExportError::CountMismatch {
				what: "attach point unknown vectors",
				expected: self.bones.len() * 2,
				found: self.unknown.len(),
			});
		}

		let num_points = total_points(&self.groups).map_err(BrgExportError::DupliCount)?;
		if num_points != self.name_codes.len() {
			return Err(BrgExportError::CountMismatch {
				what: "attach point names",
				expected: num_points,
				found: self.name_codes.len(),
			});
		}

		if let Some(code) = self.name_codes.iter().find(|c| **c as usize >= NODE_NAMES.len()) {
			return Err(BrgExportError::NameTableOverflow(*code));
		}

		Ok((bone_count, index_count))
	}

	#[cfg(feature = "export")]
	pub(crate) fn write<W>(&self, buf: &mut W) -> Result<(), BrgExportError>
	where
		W: WriteBytesExt + ?Sized,
	{
		let (bone_count, index_count) = self.validate()?;

		buf.write_u16::<LE>(bone_count)?;
		buf.write_u16::<LE>(index_count)?;
		buf.write_all(&self.unknown0)?;

		for column in 0..3 {
			for bone in self.bones.iter() {
				buf.write_vec3_half_unswapped(bone.rotation.cols[column])?;
			}
		}

		for bone in self.bones.iter() {
			buf.write_vec3_half_unswapped(bone.translation)?;
		}

		for v in self.unknown.iter() {
			buf.write_vec3_half_unswapped(*v)?;
		}

		for group in self.groups.iter() {
			buf.write_i32::<LE>(group.dupli_count)?;
			buf.write_all(&group.unknown)?;
		}

		buf.write_all(&self.name_codes)?;

		Ok(())
	}
}

/// Sums duplicate counts, failing on the first negative one
fn total_points(groups: &[PointGroup]) -> Result<usize, i32> {
	let mut total = 0usize;
	for group in groups.iter() {
		if group.dupli_count < 0 {
			return Err(group.dupli_count);
		}
		total += group.dupli_count as usize;
	}

	Ok(total)
}
