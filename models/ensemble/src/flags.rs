use bitflags::bitflags;

use std::{
	fmt::{
		Debug,
		Formatter,
		self
	},
	marker::PhantomData
};

bitflags! {
	/// Mesh property bits. Every value carries the `0x28` tag in its low byte.
	pub struct MeshFlags: u32 {
		const NONE1 = 0x8000_0028;
		const TRANSPCOLOR = 0x4000_0028;
		const NONE2 = 0x2000_0028;
		const NONE3 = 0x1000_0028;
		const MOVINGTEX = 0x0800_0028;
		const NOTFIRST = 0x0400_0028;
		const NONE4 = 0x0200_0028;
		const ATTACHPOINTS = 0x0100_0028;
		const NONE5 = 0x0080_0028;
		const MATERIALS = 0x0040_0028;
		const CHANGINGCOL = 0x0020_0028;
		const NONE7 = 0x0010_0028;
		const NONE8 = 0x0008_0028;
		const NONE9 = 0x0004_0028;
		const TEXTURE = 0x0002_0028;
		const VERTCOLOR = 0x0001_0028;
	}

	/// Material property bits
	pub struct MatrFlags: u32 {
		const SFX = 0x1C00_0000;
		const SOLIDCOLOR = 0x0200_0000;
		const MATNONE1 = 0x0080_0000;
		const GLOW = 0x0020_0000;
		const PLAYERCOLOR = 0x0004_0000;
		const MATTEXTURE = 0x0000_0030;
	}
}

/// A named bit pattern that can be tested against a [`FlagSet`]
pub trait Flag: Copy + Debug {
	fn pattern(self) -> u32;

	/// Keeps only the bits this flag type names
	fn truncate(raw: u32) -> Self;
}

impl Flag for MeshFlags {
	fn pattern(self) -> u32 {
		self.bits()
	}

	fn truncate(raw: u32) -> Self {
		MeshFlags::from_bits_truncate(raw)
	}
}

impl Flag for MatrFlags {
	fn pattern(self) -> u32 {
		self.bits()
	}

	fn truncate(raw: u32) -> Self {
		MatrFlags::from_bits_truncate(raw)
	}
}

/// An opaque 32-bit flag field as stored on disk.
///
/// Unknown bits are kept as-is; [`FlagSet::has`] is a plain "all bits present" test.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagSet<F> {
	raw: u32,
	kind: PhantomData<F>,
}

impl<F: Flag> FlagSet<F> {
	pub const fn from_raw(raw: u32) -> FlagSet<F> {
		FlagSet {
			raw: raw,
			kind: PhantomData,
		}
	}

	pub fn from_flags(flags: F) -> FlagSet<F> {
		FlagSet::from_raw(flags.pattern())
	}

	pub const fn raw(&self) -> u32 {
		self.raw
	}

	/// Returns true if every bit of `flag` is set
	pub fn has(&self, flag: F) -> bool {
		(self.raw & flag.pattern()) == flag.pattern()
	}

	/// Returns a copy with every bit of `flag` set
	pub fn with(self, flag: F) -> FlagSet<F> {
		FlagSet::from_raw(self.raw | flag.pattern())
	}
}

impl<F: Flag> Default for FlagSet<F> {
	fn default() -> Self {
		FlagSet::from_raw(0)
	}
}

impl<F: Flag> From<F> for FlagSet<F> {
	fn from(flags: F) -> Self {
		FlagSet::from_flags(flags)
	}
}

impl<F: Flag> Debug for FlagSet<F> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{:#010X} {:?}", self.raw, F::truncate(self.raw))
	}
}
