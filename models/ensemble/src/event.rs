//! Section-level diagnostics handed to whoever drives the codec

use brgkit_core::tag_str;

use crate::{
	material::Material,
	mesh::Frame
};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
	Tag([u8; 4]),
	Header {
		material_count: u32,
		shape_key_count: u32,
	},
	Animation {
		frame_count: u32,
		duration_seconds: f32,
		fps: f32,
	},
	Frame {
		frame_id: u32,
		version: u16,
		format: u16,
		vertex_count: u16,
		face_count: u16,
		flags: u32,
	},
	AttachPoints {
		frame_id: u32,
		bone_count: usize,
		point_count: usize,
	},
	Material {
		index: usize,
		raw_id: u32,
		flags: u32,
		texture_name: String,
	},
	/// The scan finished, either at the end of the stream or at the given unrecognized tag
	End(Option<[u8; 4]>),
}

impl Event {
	pub fn frame(frame: &Frame) -> Event {
		Event::Frame {
			frame_id: frame.frame_id,
			version: frame.version,
			format: frame.format,
			vertex_count: frame.vertex_count,
			face_count: frame.face_count,
			flags: frame.flags.raw(),
		}
	}

	pub fn attach_points(frame: &Frame) -> Option<Event> {
		frame.attach_points.as_ref().map(|points| Event::AttachPoints {
			frame_id: frame.frame_id,
			bone_count: points.bone_count(),
			point_count: points.name_codes.len(),
		})
	}

	pub fn material(index: usize, material: &Material) -> Event {
		Event::Material {
			index: index,
			raw_id: material.raw_id,
			flags: material.flags.raw(),
			texture_name: material.texture_name.clone(),
		}
	}
}

pub trait EventSink {
	fn event(&mut self, event: &Event);
}

/// Forwards events to the `log` facade under the `brg` target
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
	fn event(&mut self, event: &Event) {
		match event {
			Event::Tag(tag) => log::trace!(target: "brg", "section {}", tag_str(tag)),
			Event::Header { material_count, shape_key_count } =>
				log::debug!(target: "brg", "materials: {}, shape keys: {}", material_count, shape_key_count),
			Event::Animation { frame_count, duration_seconds, fps } =>
				log::debug!(target: "brg", "frames: {}, time: {}, fps: {}", frame_count, duration_seconds, fps),
			Event::Frame { frame_id, version, format, vertex_count, face_count, flags } =>
				log::debug!(target: "brg", "frame {} (version {}, format {}): {} vertices, {} faces, flags {:#010X}",
					frame_id, version, format, vertex_count, face_count, flags),
			Event::AttachPoints { frame_id, bone_count, point_count } =>
				log::debug!(target: "brg", "frame {}: {} attach bones, {} named points",
					frame_id, bone_count, point_count),
			Event::Material { index, raw_id, flags, texture_name } =>
				log::debug!(target: "brg", "material {} with id {}: flags {:#010X}, texture {:?}",
					index, raw_id, flags, texture_name),
			Event::End(None) => log::trace!(target: "brg", "end of stream"),
			Event::End(Some(tag)) => log::debug!(target: "brg", "stopped at unknown section {}", tag_str(tag)),
		}
	}
}

/// Discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
	fn event(&mut self, _event: &Event) {}
}

impl EventSink for Vec<Event> {
	fn event(&mut self, event: &Event) {
		self.push(event.clone());
	}
}
