/// Normalized RGBA color, each channel in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub red: f32,
	pub green: f32,
	pub blue: f32,
	pub alpha: f32,
}

impl Color {
	pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Color {
		Color {
			red: red,
			green: green,
			blue: blue,
			alpha: alpha,
		}
	}

	/// Builds a color from four bytes in `(r, g, b, a)` order
	pub fn from_rgba8888(bytes: [u8; 4]) -> Color {
		Color {
			red: (bytes[0] as f32) / 255.0,
			green: (bytes[1] as f32) / 255.0,
			blue: (bytes[2] as f32) / 255.0,
			alpha: (bytes[3] as f32) / 255.0,
		}
	}

	/// Returns the color as four bytes in `(r, g, b, a)` order.
	/// Channels are rounded to the nearest step and clamped.
	pub fn to_rgba8888(&self) -> [u8; 4] {
		[scale_to_u8(self.red), scale_to_u8(self.green), scale_to_u8(self.blue), scale_to_u8(self.alpha)]
	}

	/// Returns a textual hex representation in the form of `#rrggbb`
	pub fn hex_rgb(&self) -> String {
		let [r, g, b, _] = self.to_rgba8888();

		format!("#{:02x}{:02x}{:02x}", r, g, b)
	}
}

fn scale_to_u8(c: f32) -> u8 {
	(c * 255.0).round().clamp(0.0, 255.0) as u8
}
