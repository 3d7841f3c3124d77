#[cfg(feature = "io_ext")]
pub mod io_ext;

pub mod color;

/// Renders a 4-byte tag for display, replacing non-printable bytes with `.`
pub fn tag_str(tag: &[u8; 4]) -> String {
	tag.iter().map(|b| if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' }).collect()
}

#[cfg(test)]
mod tests {
	#[test]
	fn test_tag_str() {
		assert_eq!(super::tag_str(b"MESI"), "MESI");
		assert_eq!(super::tag_str(&[b'M', 0, b'T', 0xff]), "M.T.");
	}
}
