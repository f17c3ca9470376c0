/// Fixed-width sliding window of characters used as a chain lookup key.
///
/// The window always holds exactly `order` characters. It starts filled with
/// `'\0'` and every `shift` drops the oldest character and appends the newest,
/// so the key produced before `order` shifts still carries the padding.
///
/// # Invariants
/// - `chars.len() == order` at all times
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
	chars: Vec<char>,
}

impl Prefix {
	/// Padding character of a window that has not been fully shifted in.
	pub const PADDING: char = '\0';

	/// Creates a window of `order` padding characters.
	pub fn new(order: usize) -> Self {
		Self { chars: vec![Self::PADDING; order] }
	}

	/// Drops the oldest character and appends `c`, in place.
	pub fn shift(&mut self, c: char) {
		if self.chars.is_empty() {
			return;
		}
		self.chars.rotate_left(1);
		// Should not panic, the window is never empty here
		if let Some(last) = self.chars.last_mut() {
			*last = c;
		}
	}

	/// Returns the window content as a lookup key.
	pub fn as_key(&self) -> String {
		self.chars.iter().collect()
	}

	/// Width of the window.
	pub fn order(&self) -> usize {
		self.chars.len()
	}
}
