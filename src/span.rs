use std::fmt;

// char, line, col, length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiInSpan(pub usize, pub usize, pub usize, pub usize);

impl RsiInSpan {
	pub fn with_len(&self, len: usize) -> Self {
		RsiInSpan(self.0, self.1, self.2, len)
	}
}

impl fmt::Display for RsiInSpan {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.1, self.2)
	}
}

/// span covering everything from the start of `start` to the end of `end`
pub fn merge_span(start: RsiSpan, end: RsiSpan) -> RsiSpan {
	match start {
		Some(a) => match end {
			Some(b) => Some(a.with_len(b.3 + b.0 - a.0)),
			None => Some(a),
		},
		None => end,
	}
}

pub type RsiSpan = Option<RsiInSpan>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_covers_both() {
		let a = Some(RsiInSpan(2, 1, 3, 1));
		let b = Some(RsiInSpan(9, 1, 10, 1));
		assert_eq!(merge_span(a, b), Some(RsiInSpan(2, 1, 3, 8)));
		assert_eq!(merge_span(None, b), b);
		assert_eq!(merge_span(a, None), a);
	}
}
