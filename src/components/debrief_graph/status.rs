//! Step status taxonomy: names and node fill colors.

/// Fill for nodes that carry no status code at all.
pub const NO_STATUS_FILL: &str = "#efefef";

/// Human-readable name for a step status code. Codes outside the known
/// set mean the step has not run yet.
pub fn status_name(status: i32) -> &'static str {
	match status {
		0 => "success",
		1 => "failure",
		-2 => "discarded",
		-3 => "collected",
		-4 => "untrusted",
		-5 => "visibility",
		124 => "timeout",
		_ => "queued",
	}
}

/// Node circle fill for a step status code.
pub fn status_color(status: i32) -> &'static str {
	match status {
		0 => "#44AA99",
		1 => "#CC3311",
		-2 => "black",
		-3 => "#FFB000",
		-4 => "white",
		-5 => "#EE3377",
		124 => "cornflowerblue",
		_ => "#555555",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_names_match_taxonomy() {
		assert_eq!(status_name(0), "success");
		assert_eq!(status_name(1), "failure");
		assert_eq!(status_name(-2), "discarded");
		assert_eq!(status_name(124), "timeout");
		assert_eq!(status_name(-3), "collected");
		assert_eq!(status_name(-4), "untrusted");
		assert_eq!(status_name(-5), "visibility");
		assert_eq!(status_name(999), "queued");
	}

	#[test]
	fn every_known_status_has_a_distinct_color() {
		let colors: Vec<_> = [0, 1, -2, -3, -4, -5, 124, 2]
			.iter()
			.map(|&s| status_color(s))
			.collect();
		for (i, a) in colors.iter().enumerate() {
			for b in &colors[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}
}
