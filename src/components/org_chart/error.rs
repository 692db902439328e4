use thiserror::Error;

/// Errors surfaced by the org chart subsystem. All of these degrade to an
/// empty or unchanged view; none abort the host application.
#[derive(Error, Debug)]
pub enum ChartError {
	/// The drawing surface could not be acquired. Fatal to the open attempt.
	#[error("mount error: {message}")]
	Mount { message: String },

	/// The subtree fetch failed (network error or non-2xx status).
	#[error("subtree fetch failed: {message}")]
	Fetch { status: Option<u16>, message: String },

	/// The layout worker rejected its input.
	#[error("layout error: {message}")]
	Layout { message: String },
}

impl ChartError {
	pub fn mount(message: impl Into<String>) -> Self {
		Self::Mount { message: message.into() }
	}

	pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
		Self::Fetch { status, message: message.into() }
	}

	pub fn layout(message: impl Into<String>) -> Self {
		Self::Layout { message: message.into() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fetch_error_keeps_status() {
		let err = ChartError::fetch(Some(500), "server fell over");
		match err {
			ChartError::Fetch { status, .. } => assert_eq!(status, Some(500)),
			_ => panic!("expected fetch variant"),
		}
	}

	#[test]
	fn errors_display_their_category() {
		assert!(ChartError::mount("no 2d context").to_string().contains("mount error"));
		assert!(
			ChartError::layout("bad spacing")
				.to_string()
				.contains("layout error")
		);
	}
}
