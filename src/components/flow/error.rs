use thiserror::Error;

/// Failures that abort a load. None of them are fatal; the last good graph stays on screen.
#[derive(Debug, Error)]
pub enum FlowError {
	#[error("invalid API response: missing `{missing}`")]
	InvalidResponse { missing: &'static str },

	#[error("network error: {0}")]
	Network(String),

	#[error("HTTP {0}")]
	Http(u16),

	#[error("failed to parse graph data: {0}")]
	Parse(String),
}

impl From<serde_json::Error> for FlowError {
	fn from(err: serde_json::Error) -> Self {
		FlowError::Parse(err.to_string())
	}
}
