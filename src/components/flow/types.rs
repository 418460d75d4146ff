use serde::Deserialize;

/// Graph payload as served by the endpoint, after the shape check.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
	pub nodes: Vec<RawNode>,
	pub edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	pub id: String,
	#[serde(default)]
	pub data: Option<RawNodeData>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawNodeData {
	#[serde(default)]
	pub label: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
	#[serde(default)]
	pub id: Option<String>,
	/// Absent or `null` endpoints are dangling; sanitize drops the edge.
	#[serde(default)]
	pub source: Option<String>,
	#[serde(default)]
	pub target: Option<String>,
}

/// Top-left corner of a node box, in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowNode {
	pub id: String,
	pub label: String,
	pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: &'static str,
	pub stroke_width: f64,
	pub animated: bool,
}

pub const DEFAULT_STROKE: &str = "#b1b1b7";
pub const EMPHASIS_STROKE: &str = "#ff0072";

impl EdgeStyle {
	pub const DEFAULT: EdgeStyle = EdgeStyle {
		stroke: DEFAULT_STROKE,
		stroke_width: 1.0,
		animated: true,
	};

	pub const EMPHASIZED: EdgeStyle = EdgeStyle {
		stroke: EMPHASIS_STROKE,
		stroke_width: 3.0,
		animated: true,
	};
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self::DEFAULT
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub style: EdgeStyle,
}

impl FlowEdge {
	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}
