use super::state::FlowState;
use super::types::{FlowNode, Position};
use crate::config::LayoutConfig;

pub const HANDLE_RADIUS: f64 = 4.0;
/// Grab radius around a source handle, in graph space.
const HANDLE_HIT_RADIUS: f64 = 8.0;
/// Screen pixels the pointer must travel before a press on a node becomes a drag.
const DRAG_THRESHOLD: f64 = 3.0;
const FIT_PADDING: f64 = 0.1;
const FIT_ZOOM: (f64, f64) = (0.5, 2.0);
const WHEEL_ZOOM: (f64, f64) = (0.1, 4.0);

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	/// Pressed on a node body; becomes a click or a drag.
	Press {
		node_id: String,
		start_x: f64,
		start_y: f64,
		node_start: Position,
	},
	DragNode {
		node_id: String,
		start_x: f64,
		start_y: f64,
		node_start: Position,
	},
	Pan {
		start_x: f64,
		start_y: f64,
		transform_start_x: f64,
		transform_start_y: f64,
	},
	/// Dragging a new edge out of `source`; `cursor` is in graph space.
	Connect { source: String, cursor: (f64, f64) },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
	SourceHandle(String),
	Node(String),
	Background,
}

/// View-side state: pan/zoom and the pointer gesture in progress.
pub struct CanvasState {
	pub transform: ViewTransform,
	pub gesture: Gesture,
	pub width: f64,
	pub height: f64,
	pub node_width: f64,
	pub node_height: f64,
	pub flow_time: f64,
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		let config = LayoutConfig::default();
		Self {
			transform: ViewTransform::default(),
			gesture: Gesture::Idle,
			width,
			height,
			node_width: config.node_width,
			node_height: config.node_height,
			flow_time: 0.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn source_handle(&self, node: &FlowNode) -> (f64, f64) {
		(
			node.position.x + self.node_width / 2.0,
			node.position.y + self.node_height,
		)
	}

	pub fn target_handle(&self, node: &FlowNode) -> (f64, f64) {
		(node.position.x + self.node_width / 2.0, node.position.y)
	}

	/// Later nodes are drawn on top, so they win.
	pub fn hit_test(&self, flow: &FlowState, sx: f64, sy: f64) -> Hit {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		for node in flow.nodes.iter().rev() {
			let (hx, hy) = self.source_handle(node);
			if (hx - gx).hypot(hy - gy) <= HANDLE_HIT_RADIUS {
				return Hit::SourceHandle(node.id.clone());
			}
			let Position { x, y } = node.position;
			if gx >= x && gx <= x + self.node_width && gy >= y && gy <= y + self.node_height {
				return Hit::Node(node.id.clone());
			}
		}
		Hit::Background
	}

	fn node_under(&self, flow: &FlowState, sx: f64, sy: f64) -> Option<String> {
		match self.hit_test(flow, sx, sy) {
			Hit::SourceHandle(id) | Hit::Node(id) => Some(id),
			Hit::Background => None,
		}
	}

	pub fn pointer_down(&mut self, flow: &FlowState, sx: f64, sy: f64) {
		self.gesture = match self.hit_test(flow, sx, sy) {
			Hit::SourceHandle(source) => Gesture::Connect {
				source,
				cursor: self.screen_to_graph(sx, sy),
			},
			Hit::Node(node_id) => {
				let node_start = flow
					.node(&node_id)
					.map(|n| n.position)
					.unwrap_or_default();
				Gesture::Press {
					node_id,
					start_x: sx,
					start_y: sy,
					node_start,
				}
			}
			Hit::Background => Gesture::Pan {
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			},
		};
	}

	pub fn pointer_move(&mut self, flow: &mut FlowState, sx: f64, sy: f64) {
		let k = self.transform.k;
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::Press {
				node_id,
				start_x,
				start_y,
				node_start,
			} => {
				if (sx - *start_x).hypot(sy - *start_y) > DRAG_THRESHOLD {
					self.gesture = Gesture::DragNode {
						node_id: std::mem::take(node_id),
						start_x: *start_x,
						start_y: *start_y,
						node_start: *node_start,
					};
					self.pointer_move(flow, sx, sy);
				}
			}
			Gesture::DragNode {
				node_id,
				start_x,
				start_y,
				node_start,
			} => {
				let position = Position::new(
					node_start.x + (sx - *start_x) / k,
					node_start.y + (sy - *start_y) / k,
				);
				flow.move_node(node_id, position);
			}
			Gesture::Pan {
				start_x,
				start_y,
				transform_start_x,
				transform_start_y,
			} => {
				self.transform.x = *transform_start_x + (sx - *start_x);
				self.transform.y = *transform_start_y + (sy - *start_y);
			}
			Gesture::Connect { cursor, .. } => {
				*cursor = (
					(sx - self.transform.x) / k,
					(sy - self.transform.y) / k,
				);
			}
		}
	}

	pub fn pointer_up(&mut self, flow: &mut FlowState, sx: f64, sy: f64) {
		match std::mem::take(&mut self.gesture) {
			Gesture::Press { node_id, .. } => flow.toggle_selection(&node_id),
			Gesture::Connect { source, .. } => match self.node_under(flow, sx, sy) {
				// Released on its own node: the handle was clicked.
				Some(target) if target == source => flow.toggle_selection(&source),
				Some(target) => {
					flow.connect(&source, &target);
				}
				None => {}
			},
			Gesture::Idle | Gesture::DragNode { .. } | Gesture::Pan { .. } => {}
		}
	}

	pub fn pointer_leave(&mut self) {
		self.gesture = Gesture::Idle;
	}

	/// Zoom around the cursor; `delta_y > 0` zooms out.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(WHEEL_ZOOM.0, WHEEL_ZOOM.1);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Center all nodes in the viewport with some padding.
	pub fn fit_view(&mut self, nodes: &[FlowNode]) {
		if nodes.is_empty() {
			self.transform = ViewTransform::default();
			return;
		}
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for node in nodes {
			min_x = min_x.min(node.position.x);
			min_y = min_y.min(node.position.y);
			max_x = max_x.max(node.position.x + self.node_width);
			max_y = max_y.max(node.position.y + self.node_height);
		}

		let pad = 1.0 + 2.0 * FIT_PADDING;
		let (bw, bh) = ((max_x - min_x) * pad, (max_y - min_y) * pad);
		let k = (self.width / bw)
			.min(self.height / bh)
			.clamp(FIT_ZOOM.0, FIT_ZOOM.1);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::types::{EdgeStyle, FlowEdge};

	fn flow() -> FlowState {
		let mut flow = FlowState::new();
		let ticket = flow.begin_reload();
		let nodes = [("A", 0.0, 0.0), ("B", 0.0, 140.0), ("C", 240.0, 140.0)]
			.into_iter()
			.map(|(id, x, y)| FlowNode {
				id: id.into(),
				label: id.into(),
				position: Position::new(x, y),
			})
			.collect();
		let edges = vec![FlowEdge {
			id: "e-A-B-0".into(),
			source: "A".into(),
			target: "B".into(),
			style: EdgeStyle::DEFAULT,
		}];
		flow.commit(ticket, nodes, edges);
		flow
	}

	#[test]
	fn hit_test_distinguishes_handle_body_and_background() {
		let canvas = CanvasState::new(800.0, 600.0);
		let flow = flow();

		assert_eq!(canvas.hit_test(&flow, 90.0, 60.0), Hit::SourceHandle("A".into()));
		assert_eq!(canvas.hit_test(&flow, 20.0, 20.0), Hit::Node("A".into()));
		assert_eq!(canvas.hit_test(&flow, 500.0, 20.0), Hit::Background);
	}

	#[test]
	fn click_toggles_selection() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let mut flow = flow();

		canvas.pointer_down(&flow, 20.0, 20.0);
		canvas.pointer_up(&mut flow, 21.0, 20.0);
		assert_eq!(flow.selection.selected(), Some("A"));
		assert_eq!(flow.edges[0].style, EdgeStyle::EMPHASIZED);

		canvas.pointer_down(&flow, 20.0, 20.0);
		canvas.pointer_up(&mut flow, 20.0, 20.0);
		assert_eq!(flow.selection.selected(), None);
		assert_eq!(flow.edges[0].style, EdgeStyle::DEFAULT);
	}

	#[test]
	fn drag_moves_node_without_selecting() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.transform.k = 2.0;
		let mut flow = flow();

		canvas.pointer_down(&flow, 20.0, 20.0);
		canvas.pointer_move(&mut flow, 60.0, 40.0);
		canvas.pointer_up(&mut flow, 60.0, 40.0);

		assert_eq!(flow.node("A").unwrap().position, Position::new(20.0, 10.0));
		assert_eq!(flow.selection.selected(), None);
	}

	#[test]
	fn dragging_from_handle_connects_nodes() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let mut flow = flow();

		canvas.pointer_down(&flow, 90.0, 60.0);
		canvas.pointer_move(&mut flow, 300.0, 170.0);
		assert_eq!(
			canvas.gesture,
			Gesture::Connect {
				source: "A".into(),
				cursor: (300.0, 170.0)
			}
		);
		canvas.pointer_up(&mut flow, 300.0, 170.0);

		assert_eq!(flow.edges.len(), 2);
		assert_eq!(flow.edges[1].id, "xy-edge__A-C");
	}

	#[test]
	fn clicking_a_handle_toggles_selection() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let mut flow = flow();

		canvas.pointer_down(&flow, 90.0, 60.0);
		canvas.pointer_up(&mut flow, 90.0, 60.0);
		assert_eq!(flow.selection.selected(), Some("A"));
		assert_eq!(flow.edges.len(), 1);
		assert_eq!(flow.edges[0].style, EdgeStyle::EMPHASIZED);

		canvas.pointer_down(&flow, 90.0, 60.0);
		canvas.pointer_up(&mut flow, 50.0, 30.0);
		assert_eq!(flow.selection.selected(), None);
		assert_eq!(flow.edges.len(), 1);
	}

	#[test]
	fn connect_released_on_background_adds_nothing() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let mut flow = flow();

		canvas.pointer_down(&flow, 90.0, 60.0);
		canvas.pointer_up(&mut flow, 700.0, 500.0);
		assert_eq!(flow.edges.len(), 1);
	}

	#[test]
	fn background_drag_pans() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let mut flow = flow();

		canvas.pointer_down(&flow, 600.0, 500.0);
		canvas.pointer_move(&mut flow, 650.0, 480.0);
		assert_eq!((canvas.transform.x, canvas.transform.y), (50.0, -20.0));
	}

	#[test]
	fn fit_view_centers_graph() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let flow = flow();
		canvas.fit_view(&flow.nodes);

		// Bounds are 420 x 200; width is the binding constraint.
		let k = 800.0 / (420.0 * 1.2);
		assert!((canvas.transform.k - k).abs() < 1e-9);
		assert!((canvas.transform.x - (400.0 - 210.0 * k)).abs() < 1e-9);
		assert!((canvas.transform.y - (300.0 - 100.0 * k)).abs() < 1e-9);
	}

	#[test]
	fn zoom_keeps_cursor_fixed() {
		let mut canvas = CanvasState::new(800.0, 600.0);
		let before = canvas.screen_to_graph(200.0, 100.0);
		canvas.zoom_at(200.0, 100.0, -1.0);
		let after = canvas.screen_to_graph(200.0, 100.0);

		assert!((canvas.transform.k - 1.1).abs() < 1e-9);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}
}
