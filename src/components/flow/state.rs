use log::{debug, warn};

use super::highlight::{Selection, restyle};
use super::types::{EdgeStyle, FlowEdge, FlowNode, Position};

/// Identifies one reload; only the newest ticket may commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReloadTicket(u64);

/// Everything the view shows. Mutated only through the methods below.
#[derive(Debug, Default)]
pub struct FlowState {
	pub nodes: Vec<FlowNode>,
	pub edges: Vec<FlowEdge>,
	pub selection: Selection,
	generation: u64,
}

impl FlowState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn begin_reload(&mut self) -> ReloadTicket {
		self.generation += 1;
		ReloadTicket(self.generation)
	}

	/// Replace the graph and reset the selection. Returns false, leaving state
	/// untouched, when a newer reload has started since `ticket` was issued.
	pub fn commit(&mut self, ticket: ReloadTicket, nodes: Vec<FlowNode>, mut edges: Vec<FlowEdge>) -> bool {
		if ticket.0 != self.generation {
			debug!(
				"Discarding stale reload {} (current is {})",
				ticket.0, self.generation
			);
			return false;
		}
		self.selection.clear();
		restyle(&mut edges, &self.selection);
		self.nodes = nodes;
		self.edges = edges;
		true
	}

	pub fn toggle_selection(&mut self, node_id: &str) {
		self.selection.toggle(node_id);
		restyle(&mut self.edges, &self.selection);
	}

	pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
		self.nodes.iter().find(|n| n.id == node_id)
	}

	pub fn move_node(&mut self, node_id: &str, position: Position) {
		if let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) {
			node.position = position;
		}
	}

	/// Append a user-drawn edge. Self-loops, unknown endpoints and duplicates are ignored.
	pub fn connect(&mut self, source: &str, target: &str) -> bool {
		if source == target || self.node(source).is_none() || self.node(target).is_none() {
			warn!("Ignoring connection {} -> {}", source, target);
			return false;
		}
		if self
			.edges
			.iter()
			.any(|e| e.source == source && e.target == target)
		{
			debug!("Connection {} -> {} already exists", source, target);
			return false;
		}
		let mut edge = FlowEdge {
			id: format!("xy-edge__{}-{}", source, target),
			source: source.to_string(),
			target: target.to_string(),
			style: EdgeStyle::DEFAULT,
		};
		edge.style = self.selection.style_for(&edge);
		self.edges.push(edge);
		true
	}
}
