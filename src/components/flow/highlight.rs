use super::types::{EdgeStyle, FlowEdge};

/// At most one selected node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(Option<String>);

impl Selection {
	pub fn selected(&self) -> Option<&str> {
		self.0.as_deref()
	}

	pub fn is_selected(&self, node_id: &str) -> bool {
		self.selected() == Some(node_id)
	}

	/// Clicking the selected node clears it; clicking any other node replaces it.
	pub fn toggle(&mut self, node_id: &str) {
		if self.is_selected(node_id) {
			self.0 = None;
		} else {
			self.0 = Some(node_id.to_string());
		}
	}

	pub fn clear(&mut self) {
		self.0 = None;
	}

	pub fn style_for(&self, edge: &FlowEdge) -> EdgeStyle {
		match self.selected() {
			Some(id) if edge.touches(id) => EdgeStyle::EMPHASIZED,
			_ => EdgeStyle::DEFAULT,
		}
	}
}

/// Recompute every edge's style against the selection.
pub fn restyle(edges: &mut [FlowEdge], selection: &Selection) {
	for edge in edges {
		edge.style = selection.style_for(edge);
	}
}
