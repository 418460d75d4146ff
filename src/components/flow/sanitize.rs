//! Validation and normalization of fetched graph records.
//!
//! Optional fields fall back as follows:
//!
//! | field      | fallback                      |
//! |------------|-------------------------------|
//! | node label | node id                       |
//! | edge id    | `e-{source}-{target}-{index}` |

use std::collections::HashSet;

use log::debug;

use super::types::{EdgeStyle, FlowEdge, FlowNode, Position, RawEdge, RawGraph, RawNode};

fn present(value: Option<&str>) -> Option<&str> {
	value.filter(|s| !s.is_empty())
}

pub fn node_label(node: &RawNode) -> String {
	node.data
		.as_ref()
		.and_then(|d| present(d.label.as_deref()))
		.unwrap_or(&node.id)
		.to_string()
}

/// An edge whose endpoints both name known nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkedEdge<'a> {
	pub id: Option<&'a str>,
	pub source: &'a str,
	pub target: &'a str,
}

/// `index` is the edge's position among the edges that survived filtering.
pub fn edge_id(edge: &LinkedEdge<'_>, index: usize) -> String {
	match present(edge.id) {
		Some(id) => id.to_string(),
		None => format!("e-{}-{}-{}", edge.source, edge.target, index),
	}
}

/// Keep the edges whose endpoints are present and both exist, preserving input order.
pub fn valid_edges<'a>(nodes: &[RawNode], edges: &'a [RawEdge]) -> Vec<LinkedEdge<'a>> {
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	edges
		.iter()
		.filter_map(|e| {
			let source = e.source.as_deref().filter(|s| ids.contains(s))?;
			let target = e.target.as_deref().filter(|t| ids.contains(t))?;
			Some(LinkedEdge {
				id: e.id.as_deref(),
				source,
				target,
			})
		})
		.collect()
}

/// Turn a fetched graph into display records, dropping dangling edges.
pub fn sanitize(raw: &RawGraph) -> (Vec<FlowNode>, Vec<FlowEdge>) {
	let kept = valid_edges(&raw.nodes, &raw.edges);
	let dropped = raw.edges.len() - kept.len();
	if dropped > 0 {
		debug!("Dropped {} edge(s) with missing or unknown endpoints", dropped);
	}

	let nodes = raw
		.nodes
		.iter()
		.map(|node| FlowNode {
			id: node.id.clone(),
			label: node_label(node),
			position: Position::ORIGIN,
		})
		.collect();

	let edges = kept
		.iter()
		.enumerate()
		.map(|(index, edge)| FlowEdge {
			id: edge_id(edge, index),
			source: edge.source.to_string(),
			target: edge.target.to_string(),
			style: EdgeStyle::DEFAULT,
		})
		.collect();

	(nodes, edges)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;

	use super::*;
	use crate::components::flow::types::RawNodeData;

	fn node(id: &str) -> RawNode {
		RawNode {
			id: id.into(),
			data: None,
		}
	}

	fn edge(source: &str, target: &str) -> RawEdge {
		RawEdge {
			id: None,
			source: Some(source.into()),
			target: Some(target.into()),
		}
	}

	#[test]
	fn drops_edge_to_unknown_node() {
		let raw = RawGraph {
			nodes: vec![node("A"), node("B")],
			edges: vec![edge("A", "B"), edge("A", "X")],
		};
		let (nodes, edges) = sanitize(&raw);

		assert_eq!(nodes.len(), 2);
		assert_eq!(edges.len(), 1);
		assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("A", "B"));
		assert_eq!(edges[0].id, "e-A-B-0");
	}

	#[test]
	fn label_falls_back_to_id() {
		let labelled = RawNode {
			id: "n1".into(),
			data: Some(RawNodeData {
				label: Some("Billing".into()),
			}),
		};
		let empty = RawNode {
			id: "n2".into(),
			data: Some(RawNodeData {
				label: Some(String::new()),
			}),
		};
		assert_eq!(node_label(&labelled), "Billing");
		assert_eq!(node_label(&empty), "n2");
		assert_eq!(node_label(&node("n3")), "n3");
	}

	#[test]
	fn explicit_edge_id_is_kept() {
		let mut e = LinkedEdge {
			id: Some("link"),
			source: "A",
			target: "B",
		};
		assert_eq!(edge_id(&e, 4), "link");
		e.id = Some("");
		assert_eq!(edge_id(&e, 4), "e-A-B-4");
	}

	#[test]
	fn drops_edges_with_missing_endpoints() {
		let mut no_target = edge("A", "B");
		no_target.target = None;
		let mut no_source = edge("A", "B");
		no_source.source = None;
		let raw = RawGraph {
			nodes: vec![node("A"), node("B")],
			edges: vec![no_target, edge("B", "A"), no_source],
		};
		let (nodes, edges) = sanitize(&raw);

		assert_eq!(nodes.len(), 2);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].id, "e-B-A-0");
	}

	#[test]
	fn synthesized_ids_index_the_filtered_list() {
		let raw = RawGraph {
			nodes: vec![node("A"), node("B")],
			edges: vec![edge("A", "X"), edge("A", "B"), edge("A", "B")],
		};
		let (_, edges) = sanitize(&raw);
		let ids: Vec<_> = edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, ["e-A-B-0", "e-A-B-1"]);
	}

	fn arb_graph() -> impl Strategy<Value = RawGraph> {
		let ids = prop::collection::vec("[a-e]", 0..6);
		let endpoint = || prop::option::weighted(0.9, "[a-h]");
		let edges = prop::collection::vec((endpoint(), endpoint()), 0..12);
		(ids, edges).prop_map(|(ids, edges)| RawGraph {
			nodes: ids.iter().map(|id| node(id)).collect(),
			edges: edges
				.into_iter()
				.map(|(source, target)| RawEdge {
					id: None,
					source,
					target,
				})
				.collect(),
		})
	}

	proptest! {
		#[test]
		fn kept_edges_reference_known_nodes(raw in arb_graph()) {
			let (nodes, edges) = sanitize(&raw);
			let ids: HashSet<_> = nodes.iter().map(|n| n.id.as_str()).collect();
			for e in &edges {
				prop_assert!(ids.contains(e.source.as_str()));
				prop_assert!(ids.contains(e.target.as_str()));
			}
			let expected = raw
				.edges
				.iter()
				.filter(|e| {
					let known = |end: &Option<String>| end.as_deref().is_some_and(|id| ids.contains(id));
					known(&e.source) && known(&e.target)
				})
				.count();
			prop_assert_eq!(edges.len(), expected);
		}

		#[test]
		fn synthesized_ids_are_deterministic_and_unique(raw in arb_graph()) {
			let (_, first) = sanitize(&raw);
			let (_, second) = sanitize(&raw);
			prop_assert_eq!(&first, &second);
			let unique: HashSet<_> = first.iter().map(|e| e.id.as_str()).collect();
			prop_assert_eq!(unique.len(), first.len());
		}
	}
}
