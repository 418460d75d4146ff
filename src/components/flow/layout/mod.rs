//! Layout adapter: hands sanitized nodes and edges to a layout engine and maps
//! the computed positions back onto copies of the nodes.

pub mod force;
pub mod layered;

use std::collections::HashMap;

use super::types::{FlowEdge, FlowNode, Position};
use crate::config::{LAYOUT_STRATEGY, LayoutConfig, LayoutStrategy};
use layered::LayeredEngine;

fn engine_input<'a>(nodes: &'a [FlowNode], edges: &'a [FlowEdge]) -> (Vec<&'a str>, Vec<(&'a str, &'a str)>) {
	(
		nodes.iter().map(|n| n.id.as_str()).collect(),
		edges
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect(),
	)
}

/// One output node per input node; ids the engine did not return land at the origin.
pub fn apply_positions(nodes: &[FlowNode], positions: &HashMap<String, Position>) -> Vec<FlowNode> {
	nodes
		.iter()
		.map(|node| FlowNode {
			position: positions.get(&node.id).copied().unwrap_or(Position::ORIGIN),
			..node.clone()
		})
		.collect()
}

pub async fn layered_layout(nodes: &[FlowNode], edges: &[FlowEdge], config: &LayoutConfig) -> Vec<FlowNode> {
	yield_now().await;
	let (ids, links) = engine_input(nodes, edges);
	let positions = LayeredEngine::from(config).layout(&ids, &links);
	apply_positions(nodes, &positions)
}

/// Blocks until every simulation step has run.
pub fn force_layout(nodes: &[FlowNode], edges: &[FlowEdge], config: &LayoutConfig) -> Vec<FlowNode> {
	let (ids, links) = engine_input(nodes, edges);
	let positions = force::simulate(&ids, &links, config);
	apply_positions(nodes, &positions)
}

/// Lay out with the strategy chosen at build time.
pub async fn apply_layout(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<FlowNode> {
	let config = LayoutConfig::default();
	match LAYOUT_STRATEGY {
		LayoutStrategy::Layered => layered_layout(nodes, edges, &config).await,
		LayoutStrategy::Force => force_layout(nodes, edges, &config),
	}
}

/// Give the event loop a turn before running the engine.
#[cfg(target_arch = "wasm32")]
async fn yield_now() {
	use wasm_bindgen::JsValue;
	use wasm_bindgen_futures::JsFuture;

	let _ = JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL)).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn yield_now() {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::types::EdgeStyle;

	fn node(id: &str) -> FlowNode {
		FlowNode {
			id: id.into(),
			label: id.into(),
			position: Position::ORIGIN,
		}
	}

	fn edge(source: &str, target: &str) -> FlowEdge {
		FlowEdge {
			id: format!("{}->{}", source, target),
			source: source.into(),
			target: target.into(),
			style: EdgeStyle::DEFAULT,
		}
	}

	#[test]
	fn missing_ids_default_to_origin() {
		let nodes = vec![node("A"), node("B")];
		let positions = HashMap::from([("A".to_string(), Position::new(5.0, 7.0))]);
		let placed = apply_positions(&nodes, &positions);

		assert_eq!(placed.len(), 2);
		assert_eq!(placed[0].position, Position::new(5.0, 7.0));
		assert_eq!(placed[1].position, Position::ORIGIN);
	}

	#[test]
	fn layered_layout_positions_every_node_without_touching_input() {
		let nodes = vec![node("A"), node("B"), node("C")];
		let edges = vec![edge("A", "B"), edge("A", "C")];
		let before = (nodes.clone(), edges.clone());

		let placed = pollster::block_on(layered_layout(&nodes, &edges, &LayoutConfig::default()));

		assert_eq!(placed.len(), 3);
		assert_eq!(placed.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(), ["A", "B", "C"]);
		assert!(placed[0].position.y < placed[1].position.y);
		assert_eq!((nodes, edges), before);
	}

	#[test]
	fn force_layout_positions_every_node() {
		let nodes = vec![node("A"), node("B"), node("C")];
		let edges = vec![edge("A", "B")];
		let placed = force_layout(&nodes, &edges, &LayoutConfig::default());

		assert_eq!(placed.len(), nodes.len());
		assert!(placed.iter().all(|n| n.position.x.is_finite()));
		assert!(nodes.iter().all(|n| n.position == Position::ORIGIN));
	}

	#[test]
	fn build_time_strategy_lays_out_every_node() {
		let nodes = vec![node("A"), node("B")];
		let placed = pollster::block_on(apply_layout(&nodes, &[edge("A", "B")]));
		assert_eq!(placed.len(), 2);
	}
}
