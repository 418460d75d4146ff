use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use log::{error, info};

use super::error::FlowError;
use super::fetch::fetch_graph;
use super::layout::apply_layout;
use super::sanitize::sanitize;
use super::state::FlowState;
use super::types::{FlowEdge, FlowNode, RawGraph};

/// Sanitize, then lay out. Never runs layout on unsanitized data.
pub async fn prepare(raw: &RawGraph) -> (Vec<FlowNode>, Vec<FlowEdge>) {
	let (nodes, edges) = sanitize(raw);
	let nodes = apply_layout(&nodes, &edges).await;
	(nodes, edges)
}

/// Fetch → sanitize → layout → commit. Returns whether the result was committed.
///
/// Failures are logged and leave the current graph in place. No `RefCell`
/// borrow is held across an await point.
pub async fn run_reload<F, Fut>(state: &Rc<RefCell<FlowState>>, fetch: F) -> bool
where
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<RawGraph, FlowError>>,
{
	let ticket = state.borrow_mut().begin_reload();

	let raw = match fetch().await {
		Ok(raw) => raw,
		Err(err) => {
			error!("Error fetching graph data: {}", err);
			return false;
		}
	};

	let (nodes, edges) = prepare(&raw).await;
	let (node_count, edge_count) = (nodes.len(), edges.len());
	let committed = state.borrow_mut().commit(ticket, nodes, edges);
	if committed {
		info!("Loaded graph with {} nodes and {} edges", node_count, edge_count);
	}
	committed
}

pub async fn reload(state: &Rc<RefCell<FlowState>>, endpoint: &str) -> bool {
	run_reload(state, || fetch_graph(endpoint)).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::fetch::parse_graph;
	use crate::components::flow::types::EdgeStyle;

	fn shared() -> Rc<RefCell<FlowState>> {
		Rc::new(RefCell::new(FlowState::new()))
	}

	const GRAPH: &str = r#"{
		"nodes": [{"id": "A"}, {"id": "B", "data": {"label": "Bee"}}],
		"edges": [{"source": "A", "target": "B"}, {"source": "A", "target": "X"}]
	}"#;

	#[test]
	fn loads_sanitized_and_positioned_graph() {
		let state = shared();
		assert!(pollster::block_on(run_reload(&state, || async { parse_graph(GRAPH) })));

		let state = state.borrow();
		assert_eq!(state.nodes.len(), 2);
		assert_eq!(state.node("B").unwrap().label, "Bee");
		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.edges[0].id, "e-A-B-0");
		assert_eq!(state.edges[0].style, EdgeStyle::DEFAULT);
	}

	#[test]
	fn null_endpoint_drops_only_that_edge() {
		let state = shared();
		let committed = pollster::block_on(run_reload(&state, || async {
			parse_graph(
				r#"{
					"nodes": [{"id": "A"}, {"id": "B"}],
					"edges": [
						{"source": "A", "target": null},
						{"source": "A"},
						{"source": "A", "target": "B"}
					]
				}"#,
			)
		}));

		assert!(committed);
		let s = state.borrow();
		assert_eq!(s.nodes.len(), 2);
		assert_eq!(s.edges.len(), 1);
		assert_eq!(s.edges[0].id, "e-A-B-0");
	}

	#[test]
	fn missing_edges_leaves_graph_unchanged() {
		let state = shared();
		pollster::block_on(run_reload(&state, || async { parse_graph(GRAPH) }));
		state.borrow_mut().toggle_selection("A");
		let (nodes, edges) = {
			let s = state.borrow();
			(s.nodes.clone(), s.edges.clone())
		};

		let committed = pollster::block_on(run_reload(&state, || async {
			parse_graph(r#"{"nodes": [{"id": "Z"}]}"#)
		}));

		assert!(!committed);
		let s = state.borrow();
		assert_eq!(s.nodes, nodes);
		assert_eq!(s.edges, edges);
	}

	#[test]
	fn network_failure_on_first_load_shows_nothing() {
		let state = shared();
		let committed = pollster::block_on(run_reload(&state, || async {
			Err(FlowError::Network("offline".into()))
		}));
		assert!(!committed);
		assert!(state.borrow().nodes.is_empty());
	}

	#[test]
	fn reload_started_later_wins() {
		let state = shared();
		let newer = {
			let state = state.clone();
			move || async move {
				// A second reload begins while this one is still fetching.
				let inner = run_reload(&state, || async {
					parse_graph(r#"{"nodes": [{"id": "new"}], "edges": []}"#)
				});
				assert!(inner.await);
				parse_graph(r#"{"nodes": [{"id": "old"}], "edges": []}"#)
			}
		};

		let committed = pollster::block_on(run_reload(&state, newer));

		assert!(!committed);
		assert_eq!(state.borrow().nodes[0].id, "new");
	}
}
