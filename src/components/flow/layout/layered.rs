//! Top-down layered placement.
//!
//! Cycle breaking, longest-path layering, dummy nodes for long edges,
//! barycenter crossing reduction, then fixed-size coordinate assignment.
//! Only node positions come out; edges are drawn orthogonally by the renderer.

use std::collections::{HashMap, VecDeque};

use crate::components::flow::types::Position;
use crate::config::LayoutConfig;

const CROSSING_PASSES: usize = 6;
const DUMMY_WIDTH: f64 = 20.0;

#[derive(Clone, Debug)]
pub struct LayeredEngine {
	pub node_width: f64,
	pub node_height: f64,
	pub layer_spacing: f64,
	pub node_spacing: f64,
}

impl From<&LayoutConfig> for LayeredEngine {
	fn from(config: &LayoutConfig) -> Self {
		Self {
			node_width: config.node_width,
			node_height: config.node_height,
			layer_spacing: config.layer_spacing,
			node_spacing: config.node_spacing,
		}
	}
}

#[derive(Clone, Debug)]
struct WorkNode {
	layer: usize,
	order: usize,
	x: f64,
	width: f64,
}

#[derive(Clone, Copy, Debug)]
struct WorkEdge {
	from: usize,
	to: usize,
	reversed: bool,
}

impl LayeredEngine {
	/// Positions keyed by node id. Edges naming unknown ids are ignored.
	pub fn layout(&self, node_ids: &[&str], edges: &[(&str, &str)]) -> HashMap<String, Position> {
		let mut index = HashMap::new();
		let mut ids = Vec::new();
		for &id in node_ids {
			index.entry(id).or_insert_with(|| {
				ids.push(id);
				ids.len() - 1
			});
		}

		let mut nodes: Vec<WorkNode> = ids
			.iter()
			.map(|_| WorkNode {
				layer: 0,
				order: 0,
				x: 0.0,
				width: self.node_width,
			})
			.collect();

		let mut work_edges: Vec<WorkEdge> = edges
			.iter()
			.filter_map(|(s, t)| Some((*index.get(s)?, *index.get(t)?)))
			.filter(|(from, to)| from != to)
			.map(|(from, to)| WorkEdge {
				from,
				to,
				reversed: false,
			})
			.collect();

		make_acyclic(&mut work_edges, nodes.len());
		assign_layers(&mut nodes, &work_edges);
		let unit_edges = insert_dummy_nodes(&mut nodes, &work_edges);
		let mut layers = build_layers(&mut nodes);
		reduce_crossings(&mut nodes, &mut layers, &unit_edges);
		self.assign_coordinates(&mut nodes, &layers);

		let layer_step = self.node_height + self.layer_spacing;
		ids.iter()
			.enumerate()
			.map(|(idx, id)| {
				let node = &nodes[idx];
				(
					id.to_string(),
					Position::new(node.x, node.layer as f64 * layer_step),
				)
			})
			.collect()
	}

	fn assign_coordinates(&self, nodes: &mut [WorkNode], layers: &[Vec<usize>]) {
		let layer_width = |layer: &Vec<usize>| -> f64 {
			let boxes: f64 = layer.iter().map(|&idx| nodes[idx].width).sum();
			boxes + self.node_spacing * layer.len().saturating_sub(1) as f64
		};
		let widths: Vec<f64> = layers.iter().map(layer_width).collect();
		let widest = widths.iter().copied().fold(0.0, f64::max);

		for (layer, width) in layers.iter().zip(widths) {
			let mut x = (widest - width) / 2.0;
			for &idx in layer {
				nodes[idx].x = x;
				x += nodes[idx].width + self.node_spacing;
			}
		}
	}
}

fn make_acyclic(edges: &mut [WorkEdge], node_count: usize) {
	let mut adjacency = vec![Vec::new(); node_count];
	for (idx, edge) in edges.iter().enumerate() {
		adjacency[edge.from].push(idx);
	}

	// 0 = unvisited, 1 = on stack, 2 = done
	let mut state = vec![0u8; node_count];
	for start in 0..node_count {
		if state[start] != 0 {
			continue;
		}
		let mut stack = vec![(start, 0usize)];
		state[start] = 1;
		while let Some(top) = stack.last_mut() {
			let node = top.0;
			let Some(&edge_idx) = adjacency[node].get(top.1) else {
				state[node] = 2;
				stack.pop();
				continue;
			};
			top.1 += 1;
			let to = edges[edge_idx].to;
			match state[to] {
				0 => {
					state[to] = 1;
					stack.push((to, 0));
				}
				1 => edges[edge_idx].reversed = true,
				_ => {}
			}
		}
	}

	for edge in edges.iter_mut().filter(|e| e.reversed) {
		std::mem::swap(&mut edge.from, &mut edge.to);
	}
}

fn assign_layers(nodes: &mut [WorkNode], edges: &[WorkEdge]) {
	let mut indegree = vec![0usize; nodes.len()];
	let mut outgoing = vec![Vec::new(); nodes.len()];
	for edge in edges {
		outgoing[edge.from].push(edge.to);
		indegree[edge.to] += 1;
	}

	let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| indegree[i] == 0).collect();
	while let Some(node) = queue.pop_front() {
		let current = nodes[node].layer;
		for &next in &outgoing[node] {
			nodes[next].layer = nodes[next].layer.max(current + 1);
			indegree[next] -= 1;
			if indegree[next] == 0 {
				queue.push_back(next);
			}
		}
	}
}

/// Split edges spanning several layers into unit-length hops through dummy nodes.
fn insert_dummy_nodes(nodes: &mut Vec<WorkNode>, edges: &[WorkEdge]) -> Vec<(usize, usize)> {
	let mut unit_edges = Vec::new();
	for edge in edges {
		let (from_layer, to_layer) = (nodes[edge.from].layer, nodes[edge.to].layer);
		let mut prev = edge.from;
		for layer in (from_layer + 1)..to_layer {
			let dummy = nodes.len();
			nodes.push(WorkNode {
				layer,
				order: 0,
				x: 0.0,
				width: DUMMY_WIDTH,
			});
			unit_edges.push((prev, dummy));
			prev = dummy;
		}
		unit_edges.push((prev, edge.to));
	}
	unit_edges
}

fn build_layers(nodes: &mut [WorkNode]) -> Vec<Vec<usize>> {
	let max_layer = nodes.iter().map(|n| n.layer).max().unwrap_or(0);
	let mut layers = vec![Vec::new(); max_layer + 1];
	for (idx, node) in nodes.iter().enumerate() {
		layers[node.layer].push(idx);
	}
	for layer in &layers {
		for (order, &idx) in layer.iter().enumerate() {
			nodes[idx].order = order;
		}
	}
	layers
}

fn reduce_crossings(nodes: &mut [WorkNode], layers: &mut [Vec<usize>], unit_edges: &[(usize, usize)]) {
	let mut down = vec![Vec::new(); nodes.len()];
	let mut up = vec![Vec::new(); nodes.len()];
	for &(from, to) in unit_edges {
		down[from].push(to);
		up[to].push(from);
	}

	for pass in 0..CROSSING_PASSES {
		if pass % 2 == 0 {
			for layer in 1..layers.len() {
				reorder_layer(nodes, &mut layers[layer], &up);
			}
		} else {
			for layer in (0..layers.len().saturating_sub(1)).rev() {
				reorder_layer(nodes, &mut layers[layer], &down);
			}
		}
	}
}

fn reorder_layer(nodes: &mut [WorkNode], layer: &mut Vec<usize>, neighbors: &[Vec<usize>]) {
	let mut scored: Vec<(usize, f64)> = layer
		.iter()
		.map(|&idx| {
			let adjacent = &neighbors[idx];
			if adjacent.is_empty() {
				return (idx, nodes[idx].order as f64);
			}
			let sum: usize = adjacent.iter().map(|&n| nodes[n].order).sum();
			(idx, sum as f64 / adjacent.len() as f64)
		})
		.collect();

	scored.sort_by(|a, b| {
		a.1.total_cmp(&b.1)
			.then_with(|| nodes[a.0].order.cmp(&nodes[b.0].order))
	});

	*layer = scored.into_iter().map(|(idx, _)| idx).collect();
	for (order, &idx) in layer.iter().enumerate() {
		nodes[idx].order = order;
	}
}
