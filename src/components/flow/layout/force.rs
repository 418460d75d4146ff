use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::components::flow::types::Position;
use crate::config::LayoutConfig;

const INITIAL_RADIUS: f64 = 10.0;

/// Spiral seeding used for particles without a position, so no two start on top of each other.
fn phyllotaxis(i: usize) -> (f32, f32) {
	let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
	let radius = INITIAL_RADIUS * (i as f64 + 0.5).sqrt();
	((radius * angle.cos()) as f32, (radius * angle.sin()) as f32)
}

/// Run the simulation to completion and read positions off the particles.
pub fn simulate(
	node_ids: &[&str],
	edges: &[(&str, &str)],
	config: &LayoutConfig,
) -> HashMap<String, Position> {
	let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
		force_charge: config.force_charge,
		force_spring: config.force_spring(),
		force_max: config.force_max,
		node_speed: config.node_speed,
		damping_factor: config.damping_factor,
	});

	let mut id_to_idx = HashMap::new();
	for (i, id) in node_ids.iter().enumerate() {
		let (x, y) = phyllotaxis(i);
		let idx = graph.add_node(NodeData {
			x,
			y,
			mass: config.node_mass,
			is_anchor: false,
			user_data: i,
		});
		id_to_idx.insert(*id, idx);
	}

	for (source, target) in edges {
		if let (Some(&src), Some(&tgt)) = (id_to_idx.get(source), id_to_idx.get(target)) {
			if src != tgt {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}
	}

	for _ in 0..config.simulation_steps {
		graph.update(config.simulation_dt);
		recenter(&mut graph);
	}

	let mut positions = HashMap::with_capacity(node_ids.len());
	graph.visit_nodes(|node| {
		let id = node_ids[node.data.user_data];
		positions.insert(
			id.to_string(),
			Position::new(node.x() as f64, node.y() as f64),
		);
	});
	positions
}

/// Centering force: shift every particle so the centroid sits at the origin.
fn recenter(graph: &mut ForceGraph<usize, ()>) {
	let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0usize);
	graph.visit_nodes(|node| {
		sx += node.x();
		sy += node.y();
		n += 1;
	});
	if n == 0 {
		return;
	}
	let (cx, cy) = (sx / n as f32, sy / n as f32);
	graph.visit_nodes_mut(|node| {
		node.data.x -= cx;
		node.data.y -= cy;
	});
}
