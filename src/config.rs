//! Build-time configuration. Nothing here is read at runtime.

/// Endpoint serving the graph JSON. Override with `FLOW_MAPPER_ENDPOINT` at build time.
pub const GRAPH_ENDPOINT: &str = match option_env!("FLOW_MAPPER_ENDPOINT") {
	Some(url) => url,
	None => "https://api-oos.jojonomic.com/27407/rnd/system-mapper/get-flow",
};

/// Which layout strategy the build uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutStrategy {
	/// Top-down layered placement, computed asynchronously.
	Layered,
	/// Force-directed simulation, run synchronously for a fixed number of steps.
	Force,
}

/// Selected by the `force-layout` cargo feature.
pub const LAYOUT_STRATEGY: LayoutStrategy = if cfg!(feature = "force-layout") {
	LayoutStrategy::Force
} else {
	LayoutStrategy::Layered
};

/// Geometry and simulation constants shared by both layout strategies and the renderer.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	pub node_width: f64,
	pub node_height: f64,
	/// Vertical gap between consecutive layers.
	pub layer_spacing: f64,
	/// Horizontal gap between nodes of one layer.
	pub node_spacing: f64,
	/// Target edge length for the force strategy.
	pub link_distance: f64,
	pub simulation_steps: usize,
	pub simulation_dt: f32,
	pub force_charge: f32,
	pub node_mass: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
}

impl LayoutConfig {
	/// Spring constant at which charge and spring cancel for an isolated pair
	/// at `link_distance`: `0.5 * k * d = charge * m^2 / d^2`.
	pub fn force_spring(&self) -> f32 {
		let d = self.link_distance as f32;
		2.0 * self.force_charge * self.node_mass * self.node_mass / (d * d * d)
	}
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_width: 180.0,
			node_height: 60.0,
			layer_spacing: 80.0,
			node_spacing: 60.0,
			link_distance: 200.0,
			simulation_steps: 300,
			simulation_dt: 0.016,
			force_charge: 3000.0,
			node_mass: 10.0,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}
