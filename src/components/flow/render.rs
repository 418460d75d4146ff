use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::canvas::{CanvasState, Gesture, HANDLE_RADIUS};
use super::state::FlowState;
use super::types::{DEFAULT_STROKE, EMPHASIS_STROKE, FlowEdge, FlowNode};

const BACKGROUND: &str = "#F7F9FB";
const DOT_COLOR: &str = "#91919a";
const DOT_GAP: f64 = 20.0;
const NODE_FILL: &str = "#ffffff";
const NODE_BORDER: &str = "#1a192b";
const CORNER_RADIUS: f64 = 3.0;
const STEP_RADIUS: f64 = 5.0;
const DASH: f64 = 5.0;
/// Dash offset travel per second for animated edges.
const DASH_SPEED: f64 = 20.0;

pub fn render(flow: &FlowState, canvas: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, canvas.width, canvas.height);
	draw_dots(canvas, ctx);

	ctx.save();
	let _ = ctx.translate(canvas.transform.x, canvas.transform.y);
	let _ = ctx.scale(canvas.transform.k, canvas.transform.k);
	draw_edges(flow, canvas, ctx);
	draw_connection_line(flow, canvas, ctx);
	draw_nodes(flow, canvas, ctx);
	ctx.restore();
}

fn draw_dots(canvas: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let gap = DOT_GAP * canvas.transform.k;
	if gap < 4.0 {
		return;
	}
	let size = canvas.transform.k.max(0.5);
	let (ox, oy) = (
		canvas.transform.x.rem_euclid(gap),
		canvas.transform.y.rem_euclid(gap),
	);
	ctx.set_fill_style_str(DOT_COLOR);
	let mut x = ox;
	while x < canvas.width {
		let mut y = oy;
		while y < canvas.height {
			ctx.fill_rect(x - size / 2.0, y - size / 2.0, size, size);
			y += gap;
		}
		x += gap;
	}
}

/// Orthogonal path from a source handle down to a target handle, with rounded corners.
fn smooth_step(ctx: &CanvasRenderingContext2d, start: (f64, f64), end: (f64, f64)) {
	ctx.begin_path();
	ctx.move_to(start.0, start.1);
	if (start.0 - end.0).abs() < 0.5 {
		ctx.line_to(end.0, end.1);
		return;
	}
	let mid_y = (start.1 + end.1) / 2.0;
	let radius = STEP_RADIUS
		.min((end.0 - start.0).abs() / 2.0)
		.min((mid_y - start.1).abs());
	let _ = ctx.arc_to(start.0, mid_y, end.0, mid_y, radius);
	let _ = ctx.arc_to(end.0, mid_y, end.0, end.1, radius);
	ctx.line_to(end.0, end.1);
}

fn draw_edges(flow: &FlowState, canvas: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let by_id: HashMap<&str, &FlowNode> = flow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
	let dash_offset = -(canvas.flow_time * DASH_SPEED) % (DASH * 2.0);

	// Emphasized edges go last so they sit on top.
	let (plain, emphasized): (Vec<&FlowEdge>, Vec<&FlowEdge>) = flow
		.edges
		.iter()
		.partition(|e| e.style.stroke != EMPHASIS_STROKE);

	for edge in plain.into_iter().chain(emphasized) {
		let (Some(source), Some(target)) = (
			by_id.get(edge.source.as_str()),
			by_id.get(edge.target.as_str()),
		) else {
			continue;
		};

		ctx.set_stroke_style_str(edge.style.stroke);
		ctx.set_line_width(edge.style.stroke_width);
		if edge.style.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(DASH),
				&JsValue::from_f64(DASH),
			));
			ctx.set_line_dash_offset(dash_offset);
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		smooth_step(ctx, canvas.source_handle(source), canvas.target_handle(target));
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_connection_line(flow: &FlowState, canvas: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Gesture::Connect { source, cursor } = &canvas.gesture else {
		return;
	};
	let Some(node) = flow.node(source) else {
		return;
	};
	ctx.set_stroke_style_str(DEFAULT_STROKE);
	ctx.set_line_width(1.0);
	smooth_step(ctx, canvas.source_handle(node), *cursor);
	ctx.stroke();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_handle(ctx: &CanvasRenderingContext2d, (x, y): (f64, f64)) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, HANDLE_RADIUS, 0.0, std::f64::consts::TAU);
	ctx.set_fill_style_str(NODE_BORDER);
	ctx.fill();
	ctx.set_stroke_style_str(NODE_FILL);
	ctx.set_line_width(1.0);
	ctx.stroke();
}

fn draw_nodes(flow: &FlowState, canvas: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (canvas.node_width, canvas.node_height);
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in &flow.nodes {
		let (x, y) = (node.position.x, node.position.y);
		let selected = flow.selection.is_selected(&node.id);

		rounded_rect(ctx, x, y, w, h, CORNER_RADIUS);
		ctx.set_fill_style_str(NODE_FILL);
		ctx.fill();
		ctx.set_stroke_style_str(if selected { EMPHASIS_STROKE } else { NODE_BORDER });
		ctx.set_line_width(if selected { 2.0 } else { 1.0 });
		ctx.stroke();

		ctx.set_fill_style_str("#222222");
		let _ = ctx.fill_text_with_max_width(&node.label, x + w / 2.0, y + h / 2.0, w - 16.0);

		draw_handle(ctx, canvas.target_handle(node));
		draw_handle(ctx, canvas.source_handle(node));
	}
}
