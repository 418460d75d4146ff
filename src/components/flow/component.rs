use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::canvas::CanvasState;
use super::pipeline;
use super::render;
use super::state::FlowState;

const FRAME_DT: f64 = 0.016;

fn viewport(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn selected_label(flow: &FlowState) -> Option<String> {
	let id = flow.selection.selected()?;
	flow.node(id).map(|n| n.label.clone())
}

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// The window callbacks a mounted view registers: the frame loop and the resize listener.
#[derive(Clone, Default)]
struct FrameLoop {
	animate: Callback,
	resize: Callback,
	frame: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
	fn request_frame(&self, window: &Window) {
		if let Some(cb) = self.animate.borrow().as_ref() {
			self.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	}

	/// Cancel the pending frame, detach the resize listener and drop both closures.
	fn stop(&self) {
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize.borrow().as_ref() {
				let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		// The animate closure holds a clone of this loop; dropping it breaks the cycle.
		self.animate.borrow_mut().take();
		self.resize.borrow_mut().take();
	}
}

/// Run the load pipeline and refit the view if the result was committed.
fn spawn_reload(
	flow: Rc<RefCell<FlowState>>,
	canvas: Rc<RefCell<CanvasState>>,
	endpoint: &'static str,
	selected: RwSignal<Option<String>>,
) {
	spawn_local(async move {
		if pipeline::reload(&flow, endpoint).await {
			canvas.borrow_mut().fit_view(&flow.borrow().nodes);
			selected.set(None);
		}
	});
}

/// Full-viewport flow diagram backed by `endpoint`.
#[component]
pub fn FlowView(endpoint: &'static str) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let flow = Rc::new(RefCell::new(FlowState::new()));
	let canvas_state = Rc::new(RefCell::new(CanvasState::new(0.0, 0.0)));
	let frame_loop = FrameLoop::default();
	let selected = RwSignal::new(None::<String>);

	let (flow_init, canvas_init, loop_init) = (flow.clone(), canvas_state.clone(), frame_loop.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("No window available");
			return;
		};
		let Some((w, h)) = viewport(&window) else {
			error!("Could not read viewport size");
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			error!("Canvas 2d context unavailable");
			return;
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		canvas_init.borrow_mut().resize(w, h);
		loop_init.stop();

		let (canvas_resize, state_resize) = (canvas.clone(), canvas_init.clone());
		*loop_init.resize.borrow_mut() = Some(Closure::new(move || {
			let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport) else {
				return;
			};
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *loop_init.resize.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (flow_anim, canvas_anim, loop_inner) =
			(flow_init.clone(), canvas_init.clone(), loop_init.clone());
		*loop_init.animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut c = canvas_anim.borrow_mut();
				c.tick(FRAME_DT);
				render::render(&flow_anim.borrow(), &c, &ctx);
			}
			if let Some(win) = web_sys::window() {
				loop_inner.request_frame(&win);
			}
		}));
		loop_init.request_frame(&window);

		spawn_reload(flow_init.clone(), canvas_init.clone(), endpoint, selected);
	});

	let teardown = StoredValue::new_local(frame_loop);
	on_cleanup(move || {
		teardown.try_with_value(FrameLoop::stop);
	});

	let (flow_md, canvas_md) = (flow.clone(), canvas_state.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		canvas_md.borrow_mut().pointer_down(&flow_md.borrow(), x, y);
	};

	let (flow_mm, canvas_mm) = (flow.clone(), canvas_state.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		canvas_mm.borrow_mut().pointer_move(&mut flow_mm.borrow_mut(), x, y);
	};

	let (flow_mu, canvas_mu) = (flow.clone(), canvas_state.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let mut flow = flow_mu.borrow_mut();
		canvas_mu.borrow_mut().pointer_up(&mut flow, x, y);
		selected.set(selected_label(&flow));
	};

	let canvas_ml = canvas_state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		canvas_ml.borrow_mut().pointer_leave();
	};

	let canvas_wh = canvas_state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		canvas_wh.borrow_mut().zoom_at(x, y, ev.delta_y());
	};

	let (flow_rl, canvas_rl) = (flow.clone(), canvas_state.clone());
	let on_reload = move |_| spawn_reload(flow_rl.clone(), canvas_rl.clone(), endpoint, selected);

	view! {
		<div class="flow-view">
			<canvas
				node_ref=canvas_ref
				class="flow-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="flow-panel">
				<button on:click=on_reload>"Reload Layout"</button>
				<Show when=move || selected.with(Option::is_some)>
					<p class="selection">"Selected: " {move || selected.get().unwrap_or_default()}</p>
				</Show>
			</div>
		</div>
	}
}
