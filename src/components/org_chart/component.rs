use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::controller::{ChartConfig, OrgChartController};
use super::viewport::{ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// Treat a press/release pair as a click if the pointer travelled less than
/// this many pixels in between.
const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, Default)]
struct DragState {
	active: bool,
	last_x: f64,
	last_y: f64,
	travel: f64,
}

#[component]
pub fn OrgChart(
	/// Subtree data API endpoint, e.g. "/api/org/subtree".
	#[prop(into)] endpoint: String,
	#[prop(default = 4)] max_depth: u32,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	/// Invoked with a node id when a click resolves to a node.
	#[prop(into)] on_node_activated: Callback<String>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let loading = RwSignal::new(false);

	let mut config = ChartConfig::new(endpoint);
	config.max_depth = max_depth;
	let controller = Rc::new(OrgChartController::new(
		config,
		loading,
		Rc::new(move |id| on_node_activated.run(id)),
	));
	let drag: Rc<RefCell<DragState>> = Rc::new(RefCell::new(DragState::default()));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let controller_init = controller.clone();
	let resize_cb_init = resize_cb.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		if let Err(err) = controller_init.open(&canvas) {
			log::error!("org chart failed to open: {err}");
			return;
		}

		if fullscreen {
			let (controller_resize, canvas_resize) = (controller_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				controller_resize.resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	});

	let cleanup_state = SendWrapper::new((controller.clone(), resize_cb.clone()));
	on_cleanup(move || {
		let (controller_cleanup, resize_cb_cleanup) = cleanup_state.take();
		// Unregister before the closure drops so the browser never calls a
		// dead callback.
		if let Some(cb) = resize_cb_cleanup.borrow_mut().take() {
			if let Some(window) = web_sys::window() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		controller_cleanup.close();
	});

	let drag_md = drag.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let mut d = drag_md.borrow_mut();
		d.active = true;
		d.last_x = ev.client_x() as f64 - rect.left();
		d.last_y = ev.client_y() as f64 - rect.top();
		d.travel = 0.0;
	};

	let (drag_mm, controller_mm) = (drag.clone(), controller.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let mut d = drag_mm.borrow_mut();
		if d.active {
			let (dx, dy) = (x - d.last_x, y - d.last_y);
			controller_mm.pan(dx, dy);
			d.travel += dx.abs() + dy.abs();
			d.last_x = x;
			d.last_y = y;
		}
	};

	let (drag_mu, controller_mu) = (drag.clone(), controller.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let mut d = drag_mu.borrow_mut();
		if d.active && d.travel < CLICK_SLOP {
			controller_mu.handle_click(x, y);
		}
		d.active = false;
	};

	let drag_ml = drag.clone();
	let on_mouseleave = move |_: MouseEvent| {
		drag_ml.borrow_mut().active = false;
	};

	let controller_wh = controller.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let factor = if ev.delta_y() > 0.0 { ZOOM_OUT_FACTOR } else { ZOOM_IN_FACTOR };
		controller_wh.zoom_by(factor, Some((x, y)));
	};

	view! {
		<div class="org-chart" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="org-chart-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Show when=move || loading.get()>
				<div class="org-chart-loading">"Loading organization\u{2026}"</div>
			</Show>
		</div>
	}
}
