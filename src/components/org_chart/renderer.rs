//! Binds the drawing surface and runs the continuous redraw loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::error::ChartError;
use super::render::{self, LodThresholds};
use super::types::{LayoutEdge, PositionedNode};
use super::viewport::Viewport;

/// Everything a frame needs. The nodes/edges snapshot is immutable once set;
/// `set_layout` replaces it wholesale. The viewport is mutated only by the
/// pointer handlers between frames.
pub struct RenderState {
	pub nodes: Vec<PositionedNode>,
	pub edges: Vec<LayoutEdge>,
	pub viewport: Viewport,
	pub thresholds: LodThresholds,
	pub width: f64,
	pub height: f64,
}

/// Owns the 2d context and redraws every animation frame until `destroy()`.
pub struct LodRenderer {
	ctx: CanvasRenderingContext2d,
	state: Rc<RefCell<RenderState>>,
	running: Rc<Cell<bool>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	raf_id: Rc<Cell<Option<i32>>>,
}

impl LodRenderer {
	pub fn new(canvas: &HtmlCanvasElement, thresholds: LodThresholds) -> Result<Self, ChartError> {
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.map_err(|e| ChartError::mount(format!("get_context failed: {e:?}")))?
			.ok_or_else(|| ChartError::mount("canvas has no 2d context"))?
			.dyn_into()
			.map_err(|_| ChartError::mount("2d context has unexpected type"))?;

		let state = RenderState {
			nodes: Vec::new(),
			edges: Vec::new(),
			viewport: Viewport::default(),
			thresholds,
			width: canvas.width() as f64,
			height: canvas.height() as f64,
		};

		Ok(Self {
			ctx,
			state: Rc::new(RefCell::new(state)),
			running: Rc::new(Cell::new(false)),
			animate: Rc::new(RefCell::new(None)),
			raf_id: Rc::new(Cell::new(None)),
		})
	}

	/// Start the redraw loop. One scheduled callback per display frame; the
	/// loop stops rescheduling itself once `destroy()` clears the flag.
	pub fn start(&self) {
		if self.running.get() {
			return;
		}
		self.running.set(true);

		let ctx = self.ctx.clone();
		let state = self.state.clone();
		let running = self.running.clone();
		let animate_inner = self.animate.clone();
		let raf_id = self.raf_id.clone();
		*self.animate.borrow_mut() = Some(Closure::new(move || {
			if !running.get() {
				raf_id.set(None);
				return;
			}
			{
				let s = state.borrow();
				render::render(
					&ctx,
					&s.nodes,
					&s.edges,
					&s.viewport,
					&s.thresholds,
					s.width,
					s.height,
				);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Ok(id) = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref())
				{
					raf_id.set(Some(id));
				}
			}
		}));
		if let Some(ref cb) = *self.animate.borrow() {
			if let Ok(id) = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref())
			{
				self.raf_id.set(Some(id));
			}
		}
	}

	/// Replace the rendered snapshot. The previous arrays are dropped; the
	/// viewport is left untouched so the user keeps their pan/zoom.
	pub fn set_layout(&self, nodes: Vec<PositionedNode>, edges: Vec<LayoutEdge>) {
		let mut s = self.state.borrow_mut();
		s.nodes = nodes;
		s.edges = edges;
	}

	/// Shared handle for the pointer handlers (viewport mutation, hit tests).
	pub fn state(&self) -> Rc<RefCell<RenderState>> {
		self.state.clone()
	}

	pub fn resize(&self, width: f64, height: f64) {
		let mut s = self.state.borrow_mut();
		s.width = width;
		s.height = height;
	}

	/// Stop the redraw loop and drop the frame callback. The scheduled frame
	/// must be cancelled before the closure is dropped, or the browser would
	/// invoke a dead callback on the next frame.
	pub fn destroy(&self) {
		self.running.set(false);
		if let Some(id) = self.raf_id.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
		*self.animate.borrow_mut() = None;
	}
}
