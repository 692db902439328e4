//! Chart lifecycle orchestration: open/close, data fetch, worker round-trip.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::{RwSignal, Set};
use log::{debug, error, info};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlCanvasElement;

use super::api::SubtreeClient;
use super::error::ChartError;
use super::render::LodThresholds;
use super::renderer::LodRenderer;
use super::types::{LayoutOptions, SubtreeResponse, edges_from_parents};
use super::viewport::Viewport;
use super::worker::{LayoutRequest, LayoutResponse, LayoutWorker};

/// Lifecycle phase of a chart instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartPhase {
	Closed,
	Opening,
	Open,
}

/// Pure lifecycle state: phase plus a session generation used to fence off
/// async completions (fetch responses, worker results) that outlive the
/// session that issued them.
#[derive(Debug)]
pub struct ChartState {
	phase: ChartPhase,
	generation: u64,
}

impl Default for ChartState {
	fn default() -> Self {
		Self::new()
	}
}

impl ChartState {
	pub fn new() -> Self {
		Self { phase: ChartPhase::Closed, generation: 0 }
	}

	pub fn phase(&self) -> ChartPhase {
		self.phase
	}

	/// `Closed → Opening`. Returns the session token async completions must
	/// present, or `None` if the chart is already open.
	pub fn begin_open(&mut self) -> Option<u64> {
		if self.phase != ChartPhase::Closed {
			return None;
		}
		self.generation += 1;
		self.phase = ChartPhase::Opening;
		Some(self.generation)
	}

	/// `Opening → Open`, gated on the session token.
	pub fn finish_open(&mut self, token: u64) -> bool {
		if self.phase == ChartPhase::Opening && self.generation == token {
			self.phase = ChartPhase::Open;
			true
		} else {
			false
		}
	}

	/// Whether a completion from session `token` may still be applied.
	pub fn accepts(&self, token: u64) -> bool {
		self.phase != ChartPhase::Closed && self.generation == token
	}

	/// `* → Closed`. Bumping the generation invalidates every outstanding
	/// token.
	pub fn close(&mut self) {
		self.generation += 1;
		self.phase = ChartPhase::Closed;
	}
}

/// Tuning for a chart instance; everything except the endpoint has defaults.
#[derive(Clone, Debug)]
pub struct ChartConfig {
	pub endpoint: String,
	pub max_depth: u32,
	pub options: LayoutOptions,
	pub thresholds: LodThresholds,
}

impl ChartConfig {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			max_depth: 4,
			options: LayoutOptions::default(),
			thresholds: LodThresholds::default(),
		}
	}
}

/// Owns the renderer and layout worker for one chart instance. Created per
/// component, so multiple charts can coexist; nothing here is global.
pub struct OrgChartController {
	config: ChartConfig,
	state: Rc<RefCell<ChartState>>,
	renderer: Rc<RefCell<Option<LodRenderer>>>,
	worker: Rc<RefCell<Option<LayoutWorker>>>,
	client: SubtreeClient,
	loading: RwSignal<bool>,
	on_node_activated: Rc<dyn Fn(String)>,
}

impl OrgChartController {
	pub fn new(
		config: ChartConfig,
		loading: RwSignal<bool>,
		on_node_activated: Rc<dyn Fn(String)>,
	) -> Self {
		let client = SubtreeClient::new(config.endpoint.clone());
		Self {
			config,
			state: Rc::new(RefCell::new(ChartState::new())),
			renderer: Rc::new(RefCell::new(None)),
			worker: Rc::new(RefCell::new(None)),
			client,
			loading,
			on_node_activated,
		}
	}

	pub fn phase(&self) -> ChartPhase {
		self.state.borrow().phase()
	}

	/// Bind the canvas, spawn the worker and kick off the initial subtree
	/// fetch. A mount failure leaves the chart `Closed`; a fetch failure
	/// still reaches `Open`, just with nothing to draw.
	pub fn open(&self, canvas: &HtmlCanvasElement) -> Result<(), ChartError> {
		let Some(token) = self.state.borrow_mut().begin_open() else {
			debug!("org chart: open() ignored, already open");
			return Ok(());
		};

		let renderer = match LodRenderer::new(canvas, self.config.thresholds) {
			Ok(renderer) => renderer,
			Err(err) => {
				error!("org chart: mount failed: {err}");
				self.state.borrow_mut().close();
				return Err(err);
			}
		};
		renderer.start();
		*self.renderer.borrow_mut() = Some(renderer);
		*self.worker.borrow_mut() = Some(LayoutWorker::spawn());
		self.loading.set(true);

		let state = self.state.clone();
		let renderer = self.renderer.clone();
		let worker = self.worker.clone();
		let client = self.client.clone();
		let loading = self.loading;
		let options = self.config.options;
		let max_depth = self.config.max_depth;
		spawn_local(async move {
			let fetched = client.fetch_subtree(max_depth).await;
			if !state.borrow().accepts(token) {
				debug!("org chart: subtree response after close, discarded");
				return;
			}
			state.borrow_mut().finish_open(token);
			loading.set(false);

			let SubtreeResponse { nodes, edges } = match fetched {
				Ok(response) => response,
				Err(err) => {
					// Chart stays open and empty.
					error!("org chart: {err}");
					return;
				}
			};
			info!("org chart: fetched {} nodes, {} edges", nodes.len(), edges.len());

			let edges = if edges.is_empty() { edges_from_parents(&nodes) } else { edges };
			let request = LayoutRequest::Init { nodes, edges, options };

			let state = state.clone();
			let renderer = renderer.clone();
			let worker_ref = worker.borrow();
			let Some(worker) = worker_ref.as_ref() else {
				return;
			};
			worker.request(request, move |response| {
				if !state.borrow().accepts(token) {
					debug!("org chart: stale layout result discarded");
					return;
				}
				match response {
					LayoutResponse::Result { nodes, edges, meta } => {
						debug!("org chart: layout applied in {:.1}ms", meta.duration_ms);
						if let Some(renderer) = renderer.borrow().as_ref() {
							renderer.set_layout(nodes, edges);
						}
					}
					LayoutResponse::Error { message } => {
						// Previous render, if any, persists.
						error!("org chart: {}", ChartError::layout(message));
					}
				}
			});
		});
		Ok(())
	}

	/// Terminate the worker, stop the redraw loop, drop the viewport.
	pub fn close(&self) {
		self.state.borrow_mut().close();
		if let Some(worker) = self.worker.borrow_mut().take() {
			worker.terminate();
		}
		if let Some(renderer) = self.renderer.borrow_mut().take() {
			renderer.destroy();
		}
		self.loading.set(false);
	}

	pub fn pan(&self, dx: f64, dy: f64) {
		if let Some(renderer) = self.renderer.borrow().as_ref() {
			renderer.state().borrow_mut().viewport.pan(dx, dy);
		}
	}

	pub fn zoom_by(&self, factor: f64, pivot: Option<(f64, f64)>) {
		if let Some(renderer) = self.renderer.borrow().as_ref() {
			renderer.state().borrow_mut().viewport.zoom_by(factor, pivot);
		}
	}

	pub fn resize(&self, width: f64, height: f64) {
		if let Some(renderer) = self.renderer.borrow().as_ref() {
			renderer.resize(width, height);
		}
	}

	pub fn viewport(&self) -> Option<Viewport> {
		self.renderer
			.borrow()
			.as_ref()
			.map(|renderer| renderer.state().borrow().viewport)
	}

	/// Resolve a click to a node and hand its id to the host application.
	pub fn handle_click(&self, sx: f64, sy: f64) {
		let hit = self.renderer.borrow().as_ref().and_then(|renderer| {
			let state = renderer.state();
			let state = state.borrow();
			state
				.viewport
				.hit_test(&state.nodes, sx, sy)
				.map(|n| n.node.id.clone())
		});
		if let Some(id) = hit {
			(self.on_node_activated)(id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn open_close_walks_the_phases() {
		let mut state = ChartState::new();
		assert_eq!(state.phase(), ChartPhase::Closed);

		let token = state.begin_open().expect("closed chart must open");
		assert_eq!(state.phase(), ChartPhase::Opening);
		assert!(state.finish_open(token));
		assert_eq!(state.phase(), ChartPhase::Open);

		state.close();
		assert_eq!(state.phase(), ChartPhase::Closed);
	}

	#[test]
	fn reopening_while_open_is_refused() {
		let mut state = ChartState::new();
		let token = state.begin_open().unwrap();
		assert!(state.begin_open().is_none());
		state.finish_open(token);
		assert!(state.begin_open().is_none());
	}

	#[test]
	fn failed_fetch_still_reaches_open() {
		// HTTP 500 path: the open transition completes, the chart is just
		// empty; no layout is ever requested for this session.
		let mut state = ChartState::new();
		let token = state.begin_open().unwrap();
		assert!(state.finish_open(token));
		assert_eq!(state.phase(), ChartPhase::Open);
	}

	#[test]
	fn close_invalidates_in_flight_tokens() {
		let mut state = ChartState::new();
		let token = state.begin_open().unwrap();
		state.finish_open(token);
		assert!(state.accepts(token));

		state.close();
		assert!(!state.accepts(token), "stale result must be discarded");
		assert!(!state.finish_open(token));
	}

	#[test]
	fn tokens_are_session_scoped() {
		let mut state = ChartState::new();
		let first = state.begin_open().unwrap();
		state.close();
		let second = state.begin_open().unwrap();
		assert_ne!(first, second);
		assert!(!state.accepts(first));
		assert!(state.accepts(second));
	}
}
