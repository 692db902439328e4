//! Layout worker protocol and the background task that services it.
//!
//! One request per open session: the controller posts `layout:init` and gets
//! back either `layout:result` or `layout:error`. The task yields to the
//! event loop before computing, so posting a request never blocks the turn
//! that issued it; `terminate()` guarantees no response is delivered
//! afterwards, whether the computation has started or not.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen_futures::spawn_local;

use super::layout::compute_layout;
use super::types::{GraphNode, LayoutEdge, LayoutOptions, PositionedNode};

/// Request message posted to the layout worker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayoutRequest {
	#[serde(rename = "layout:init")]
	Init {
		nodes: Vec<GraphNode>,
		edges: Vec<LayoutEdge>,
		options: LayoutOptions,
	},
}

/// Response message emitted by the layout worker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayoutResponse {
	#[serde(rename = "layout:result")]
	Result {
		nodes: Vec<PositionedNode>,
		edges: Vec<LayoutEdge>,
		meta: LayoutMeta,
	},
	#[serde(rename = "layout:error")]
	Error { message: String },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMeta {
	pub duration_ms: f64,
}

fn now_ms() -> f64 {
	#[cfg(target_arch = "wasm32")]
	{
		js_sys::Date::now()
	}
	#[cfg(not(target_arch = "wasm32"))]
	{
		use std::time::{SystemTime, UNIX_EPOCH};
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs_f64() * 1000.0)
			.unwrap_or(0.0)
	}
}

/// Service a single request. Spacing must be finite and non-negative; the
/// layout itself never fails, even for cyclic input.
pub fn process_request(request: LayoutRequest) -> LayoutResponse {
	let LayoutRequest::Init { nodes, edges, options } = request;

	let spacings_valid = options.vertical_spacing.is_finite()
		&& options.horizontal_spacing.is_finite()
		&& options.vertical_spacing >= 0.0
		&& options.horizontal_spacing >= 0.0;
	if !spacings_valid {
		return LayoutResponse::Error {
			message: format!(
				"invalid spacing options: vertical={} horizontal={}",
				options.vertical_spacing, options.horizontal_spacing
			),
		};
	}

	let started = now_ms();
	let positioned = compute_layout(&nodes, &edges, options);
	let duration_ms = now_ms() - started;
	log::debug!(
		"layout worker: {} nodes, {} edges in {:.1}ms",
		positioned.len(),
		edges.len(),
		duration_ms
	);

	LayoutResponse::Result {
		nodes: positioned,
		edges,
		meta: LayoutMeta { duration_ms },
	}
}

/// Handle to the background layout task. Owned by the controller; terminated
/// on close, which also drops any not-yet-delivered response.
pub struct LayoutWorker {
	cancelled: Rc<Cell<bool>>,
}

impl LayoutWorker {
	pub fn spawn() -> Self {
		Self { cancelled: Rc::new(Cell::new(false)) }
	}

	/// Post a one-shot request; `on_response` runs on the UI thread unless
	/// the worker has been terminated in the meantime.
	pub fn request(
		&self,
		request: LayoutRequest,
		on_response: impl FnOnce(LayoutResponse) + 'static,
	) {
		let cancelled = self.cancelled.clone();
		spawn_local(async move {
			// Let the posting turn (and a pending frame) run before the
			// computation occupies the thread.
			yield_to_event_loop().await;
			if cancelled.get() {
				log::debug!("layout worker: terminated before computing, request dropped");
				return;
			}
			let response = process_request(request);
			Self::deliver(&cancelled, response, on_response);
		});
	}

	/// Final delivery gate: a response produced after `terminate()` is
	/// silently discarded. Benign race, debug-logged only.
	fn deliver(
		cancelled: &Cell<bool>,
		response: LayoutResponse,
		on_response: impl FnOnce(LayoutResponse),
	) {
		if cancelled.get() {
			log::debug!("layout worker: discarding response after terminate");
			return;
		}
		on_response(response);
	}

	pub fn terminate(&self) {
		self.cancelled.set(true);
	}
}

/// Reschedule the current task as a timeout-0 macrotask, letting input and
/// rAF callbacks run first.
async fn yield_to_event_loop() {
	let promise = js_sys::Promise::new(&mut |resolve, _reject| {
		let window = web_sys::window().unwrap();
		let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0);
	});
	let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn person(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			parent_id: None,
			first_name: "Kat".into(),
			last_name: "Holmes".into(),
			title: None,
			avatar_url: None,
		}
	}

	fn init(nodes: Vec<GraphNode>, edges: Vec<LayoutEdge>, options: LayoutOptions) -> LayoutRequest {
		LayoutRequest::Init { nodes, edges, options }
	}

	#[test]
	fn request_wire_tag_is_layout_init() {
		let json = serde_json::to_value(init(vec![], vec![], LayoutOptions::default())).unwrap();
		assert_eq!(json["type"], "layout:init");
		assert_eq!(json["options"]["verticalSpacing"], 120.0);
	}

	#[test]
	fn result_wire_format_matches_contract() {
		let response = process_request(init(
			vec![person("1")],
			vec![],
			LayoutOptions::default(),
		));
		let json = serde_json::to_value(&response).unwrap();
		assert_eq!(json["type"], "layout:result");
		assert!(json["meta"]["durationMs"].is_number());
		assert_eq!(json["nodes"][0]["level"], 0);
	}

	#[test]
	fn invalid_spacing_yields_layout_error() {
		let response = process_request(init(
			vec![person("1")],
			vec![],
			LayoutOptions { vertical_spacing: f64::NAN, horizontal_spacing: 30.0 },
		));
		match &response {
			LayoutResponse::Error { message } => assert!(message.contains("invalid spacing")),
			_ => panic!("expected layout:error"),
		}
		let json = serde_json::to_value(&response).unwrap();
		assert_eq!(json["type"], "layout:error");
	}

	#[test]
	fn terminated_worker_never_delivers_a_finished_response() {
		let worker = LayoutWorker::spawn();
		let response = process_request(init(vec![person("1")], vec![], LayoutOptions::default()));

		worker.terminate();
		let delivered = Cell::new(false);
		LayoutWorker::deliver(&worker.cancelled, response, |_| delivered.set(true));
		assert!(!delivered.get(), "response after terminate must be dropped");
	}

	#[test]
	fn live_worker_delivers_its_response() {
		let worker = LayoutWorker::spawn();
		let response = process_request(init(vec![person("1")], vec![], LayoutOptions::default()));

		let delivered = Cell::new(false);
		LayoutWorker::deliver(&worker.cancelled, response, |r| {
			assert!(matches!(r, LayoutResponse::Result { .. }));
			delivered.set(true);
		});
		assert!(delivered.get());
	}

	#[test]
	fn worker_round_trip_levels_children() {
		let nodes = vec![person("a"), person("b")];
		let edges = vec![LayoutEdge { from_id: "a".into(), to_id: "b".into() }];
		match process_request(init(nodes, edges, LayoutOptions::default())) {
			LayoutResponse::Result { nodes, .. } => {
				assert_eq!(nodes.len(), 2);
				assert_eq!(nodes[0].level + 1, nodes[1].level);
			}
			LayoutResponse::Error { message } => panic!("unexpected error: {message}"),
		}
	}
}
