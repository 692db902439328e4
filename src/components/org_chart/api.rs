//! Fetch client for the subtree data API.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::error::ChartError;
use super::types::SubtreeResponse;

/// Client for `GET <endpoint>?max_depth=<n>`. Any non-2xx status maps to
/// `ChartError::Fetch`; retry and timeout policy belong to the server side.
#[derive(Clone)]
pub struct SubtreeClient {
	endpoint: String,
}

impl SubtreeClient {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self { endpoint: endpoint.into() }
	}

	pub async fn fetch_subtree(&self, max_depth: u32) -> Result<SubtreeResponse, ChartError> {
		let url = format!("{}?max_depth={}", self.endpoint, max_depth);

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let request = Request::new_with_str_and_init(&url, &opts)
			.map_err(|e| ChartError::fetch(None, format!("request error: {e:?}")))?;

		let window =
			web_sys::window().ok_or_else(|| ChartError::fetch(None, "no window object"))?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| ChartError::fetch(None, format!("network error: {e:?}")))?;

		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| ChartError::fetch(None, "response is not a Response"))?;

		if !resp.ok() {
			return Err(ChartError::fetch(
				Some(resp.status()),
				format!("HTTP {}", resp.status()),
			));
		}

		let json = JsFuture::from(
			resp.json()
				.map_err(|e| ChartError::fetch(None, format!("json promise error: {e:?}")))?,
		)
		.await
		.map_err(|e| ChartError::fetch(None, format!("json error: {e:?}")))?;

		serde_wasm_bindgen::from_value(json)
			.map_err(|e| ChartError::fetch(None, format!("deserialize error: {e}")))
	}
}
