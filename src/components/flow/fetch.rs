use serde_json::Value;

use super::error::FlowError;
use super::types::RawGraph;

/// Parse a response body, requiring both `nodes` and `edges` to be present.
pub fn parse_graph(body: &str) -> Result<RawGraph, FlowError> {
	let value: Value = serde_json::from_str(body)?;
	for field in ["nodes", "edges"] {
		if value.get(field).is_none_or(Value::is_null) {
			return Err(FlowError::InvalidResponse { missing: field });
		}
	}
	Ok(serde_json::from_value(value)?)
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_graph(endpoint: &str) -> Result<RawGraph, FlowError> {
	use wasm_bindgen::JsCast;
	use wasm_bindgen_futures::JsFuture;
	use web_sys::{Request, RequestInit, RequestMode, Response};

	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(RequestMode::Cors);

	let request = Request::new_with_str_and_init(endpoint, &opts)
		.map_err(|e| FlowError::Network(format!("request error: {:?}", e)))?;

	let window = web_sys::window().ok_or_else(|| FlowError::Network("no window".into()))?;
	let resp_value = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| FlowError::Network(format!("fetch error: {:?}", e)))?;

	let resp: Response = resp_value
		.dyn_into()
		.map_err(|_| FlowError::Network("response is not a Response".into()))?;

	if !resp.ok() {
		return Err(FlowError::Http(resp.status()));
	}

	let text = JsFuture::from(
		resp.text()
			.map_err(|e| FlowError::Network(format!("body promise error: {:?}", e)))?,
	)
	.await
	.map_err(|e| FlowError::Network(format!("body error: {:?}", e)))?;

	let body = text
		.as_string()
		.ok_or_else(|| FlowError::Parse("response body is not text".into()))?;
	parse_graph(&body)
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_graph(endpoint: &str) -> Result<RawGraph, FlowError> {
	Err(FlowError::Network(format!(
		"cannot fetch {} outside the browser",
		endpoint
	)))
}
