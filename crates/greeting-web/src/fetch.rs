use greeting_engine::{ContentError, Customization};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

fn network(url: &str, err: JsValue) -> ContentError {
    ContentError::Network {
        url: url.to_string(),
        reason: format!("{:?}", err),
    }
}

/// `GET url` and parse the body as a customization document.
pub async fn load_customization(url: &str) -> Result<Customization, ContentError> {
    let window = web_sys::window().ok_or_else(|| network(url, JsValue::from_str("no window")))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| network(url, e))?;
    let response: Response = response.dyn_into().map_err(|e| network(url, e))?;
    if !response.ok() {
        return Err(ContentError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let body = JsFuture::from(response.text().map_err(|e| network(url, e))?)
        .await
        .map_err(|e| network(url, e))?;
    Customization::from_json(&body.as_string().unwrap_or_default())
}
