use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid root margin `{0}`")]
    InvalidRootMargin(String),
}

impl From<JsValue> for FxError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        FxError::Js(message)
    }
}
