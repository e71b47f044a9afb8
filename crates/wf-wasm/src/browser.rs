//! Browser implementations of the editor's storage seams.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlAnchorElement;
use wf_core::{Result, WorkflowError};
use wf_editor::{FileSink, KeyValueStore};

fn js_error(context: &str, err: JsValue) -> WorkflowError {
    let detail = err.as_string().unwrap_or_else(|| format!("{err:?}"));
    WorkflowError::Storage(format!("{context}: {detail}"))
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| WorkflowError::Storage("no window".into()))
}

/// `window.localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self> {
        let storage = window()?
            .local_storage()
            .map_err(|e| js_error("localStorage", e))?
            .ok_or_else(|| WorkflowError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("getItem", e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("setItem", e))
    }
}

/// Triggers a download by clicking a detached `<a download>` pointing at a
/// `data:` URI.
pub struct AnchorDownload;

impl FileSink for AnchorDownload {
    fn download(&mut self, file_name: &str, contents: &str) -> Result<()> {
        let document = window()?
            .document()
            .ok_or_else(|| WorkflowError::Storage("no document".into()))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| js_error("createElement", e))?
            .dyn_into()
            .map_err(|_| WorkflowError::Storage("<a> is not an anchor element".into()))?;

        let encoded: String = js_sys::encode_uri_component(contents).into();
        anchor.set_href(&format!("data:application/json;charset=utf-8,{encoded}"));
        anchor.set_download(file_name);
        anchor.click();
        Ok(())
    }
}
