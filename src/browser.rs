//! Browser-only glue: clipboard writes, debounced live conversion, and the
//! multipart requests of the PDF form extractor page.
//!
//! Network calls are made once per user action. A failed call is reported as a
//! single error string; there is no retry.

use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use js_sys::{Function, Uint8Array};
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{File, FormData};

use crate::assembly::{error_json, run_tool_json};
use crate::pdf_form::{
    EXPORT_ENDPOINT, EXTRACT_ENDPOINT, ExportFormat, FORMAT_PART, FormFieldsResponse, PDF_PART,
    PdfUpload, export_filename, summarize, validate_pdf_upload,
};
use crate::schema::ToolError;

pub const DEFAULT_DEBOUNCE_MS: u32 = 300;

const EXTRACTOR_ID: &str = "pdf-form-field-extractor";

fn net_err<E: std::fmt::Display>(err: E) -> ToolError {
    ToolError::Network(err.to_string())
}

fn js_err(err: JsValue) -> ToolError {
    ToolError::Network(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Writes `text` to the clipboard. Fire-and-forget; failures are only logged.
#[wasm_bindgen]
pub fn copy_to_clipboard(text: String) {
    let Some(window) = web_sys::window() else {
        warn!("clipboard unavailable: no window");
        return;
    };
    let promise = window.navigator().clipboard().write_text(&text);
    spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            warn!("clipboard write failed: {err:?}");
        }
    });
}

/// Runs a text tool after the user stops typing.
///
/// Each call to `schedule` replaces the pending run, so only the last input
/// within the delay window is converted.
#[wasm_bindgen]
pub struct LiveConverter {
    tool_id: String,
    delay_ms: u32,
    pending: Option<Timeout>,
}

#[wasm_bindgen]
impl LiveConverter {
    #[wasm_bindgen(constructor)]
    pub fn new(tool_id: String, delay_ms: Option<u32>) -> LiveConverter {
        LiveConverter {
            tool_id,
            delay_ms: delay_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            pending: None,
        }
    }

    /// Converts `input_json` after the delay and passes the JSON result to `callback`.
    pub fn schedule(&mut self, input_json: String, callback: Function) {
        // dropping a Timeout clears it
        self.pending = None;
        let tool_id = self.tool_id.clone();
        self.pending = Some(Timeout::new(self.delay_ms, move || {
            let out = run_tool_json(&tool_id, &input_json, None)
                .unwrap_or_else(|err| error_json(&tool_id, &err));
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&out)) {
                warn!("live converter callback failed: {err:?}");
            }
        }));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

fn check_file(file: &File) -> Result<(), ToolError> {
    let upload = PdfUpload {
        name: file.name(),
        mime: Some(file.type_()),
        size: file.size() as u64,
    };
    validate_pdf_upload(std::slice::from_ref(&upload), &[])?;
    Ok(())
}

fn pdf_form_data(file: &File, format: Option<ExportFormat>) -> Result<FormData, ToolError> {
    let form = FormData::new().map_err(js_err)?;
    form.append_with_blob_and_filename(PDF_PART, file, &file.name())
        .map_err(js_err)?;
    if let Some(format) = format {
        form.append_with_str(FORMAT_PART, format.as_str())
            .map_err(js_err)?;
    }
    Ok(form)
}

async fn post_form(endpoint: &str, form: FormData) -> Result<gloo_net::http::Response, ToolError> {
    let resp = Request::post(endpoint)
        .body(form)
        .map_err(net_err)?
        .send()
        .await
        .map_err(net_err)?;
    if !resp.ok() {
        return Err(ToolError::Network(format!(
            "server responded with status {}",
            resp.status()
        )));
    }
    Ok(resp)
}

async fn extract(file: &File) -> Result<String, ToolError> {
    check_file(file)?;
    let resp = post_form(EXTRACT_ENDPOINT, pdf_form_data(file, None)?).await?;
    let body: FormFieldsResponse = resp.json().await.map_err(net_err)?;
    debug!("extracted {} fields from {}", body.fields.len(), file.name());
    Ok(serde_json::to_string(&summarize(body)?)?)
}

/// Uploads `file` to the extraction endpoint and returns the form summary JSON.
#[wasm_bindgen]
pub async fn extract_form_fields(file: File) -> JsValue {
    match extract(&file).await {
        Ok(json) => JsValue::from_str(&json),
        Err(err) => {
            warn!("form field extraction failed: {err}");
            JsValue::from_str(&error_json(EXTRACTOR_ID, &err))
        }
    }
}

async fn export(file: &File, format: ExportFormat) -> Result<Vec<u8>, ToolError> {
    check_file(file)?;
    let resp = post_form(EXPORT_ENDPOINT, pdf_form_data(file, Some(format))?).await?;
    resp.binary().await.map_err(net_err)
}

/// Downloaded export of a form's field data.
#[wasm_bindgen(getter_with_clone)]
pub struct ExportedFormData {
    pub filename: String,
    pub mime: String,
    pub bytes: Uint8Array,
}

/// Asks the export endpoint for the form data in `format` (`json`, `csv` or `xml`).
///
/// Rejects with the error message string on failure.
#[wasm_bindgen]
pub async fn export_form_data(file: File, format: String) -> Result<ExportedFormData, JsValue> {
    let result = async {
        let format = ExportFormat::from_name(&format)?;
        let bytes = export(&file, format).await?;
        Ok::<_, ToolError>(ExportedFormData {
            filename: export_filename(&file.name(), format),
            mime: format.mime().into(),
            bytes: Uint8Array::from(bytes.as_slice()),
        })
    }
    .await;
    result.map_err(|err| {
        warn!("form data export failed: {err}");
        JsValue::from_str(&err.to_string())
    })
}
