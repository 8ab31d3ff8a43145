//! # Assembly Module
//!
//! WASM-exported entry points. Every page of the site calls into the library
//! through this module, passing its form state as a JSON string and getting a
//! JSON string back.
//!
//! ## Overview
//!
//! - `run_tool`: generic dispatcher keyed by catalog id
//! - one named export per tool family (`growth_percentile`, `body_fat`, ...)
//! - `validate_pdf` / `validate_pdf_base64`: upload checks for the form extractor
//! - `tool_catalog`, `build_sitemaps`, `split_existing_sitemap`: site tooling
//!
//! Each export delegates to a `*_json` function returning
//! `Result<String, ToolError>`, so the logic runs natively as well. Failures
//! never throw into JavaScript; they come back as
//! `{"error": "<message>", "tool": "<id>"}`.

use base64::Engine;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

use crate::activity::calculate_swimming_calories;
use crate::body::{calculate_bmi, calculate_body_fat, calculate_energy};
use crate::catalog::{Tool, builtin_tools};
use crate::growth::calculate_growth_percentile;
use crate::pdf_form::{FormFieldsResponse, PdfUpload, summarize, validate_pdf_upload};
use crate::schema::{ToolError, ToolOptions};
use crate::sitemap::{SiteConfig, generate_sitemaps, split_sitemap};
use crate::text_tools::{
    ReverseInput, ReverseMode, StatsInput, run_decode, run_encode, run_reverse, text_stats,
};

fn parse_input<T: DeserializeOwned>(input_json: &str) -> Result<T, ToolError> {
    serde_json::from_str(input_json).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string(value)?)
}

/// Error payload returned to JavaScript.
pub fn error_json(tool: &str, err: &ToolError) -> String {
    json!({ "error": err.to_string(), "tool": tool }).to_string()
}

fn respond(tool: &str, result: Result<String, ToolError>) -> JsValue {
    match result {
        Ok(s) => JsValue::from_str(&s),
        Err(err) => {
            warn!("{tool}: {err}");
            JsValue::from_str(&error_json(tool, &err))
        }
    }
}

/// Runs the tool registered under `tool_id` on `input_json`.
///
/// `options_json` is parsed as [`ToolOptions`]; missing or malformed options
/// fall back to the defaults.
pub fn run_tool_json(
    tool_id: &str,
    input_json: &str,
    options_json: Option<&str>,
) -> Result<String, ToolError> {
    let options = ToolOptions::from_json(options_json);
    debug!("run_tool {tool_id}");

    match tool_id {
        "baby-growth-percentile-calculator" => {
            to_json(&calculate_growth_percentile(&parse_input(input_json)?, &options)?)
        }
        "body-fat-calculator" => to_json(&calculate_body_fat(&parse_input(input_json)?, &options)?),
        "bmr-calculator" | "tdee-calculator" => {
            to_json(&calculate_energy(&parse_input(input_json)?, &options)?)
        }
        "bmi-calculator" => to_json(&calculate_bmi(&parse_input(input_json)?, &options)?),
        "swimming-calorie-calculator" => {
            to_json(&calculate_swimming_calories(&parse_input(input_json)?, &options)?)
        }
        "text-to-binary-converter" => to_json(&run_encode(&parse_input(input_json)?)?),
        "binary-to-text-converter" => to_json(&run_decode(&parse_input(input_json)?)?),
        "reverse-text-generator" => to_json(&run_reverse(&parse_input(input_json)?)),
        "upside-down-text-generator" => {
            let mut input: ReverseInput = parse_input(input_json)?;
            input.mode = ReverseMode::UpsideDown;
            to_json(&run_reverse(&input))
        }
        "word-counter" | "character-counter" => {
            let input: StatsInput = parse_input(input_json)?;
            to_json(&text_stats(&input.text, &options))
        }
        "pdf-form-field-extractor" => {
            let response: FormFieldsResponse = parse_input(input_json)?;
            to_json(&summarize(response)?)
        }
        other => Err(ToolError::UnknownTool(other.into())),
    }
}

/// Checks a picked file before it is uploaded. `files_json` is the array of
/// `{name, mime, size}` objects from the file input or drop event.
pub fn validate_pdf_json(files_json: &str, head: &[u8]) -> Result<String, ToolError> {
    let files: Vec<PdfUpload> = parse_input(files_json)?;
    to_json(&validate_pdf_upload(&files, head)?)
}

pub fn validate_pdf_base64_json(files_json: &str, head_base64: &str) -> Result<String, ToolError> {
    let head = base64::engine::general_purpose::STANDARD
        .decode(head_base64)
        .map_err(|e| ToolError::Decode(format!("base64 decode failed: {e}")))?;
    validate_pdf_json(files_json, &head)
}

pub fn catalog_json() -> Result<String, ToolError> {
    to_json(&builtin_tools())
}

/// Sitemaps for `tools_json` (a tool array) or the built-in catalog when absent.
pub fn sitemaps_json(
    tools_json: Option<&str>,
    config_json: Option<&str>,
) -> Result<String, ToolError> {
    let tools: Vec<Tool> = match tools_json {
        Some(s) => parse_input(s)?,
        None => builtin_tools(),
    };
    let config = SiteConfig::from_json(config_json);
    to_json(&generate_sitemaps(&tools, &config)?)
}

pub fn split_sitemap_json(xml: &str, config_json: Option<&str>) -> Result<String, ToolError> {
    let config = SiteConfig::from_json(config_json);
    to_json(&split_sitemap(xml, &config)?)
}

/// Runs any tool by catalog id.
///
/// # Example
///
/// ```javascript
/// const input = JSON.stringify({ weight: 70, height: 175 });
/// const out = JSON.parse(run_tool("bmi-calculator", input, null));
/// if (out.error) showError(out.error); else render(out);
/// ```
#[wasm_bindgen]
pub fn run_tool(tool_id: &str, input_json: &str, options_json: Option<String>) -> JsValue {
    respond(tool_id, run_tool_json(tool_id, input_json, options_json.as_deref()))
}

#[wasm_bindgen]
pub fn growth_percentile(input_json: &str, options_json: Option<String>) -> JsValue {
    run_tool("baby-growth-percentile-calculator", input_json, options_json)
}

#[wasm_bindgen]
pub fn body_fat(input_json: &str, options_json: Option<String>) -> JsValue {
    run_tool("body-fat-calculator", input_json, options_json)
}

#[wasm_bindgen]
pub fn bmr_tdee(input_json: &str, options_json: Option<String>) -> JsValue {
    run_tool("tdee-calculator", input_json, options_json)
}

#[wasm_bindgen]
pub fn bmi(input_json: &str, options_json: Option<String>) -> JsValue {
    run_tool("bmi-calculator", input_json, options_json)
}

#[wasm_bindgen]
pub fn swimming_calories(input_json: &str, options_json: Option<String>) -> JsValue {
    run_tool("swimming-calorie-calculator", input_json, options_json)
}

#[wasm_bindgen]
pub fn text_to_binary(input_json: &str) -> JsValue {
    run_tool("text-to-binary-converter", input_json, None)
}

#[wasm_bindgen]
pub fn binary_to_text(input_json: &str) -> JsValue {
    run_tool("binary-to-text-converter", input_json, None)
}

#[wasm_bindgen]
pub fn reverse(input_json: &str) -> JsValue {
    run_tool("reverse-text-generator", input_json, None)
}

#[wasm_bindgen]
pub fn text_statistics(input_json: &str, options_json: Option<String>) -> JsValue {
    run_tool("word-counter", input_json, options_json)
}

#[wasm_bindgen]
pub fn summarize_form_fields(response_json: &str) -> JsValue {
    run_tool("pdf-form-field-extractor", response_json, None)
}

#[wasm_bindgen]
pub fn validate_pdf(files_json: &str, head: &[u8]) -> JsValue {
    respond("pdf-form-field-extractor", validate_pdf_json(files_json, head))
}

/// Same as `validate_pdf`, for callers holding the file head as base64.
#[wasm_bindgen]
pub fn validate_pdf_base64(files_json: &str, head_base64: &str) -> JsValue {
    respond(
        "pdf-form-field-extractor",
        validate_pdf_base64_json(files_json, head_base64),
    )
}

#[wasm_bindgen]
pub fn tool_catalog() -> JsValue {
    respond("catalog", catalog_json())
}

#[wasm_bindgen]
pub fn build_sitemaps(tools_json: Option<String>, config_json: Option<String>) -> JsValue {
    respond(
        "sitemap",
        sitemaps_json(tools_json.as_deref(), config_json.as_deref()),
    )
}

#[wasm_bindgen]
pub fn split_existing_sitemap(xml: &str, config_json: Option<String>) -> JsValue {
    respond("sitemap", split_sitemap_json(xml, config_json.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_input(tool_id: &str) -> &'static str {
        match tool_id {
            "baby-growth-percentile-calculator" => {
                r#"{"sex": "female", "metric": "weight", "value": 7.3, "age_months": 6}"#
            }
            "body-fat-calculator" => {
                r#"{"sex": "male", "waist": 85, "neck": 38, "height": 175}"#
            }
            "bmr-calculator" | "tdee-calculator" => {
                r#"{"sex": "male", "age": 30, "weight": 70, "height": 175,
                    "activity_level": "light"}"#
            }
            "bmi-calculator" => r#"{"weight": 70, "height": 175}"#,
            "swimming-calorie-calculator" => {
                r#"{"weight": 70, "minutes": 30, "stroke": "breaststroke"}"#
            }
            "binary-to-text-converter" => r#"{"encoded": "01001000 01101001"}"#,
            "pdf-form-field-extractor" => r#"{"fields": [{"name": "a", "type": "text"}]}"#,
            _ => r#"{"text": "Hello world"}"#,
        }
    }

    #[test]
    fn every_catalog_tool_dispatches() {
        for tool in builtin_tools() {
            let out = run_tool_json(&tool.id, sample_input(&tool.id), None);
            assert!(out.is_ok(), "{}: {:?}", tool.id, out);
        }
    }

    #[test]
    fn growth_result_shape() {
        let out = run_tool_json(
            "baby-growth-percentile-calculator",
            sample_input("baby-growth-percentile-calculator"),
            None,
        )
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["percentile"], 50.0);
        assert_eq!(v["category"], "Normal Range");
    }

    #[test]
    fn upside_down_forces_mode() {
        let out =
            run_tool_json("upside-down-text-generator", r#"{"text": "hello"}"#, None).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["output"], "ollǝɥ");
        assert_eq!(v["mode"], "upside_down");
    }

    #[test]
    fn binary_converters_agree_on_separator() {
        let out = run_tool_json(
            "text-to-binary-converter",
            r#"{"text": "Hi", "separator": "-"}"#,
            None,
        )
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["output"], "01001000-01101001");

        let input = json!({ "encoded": v["output"], "separator": "-" }).to_string();
        let out = run_tool_json("binary-to-text-converter", &input, None).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["text"], "Hi");

        let err = run_tool_json(
            "text-to-binary-converter",
            r#"{"text": "Hi", "separator": ""}"#,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn options_change_precision_and_units() {
        let out = run_tool_json(
            "bmi-calculator",
            r#"{"weight": 154, "height": 69}"#,
            Some(r#"{"precision": 2, "units": "imperial"}"#),
        )
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["bmi"], 22.74);
    }

    #[test]
    fn errors_render_as_single_message() {
        let err = run_tool_json("loan-calculator", "{}", None).unwrap_err();
        let v: Value = serde_json::from_str(&error_json("loan-calculator", &err)).unwrap();
        assert_eq!(v["error"], "Unknown tool: loan-calculator");
        assert_eq!(v["tool"], "loan-calculator");

        let err = run_tool_json("bmi-calculator", r#"{"weight": "heavy"}"#, None).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn pdf_validation_from_base64_head() {
        // "%PDF-1.4" in base64
        let ok = validate_pdf_base64_json(
            r#"[{"name": "upload.bin", "mime": null, "size": 2048}]"#,
            "JVBERi0xLjQ=",
        )
        .unwrap();
        let v: Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(v["size_label"], "2.0 KB");

        assert!(matches!(
            validate_pdf_base64_json("[]", "not base64!"),
            Err(ToolError::Decode(_))
        ));
    }

    #[test]
    fn sitemaps_default_to_builtin_catalog() {
        let out = sitemaps_json(None, Some(r#"{"lastmod": "2025-01-02"}"#)).unwrap();
        let files: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(files.last().unwrap()["filename"], "sitemap.xml");

        let custom = r#"[{"id": "loan-calculator", "name": "Loan Calculator", "description": "",
                          "category": "finance", "href": "/Loan-Calculator/"}]"#;
        let out = sitemaps_json(Some(custom), None).unwrap();
        assert!(out.contains("sitemap-finance.xml"));
        assert!(out.contains("https://dapsiwow.com/tools/loan-calculator"));
    }

    #[test]
    fn catalog_serializes() {
        let tools: Vec<Value> = serde_json::from_str(&catalog_json().unwrap()).unwrap();
        assert!(tools.iter().any(|t| t["id"] == "pdf-form-field-extractor"));
    }
}
