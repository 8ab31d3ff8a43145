//! # PDF Form Field Extractor
//!
//! Client-side half of the form field extractor page. The PDF itself is parsed
//! by the site's `/api/extract-form-fields` endpoint; this module validates the
//! upload before it is sent, models the JSON the endpoint answers with, and
//! turns that answer into the summary the page renders.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::file_utils::{FileKind, detect_type, file_stem};
use crate::schema::ToolError;

pub const EXTRACT_ENDPOINT: &str = "/api/extract-form-fields";
pub const EXPORT_ENDPOINT: &str = "/api/export-form-data";

/// Multipart part carrying the PDF.
pub const PDF_PART: &str = "pdf";
/// Multipart part carrying the export format.
pub const FORMAT_PART: &str = "format";

pub const MAX_PDF_BYTES: u64 = 10 * 1024 * 1024;

pub const INVALID_PDF_MESSAGE: &str = "Please select a valid PDF file.";

/// Metadata of a file picked or dropped onto the page.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PdfUpload {
    pub name: String,
    pub mime: Option<String>,
    pub size: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidatedUpload {
    pub name: String,
    pub size: u64,
    pub size_label: String,
}

/// Human readable size, e.g. `"1.5 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Accepts exactly one non-empty PDF no larger than [`MAX_PDF_BYTES`].
///
/// `head` holds the first bytes of the file when the caller has them; it lets a
/// PDF with a wrong extension through.
pub fn validate_pdf_upload(files: &[PdfUpload], head: &[u8]) -> Result<ValidatedUpload, ToolError> {
    let file = match files {
        [file] => file,
        [] => return Err(ToolError::UnsupportedFile(INVALID_PDF_MESSAGE.into())),
        _ => {
            return Err(ToolError::UnsupportedFile(
                "Please select a single PDF file.".into(),
            ));
        }
    };

    if detect_type(Some(&file.name), file.mime.as_deref(), head) != FileKind::Pdf {
        warn!("rejected upload {} ({:?})", file.name, file.mime);
        return Err(ToolError::UnsupportedFile(INVALID_PDF_MESSAGE.into()));
    }
    if file.size == 0 {
        return Err(ToolError::UnsupportedFile("The selected file is empty.".into()));
    }
    if file.size > MAX_PDF_BYTES {
        return Err(ToolError::UnsupportedFile(format!(
            "PDF files must be {} or smaller.",
            format_file_size(MAX_PDF_BYTES)
        )));
    }

    Ok(ValidatedUpload {
        name: file.name.clone(),
        size: file.size,
        size_label: format_file_size(file.size),
    })
}

/// One field as reported by the extraction endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type", alias = "fieldType")]
    pub field_type: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl FormField {
    fn is_filled(&self) -> bool {
        match &self.value {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        }
    }
}

/// Body of a `/api/extract-form-fields` response.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FormFieldsResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "totalFields")]
    pub total_fields: Option<usize>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default, alias = "fieldTypes")]
    pub field_types: Option<BTreeMap<String, usize>>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TypeCount {
    pub field_type: String,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PageCount {
    pub page: u32,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FormSummary {
    pub total_fields: usize,
    pub pages: Option<u32>,
    pub by_type: Vec<TypeCount>,
    pub by_page: Vec<PageCount>,
    pub required_count: usize,
    pub filled_count: usize,
    pub fields: Vec<FormField>,
}

/// Builds the page summary, recomputing any count the server left out.
pub fn summarize(response: FormFieldsResponse) -> Result<FormSummary, ToolError> {
    if response.success == Some(false) || response.error.is_some() {
        let msg = response
            .error
            .unwrap_or_else(|| "Failed to extract form fields".into());
        return Err(ToolError::Network(msg));
    }

    let type_counts = match response.field_types {
        Some(types) if !types.is_empty() => types,
        _ => {
            let mut types = BTreeMap::new();
            for field in &response.fields {
                *types.entry(field.field_type.clone()).or_insert(0) += 1;
            }
            types
        }
    };
    let mut by_type: Vec<TypeCount> = type_counts
        .into_iter()
        .map(|(field_type, count)| TypeCount { field_type, count })
        .collect();
    by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.field_type.cmp(&b.field_type)));

    let mut pages: BTreeMap<u32, usize> = BTreeMap::new();
    for page in response.fields.iter().filter_map(|f| f.page) {
        *pages.entry(page).or_insert(0) += 1;
    }
    let last_page = pages.keys().next_back().copied();

    Ok(FormSummary {
        total_fields: response.total_fields.unwrap_or(response.fields.len()),
        pages: response.pages.or(last_page),
        by_type,
        by_page: pages
            .into_iter()
            .map(|(page, count)| PageCount { page, count })
            .collect(),
        required_count: response
            .fields
            .iter()
            .filter(|f| f.required.unwrap_or(false))
            .count(),
        filled_count: response.fields.iter().filter(|f| f.is_filled()).count(),
        fields: response.fields,
    })
}

/// Download format offered by `/api/export-form-data`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Xml,
}

impl ExportFormat {
    /// Parses the value of the format picker.
    pub fn from_name(name: &str) -> Result<Self, ToolError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "xml" => Ok(ExportFormat::Xml),
            other => Err(ToolError::InvalidInput(format!(
                "unsupported export format '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xml => "application/xml",
        }
    }
}

/// Name of the downloaded export, `<stem>-form-data.<ext>`.
pub fn export_filename(original: &str, format: ExportFormat) -> String {
    format!("{}-form-data.{}", file_stem(original), format.as_str())
}
