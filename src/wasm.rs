//! WASM entry points for browser use.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::batch::{self, SheetReport};
use crate::error::SheetError;
use crate::schema::{SheetSchema, builtin};
use crate::validate::combinators::{FieldValidator, upc_or_ean};
use crate::validate::{Issue, ValidationResult};

/// Validate rows JSON against a sheet schema JSON.
/// Returns `{status: "report", ...}` or `{status: "errors", errors: [...]}`.
#[wasm_bindgen]
pub fn validate_sheet_json(schema_json: &str, rows_json: &str) -> JsValue {
    let result = validate_sheet_inner(schema_json, rows_json);
    to_js(&result)
}

fn validate_sheet_inner(schema_json: &str, rows_json: &str) -> SheetResponse {
    SheetSchema::from_json(schema_json)
        .and_then(SheetSchema::compile)
        .and_then(|sheet| batch::validate_sheet(&sheet, rows_json))
        .into()
}

/// Validate rows JSON against one of the built-in sheets (`reviews`, `products`).
#[wasm_bindgen]
pub fn validate_builtin_sheet(name: &str, rows_json: &str) -> JsValue {
    let result = validate_builtin_inner(name, rows_json);
    to_js(&result)
}

fn validate_builtin_inner(name: &str, rows_json: &str) -> SheetResponse {
    builtin::by_name(name)
        .and_then(SheetSchema::compile)
        .and_then(|sheet| batch::validate_sheet(&sheet, rows_json))
        .into()
}

/// Check a single UPC/EAN code as typed into a form field.
#[wasm_bindgen]
pub fn check_upc(code: &str) -> JsValue {
    let result = check_upc_inner(code);
    to_js(&result)
}

fn check_upc_inner(code: &str) -> UpcDto {
    match upc_or_ean().on(code).invoke() {
        ValidationResult::Pass(normalized) => UpcDto {
            valid: true,
            code: Some(normalized),
            issues: vec![],
        },
        ValidationResult::Fail(issues) => UpcDto {
            valid: false,
            code: None,
            issues: issues.into_vec(),
        },
    }
}

/// Maps become plain objects, so `record.values.page_id` works from JS.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorDto {
    code: String,
    message: String,
}

impl From<SheetError> for ErrorDto {
    fn from(e: SheetError) -> Self {
        ErrorDto {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status")]
enum SheetResponse {
    #[serde(rename = "report")]
    Report(SheetReport),
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

impl From<Result<SheetReport, SheetError>> for SheetResponse {
    fn from(result: Result<SheetReport, SheetError>) -> Self {
        match result {
            Ok(report) => SheetResponse::Report(report),
            Err(e) => SheetResponse::Errors {
                errors: vec![ErrorDto::from(e)],
            },
        }
    }
}

#[derive(Serialize)]
struct UpcDto {
    valid: bool,
    code: Option<String>,
    issues: Vec<Issue>,
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use js_sys::{Map, Reflect};
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn record_values_reach_js_as_plain_objects() {
        let out = validate_builtin_sheet(
            "reviews",
            r#"[{"page_id":"p1","review_id":"r1","rating":5}]"#,
        );
        let records = Reflect::get(&out, &"records".into()).unwrap();
        let record = Reflect::get(&records, &0.into()).unwrap();
        let values = Reflect::get(&record, &"values".into()).unwrap();
        assert!(!values.is_instance_of::<Map>());
        let page_id = Reflect::get(&values, &"page_id".into()).unwrap();
        assert_eq!(page_id.as_string().as_deref(), Some("p1"));
    }

    #[wasm_bindgen_test]
    fn check_upc_returns_plain_object() {
        let out = check_upc("036000291452");
        let code = Reflect::get(&out, &"code".into()).unwrap();
        assert_eq!(code.as_string().as_deref(), Some("0036000291452"));
    }
}
