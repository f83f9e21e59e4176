//! WASM bindings for augtex
//!
//! This module provides JavaScript-accessible functions for building,
//! serializing and searching formula trees. Rendering itself happens on the
//! JavaScript side; these functions hand it render-mode LaTeX.

use wasm_bindgen::prelude::*;

use serde::{Deserialize, Serialize};

use crate::core::builder::{build_formula_with_variables, check_latex, BuildOptions};
use crate::core::lookup::find_expression;
use augtex_latex_backend::{LatexMode, RangedLatex, StyledRange, ToLatex, ToStyledRanges};

/// Build options (exposed to WASM)
#[derive(Serialize, Deserialize)]
pub struct WasmBuildOptions {
    /// Prefix of every structural id
    #[serde(default)]
    pub id_prefix: String,
    /// Non-strict mode: keep unknown commands as literal symbols
    #[serde(default = "default_true")]
    pub non_strict: bool,
}

impl Default for WasmBuildOptions {
    fn default() -> Self {
        Self {
            id_prefix: String::new(),
            non_strict: true,
        }
    }
}

impl From<WasmBuildOptions> for BuildOptions {
    fn from(options: WasmBuildOptions) -> Self {
        BuildOptions {
            id_prefix: options.id_prefix,
            non_strict: options.non_strict,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Result object handed back to JavaScript
#[derive(Serialize)]
pub struct WasmResult<T: Serialize> {
    pub success: bool,
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> WasmResult<T> {
    fn ok(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.to_string()),
        }
    }
}

/// Safely serialize a value to JsValue, returning an error object on failure.
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = WasmResult::<()>::err(format!("Serialization error: {}", e));
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

fn variables_from(value: JsValue) -> Vec<String> {
    serde_wasm_bindgen::from_value(value).unwrap_or_default()
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Render-mode LaTeX with id ranges for a formula
///
/// # Arguments
/// * `latex` - LaTeX math (without $ delimiters)
/// * `variables` - array of variable snippets to group, e.g. `["x_i"]`
/// * `options` - optional [`WasmBuildOptions`]
#[wasm_bindgen(js_name = "renderFormula")]
pub fn render_formula_wasm(latex: &str, variables: JsValue, options: JsValue) -> JsValue {
    let options: WasmBuildOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let variables = variables_from(variables);
    let result = match build_formula_with_variables(latex, &variables, &options.into()) {
        Ok(formula) => WasmResult::<RangedLatex>::ok(formula.to_latex(LatexMode::Render, 0)),
        Err(e) => WasmResult::err(e),
    };
    to_js_value(&result)
}

/// Editor decorations for a formula
#[wasm_bindgen(js_name = "styledRanges")]
pub fn styled_ranges_wasm(latex: &str, variables: JsValue) -> JsValue {
    let variables = variables_from(variables);
    let result = match build_formula_with_variables(latex, &variables, &BuildOptions::default()) {
        Ok(formula) => WasmResult::<Vec<StyledRange>>::ok(formula.to_styled_ranges()),
        Err(e) => WasmResult::err(e),
    };
    to_js_value(&result)
}

/// Display ids of `expression` inside `latex`
///
/// `css_ids` lists the ids the renderer actually produced; only those count
/// as display ids.
#[wasm_bindgen(js_name = "findExpression")]
pub fn find_expression_wasm(
    latex: &str,
    expression: &str,
    css_ids: JsValue,
    variables: JsValue,
) -> JsValue {
    let css_ids = variables_from(css_ids);
    let variables = variables_from(variables);
    let mut formula =
        match build_formula_with_variables(latex, &variables, &BuildOptions::default()) {
            Ok(formula) => formula,
            Err(e) => return to_js_value(&WasmResult::<Vec<String>>::err(e)),
        };
    formula.annotate_rendered(&css_ids);
    let found = find_expression(&formula, expression, &variables).map(|found| found.css_ids);
    to_js_value(&WasmResult::ok(found))
}

/// Whether `latex` builds in strict mode
#[wasm_bindgen(js_name = "isValidLatex")]
pub fn is_valid_latex_wasm(latex: &str) -> JsValue {
    let result = match check_latex(latex) {
        Ok(()) => WasmResult::ok(true),
        Err(e) => WasmResult::<bool>::err(e),
    };
    to_js_value(&result)
}

/// Library version
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
