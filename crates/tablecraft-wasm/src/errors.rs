//! Translating `tablecraft_common::TableError`/`ImportErrors` into the
//! `js_sys::Error` values wasm-bindgen expects on the failure side of a
//! `Result<T, JsValue>`-returning export.

use wasm_bindgen::JsValue;

use crate::utils::js_error;

pub fn table_error(err: tablecraft_common::TableError) -> JsValue {
    js_error(err.to_string())
}

pub fn import_errors(err: tablecraft_common::ImportErrors) -> JsValue {
    js_error(err.to_string())
}
