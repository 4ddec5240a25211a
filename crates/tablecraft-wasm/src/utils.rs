use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn set_panic_hook() {
    #[cfg(feature = "console_panic")]
    console_error_panic_hook::set_once();
}

pub fn js_error(message: impl AsRef<str>) -> JsValue {
    JsValue::from(js_sys::Error::new(message.as_ref()))
}

pub fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(
            &serde_wasm_bindgen::Serializer::new()
                .serialize_maps_as_objects(true)
                .serialize_missing_as_null(false),
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
