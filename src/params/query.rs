use serde::Serialize;
use serde_json::Value;

/// Flattens parameters into query-string pairs for GET requests.
///
/// The remote API expects booleans as the literal strings `true`/`false`
/// and numbers in their decimal form. Nested structures have no canonical
/// query encoding server-side, so they are sent JSON-encoded; null fields
/// are dropped.
pub fn query_pairs<T: Serialize>(params: &T) -> Vec<(String, String)> {
    let value = match serde_json::to_value(params) {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };

    let object = match value {
        Value::Object(object) => object,
        _ => return Vec::new(),
    };

    object
        .into_iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                Value::String(text) => text,
                nested => nested.to_string(),
            };
            Some((key, encoded))
        })
        .collect()
}
