use crate::stream::LineDecoder;
use crate::ClientError;
use serde_json::Value;

/// Status codes the service documents as application errors with a
/// JSON `error` field in the body.
const KNOWN_ERROR_STATUSES: [u16; 3] = [402, 409, 500];

/// Classifies a non-success response into an error.
///
/// Known application statuses extract the body's `error` field when the
/// body is JSON, falling back to the raw text. Anything else is surfaced
/// as-is with its status code.
pub(crate) fn error_from_status(
    action: &str,
    status: u16,
    content_type: &str,
    body: &str,
) -> ClientError {
    if KNOWN_ERROR_STATUSES.contains(&status) {
        let message = extract_error_field(content_type, body)
            .unwrap_or_else(|| {
                if body.is_empty() {
                    "unknown error".to_string()
                } else {
                    body.to_string()
                }
            });
        ClientError::Api {
            action: action.to_string(),
            status,
            message,
        }
    } else {
        ClientError::UnexpectedStatus {
            action: action.to_string(),
            status,
            body: body.to_string(),
        }
    }
}

fn extract_error_field(content_type: &str, body: &str) -> Option<String> {
    if !content_type.contains("json") {
        return None;
    }
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .map(|error| match error {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}

/// Decodes a successful response body according to its content type.
///
/// - `jsonl` / `ndjson`: an array of line-decoded records
/// - `json`: the parsed document
/// - anything else: the raw body as a JSON string
///
/// Empty bodies (204, DELETE acknowledgements) decode to `null`.
pub(crate) fn decode_success(action: &str, content_type: &str, body: &str) -> crate::Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }

    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("jsonl") || content_type.contains("ndjson") {
        let mut decoder = LineDecoder::new();
        let mut records = decoder.feed(body.as_bytes());
        records.extend(decoder.finish());
        Ok(Value::Array(records))
    } else if content_type.contains("json") {
        serde_json::from_str(body).map_err(|source| ClientError::Decode {
            action: action.to_string(),
            source,
        })
    } else {
        Ok(Value::String(body.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_status_extracts_error_field() {
        let error = error_from_status(
            "post to crawl",
            402,
            "application/json",
            r#"{"error":"out of credits"}"#,
        );
        match error {
            ClientError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 402);
                assert_eq!(message, "out of credits");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_known_status_with_text_body() {
        let error = error_from_status("post to crawl", 500, "text/plain", "server fell over");
        match error {
            ClientError::Api { message, .. } => assert_eq!(message, "server fell over"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_known_status_json_without_error_field() {
        let error = error_from_status("post to crawl", 409, "application/json", r#"{"oops":1}"#);
        match error {
            ClientError::Api { message, .. } => assert_eq!(message, r#"{"oops":1}"#),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_status_is_unexpected() {
        let error = error_from_status("get from data/credits", 418, "text/plain", "teapot");
        match error {
            ClientError::UnexpectedStatus { status, body, .. } => {
                assert_eq!(status, 418);
                assert_eq!(body, "teapot");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_json_round_trip() {
        let decoded =
            decode_success("post to crawl", "application/json", r#"{"pages":[1,2]}"#).unwrap();
        assert_eq!(decoded, json!({"pages": [1, 2]}));
    }

    #[test]
    fn test_decode_jsonl_to_array() {
        let decoded = decode_success(
            "post to crawl",
            "application/jsonl",
            "{\"a\":1}\n{\"b\":2}",
        )
        .unwrap();
        assert_eq!(decoded, json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn test_decode_empty_body_is_null() {
        let decoded = decode_success("delete from data/pages", "application/json", "").unwrap();
        assert_eq!(decoded, Value::Null);
    }

    #[test]
    fn test_decode_non_json_is_raw_string() {
        let decoded = decode_success("get from data/sign-url", "text/plain", "hello").unwrap();
        assert_eq!(decoded, Value::String("hello".into()));
    }

    #[test]
    fn test_decode_invalid_json_errors() {
        let result = decode_success("post to crawl", "application/json", "{nope");
        assert!(matches!(result, Err(ClientError::Decode { .. })));
    }
}
