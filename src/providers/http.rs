use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const ERROR_PREVIEW_CHARS: usize = 180;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("retrofit-oracle/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

pub fn client() -> &'static Client {
    &HTTP_CLIENT
}

pub async fn fetch_json(url: &str) -> Result<Value> {
    send_json(HTTP_CLIENT.get(url), url).await
}

pub async fn post_json(url: &str, bearer: &str, payload: &Value) -> Result<Value> {
    let request = HTTP_CLIENT.post(url).bearer_auth(bearer).json(payload);
    send_json(request, url).await
}

/// Sends a prepared request and parses the body as JSON. `label` names the
/// endpoint in error messages.
pub async fn send_json(request: RequestBuilder, label: &str) -> Result<Value> {
    let response = request
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("failed request: {label}"))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed reading response body: {label}"))?;
    if !status.is_success() {
        let preview: String = body.chars().take(ERROR_PREVIEW_CHARS).collect();
        return Err(anyhow!("{label} returned {status}: {preview}"));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).with_context(|| format!("invalid JSON response: {label}"))
}

/// Arrays of objects found at the top level or under any of `keys`, one level
/// of nesting deep. Upstream APIs disagree on envelope shape.
pub fn candidate_object_arrays<'a>(value: &'a Value, keys: &[&str]) -> Vec<&'a Vec<Value>> {
    let mut arrays = Vec::new();
    if let Some(arr) = value.as_array() {
        if looks_like_object_array(arr) {
            arrays.push(arr);
        }
    }
    let Some(object) = value.as_object() else {
        return arrays;
    };
    for key in keys {
        let Some(v) = object_get_case_insensitive(object, key) else {
            continue;
        };
        if let Some(arr) = v.as_array() {
            if looks_like_object_array(arr) {
                arrays.push(arr);
            }
        } else if let Some(nested) = v.as_object() {
            for nested_key in keys {
                if let Some(arr) =
                    object_get_case_insensitive(nested, nested_key).and_then(Value::as_array)
                {
                    if looks_like_object_array(arr) {
                        arrays.push(arr);
                    }
                }
            }
        }
    }
    arrays
}

fn looks_like_object_array(arr: &[Value]) -> bool {
    arr.iter().take(5).any(Value::is_object)
}

pub fn string_from_paths(object: &Map<String, Value>, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match object_path_value(object, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn number_from_paths(object: &Map<String, Value>, paths: &[&str]) -> Option<f64> {
    paths
        .iter()
        .find_map(|path| object_path_value(object, path).and_then(to_f64))
}

pub fn object_path_value<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = object_get_case_insensitive(object, first)?;
    for segment in segments {
        let nested = current.as_object()?;
        current = object_get_case_insensitive(nested, segment)?;
    }
    Some(current)
}

pub fn object_get_case_insensitive<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let sanitized = s
                .trim()
                .trim_start_matches('£')
                .replace(',', "")
                .replace('_', "");
            sanitized.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}
