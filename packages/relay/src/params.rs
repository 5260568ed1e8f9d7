//! Typed access to an inbound call's parameter bag.
//!
//! Callers pass parameters in the query string, as a urlencoded form body,
//! or as a JSON body. [`InboundCall::param`] looks a key up across all
//! three (in that order) and returns a tagged optional value, so the
//! coercion policy lives in one place instead of ad hoc checks at every
//! call site.

use serde_json::Value;

use crate::gateway::InboundCall;

/// A parameter value with its provenance: absent, a string from the query
/// string or a form body, or a JSON value from a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Absent,
    Str(String),
    Json(Value),
}

impl Param {
    pub fn is_present(&self) -> bool {
        !matches!(self, Param::Absent)
    }

    /// The value as a string, when it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            Param::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer: JSON numbers directly, strings by parsing.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Param::Str(s) => s.parse().ok(),
            Param::Json(Value::Number(n)) => n.as_i64(),
            Param::Json(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Boolean coercion. JSON booleans are taken as-is; the strings
    /// "true"/"yes"/"1" and "false"/"no"/"0" (case-insensitive) map to
    /// their obvious values; anything else yields `default`.
    pub fn as_bool(&self, default: bool) -> bool {
        let text = match self {
            Param::Json(Value::Bool(b)) => return *b,
            Param::Str(s) => s.as_str(),
            Param::Json(Value::String(s)) => s.as_str(),
            _ => return default,
        };
        match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => default,
        }
    }
}

impl InboundCall {
    /// Look `key` up in the call's parameter bag: query string first, then
    /// a urlencoded form body, then a top-level JSON body key.
    pub fn param(&self, key: &str) -> Param {
        if let Some(value) = self.query_first(key) {
            return Param::Str(value.to_string());
        }
        if self.method == "POST" {
            if self
                .content_type
                .contains("application/x-www-form-urlencoded")
            {
                if let Some(value) = form_value(&self.body, key) {
                    return Param::Str(value);
                }
            }
            if self.content_type.contains("application/json") {
                if let Ok(body) = serde_json::from_str::<Value>(&self.body) {
                    if let Some(value) = body.get(key) {
                        return Param::Json(value.clone());
                    }
                }
            }
        }
        Param::Absent
    }
}

/// Extract one key from a urlencoded form body. Keys are decoded the same
/// way values are, so an encoded key still matches.
fn form_value(body: &str, key: &str) -> Option<String> {
    for pair in body.split('&') {
        let Some((k, v)) = pair.split_once('=') else {
            continue;
        };
        if form_decode(k) == key {
            return Some(form_decode(v));
        }
    }
    None
}

/// Decode one urlencoded form component ('+' is a space).
fn form_decode(component: &str) -> String {
    let component = component.replace('+', " ");
    match urlencoding::decode(&component) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => component,
    }
}
