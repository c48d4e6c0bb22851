//! Field remapping between the delegated service's wire format and ours.
//!
//! The upstream service encodes consent state, status, and display type as
//! integers and uses a few legacy field names (`eula`, `value`, `op`). These
//! helpers translate responses in place and encode outgoing consents.

use serde_json::Value;

/// Integer-coded consent state to its string name.
pub fn state_name(code: u64) -> Option<&'static str> {
    match code {
        1 => Some("allow"),
        2 => Some("deny"),
        3 => Some("opt_in"),
        4 => Some("opt_out"),
        5 => Some("transparent"),
        _ => None,
    }
}

/// Consent state name to its integer code.
pub fn state_code(name: &str) -> Option<u64> {
    match name {
        "allow" => Some(1),
        "deny" => Some(2),
        "opt_in" => Some(3),
        "opt_out" => Some(4),
        "transparent" => Some(5),
        _ => None,
    }
}

/// Integer-coded display type to its string name.
pub fn display_type_name(code: u64) -> Option<&'static str> {
    match code {
        1 => Some("do_not_show"),
        2 => Some("transparent"),
        3 => Some("opt_in_or_out"),
        4 => Some("allow_or_deny"),
        _ => None,
    }
}

/// Integer-coded consent status to its string name.
pub fn status_name(code: u64) -> Option<&'static str> {
    match code {
        1 => Some("active"),
        2 => Some("expired"),
        3 => Some("future"),
        8 => Some("none"),
        _ => None,
    }
}

/// Split an upstream error string of the form `"<CODE> <description>"`.
///
/// Upstream codes start with `CS`; anything else maps to `unknown` with the
/// full string as the description.
pub fn split_error_string(error: &str) -> (String, String) {
    if error.starts_with("CS") {
        if let Some(idx) = error.find(' ') {
            return (error[..idx].to_string(), error[idx + 1..].to_string());
        }
    }
    ("unknown".to_string(), error.to_string())
}

fn replace_code(value: &mut Value, lookup: fn(u64) -> Option<&'static str>) {
    if let Some(code) = value.as_u64() {
        if let Some(name) = lookup(code) {
            *value = Value::String(name.to_string());
        }
    }
}

/// Collapse each assessment item's `result` array to its first element.
pub fn remap_assessment(response: &mut Value) {
    let Some(items) = response
        .get_mut("assessment")
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    for item in items {
        let Some(result) = item.get_mut("result") else {
            continue;
        };
        if let Some(first) = result.as_array().and_then(|a| a.first()).cloned() {
            *result = first;
        }
    }
}

/// Rename `eula` to `document` and decode integer codes in `default` entries.
pub fn remap_metadata(response: &mut Value) {
    let Some(metadata) = response.get_mut("metadata").and_then(Value::as_object_mut) else {
        return;
    };

    if let Some(eula) = metadata.remove("eula") {
        metadata.insert("document".to_string(), eula);
    }

    let Some(default_entries) = metadata.get_mut("default").and_then(Value::as_array_mut) else {
        return;
    };

    for entry in default_entries {
        if let Some(consent_type) = entry.get_mut("consentType") {
            replace_code(consent_type, display_type_name);
        }
        if let Some(consent) = entry.get_mut("consent").filter(|c| !c.is_null()) {
            if let Some(state) = consent.get_mut("state") {
                replace_code(state, state_name);
            }
            if let Some(status) = consent.get_mut("status") {
                replace_code(status, status_name);
            }
        }
    }
}

/// Normalize a consent-store response: `value` becomes `consent` with the
/// state decoded, `op` is dropped, and error strings become structured
/// `{messageId, messageDescription}` objects.
pub fn remap_store_response(response: &mut Value) {
    let Some(results) = response.get_mut("results").and_then(Value::as_array_mut) else {
        return;
    };

    for result in results {
        let Some(obj) = result.as_object_mut() else {
            continue;
        };

        if let Some(mut value) = obj.remove("value") {
            if let Some(state) = value.get_mut("state") {
                replace_code(state, state_name);
            }
            obj.insert("consent".to_string(), value);
        }

        obj.remove("op");

        if let Some(error) = obj.get("error").and_then(Value::as_str) {
            if !error.is_empty() {
                let (message_id, description) = split_error_string(error);
                obj.insert(
                    "error".to_string(),
                    serde_json::json!({
                        "messageId": message_id,
                        "messageDescription": description,
                    }),
                );
            }
        }
    }
}

/// Encode outgoing consents for the upstream service: state names become
/// integer codes, consents are marked global, and `isExternalSubject` is
/// defaulted. Returns the `geoIP` override carried by the batch, if any.
pub fn prepare_consents(consents: &mut [Value]) -> Option<String> {
    let mut client_ip = None;

    for consent in consents.iter_mut() {
        let Some(obj) = consent.as_object_mut() else {
            continue;
        };

        if let Some(code) = obj
            .get("state")
            .and_then(Value::as_str)
            .and_then(state_code)
        {
            obj.insert("state".to_string(), Value::from(code));
        }

        if let Some(ip) = obj.get("geoIP").and_then(Value::as_str) {
            if !ip.is_empty() {
                client_ip = Some(ip.to_string());
            }
        }

        obj.insert("isGlobal".to_string(), Value::Bool(true));

        if !obj.contains_key("isExternalSubject") {
            obj.insert("isExternalSubject".to_string(), Value::Bool(false));
        }
    }

    client_ip
}
