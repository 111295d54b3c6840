//! Request line construction from `KEY=VALUE` arguments.

use serde_json::{Map, Value};

use crate::errors::ClientError;

const ACTION_KEY: &str = "action";

/// Builds the request object for `action` with the given parameters.
pub(crate) fn build_request(action: &str, params: &[String]) -> Result<Value, ClientError> {
    let mut request = Map::new();
    request.insert(ACTION_KEY.to_owned(), Value::String(action.to_owned()));
    for param in params {
        let (key, value) = split_param(param)?;
        if key == ACTION_KEY {
            return Err(ClientError::ReservedKey(key.to_owned()));
        }
        request.insert(key.to_owned(), parse_value(value));
    }
    Ok(Value::Object(request))
}

fn split_param(param: &str) -> Result<(&str, &str), ClientError> {
    match param.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ClientError::MalformedParameter(param.to_owned())),
    }
}

/// `3` becomes a number and `[1,2]` an array; `Bass` stays a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
